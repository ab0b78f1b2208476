use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::ui::theme::Theme;

pub struct MenuItem {
    pub key: String,
    pub label: String,
    pub description: String,
}

impl MenuItem {
    pub fn new(key: &str, label: &str, description: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            description: description.to_string(),
        }
    }
}

pub struct Menu<'a> {
    pub title: String,
    pub subtitle: String,
    pub items: Vec<MenuItem>,
    pub selected: usize,
    pub theme: &'a Theme,
}

impl<'a> Menu<'a> {
    pub fn new(title: &str, subtitle: &str, items: Vec<MenuItem>, theme: &'a Theme) -> Self {
        Self {
            title: title.to_string(),
            subtitle: subtitle.to_string(),
            items,
            selected: 0,
            theme,
        }
    }

    pub fn main(theme: &'a Theme) -> Self {
        Self::new(
            "quizdr",
            "Safety quizzes in your terminal",
            vec![
                MenuItem::new("1", "Quizzes", "Pick a quiz and play it through"),
                MenuItem::new("2", "Vocabulary", "Browse the glossary of terms"),
                MenuItem::new("r", "Reset progress", "Forget which quizzes are completed"),
                MenuItem::new("q", "Quit", "Leave quizdr"),
            ],
            theme,
        )
    }

    pub fn selected(mut self, selected: usize) -> Self {
        self.selected = selected.min(self.items.len().saturating_sub(1));
        self
    }

    pub fn next(&mut self) {
        if self.items.is_empty() {
            return;
        }
        self.selected = (self.selected + 1) % self.items.len();
    }

    pub fn prev(&mut self) {
        if self.items.is_empty() {
            return;
        }
        if self.selected > 0 {
            self.selected -= 1;
        } else {
            self.selected = self.items.len() - 1;
        }
    }
}

impl Widget for &Menu<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(inner);

        let title_lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                &*self.title,
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(&*self.subtitle, Style::default().fg(colors.fg()))),
        ];
        Paragraph::new(title_lines)
            .alignment(Alignment::Center)
            .render(layout[0], buf);

        // Scroll so the selection stays visible on short terminals
        let visible = (layout[2].height / 3).max(1) as usize;
        let first = self.selected.saturating_sub(visible - 1);

        let menu_layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints(
                self.items
                    .iter()
                    .skip(first)
                    .take(visible)
                    .map(|_| Constraint::Length(3))
                    .collect::<Vec<_>>(),
            )
            .split(layout[2]);

        for (slot, (i, item)) in self
            .items
            .iter()
            .enumerate()
            .skip(first)
            .take(visible)
            .enumerate()
        {
            let is_selected = i == self.selected;
            let indicator = if is_selected { ">" } else { " " };

            let label_text = format!(" {indicator} [{key}] {label}", key = item.key, label = item.label);
            let desc_text = format!("     {}", item.description);

            let label_style = if is_selected {
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(colors.fg())
            };

            let lines = vec![
                Line::from(Span::styled(&*label_text, label_style)),
                Line::from(Span::styled(
                    &*desc_text,
                    Style::default().fg(colors.text_pending()),
                )),
            ];

            if slot < menu_layout.len() {
                Paragraph::new(lines).render(menu_layout[slot], buf);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_wraps_both_ways() {
        let theme = Theme::default();
        let mut menu = Menu::main(&theme);
        assert_eq!(menu.items.len(), 4);
        menu.prev();
        assert_eq!(menu.selected, 3);
        menu.next();
        assert_eq!(menu.selected, 0);
    }

    #[test]
    fn test_empty_menu_navigation_is_noop() {
        let theme = Theme::default();
        let mut menu = Menu::new("t", "s", Vec::new(), &theme).selected(5);
        menu.next();
        menu.prev();
        assert_eq!(menu.selected, 0);
    }
}
