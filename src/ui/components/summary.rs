use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::ui::components::progress_bar::ProgressBar;
use crate::ui::theme::Theme;

/// End-of-quiz screen. With `finale` set it doubles as the grand finale.
pub struct Summary<'a> {
    pub quiz_name: &'a str,
    pub score: u32,
    pub total: usize,
    pub completed: usize,
    pub threshold: usize,
    pub finale: bool,
    pub theme: &'a Theme,
}

impl<'a> Summary<'a> {
    pub fn new(quiz_name: &'a str, score: u32, total: usize, theme: &'a Theme) -> Self {
        Self {
            quiz_name,
            score,
            total,
            completed: 0,
            threshold: 0,
            finale: false,
            theme,
        }
    }

    pub fn progress(mut self, completed: usize, threshold: usize) -> Self {
        self.completed = completed;
        self.threshold = threshold;
        self
    }

    pub fn finale(mut self, finale: bool) -> Self {
        self.finale = finale;
        self
    }

    pub fn score_line(&self) -> String {
        format!("You finished the quiz! Final score: {} / {}", self.score, self.total)
    }
}

impl Widget for Summary<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let (title, border) = if self.finale {
            (" Grand Finale ", colors.success())
        } else {
            (" Quiz Complete ", colors.accent())
        };
        let block = Block::bordered()
            .title(title)
            .border_style(Style::default().fg(border))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Min(2),
                Constraint::Length(3),
                Constraint::Length(1),
            ])
            .split(inner);

        Paragraph::new(Line::from(Span::styled(
            self.quiz_name,
            Style::default()
                .fg(colors.accent())
                .add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center)
        .render(layout[0], buf);

        Paragraph::new(Line::from(Span::styled(
            self.score_line(),
            Style::default().fg(colors.fg()),
        )))
        .alignment(Alignment::Center)
        .render(layout[1], buf);

        if self.finale {
            let lines = vec![
                Line::from(Span::styled(
                    "Congratulations!",
                    Style::default()
                        .fg(colors.success())
                        .add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    "You have completed every quiz you needed. You know how to stay safe.",
                    Style::default().fg(colors.fg()),
                )),
            ];
            Paragraph::new(lines)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true })
                .render(layout[2], buf);
        }

        if self.threshold > 0 {
            ProgressBar::new("Quizzes completed", self.completed, self.threshold, self.theme)
                .render(layout[3], buf);
        }

        Paragraph::new(Line::from(Span::styled(
            "[Enter] Back to menu",
            Style::default().fg(colors.accent()),
        )))
        .alignment(Alignment::Center)
        .render(layout[4], buf);
    }
}
