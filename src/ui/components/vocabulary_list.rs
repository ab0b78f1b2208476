use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::ui::theme::Theme;
use crate::vocabulary::VocabList;

pub struct VocabularyList<'a> {
    pub list: &'a VocabList,
    pub scroll: usize,
    pub theme: &'a Theme,
}

impl<'a> VocabularyList<'a> {
    pub fn new(list: &'a VocabList, scroll: usize, theme: &'a Theme) -> Self {
        Self {
            list,
            scroll: scroll.min(list.terms.len().saturating_sub(1)),
            theme,
        }
    }
}

impl Widget for VocabularyList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(format!(" Vocabulary ({}) ", self.list.terms.len()))
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));

        if self.list.terms.is_empty() {
            Paragraph::new(Span::styled(
                "No vocabulary available.",
                Style::default().fg(colors.text_pending()),
            ))
            .block(block)
            .render(area, buf);
            return;
        }

        let mut lines: Vec<Line> = Vec::new();
        for term in self.list.terms.iter().skip(self.scroll) {
            lines.push(Line::from(Span::styled(
                &*term.word,
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(Span::styled(
                format!("  {}", term.definition),
                Style::default().fg(colors.fg()),
            )));
            lines.push(Line::from(""));
        }

        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }
}
