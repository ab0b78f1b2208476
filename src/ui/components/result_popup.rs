use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph, Widget, Wrap};

use crate::engine::evaluate::Verdict;
use crate::ui::theme::Theme;

/// Verdict popup shown between a submission and `advance`.
pub struct ResultPopup<'a> {
    pub verdict: &'a Verdict,
    pub theme: &'a Theme,
}

impl<'a> ResultPopup<'a> {
    pub fn new(verdict: &'a Verdict, theme: &'a Theme) -> Self {
        Self { verdict, theme }
    }

    pub fn continue_label(&self) -> &'static str {
        if self.verdict.correct {
            "Next"
        } else {
            "Try again"
        }
    }
}

impl Widget for ResultPopup<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let (title, accent) = if self.verdict.correct {
            (" Correct! ", colors.success())
        } else {
            (" Not quite ", colors.error())
        };

        Clear.render(area, buf);
        let block = Block::bordered()
            .title(title)
            .border_style(Style::default().fg(accent))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(1),
                Constraint::Length(1),
            ])
            .split(inner);

        let feedback: Vec<Line> = self
            .verdict
            .feedback
            .lines()
            .map(|line| Line::from(Span::styled(line, Style::default().fg(colors.fg()))))
            .collect();
        Paragraph::new(feedback)
            .wrap(Wrap { trim: false })
            .render(layout[1], buf);

        let help = Line::from(vec![
            Span::styled(
                format!("[Enter] {}", self.continue_label()),
                Style::default().fg(accent).add_modifier(Modifier::BOLD),
            ),
            Span::styled("  [Esc] Menu", Style::default().fg(colors.accent())),
        ]);
        Paragraph::new(help)
            .alignment(Alignment::Center)
            .render(layout[2], buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_continue_label_follows_verdict() {
        let theme = Theme::default();
        let right = Verdict::new(true, "Well done");
        let wrong = Verdict::new(false, "Mistakes:\nvase");
        assert_eq!(ResultPopup::new(&right, &theme).continue_label(), "Next");
        assert_eq!(ResultPopup::new(&wrong, &theme).continue_label(), "Try again");
    }

    #[test]
    fn test_multiline_feedback_rendered_per_line() {
        let theme = Theme::default();
        let verdict = Verdict::new(false, "Mistakes:\nThe vase is fragile.");
        let area = Rect::new(0, 0, 40, 8);
        let mut buf = Buffer::empty(area);
        ResultPopup::new(&verdict, &theme).render(area, &mut buf);

        let row = |y: u16| -> String { (0..40).map(|x| buf[(x, y)].symbol().to_string()).collect() };
        assert!(row(0).contains("Not quite"));
        assert!(row(2).contains("Mistakes:"));
        assert!(row(3).contains("The vase is fragile."));
        assert!(row(6).contains("[Enter] Try again"));
    }
}
