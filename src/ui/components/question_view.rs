use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::engine::scene::{HiddenObjectBoard, HiddenObjectScene, MapScene, MapZone, Marker};
use crate::quiz::model::{AnswerOption, Question, QuestionKind};
use crate::session::drag_board::DragBoard;
use crate::ui::theme::{Theme, ThemeColors};

pub struct QuestionView<'a> {
    pub quiz_name: &'a str,
    pub question: &'a Question,
    pub number: usize,
    pub total: usize,
    pub score: u32,
    pub cursor: usize,
    pub hint_visible: bool,
    pub drag_board: Option<&'a DragBoard>,
    pub hidden_board: Option<&'a HiddenObjectBoard>,
    pub marker_order: &'a [Marker],
    pub hidden_scene: Option<&'a HiddenObjectScene>,
    pub map_scene: Option<&'a MapScene>,
    pub theme: &'a Theme,
}

impl<'a> QuestionView<'a> {
    pub fn new(quiz_name: &'a str, question: &'a Question, theme: &'a Theme) -> Self {
        Self {
            quiz_name,
            question,
            number: 1,
            total: 1,
            score: 0,
            cursor: 0,
            hint_visible: false,
            drag_board: None,
            hidden_board: None,
            marker_order: &[],
            hidden_scene: None,
            map_scene: None,
            theme,
        }
    }

    pub fn position(mut self, index: usize, total: usize, score: u32) -> Self {
        self.number = index + 1;
        self.total = total;
        self.score = score;
        self
    }

    pub fn cursor(mut self, cursor: usize) -> Self {
        self.cursor = cursor;
        self
    }

    pub fn hint_visible(mut self, visible: bool) -> Self {
        self.hint_visible = visible;
        self
    }

    pub fn drag_board(mut self, board: Option<&'a DragBoard>) -> Self {
        self.drag_board = board;
        self
    }

    pub fn hidden_object(
        mut self,
        board: Option<&'a HiddenObjectBoard>,
        order: &'a [Marker],
        scene: &'a HiddenObjectScene,
    ) -> Self {
        self.hidden_board = board;
        self.marker_order = order;
        self.hidden_scene = Some(scene);
        self
    }

    pub fn map_scene(mut self, scene: &'a MapScene) -> Self {
        self.map_scene = Some(scene);
        self
    }

    fn hint_lines(&self) -> Vec<Line<'a>> {
        if !self.hint_visible {
            return Vec::new();
        }
        let colors = &self.theme.colors;
        let text = match self.question.hint.as_deref() {
            Some(hint) => format!("Hint: {hint}"),
            None => "No hint for this question.".to_string(),
        };
        vec![Line::from(Span::styled(
            text,
            Style::default().fg(colors.warning()),
        ))]
    }

    fn render_options(&self, options: &[AnswerOption], area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let lines: Vec<Line> = options
            .iter()
            .enumerate()
            .map(|(i, option)| {
                cursor_line(i == self.cursor, format!("{}. {}", i + 1, option.label), colors)
            })
            .collect();
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }

    fn render_map(&self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let fallback = MapScene::default();
        let scene = self.map_scene.unwrap_or(&fallback);

        let mut lines = vec![
            Line::from(Span::styled(
                "Where do you go?",
                Style::default().fg(colors.text_pending()),
            )),
            Line::from(""),
        ];
        lines.extend(MapZone::ALL.iter().enumerate().map(|(i, zone)| {
            cursor_line(
                i == self.cursor,
                format!("{}. {}", i + 1, scene.spot(*zone).label),
                colors,
            )
        }));
        Paragraph::new(lines).render(area, buf);
    }

    fn render_drag(&self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let Some(board) = self.drag_board else {
            return;
        };

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(area);

        let pool_len = board.pool().len();
        let pool_cursor = (self.cursor < pool_len).then_some(self.cursor);
        let zone_cursor = self.cursor.checked_sub(pool_len);

        let pool_lines: Vec<Line> = board
            .pool()
            .iter()
            .enumerate()
            .map(|(i, item)| cursor_line(pool_cursor == Some(i), item.identifier.clone(), colors))
            .collect();
        let zone_lines: Vec<Line> = board
            .zone()
            .iter()
            .enumerate()
            .map(|(i, item)| cursor_line(zone_cursor == Some(i), item.identifier.clone(), colors))
            .collect();

        let column = |title: &str, focused: bool| {
            Block::bordered().title(format!(" {title} ")).border_style(
                Style::default().fg(if focused {
                    colors.border_focused()
                } else {
                    colors.border()
                }),
            )
        };

        Paragraph::new(pool_lines)
            .block(column("Items", pool_cursor.is_some()))
            .render(columns[0], buf);
        Paragraph::new(zone_lines)
            .block(column("Drop zone", zone_cursor.is_some()))
            .render(columns[1], buf);
    }

    fn render_hidden(&self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let Some(scene) = self.hidden_scene else {
            return;
        };

        let mut lines = vec![
            Line::from(Span::styled(
                "Mark every dangerous object.",
                Style::default().fg(colors.text_pending()),
            )),
            Line::from(""),
        ];
        for (i, marker) in self.marker_order.iter().enumerate() {
            let checked = self
                .hidden_board
                .is_some_and(|board| board.is_selected(*marker));
            let check = if checked { "[x]" } else { "[ ]" };
            let label = scene.label(*marker).unwrap_or("?");
            let text = format!("{check} {}. {label}", i + 1);
            if checked && i != self.cursor {
                lines.push(Line::from(Span::styled(
                    format!("   {text}"),
                    Style::default().fg(colors.success()),
                )));
            } else {
                lines.push(cursor_line(i == self.cursor, text, colors));
            }
        }
        Paragraph::new(lines).render(area, buf);
    }
}

fn cursor_line<'l>(selected: bool, text: String, colors: &ThemeColors) -> Line<'l> {
    if selected {
        Line::from(Span::styled(
            format!(" > {text}"),
            Style::default()
                .fg(colors.selected())
                .add_modifier(Modifier::BOLD),
        ))
    } else {
        Line::from(Span::styled(format!("   {text}"), Style::default().fg(colors.fg())))
    }
}

fn wrapped_height(text: &str, width: u16) -> u16 {
    if width == 0 {
        return 1;
    }
    text.lines()
        .map(|line| line.chars().count().max(1).div_ceil(width as usize))
        .sum::<usize>()
        .max(1) as u16
}

impl Widget for QuestionView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(format!(" {} ", self.quiz_name))
            .title_bottom(Line::from(format!(
                " Question {}/{}  Score {} ",
                self.number, self.total, self.score
            )))
            .border_style(Style::default().fg(colors.border_focused()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let hint = self.hint_lines();
        let text_height = wrapped_height(&self.question.text, inner.width);
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(text_height),
                Constraint::Length(1),
                Constraint::Min(3),
                Constraint::Length(hint.len() as u16 * 2),
            ])
            .split(inner);

        Paragraph::new(Span::styled(
            &*self.question.text,
            Style::default().fg(colors.fg()).add_modifier(Modifier::BOLD),
        ))
        .wrap(Wrap { trim: true })
        .render(layout[0], buf);

        match &self.question.kind {
            QuestionKind::Standard { options } => self.render_options(options, layout[2], buf),
            QuestionKind::DragAndDrop { .. } => self.render_drag(layout[2], buf),
            QuestionKind::MapSelection => self.render_map(layout[2], buf),
            QuestionKind::HiddenObject => self.render_hidden(layout[2], buf),
        }

        if !hint.is_empty() {
            Paragraph::new(hint)
                .wrap(Wrap { trim: true })
                .render(layout[3], buf);
        }
    }
}
