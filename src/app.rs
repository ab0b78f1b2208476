use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::engine::evaluate::Verdict;
use crate::engine::progress::ProgressTracker;
use crate::engine::scene::{MapZone, Marker};
use crate::error::QuizError;
use crate::quiz::library::QuizLibrary;
use crate::quiz::model::QuestionKind;
use crate::session::quiz_session::{Phase, QuizSession, Signal};
use crate::store::KeyValueStore;
use crate::ui::components::menu::Menu;
use crate::ui::theme::Theme;
use crate::vocabulary::VocabList;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    MainMenu,
    QuizSelect,
    Question,
    Result,
    Summary,
    Finale,
    Vocabulary,
}

pub type Session = QuizSession<Box<dyn KeyValueStore>>;

pub struct App {
    pub screen: AppScreen,
    pub menu: Menu<'static>,
    pub theme: &'static Theme,
    pub config: Config,
    pub library: QuizLibrary,
    pub vocabulary: VocabList,
    pub session: Session,
    pub quiz_selected: usize,
    pub cursor: usize,
    pub hint_visible: bool,
    pub vocab_scroll: usize,
    pub marker_order: Vec<Marker>,
    pub last_signal: Option<Signal>,
    pub last_quiz_name: String,
    pub status: Option<String>,
    pub should_quit: bool,
    rng: SmallRng,
}

impl App {
    pub fn new(config: Config, store: Box<dyn KeyValueStore>) -> Self {
        let loaded_theme = Theme::load(&config.theme).unwrap_or_else(|| {
            warn!(theme = %config.theme, "unknown theme, using default");
            Theme::default()
        });
        let theme: &'static Theme = Box::leak(Box::new(loaded_theme));
        let library = QuizLibrary::load(&config.quiz_dir());
        Self::with_parts(config, theme, library, store, SmallRng::from_entropy())
    }

    pub fn with_parts(
        config: Config,
        theme: &'static Theme,
        library: QuizLibrary,
        store: Box<dyn KeyValueStore>,
        rng: SmallRng,
    ) -> Self {
        let progress = ProgressTracker::new(store, config.finale_threshold);
        info!(
            quizzes = library.len(),
            completed = progress.completed_count(),
            "app ready"
        );
        Self {
            screen: AppScreen::MainMenu,
            menu: Menu::main(theme),
            theme,
            config,
            library,
            vocabulary: VocabList::load(),
            session: QuizSession::new(progress),
            quiz_selected: 0,
            cursor: 0,
            hint_visible: false,
            vocab_scroll: 0,
            marker_order: Marker::all(),
            last_signal: None,
            last_quiz_name: String::new(),
            status: None,
            should_quit: false,
            rng,
        }
    }

    pub fn activate_menu_item(&mut self) {
        match self.menu.selected {
            0 => self.go_to_quiz_select(),
            1 => self.go_to_vocabulary(),
            2 => self.reset_progress(),
            _ => self.should_quit = true,
        }
    }

    pub fn go_to_menu(&mut self) {
        if self.session.phase() != Phase::Idle {
            let signal = self.session.quit_to_menu();
            self.apply_signal(signal);
            return;
        }
        self.screen = AppScreen::MainMenu;
        self.hint_visible = false;
    }

    pub fn go_to_quiz_select(&mut self) {
        self.status = None;
        if self.library.is_empty() {
            self.status = Some("No quizzes found.".to_string());
            return;
        }
        self.quiz_selected = self.quiz_selected.min(self.library.len() - 1);
        self.screen = AppScreen::QuizSelect;
    }

    pub fn go_to_vocabulary(&mut self) {
        self.status = None;
        self.vocab_scroll = 0;
        self.screen = AppScreen::Vocabulary;
    }

    pub fn quiz_select_next(&mut self) {
        if !self.library.is_empty() {
            self.quiz_selected = (self.quiz_selected + 1) % self.library.len();
        }
    }

    pub fn quiz_select_prev(&mut self) {
        if !self.library.is_empty() {
            self.quiz_selected = self
                .quiz_selected
                .checked_sub(1)
                .unwrap_or(self.library.len() - 1);
        }
    }

    pub fn scroll_vocabulary(&mut self, down: bool) {
        let max = self.vocabulary.terms.len().saturating_sub(1);
        self.vocab_scroll = if down {
            (self.vocab_scroll + 1).min(max)
        } else {
            self.vocab_scroll.saturating_sub(1)
        };
    }

    pub fn start_quiz(&mut self, index: usize) {
        let Some(quiz) = self.library.get(index).cloned() else {
            return;
        };
        self.quiz_selected = index;
        self.last_quiz_name = quiz.name.clone();
        match self.session.start_quiz(quiz) {
            Ok(()) => {
                self.status = None;
                self.last_signal = None;
                self.prepare_question();
                self.screen = AppScreen::Question;
            }
            Err(e) => self.report(e),
        }
    }

    pub fn start_selected_quiz(&mut self) {
        self.start_quiz(self.quiz_selected);
    }

    /// Resets per-question UI state after the session loads a question.
    fn prepare_question(&mut self) {
        self.cursor = 0;
        self.hint_visible = false;
        if self.config.shuffle_drag_items {
            if let Some(board) = self.session.drag_board_mut() {
                board.shuffle_pool(&mut self.rng);
            }
        }
        if self.session.hidden_board().is_some() {
            self.marker_order = Marker::all();
            self.marker_order.shuffle(&mut self.rng);
        }
    }

    /// Number of selectable rows on the current question.
    pub fn cursor_len(&self) -> usize {
        match self.session.current_question().map(|q| &q.kind) {
            Some(QuestionKind::Standard { options }) => options.len(),
            Some(QuestionKind::DragAndDrop { .. }) => self
                .session
                .drag_board()
                .map_or(0, |b| b.pool().len() + b.zone().len()),
            Some(QuestionKind::MapSelection) => MapZone::ALL.len(),
            Some(QuestionKind::HiddenObject) => self.marker_order.len(),
            None => 0,
        }
    }

    pub fn move_cursor(&mut self, down: bool) {
        let len = self.cursor_len();
        if len == 0 {
            return;
        }
        self.cursor = if down {
            (self.cursor + 1) % len
        } else {
            self.cursor.checked_sub(1).unwrap_or(len - 1)
        };
    }

    pub fn toggle_hint(&mut self) {
        self.hint_visible = !self.hint_visible;
    }

    /// Digit shortcut: picks row `index` directly. Standard and map
    /// questions submit immediately, hidden object questions toggle.
    pub fn choose(&mut self, index: usize) {
        if index >= self.cursor_len() {
            return;
        }
        self.cursor = index;
        match self.session.current_question().map(|q| &q.kind) {
            Some(QuestionKind::Standard { .. } | QuestionKind::MapSelection) => self.confirm(),
            Some(QuestionKind::HiddenObject) => self.toggle_at_cursor(),
            _ => {}
        }
    }

    /// Enter on a question: answers with the row under the cursor, or submits
    /// the board for drag and hidden object questions.
    pub fn confirm(&mut self) {
        let kind = self.session.current_question().map(|q| q.kind.clone());
        let result = match kind {
            Some(QuestionKind::Standard { .. }) => self.session.submit_standard(self.cursor),
            Some(QuestionKind::MapSelection) => {
                let zone = MapZone::ALL[self.cursor.min(MapZone::ALL.len() - 1)];
                let verdict = self.config.map_scene.zone_result(zone);
                self.session.report_zone_result(verdict.correct, verdict.feedback)
            }
            Some(QuestionKind::DragAndDrop { .. } | QuestionKind::HiddenObject) => {
                return self.submit_board();
            }
            None => return,
        };
        self.after_submit(result);
    }

    /// Space on a drag or hidden object question.
    pub fn toggle_at_cursor(&mut self) {
        let cursor = self.cursor;
        if let Some(board) = self.session.drag_board_mut() {
            let pool_len = board.pool().len();
            if cursor < pool_len {
                board.place(cursor);
            } else {
                board.unplace(cursor - pool_len);
            }
            return;
        }
        let Some(marker) = self.marker_order.get(cursor).copied() else {
            return;
        };
        if let Some(board) = self.session.hidden_board_mut() {
            if let Err(e) = board.toggle(marker) {
                self.report(e.into());
            }
        }
    }

    pub fn submit_board(&mut self) {
        let result = if self.session.drag_board().is_some() {
            self.session.submit_drag_board()
        } else if self.session.hidden_board().is_some() {
            self.session
                .submit_hidden_object(&self.config.hidden_object_scene)
        } else {
            return;
        };
        self.after_submit(result);
    }

    fn after_submit(&mut self, result: Result<Verdict, QuizError>) {
        match result {
            Ok(_) => {
                self.status = None;
                self.screen = AppScreen::Result;
            }
            Err(e) => self.report(e),
        }
    }

    /// Enter on the result, summary or finale screens.
    pub fn advance(&mut self) {
        match self.session.advance() {
            Some(signal) => self.apply_signal(signal),
            None if self.session.phase() == Phase::InQuestion => {
                self.prepare_question();
                self.screen = AppScreen::Question;
            }
            None => {}
        }
    }

    pub fn apply_signal(&mut self, signal: Signal) {
        match signal {
            Signal::QuizFinished { .. } => {
                self.last_signal = Some(signal);
                self.screen = AppScreen::Summary;
            }
            Signal::GrandFinaleReached { .. } => {
                self.last_signal = Some(signal);
                self.screen = AppScreen::Finale;
            }
            Signal::ReturnToMenu => {
                self.hint_visible = false;
                self.cursor = 0;
                self.screen = AppScreen::MainMenu;
            }
        }
    }

    pub fn reset_progress(&mut self) {
        match self.session.reset_progress() {
            Ok(()) => {
                info!("progress reset");
                self.status = Some("Progress reset.".to_string());
            }
            Err(e) => {
                warn!(error = %e, "could not reset progress");
                self.status = Some(format!("Could not reset progress: {e}"));
            }
        }
    }

    fn report(&mut self, error: QuizError) {
        if error.is_malformed() {
            warn!(error = %error, "quiz refused");
            self.status = Some(format!("Cannot open quiz: {error}"));
        } else {
            debug!(error = %error, "submission rejected");
            self.status = Some(error.to_string());
        }
    }

    /// Score and total of the quiz that just ended.
    pub fn final_score(&self) -> (u32, usize) {
        match self.last_signal {
            Some(Signal::QuizFinished { score, total })
            | Some(Signal::GrandFinaleReached { score, total }) => (score, total),
            _ => (0, 0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::model::Quiz;
    use crate::store::MemoryStore;

    fn app() -> App {
        let theme: &'static Theme = Box::leak(Box::new(Theme::default()));
        let library = QuizLibrary {
            quizzes: QuizLibrary::load_bundled(),
        };
        App::with_parts(
            Config::default(),
            theme,
            library,
            Box::new(MemoryStore::new()),
            SmallRng::seed_from_u64(7),
        )
    }

    fn index_of(app: &App, name: &str) -> usize {
        app.library
            .quizzes
            .iter()
            .position(|q| q.name == name)
            .unwrap()
    }

    fn correct_standard_index(app: &App) -> usize {
        match &app.session.current_question().unwrap().kind {
            QuestionKind::Standard { options } => options.iter().position(|o| o.is_correct).unwrap(),
            other => panic!("expected standard question, got {}", other.name()),
        }
    }

    #[test]
    fn test_menu_items_route_to_screens() {
        let mut app = app();
        app.activate_menu_item();
        assert_eq!(app.screen, AppScreen::QuizSelect);

        app.go_to_menu();
        assert_eq!(app.screen, AppScreen::MainMenu);
        app.menu.selected = 1;
        app.activate_menu_item();
        assert_eq!(app.screen, AppScreen::Vocabulary);

        app.menu.selected = 3;
        app.activate_menu_item();
        assert!(app.should_quit);
    }

    #[test]
    fn test_wrong_answer_shows_try_again_then_same_question() {
        let mut app = app();
        let idx = index_of(&app, "Emergency Backpack");
        app.start_quiz(idx);
        assert_eq!(app.screen, AppScreen::Question);

        let right = correct_standard_index(&app);
        let wrong = (right + 1) % app.cursor_len();
        app.choose(wrong);
        assert_eq!(app.screen, AppScreen::Result);
        assert!(!app.session.last_verdict().unwrap().correct);

        app.advance();
        assert_eq!(app.screen, AppScreen::Question);
        assert_eq!(app.session.question_index(), 0);

        app.choose(right);
        app.advance();
        assert_eq!(app.session.question_index(), 1);
        assert_eq!(app.session.score(), 1);
    }

    #[test]
    fn test_map_question_uses_configured_scene() {
        let mut app = app();
        let idx = index_of(&app, "Shelter Rules");
        app.start_quiz(idx);
        while !matches!(
            app.session.current_question().unwrap().kind,
            QuestionKind::MapSelection
        ) {
            let right = correct_standard_index(&app);
            app.choose(right);
            app.advance();
        }

        app.choose(0);
        let verdict = app.session.last_verdict().unwrap();
        assert!(!verdict.correct);
        assert_eq!(verdict.feedback, app.config.map_scene.wrong.feedback);
        app.advance();

        app.cursor = 2;
        app.confirm();
        assert!(app.session.last_verdict().unwrap().correct);
    }

    #[test]
    fn test_escape_from_question_abandons_quiz() {
        let mut app = app();
        app.start_quiz(0);
        app.go_to_menu();
        assert_eq!(app.screen, AppScreen::MainMenu);
        assert_eq!(app.session.phase(), Phase::Idle);
        assert_eq!(app.session.progress().completed_count(), 0);
    }

    #[test]
    fn test_cursor_wraps() {
        let mut app = app();
        app.start_quiz(0);
        let len = app.cursor_len();
        assert!(len > 0);
        app.move_cursor(false);
        assert_eq!(app.cursor, len - 1);
        app.move_cursor(true);
        assert_eq!(app.cursor, 0);
    }

    #[test]
    fn test_malformed_quiz_stays_on_selection_with_status() {
        let mut app = app();
        app.library.quizzes.push(Quiz {
            name: "Empty".to_string(),
            questions: Vec::new(),
        });
        app.go_to_quiz_select();
        let idx = index_of(&app, "Empty");
        app.start_quiz(idx);

        assert_eq!(app.screen, AppScreen::QuizSelect);
        assert_eq!(app.session.phase(), Phase::Idle);
        assert_eq!(
            app.status.as_deref(),
            Some("Cannot open quiz: quiz \"Empty\" is malformed: it has no questions")
        );
    }

    #[test]
    fn test_reset_progress_sets_status() {
        let mut app = app();
        app.reset_progress();
        assert_eq!(app.status.as_deref(), Some("Progress reset."));
    }
}
