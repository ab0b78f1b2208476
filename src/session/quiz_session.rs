use tracing::{debug, info, warn};

use crate::engine::evaluate::{self, Verdict};
use crate::engine::progress::ProgressTracker;
use crate::engine::scene::{HiddenObjectBoard, HiddenObjectScene};
use crate::error::{QuizError, SubmissionError};
use crate::quiz::model::{Question, QuestionKind, Quiz};
use crate::session::drag_board::DragBoard;
use crate::store::KeyValueStore;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    InQuestion,
    AwaitingAdvance { correct: bool },
    Finished,
}

/// Signals for the navigation layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Signal {
    QuizFinished { score: u32, total: usize },
    GrandFinaleReached { score: u32, total: usize },
    ReturnToMenu,
}

/// An answer to the current question. `Zone` carries a result judged by a
/// map or hidden object scene.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Response {
    Standard(usize),
    DragAndDrop(Vec<String>),
    Zone(Verdict),
}

impl Response {
    fn name(&self) -> &'static str {
        match self {
            Response::Standard(_) => "standard",
            Response::DragAndDrop(_) => "drag-and-drop",
            Response::Zone(_) => "zone",
        }
    }
}

#[derive(Clone, Debug)]
pub struct SessionState {
    pub quiz: Quiz,
    pub question_index: usize,
    pub score: u32,
    pub last_answer_was_correct: bool,
    pub finished: bool,
}

impl SessionState {
    fn new(quiz: Quiz) -> Self {
        Self {
            quiz,
            question_index: 0,
            score: 0,
            last_answer_was_correct: false,
            finished: false,
        }
    }

    pub fn total(&self) -> usize {
        self.quiz.questions.len()
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.quiz.questions.get(self.question_index)
    }
}

/// Gameplay controller: runs one quiz at a time through
/// `Idle -> InQuestion -> AwaitingAdvance -> ... -> Finished -> Idle`.
///
/// Wrong answers re-present the same question (mastery gate) and every
/// correct submission scores, retries included.
pub struct QuizSession<S> {
    progress: ProgressTracker<S>,
    state: Option<SessionState>,
    phase: Phase,
    drag_board: Option<DragBoard>,
    hidden_board: Option<HiddenObjectBoard>,
    last_verdict: Option<Verdict>,
}

impl<S: KeyValueStore> QuizSession<S> {
    pub fn new(progress: ProgressTracker<S>) -> Self {
        Self {
            progress,
            state: None,
            phase: Phase::Idle,
            drag_board: None,
            hidden_board: None,
            last_verdict: None,
        }
    }

    /// Rejects malformed quizzes without touching the running session.
    pub fn start_quiz(&mut self, quiz: Quiz) -> Result<(), QuizError> {
        quiz.validate()?;
        info!(quiz = %quiz.name, questions = quiz.questions.len(), "starting quiz");

        self.state = Some(SessionState::new(quiz));
        self.last_verdict = None;
        let finished = self.load_question();
        debug_assert!(
            finished.is_none(),
            "validated quiz finished before its first question"
        );
        Ok(())
    }

    fn load_question(&mut self) -> Option<Signal> {
        self.drag_board = None;
        self.hidden_board = None;

        let state = self.state.as_ref()?;
        let Some(question) = state.current_question() else {
            return Some(self.finish());
        };

        debug!(index = state.question_index, kind = question.kind.name(), "loading question");
        match &question.kind {
            QuestionKind::DragAndDrop { items } => self.drag_board = Some(DragBoard::new(items)),
            QuestionKind::HiddenObject => self.hidden_board = Some(HiddenObjectBoard::new()),
            QuestionKind::Standard { .. } | QuestionKind::MapSelection => {}
        }
        self.phase = Phase::InQuestion;
        None
    }

    fn finish(&mut self) -> Signal {
        self.phase = Phase::Finished;
        let Some(state) = self.state.as_mut() else {
            return Signal::ReturnToMenu;
        };
        state.finished = true;
        let (score, total) = (state.score, state.total());
        let name = state.quiz.name.clone();

        if let Err(e) = self.progress.record_completion(&name) {
            warn!(quiz = %name, error = %e, "could not persist quiz completion");
        }

        info!(quiz = %name, score, total, "quiz finished");
        if self.progress.finale_reached() {
            Signal::GrandFinaleReached { score, total }
        } else {
            Signal::QuizFinished { score, total }
        }
    }

    /// Judges `response` against the current question. Rejected submissions
    /// leave every field unchanged.
    pub fn submit(&mut self, response: Response) -> Result<Verdict, QuizError> {
        if self.phase != Phase::InQuestion {
            return Err(SubmissionError::NotAwaitingAnswer.into());
        }
        let state = self
            .state
            .as_mut()
            .ok_or(SubmissionError::NotAwaitingAnswer)?;
        let question = state
            .current_question()
            .ok_or(SubmissionError::NotAwaitingAnswer)?;

        let verdict = match (&question.kind, response) {
            (QuestionKind::Standard { options }, Response::Standard(index)) => {
                evaluate::standard(options, index)?
            }
            (QuestionKind::DragAndDrop { items }, Response::DragAndDrop(in_zone)) => {
                evaluate::drag_and_drop(items, &in_zone)?.verdict()
            }
            (
                QuestionKind::MapSelection | QuestionKind::HiddenObject,
                Response::Zone(result),
            ) => evaluate::zone(result.correct, result.feedback),
            (kind, response) => {
                return Err(SubmissionError::WrongResponseKind {
                    expected: kind.name(),
                    submitted: response.name(),
                }
                .into());
            }
        };

        state.last_answer_was_correct = verdict.correct;
        if verdict.correct {
            state.score += 1;
        }
        debug!(
            index = state.question_index,
            correct = verdict.correct,
            score = state.score,
            "answer judged"
        );

        self.phase = Phase::AwaitingAdvance {
            correct: verdict.correct,
        };
        self.last_verdict = Some(verdict.clone());
        Ok(verdict)
    }

    pub fn submit_standard(&mut self, option_index: usize) -> Result<Verdict, QuizError> {
        self.submit(Response::Standard(option_index))
    }

    pub fn submit_drag_and_drop(&mut self, in_zone: Vec<String>) -> Result<Verdict, QuizError> {
        self.submit(Response::DragAndDrop(in_zone))
    }

    /// Submits whatever currently sits in the drop zone.
    pub fn submit_drag_board(&mut self) -> Result<Verdict, QuizError> {
        let in_zone = self
            .drag_board
            .as_ref()
            .map(DragBoard::zone_identifiers)
            .ok_or(SubmissionError::NotAwaitingAnswer)?;
        self.submit_drag_and_drop(in_zone)
    }

    pub fn report_zone_result(
        &mut self,
        correct: bool,
        feedback: impl Into<String>,
    ) -> Result<Verdict, QuizError> {
        self.submit(Response::Zone(Verdict::new(correct, feedback)))
    }

    /// Judges the hidden object selection and reports it as a zone result.
    pub fn submit_hidden_object(&mut self, scene: &HiddenObjectScene) -> Result<Verdict, QuizError> {
        let verdict = self
            .hidden_board
            .as_ref()
            .map(|board| board.evaluate(scene))
            .ok_or(SubmissionError::NotAwaitingAnswer)?;
        self.submit(Response::Zone(verdict))
    }

    /// Moves on from a judged answer or a finished quiz. Does nothing while
    /// idle or while a question is still open.
    pub fn advance(&mut self) -> Option<Signal> {
        match self.phase {
            Phase::Finished => {
                self.end_session();
                Some(Signal::ReturnToMenu)
            }
            Phase::AwaitingAdvance { .. } => {
                if let Some(state) = self.state.as_mut() {
                    if state.last_answer_was_correct {
                        state.question_index += 1;
                    }
                }
                self.load_question()
            }
            Phase::Idle | Phase::InQuestion => None,
        }
    }

    /// Abandons whatever is in progress. Legal in every phase.
    pub fn quit_to_menu(&mut self) -> Signal {
        if let Some(state) = &self.state {
            info!(quiz = %state.quiz.name, index = state.question_index, "leaving quiz");
        }
        self.end_session();
        Signal::ReturnToMenu
    }

    pub fn reset_progress(&mut self) -> anyhow::Result<()> {
        self.progress.reset()
    }

    fn end_session(&mut self) {
        self.state = None;
        self.drag_board = None;
        self.hidden_board = None;
        self.last_verdict = None;
        self.phase = Phase::Idle;
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn state(&self) -> Option<&SessionState> {
        self.state.as_ref()
    }

    pub fn quiz(&self) -> Option<&Quiz> {
        self.state.as_ref().map(|s| &s.quiz)
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.state.as_ref().and_then(SessionState::current_question)
    }

    pub fn question_index(&self) -> usize {
        self.state.as_ref().map_or(0, |s| s.question_index)
    }

    pub fn score(&self) -> u32 {
        self.state.as_ref().map_or(0, |s| s.score)
    }

    pub fn is_finished(&self) -> bool {
        self.state.as_ref().is_some_and(|s| s.finished)
    }

    pub fn last_answer_was_correct(&self) -> bool {
        self.state.as_ref().is_some_and(|s| s.last_answer_was_correct)
    }

    pub fn last_verdict(&self) -> Option<&Verdict> {
        self.last_verdict.as_ref()
    }

    pub fn hint(&self) -> Option<&str> {
        self.current_question().and_then(|q| q.hint.as_deref())
    }

    pub fn drag_board(&self) -> Option<&DragBoard> {
        self.drag_board.as_ref()
    }

    pub fn drag_board_mut(&mut self) -> Option<&mut DragBoard> {
        if self.phase != Phase::InQuestion {
            return None;
        }
        self.drag_board.as_mut()
    }

    pub fn hidden_board(&self) -> Option<&HiddenObjectBoard> {
        self.hidden_board.as_ref()
    }

    pub fn hidden_board_mut(&mut self) -> Option<&mut HiddenObjectBoard> {
        if self.phase != Phase::InQuestion {
            return None;
        }
        self.hidden_board.as_mut()
    }

    pub fn progress(&self) -> &ProgressTracker<S> {
        &self.progress
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::progress::DEFAULT_FINALE_THRESHOLD;
    use crate::engine::scene::{Marker, MarkerPool};
    use crate::error::QuizProblem;
    use crate::quiz::model::{AnswerOption, DragItem};
    use crate::store::MemoryStore;

    fn session() -> QuizSession<MemoryStore> {
        QuizSession::new(ProgressTracker::new(
            MemoryStore::new(),
            DEFAULT_FINALE_THRESHOLD,
        ))
    }

    fn standard(text: &str, correct_index: usize) -> Question {
        Question {
            text: text.to_string(),
            hint: None,
            kind: QuestionKind::Standard {
                options: (0..3)
                    .map(|i| AnswerOption {
                        label: format!("option {i}"),
                        feedback: format!("feedback {i}"),
                        is_correct: i == correct_index,
                    })
                    .collect(),
            },
        }
    }

    fn drag(text: &str) -> Question {
        let item = |id: &str, required: bool| DragItem {
            identifier: id.to_string(),
            should_be_in_zone: required,
            mistake_feedback: format!("{id} does not belong"),
        };
        Question {
            text: text.to_string(),
            hint: Some("water first".to_string()),
            kind: QuestionKind::DragAndDrop {
                items: vec![item("water", true), item("vase", false), item("teddy", false)],
            },
        }
    }

    fn quiz(name: &str, questions: Vec<Question>) -> Quiz {
        Quiz {
            name: name.to_string(),
            questions,
        }
    }

    #[test]
    fn test_start_quiz_resets_and_loads_first_question() {
        let mut s = session();
        s.start_quiz(quiz("A", vec![standard("q1", 0), standard("q2", 1)]))
            .unwrap();
        assert_eq!(s.phase(), Phase::InQuestion);
        assert_eq!(s.question_index(), 0);
        assert_eq!(s.score(), 0);
        assert!(!s.is_finished());
        assert_eq!(s.current_question().unwrap().text, "q1");
    }

    #[test]
    fn test_malformed_quiz_leaves_session_untouched() {
        let mut s = session();
        s.start_quiz(quiz("A", vec![standard("q1", 0), standard("q2", 0)]))
            .unwrap();
        s.submit_standard(0).unwrap();
        s.advance();

        let err = s.start_quiz(quiz("Empty", vec![])).unwrap_err();
        assert_eq!(
            err,
            QuizError::MalformedQuiz {
                quiz: "Empty".to_string(),
                problem: QuizProblem::NoQuestions,
            }
        );
        assert_eq!(s.quiz().unwrap().name, "A");
        assert_eq!(s.question_index(), 1);
        assert_eq!(s.score(), 1);
    }

    #[test]
    fn test_incorrect_answer_retries_same_question() {
        let mut s = session();
        s.start_quiz(quiz("A", vec![standard("q1", 2), standard("q2", 0)]))
            .unwrap();

        let verdict = s.submit_standard(0).unwrap();
        assert_eq!(verdict, Verdict::new(false, "feedback 0"));
        assert_eq!(s.phase(), Phase::AwaitingAdvance { correct: false });
        assert_eq!(s.advance(), None);
        assert_eq!(s.question_index(), 0);
        assert_eq!(s.phase(), Phase::InQuestion);

        s.submit_standard(2).unwrap();
        assert_eq!(s.advance(), None);
        assert_eq!(s.question_index(), 1);
    }

    #[test]
    fn test_rejected_submission_changes_nothing() {
        let mut s = session();
        s.start_quiz(quiz("A", vec![standard("q1", 0)])).unwrap();

        let err = s.submit_standard(7).unwrap_err();
        assert_eq!(
            err,
            QuizError::InvalidSubmission(SubmissionError::OptionOutOfRange { index: 7, len: 3 })
        );
        assert_eq!(s.phase(), Phase::InQuestion);
        assert_eq!(s.score(), 0);
        assert!(s.last_verdict().is_none());

        let err = s.report_zone_result(true, "nope").unwrap_err();
        assert_eq!(
            err,
            QuizError::InvalidSubmission(SubmissionError::WrongResponseKind {
                expected: "standard",
                submitted: "zone",
            })
        );
        assert_eq!(s.phase(), Phase::InQuestion);
    }

    #[test]
    fn test_submit_twice_without_advance_is_rejected() {
        let mut s = session();
        s.start_quiz(quiz("A", vec![standard("q1", 0)])).unwrap();
        s.submit_standard(0).unwrap();
        assert_eq!(
            s.submit_standard(0),
            Err(QuizError::InvalidSubmission(SubmissionError::NotAwaitingAnswer))
        );
        assert_eq!(s.score(), 1);
    }

    #[test]
    fn test_submit_while_idle_is_rejected() {
        let mut s = session();
        assert_eq!(
            s.submit_standard(0),
            Err(QuizError::InvalidSubmission(SubmissionError::NotAwaitingAnswer))
        );
        assert_eq!(s.advance(), None);
    }

    #[test]
    fn test_drag_board_materialized_and_discarded() {
        let mut s = session();
        s.start_quiz(quiz("A", vec![drag("pack"), standard("q2", 0)]))
            .unwrap();
        assert_eq!(s.hint(), Some("water first"));
        assert_eq!(s.drag_board().unwrap().pool().len(), 3);

        s.drag_board_mut().unwrap().toggle("vase").unwrap();
        let verdict = s.submit_drag_board().unwrap();
        assert!(!verdict.correct);
        assert_eq!(
            verdict.feedback,
            "Mistakes:\nvase does not belong\nRequired items are missing."
        );
        assert!(s.drag_board_mut().is_none());

        // Retry gets a fresh board.
        s.advance();
        assert!(s.drag_board().unwrap().zone().is_empty());

        let board = s.drag_board_mut().unwrap();
        board.toggle("water").unwrap();
        board.toggle("teddy").unwrap();
        assert!(s.submit_drag_board().unwrap().correct);
        s.advance();
        assert!(s.drag_board().is_none());
        assert_eq!(s.question_index(), 1);
    }

    #[test]
    fn test_zone_results_for_map_and_hidden_object() {
        let mut s = session();
        let map = Question {
            text: "where".to_string(),
            hint: None,
            kind: QuestionKind::MapSelection,
        };
        let hidden = Question {
            text: "find".to_string(),
            hint: None,
            kind: QuestionKind::HiddenObject,
        };
        s.start_quiz(quiz("A", vec![map, hidden])).unwrap();

        let verdict = s.report_zone_result(false, "Windows are dangerous.").unwrap();
        assert_eq!(verdict, Verdict::new(false, "Windows are dangerous."));
        s.advance();
        s.report_zone_result(true, "Corridor").unwrap();
        s.advance();

        let scene = HiddenObjectScene::default();
        let board = s.hidden_board_mut().unwrap();
        board.toggle(Marker { pool: MarkerPool::Dangerous, slot: 0 }).unwrap();
        board.toggle(Marker { pool: MarkerPool::Safe, slot: 0 }).unwrap();
        let verdict = s.submit_hidden_object(&scene).unwrap();
        assert_eq!(verdict.feedback, scene.msg_selected_safe);

        s.advance();
        assert!(s.hidden_board().unwrap().selected().is_empty());
        let board = s.hidden_board_mut().unwrap();
        for slot in 0..3 {
            board.toggle(Marker { pool: MarkerPool::Dangerous, slot }).unwrap();
        }
        assert!(s.submit_hidden_object(&scene).unwrap().correct);
        assert_eq!(s.advance(), Some(Signal::QuizFinished { score: 2, total: 2 }));
        assert_eq!(s.phase(), Phase::Finished);
    }

    #[test]
    fn test_finish_then_advance_returns_to_menu() {
        let mut s = session();
        s.start_quiz(quiz("A", vec![standard("q1", 0)])).unwrap();
        s.submit_standard(0).unwrap();
        assert_eq!(s.advance(), Some(Signal::QuizFinished { score: 1, total: 1 }));
        assert!(s.is_finished());
        assert!(s.progress().is_completed("A"));

        assert_eq!(s.advance(), Some(Signal::ReturnToMenu));
        assert_eq!(s.phase(), Phase::Idle);
        assert!(s.quiz().is_none());
    }

    #[test]
    fn test_grand_finale_after_threshold() {
        let mut s = session();
        for (i, name) in ["A", "B", "C"].iter().enumerate() {
            s.start_quiz(quiz(name, vec![standard("q", 1)])).unwrap();
            s.submit_standard(1).unwrap();
            let signal = s.advance();
            if i < 2 {
                assert_eq!(signal, Some(Signal::QuizFinished { score: 1, total: 1 }));
            } else {
                assert_eq!(signal, Some(Signal::GrandFinaleReached { score: 1, total: 1 }));
            }
            s.advance();
        }

        // Replaying a completed quiz keeps the finale.
        s.start_quiz(quiz("A", vec![standard("q", 1)])).unwrap();
        s.submit_standard(1).unwrap();
        assert_eq!(
            s.advance(),
            Some(Signal::GrandFinaleReached { score: 1, total: 1 })
        );
        assert_eq!(s.progress().completed_count(), 3);
    }

    #[test]
    fn test_quit_to_menu_from_any_phase() {
        let mut s = session();
        assert_eq!(s.quit_to_menu(), Signal::ReturnToMenu);

        s.start_quiz(quiz("A", vec![drag("pack")])).unwrap();
        s.drag_board_mut().unwrap().toggle("water").unwrap();
        assert_eq!(s.quit_to_menu(), Signal::ReturnToMenu);
        assert_eq!(s.phase(), Phase::Idle);
        assert!(s.drag_board().is_none());
        assert!(!s.progress().is_completed("A"));

        s.start_quiz(quiz("A", vec![standard("q", 0)])).unwrap();
        s.submit_standard(1).unwrap();
        assert_eq!(s.quit_to_menu(), Signal::ReturnToMenu);
        assert_eq!(s.score(), 0);
    }

    #[test]
    fn test_reset_progress() {
        let mut s = session();
        s.start_quiz(quiz("A", vec![standard("q", 0)])).unwrap();
        s.submit_standard(0).unwrap();
        s.advance();
        assert_eq!(s.progress().completed_count(), 1);
        s.reset_progress().unwrap();
        assert_eq!(s.progress().completed_count(), 0);
    }
}
