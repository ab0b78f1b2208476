use std::fs;

use quizdr::engine::progress::{DEFAULT_FINALE_THRESHOLD, ProgressTracker};
use quizdr::engine::scene::{HiddenObjectScene, MapScene, MapZone, Marker, MarkerPool};
use quizdr::error::{QuizError, QuizProblem};
use quizdr::quiz::library::QuizLibrary;
use quizdr::quiz::model::{QuestionKind, Quiz};
use quizdr::session::quiz_session::{Phase, QuizSession, Signal};
use quizdr::store::json_store::JsonStore;
use quizdr::store::schema::PROGRESS_KEY;
use quizdr::store::{KeyValueStore, MemoryStore};
use tempfile::TempDir;

fn quiz_json(name: &str, correct: [usize; 2]) -> String {
    let option = |i: usize, right: usize| {
        format!(
            r#"{{ "answerText": "option {i}", "feedbackText": "feedback {i}", "isCorrect": {} }}"#,
            i == right
        )
    };
    let question = |n: usize, right: usize| {
        format!(
            r#"{{ "questionText": "question {n}", "type": 0, "hintText": "",
                 "options": [{}, {}, {}] }}"#,
            option(0, right),
            option(1, right),
            option(2, right)
        )
    };
    format!(
        r#"{{ "quizName": "{name}", "questions": [{}, {}] }}"#,
        question(1, correct[0]),
        question(2, correct[1])
    )
}

fn session_in(dir: &TempDir) -> QuizSession<JsonStore> {
    let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
    QuizSession::new(ProgressTracker::new(store, DEFAULT_FINALE_THRESHOLD))
}

/// Answers every question of the current quiz correctly on the first try.
fn play_through(session: &mut QuizSession<impl KeyValueStore>) -> Signal {
    let scene = HiddenObjectScene::default();
    let map = MapScene::default();
    loop {
        let kind = session.current_question().unwrap().kind.clone();
        match kind {
            QuestionKind::Standard { options } => {
                let right = options.iter().position(|o| o.is_correct).unwrap();
                session.submit_standard(right).unwrap();
            }
            QuestionKind::DragAndDrop { items } => {
                let required = items
                    .iter()
                    .filter(|i| i.should_be_in_zone)
                    .map(|i| i.identifier.clone())
                    .collect();
                session.submit_drag_and_drop(required).unwrap();
            }
            QuestionKind::MapSelection => {
                let verdict = map.zone_result(MapZone::Correct);
                session
                    .report_zone_result(verdict.correct, verdict.feedback)
                    .unwrap();
            }
            QuestionKind::HiddenObject => {
                let board = session.hidden_board_mut().unwrap();
                for slot in 0..3 {
                    board
                        .toggle(Marker {
                            pool: MarkerPool::Dangerous,
                            slot,
                        })
                        .unwrap();
                }
                session.submit_hidden_object(&scene).unwrap();
            }
        }
        assert!(session.last_answer_was_correct());
        if let Some(signal) = session.advance() {
            return signal;
        }
    }
}

#[test]
fn wrong_then_right_scores_every_correct_submission() {
    let quiz = Quiz::from_json(&quiz_json("Basics", [1, 2])).unwrap();
    let mut session = QuizSession::new(ProgressTracker::new(MemoryStore::new(), 3));
    session.start_quiz(quiz).unwrap();

    let verdict = session.submit_standard(0).unwrap();
    assert!(!verdict.correct);
    assert_eq!(verdict.feedback, "feedback 0");
    assert_eq!(session.advance(), None);
    assert_eq!(session.question_index(), 0);

    session.submit_standard(1).unwrap();
    assert_eq!(session.advance(), None);
    session.submit_standard(2).unwrap();
    assert_eq!(
        session.advance(),
        Some(Signal::QuizFinished { score: 2, total: 2 })
    );

    let state = session.state().unwrap();
    assert_eq!(state.score, 2);
    assert_eq!(state.question_index, 2);
    assert!(state.finished);
}

#[test]
fn progress_survives_reopening_and_triggers_finale() {
    let dir = TempDir::new().unwrap();

    {
        let mut session = session_in(&dir);
        for name in ["One", "Two"] {
            session
                .start_quiz(Quiz::from_json(&quiz_json(name, [0, 0])).unwrap())
                .unwrap();
            assert!(matches!(
                play_through(&mut session),
                Signal::QuizFinished { .. }
            ));
            assert_eq!(session.advance(), Some(Signal::ReturnToMenu));
        }
    }

    let raw = fs::read_to_string(dir.path().join("prefs.json")).unwrap();
    assert!(raw.contains(PROGRESS_KEY));

    let mut session = session_in(&dir);
    assert_eq!(session.progress().completed_count(), 2);
    assert!(session.progress().is_completed("One"));

    session
        .start_quiz(Quiz::from_json(&quiz_json("Three", [2, 1])).unwrap())
        .unwrap();
    assert_eq!(
        play_through(&mut session),
        Signal::GrandFinaleReached { score: 2, total: 2 }
    );

    session.reset_progress().unwrap();
    let session = session_in(&dir);
    assert_eq!(session.progress().completed_count(), 0);
}

#[test]
fn bundled_quizzes_play_to_completion() {
    let library = QuizLibrary {
        quizzes: QuizLibrary::load_bundled(),
    };
    assert_eq!(library.len(), 3);

    let mut session = QuizSession::new(ProgressTracker::new(MemoryStore::new(), 3));
    let mut signals = Vec::new();
    for quiz in &library.quizzes {
        session.start_quiz(quiz.clone()).unwrap();
        signals.push(play_through(&mut session));
        session.advance();
        assert_eq!(session.phase(), Phase::Idle);
    }

    assert!(matches!(signals[0], Signal::QuizFinished { .. }));
    assert!(matches!(signals[1], Signal::QuizFinished { .. }));
    assert!(matches!(signals[2], Signal::GrandFinaleReached { .. }));
}

#[test]
fn user_quiz_dir_extends_library() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("extra.json"), quiz_json("Extra", [0, 1])).unwrap();
    fs::write(dir.path().join("broken.json"), "{ not json").unwrap();

    let library = QuizLibrary::load(dir.path());
    assert_eq!(library.len(), 4);
    assert!(library.quizzes.iter().any(|q| q.name == "Extra"));
}

#[test]
fn drag_question_with_repeated_item_is_rejected_at_start() {
    let quiz = Quiz::from_json(
        r#"{ "quizName": "Bottles", "questions": [
            { "questionText": "Pack water", "type": 1, "dragItems": [
                { "content": "Bottle", "shouldBeInZone": true },
                { "content": "Bottle", "shouldBeInZone": true } ] } ] }"#,
    )
    .unwrap();
    let mut session = QuizSession::new(ProgressTracker::new(MemoryStore::new(), 3));

    let err = session.start_quiz(quiz).unwrap_err();
    assert_eq!(
        err,
        QuizError::MalformedQuiz {
            quiz: "Bottles".to_string(),
            problem: QuizProblem::DuplicateDragItem {
                question: 1,
                identifier: "Bottle".to_string(),
            },
        }
    );
    assert_eq!(session.phase(), Phase::Idle);
    assert!(session.drag_board().is_none());
}
