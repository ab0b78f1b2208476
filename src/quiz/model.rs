use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{QuizError, QuizProblem};

/// Identifiers containing this marker (case-insensitive) are decoys: they can
/// be dragged around but never count toward or against the answer.
pub const DECOY_MARKER: &str = "teddy";

/// Number of answer slots the question screen can offer (keys 1-9).
pub const MAX_OPTIONS: usize = 9;

// --- On-disk definition format ---

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum QuestionType {
    #[default]
    Standard,
    DragAndDrop,
    MapSelection,
    HiddenObject,
}

impl TryFrom<u8> for QuestionType {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(QuestionType::Standard),
            1 => Ok(QuestionType::DragAndDrop),
            2 => Ok(QuestionType::MapSelection),
            3 => Ok(QuestionType::HiddenObject),
            other => Err(format!("unknown question type {other}")),
        }
    }
}

impl From<QuestionType> for u8 {
    fn from(value: QuestionType) -> Self {
        match value {
            QuestionType::Standard => 0,
            QuestionType::DragAndDrop => 1,
            QuestionType::MapSelection => 2,
            QuestionType::HiddenObject => 3,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuizFile {
    pub quiz_name: String,
    pub questions: Vec<QuestionFile>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuestionFile {
    pub question_text: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub hint_text: String,
    pub options: Vec<AnswerOptionFile>,
    pub drag_items: Vec<DragItemFile>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnswerOptionFile {
    pub answer_text: String,
    pub feedback_text: String,
    pub is_correct: bool,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DragItemFile {
    pub content: String,
    pub should_be_in_zone: bool,
    pub mistake_feedback: String,
}

// --- Runtime model ---

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Quiz {
    pub name: String,
    pub questions: Vec<Question>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Question {
    pub text: String,
    pub hint: Option<String>,
    pub kind: QuestionKind,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QuestionKind {
    Standard { options: Vec<AnswerOption> },
    DragAndDrop { items: Vec<DragItem> },
    MapSelection,
    HiddenObject,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnswerOption {
    pub label: String,
    pub feedback: String,
    pub is_correct: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DragItem {
    pub identifier: String,
    pub should_be_in_zone: bool,
    pub mistake_feedback: String,
}

impl QuestionKind {
    pub fn name(&self) -> &'static str {
        match self {
            QuestionKind::Standard { .. } => "standard",
            QuestionKind::DragAndDrop { .. } => "drag-and-drop",
            QuestionKind::MapSelection => "map selection",
            QuestionKind::HiddenObject => "hidden object",
        }
    }
}

impl DragItem {
    pub fn is_decoy(&self) -> bool {
        self.identifier.to_lowercase().contains(DECOY_MARKER)
    }
}

impl From<QuizFile> for Quiz {
    fn from(file: QuizFile) -> Self {
        Self {
            name: file.quiz_name,
            questions: file.questions.into_iter().map(Question::from).collect(),
        }
    }
}

impl From<QuestionFile> for Question {
    fn from(file: QuestionFile) -> Self {
        // Only the payload matching the type survives; the other array is ignored.
        let kind = match file.question_type {
            QuestionType::Standard => QuestionKind::Standard {
                options: file
                    .options
                    .into_iter()
                    .map(|o| AnswerOption {
                        label: o.answer_text,
                        feedback: o.feedback_text,
                        is_correct: o.is_correct,
                    })
                    .collect(),
            },
            QuestionType::DragAndDrop => QuestionKind::DragAndDrop {
                items: file
                    .drag_items
                    .into_iter()
                    .map(|d| DragItem {
                        identifier: d.content,
                        should_be_in_zone: d.should_be_in_zone,
                        mistake_feedback: d.mistake_feedback,
                    })
                    .collect(),
            },
            QuestionType::MapSelection => QuestionKind::MapSelection,
            QuestionType::HiddenObject => QuestionKind::HiddenObject,
        };
        let hint = Some(file.hint_text).filter(|h| !h.trim().is_empty());
        Self {
            text: file.question_text,
            hint,
            kind,
        }
    }
}

impl Quiz {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let file: QuizFile = serde_json::from_str(json)?;
        Ok(file.into())
    }

    /// Structural checks run before a session accepts the quiz. Question
    /// numbers in the reported problem are 1-based.
    ///
    /// The number of correct options is not enforced; questions without
    /// exactly one correct option are only logged.
    pub fn validate(&self) -> Result<(), QuizError> {
        let malformed = |problem| QuizError::MalformedQuiz {
            quiz: self.name.clone(),
            problem,
        };

        if self.questions.is_empty() {
            return Err(malformed(QuizProblem::NoQuestions));
        }

        for (i, question) in self.questions.iter().enumerate() {
            let number = i + 1;
            match &question.kind {
                QuestionKind::Standard { options } => {
                    if options.is_empty() {
                        return Err(malformed(QuizProblem::NoOptions { question: number }));
                    }
                    if options.len() > MAX_OPTIONS {
                        return Err(malformed(QuizProblem::TooManyOptions {
                            question: number,
                            count: options.len(),
                            max: MAX_OPTIONS,
                        }));
                    }
                    let correct = options.iter().filter(|o| o.is_correct).count();
                    if correct != 1 {
                        warn!(
                            quiz = %self.name,
                            question = number,
                            correct,
                            "standard question does not have exactly one correct option"
                        );
                    }
                }
                QuestionKind::DragAndDrop { items } => {
                    if items.is_empty() {
                        return Err(malformed(QuizProblem::NoDragItems { question: number }));
                    }
                    // Zone contents are submitted by identifier, so they must be unique.
                    let mut seen = HashSet::new();
                    if let Some(dup) = items.iter().find(|i| !seen.insert(i.identifier.as_str())) {
                        return Err(malformed(QuizProblem::DuplicateDragItem {
                            question: number,
                            identifier: dup.identifier.clone(),
                        }));
                    }
                }
                QuestionKind::MapSelection | QuestionKind::HiddenObject => {}
            }
        }

        Ok(())
    }
}
