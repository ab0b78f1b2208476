use thiserror::Error;

/// Errors returned by the quiz core. Both kinds are local rejections: the
/// session is left exactly as it was before the call.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum QuizError {
    #[error("quiz \"{quiz}\" is malformed: {problem}")]
    MalformedQuiz { quiz: String, problem: QuizProblem },
    #[error("invalid submission: {0}")]
    InvalidSubmission(#[from] SubmissionError),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum QuizProblem {
    #[error("it has no questions")]
    NoQuestions,
    #[error("question {question} has no answer options")]
    NoOptions { question: usize },
    #[error("question {question} has {count} options, at most {max} can be selected")]
    TooManyOptions {
        question: usize,
        count: usize,
        max: usize,
    },
    #[error("question {question} has no drag items")]
    NoDragItems { question: usize },
    #[error("question {question} has more than one drag item named \"{identifier}\"")]
    DuplicateDragItem { question: usize, identifier: String },
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("option {index} is out of range ({len} options)")]
    OptionOutOfRange { index: usize, len: usize },
    #[error("unknown drag item \"{0}\"")]
    UnknownDragItem(String),
    #[error("unknown scene marker")]
    UnknownMarker,
    #[error("{submitted} answer submitted to a {expected} question")]
    WrongResponseKind {
        expected: &'static str,
        submitted: &'static str,
    },
    #[error("no question is waiting for an answer")]
    NotAwaitingAnswer,
}

impl QuizError {
    pub fn is_malformed(&self) -> bool {
        matches!(self, QuizError::MalformedQuiz { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_message_names_quiz() {
        let err = QuizError::MalformedQuiz {
            quiz: "Shelter".to_string(),
            problem: QuizProblem::NoOptions { question: 2 },
        };
        assert!(err.is_malformed());
        assert_eq!(
            err.to_string(),
            "quiz \"Shelter\" is malformed: question 2 has no answer options"
        );
    }

    #[test]
    fn test_submission_error_converts() {
        let err: QuizError = SubmissionError::UnknownDragItem("rope".to_string()).into();
        assert!(!err.is_malformed());
        assert!(err.to_string().contains("rope"));
    }
}
