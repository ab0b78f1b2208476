use std::collections::{BTreeSet, HashSet};

use crate::engine::scene::{HiddenObjectScene, Marker, MarkerPool};
use crate::error::SubmissionError;
use crate::quiz::model::{AnswerOption, DragItem};

pub const DRAG_SUCCESS: &str = "Great!";
pub const DRAG_ERRORS_HEADER: &str = "Mistakes:";
pub const DRAG_MISSING_REQUIRED: &str = "Required items are missing.";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Verdict {
    pub correct: bool,
    pub feedback: String,
}

impl Verdict {
    pub fn new(correct: bool, feedback: impl Into<String>) -> Self {
        Self {
            correct,
            feedback: feedback.into(),
        }
    }
}

/// Single choice: the chosen option's flag and feedback, verbatim.
pub fn standard(options: &[AnswerOption], index: usize) -> Result<Verdict, SubmissionError> {
    let option = options.get(index).ok_or(SubmissionError::OptionOutOfRange {
        index,
        len: options.len(),
    })?;
    Ok(Verdict::new(option.is_correct, option.feedback.clone()))
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DragReport {
    pub perfect: bool,
    pub correct_found: usize,
    pub total_required: usize,
    pub errors: Vec<String>,
}

impl DragReport {
    pub fn verdict(&self) -> Verdict {
        if self.perfect {
            Verdict::new(true, DRAG_SUCCESS)
        } else {
            Verdict::new(
                false,
                format!("{DRAG_ERRORS_HEADER}\n{}", self.errors.join("\n")),
            )
        }
    }
}

/// Scores the zone contents, given in placement order.
///
/// Decoys are invisible to every count. Items left outside the zone are
/// only reported through the single "missing" message.
pub fn drag_and_drop(items: &[DragItem], in_zone: &[String]) -> Result<DragReport, SubmissionError> {
    let mut placed: Vec<&DragItem> = Vec::with_capacity(in_zone.len());
    let mut seen: HashSet<&str> = HashSet::new();
    for identifier in in_zone {
        let item = items
            .iter()
            .find(|item| item.identifier == *identifier)
            .ok_or_else(|| SubmissionError::UnknownDragItem(identifier.clone()))?;
        if seen.insert(identifier.as_str()) {
            placed.push(item);
        }
    }

    let total_required = items
        .iter()
        .filter(|item| !item.is_decoy() && item.should_be_in_zone)
        .count();

    let mut perfect = true;
    let mut correct_found = 0;
    let mut errors = Vec::new();

    for item in placed.into_iter().filter(|item| !item.is_decoy()) {
        if item.should_be_in_zone {
            correct_found += 1;
        } else {
            perfect = false;
            errors.push(item.mistake_feedback.clone());
        }
    }

    if correct_found < total_required {
        perfect = false;
        errors.push(DRAG_MISSING_REQUIRED.to_string());
    }

    Ok(DragReport {
        perfect,
        correct_found,
        total_required,
        errors,
    })
}

/// Map zones are judged by the scene itself; the result passes through.
pub fn zone(correct: bool, feedback: impl Into<String>) -> Verdict {
    Verdict::new(correct, feedback)
}

/// Priority: a selected safe item beats everything, then missing dangerous
/// items, then success.
pub fn hidden_object(selected: &BTreeSet<Marker>, scene: &HiddenObjectScene) -> Verdict {
    let picked_safe = selected.iter().any(|m| m.pool == MarkerPool::Safe);
    let dangerous_found = selected
        .iter()
        .filter(|m| m.pool == MarkerPool::Dangerous)
        .count();

    if picked_safe {
        Verdict::new(false, scene.msg_selected_safe.clone())
    } else if dangerous_found < scene.dangerous.len() {
        Verdict::new(false, scene.msg_not_all_found.clone())
    } else {
        Verdict::new(true, scene.msg_success.clone())
    }
}
