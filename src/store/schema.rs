use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const SCHEMA_VERSION: u32 = 1;

/// Key under which completed quiz names are persisted.
pub const PROGRESS_KEY: &str = "completed_quizzes";

/// Completed quizzes, stored as a JSON set so names may contain any character.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressData {
    pub schema_version: u32,
    pub completed: BTreeSet<String>,
    #[serde(default)]
    pub last_completed_at: Option<DateTime<Utc>>,
}

impl Default for ProgressData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            completed: BTreeSet::new(),
            last_completed_at: None,
        }
    }
}

impl ProgressData {
    /// Check if loaded data has a stale schema version and needs reset.
    pub fn needs_reset(&self) -> bool {
        self.schema_version != SCHEMA_VERSION
    }
}
