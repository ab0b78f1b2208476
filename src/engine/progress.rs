use anyhow::Result;
use chrono::Utc;
use tracing::{info, warn};

use crate::store::KeyValueStore;
use crate::store::schema::{PROGRESS_KEY, ProgressData};

pub const DEFAULT_FINALE_THRESHOLD: usize = 3;

/// Cross-session record of which quizzes have been completed. Writes go
/// straight through to the injected store.
pub struct ProgressTracker<S> {
    store: S,
    data: ProgressData,
    threshold: usize,
}

impl<S: KeyValueStore> ProgressTracker<S> {
    pub fn new(store: S, threshold: usize) -> Self {
        let data = load_progress(&store);
        Self {
            store,
            data,
            threshold: threshold.max(1),
        }
    }

    /// Adds the quiz to the completed set. Returns `true` when the name was
    /// not there before; completing a quiz again changes nothing.
    ///
    /// The in-memory set is updated even when persisting fails.
    pub fn record_completion(&mut self, quiz_name: &str) -> Result<bool> {
        if !self.data.completed.insert(quiz_name.to_string()) {
            return Ok(false);
        }
        self.data.last_completed_at = Some(Utc::now());
        info!(
            quiz = quiz_name,
            completed = self.data.completed.len(),
            "quiz completed for the first time"
        );
        self.persist()?;
        Ok(true)
    }

    pub fn completed_count(&self) -> usize {
        self.data.completed.len()
    }

    pub fn is_completed(&self, quiz_name: &str) -> bool {
        self.data.completed.contains(quiz_name)
    }

    pub fn finale_reached(&self) -> bool {
        self.completed_count() >= self.threshold
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Clears the stored record, then the in-memory set. A failed remove
    /// leaves both untouched.
    pub fn reset(&mut self) -> Result<()> {
        self.store.remove(PROGRESS_KEY)?;
        self.data = ProgressData::default();
        info!("progress reset");
        Ok(())
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn persist(&mut self) -> Result<()> {
        let json = serde_json::to_string(&self.data)?;
        self.store.set(PROGRESS_KEY, &json)
    }
}

fn load_progress<S: KeyValueStore>(store: &S) -> ProgressData {
    let raw = match store.get(PROGRESS_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return ProgressData::default(),
        Err(e) => {
            warn!(error = %e, "could not read progress, starting fresh");
            return ProgressData::default();
        }
    };

    match serde_json::from_str::<ProgressData>(&raw) {
        Ok(data) if !data.needs_reset() => data,
        Ok(data) => {
            warn!(
                schema_version = data.schema_version,
                "stale progress schema, starting fresh"
            );
            ProgressData::default()
        }
        Err(e) => {
            warn!(error = %e, "unreadable progress record, starting fresh");
            ProgressData::default()
        }
    }
}
