use rand::Rng;
use rand::seq::SliceRandom;

use crate::error::SubmissionError;
use crate::quiz::model::DragItem;

/// The draggable items of the current question, split between the spawn
/// pool and the drop zone. Items only ever move between the two lists.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DragBoard {
    pool: Vec<DragItem>,
    zone: Vec<DragItem>,
}

impl DragBoard {
    pub fn new(items: &[DragItem]) -> Self {
        Self {
            pool: items.to_vec(),
            zone: Vec::new(),
        }
    }

    pub fn pool(&self) -> &[DragItem] {
        &self.pool
    }

    pub fn zone(&self) -> &[DragItem] {
        &self.zone
    }

    pub fn shuffle_pool<R: Rng>(&mut self, rng: &mut R) {
        self.pool.shuffle(rng);
    }

    /// Drops the pool item at `index` into the zone.
    pub fn place(&mut self, index: usize) -> bool {
        if index >= self.pool.len() {
            return false;
        }
        let item = self.pool.remove(index);
        self.zone.push(item);
        true
    }

    /// Sends the zone item at `index` back to the pool.
    pub fn unplace(&mut self, index: usize) -> bool {
        if index >= self.zone.len() {
            return false;
        }
        let item = self.zone.remove(index);
        self.pool.push(item);
        true
    }

    /// Moves the item with this identifier to the other side. Returns whether
    /// it ended up in the zone.
    pub fn toggle(&mut self, identifier: &str) -> Result<bool, SubmissionError> {
        if let Some(idx) = self.zone.iter().position(|i| i.identifier == identifier) {
            self.unplace(idx);
            Ok(false)
        } else if let Some(idx) = self.pool.iter().position(|i| i.identifier == identifier) {
            self.place(idx);
            Ok(true)
        } else {
            Err(SubmissionError::UnknownDragItem(identifier.to_string()))
        }
    }

    /// Zone contents in placement order.
    pub fn zone_identifiers(&self) -> Vec<String> {
        self.zone.iter().map(|i| i.identifier.clone()).collect()
    }
}
