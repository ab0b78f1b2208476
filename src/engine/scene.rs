use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::engine::evaluate::{self, Verdict};
use crate::error::SubmissionError;

// --- Map selection ---

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MapZone {
    Wrong,
    Almost,
    Correct,
    Bad,
}

impl MapZone {
    pub const ALL: [MapZone; 4] = [MapZone::Wrong, MapZone::Almost, MapZone::Correct, MapZone::Bad];

    pub fn is_correct(self) -> bool {
        self == MapZone::Correct
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneSpot {
    pub label: String,
    pub feedback: String,
}

impl ZoneSpot {
    fn new(label: &str, feedback: &str) -> Self {
        Self {
            label: label.to_string(),
            feedback: feedback.to_string(),
        }
    }
}

/// The room plan shown for map selection questions. Exactly one zone is safe;
/// the others are wrong to different degrees but score the same.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapScene {
    #[serde(default = "default_wrong_zone")]
    pub wrong: ZoneSpot,
    #[serde(default = "default_almost_zone")]
    pub almost: ZoneSpot,
    #[serde(default = "default_correct_zone")]
    pub correct: ZoneSpot,
    #[serde(default = "default_bad_zone")]
    pub bad: ZoneSpot,
}

fn default_wrong_zone() -> ZoneSpot {
    ZoneSpot::new("Window", "Wrong! Windows are dangerous.")
}
fn default_almost_zone() -> ZoneSpot {
    ZoneSpot::new("Middle of the room", "Not safe enough. This is too exposed.")
}
fn default_correct_zone() -> ZoneSpot {
    ZoneSpot::new("Corridor", "Correct! The two-wall rule saves lives.")
}
fn default_bad_zone() -> ZoneSpot {
    ZoneSpot::new("Balcony", "Very dangerous! Do not go here.")
}

impl Default for MapScene {
    fn default() -> Self {
        Self {
            wrong: default_wrong_zone(),
            almost: default_almost_zone(),
            correct: default_correct_zone(),
            bad: default_bad_zone(),
        }
    }
}

impl MapScene {
    pub fn spot(&self, zone: MapZone) -> &ZoneSpot {
        match zone {
            MapZone::Wrong => &self.wrong,
            MapZone::Almost => &self.almost,
            MapZone::Correct => &self.correct,
            MapZone::Bad => &self.bad,
        }
    }

    pub fn zone_result(&self, zone: MapZone) -> Verdict {
        evaluate::zone(zone.is_correct(), self.spot(zone).feedback.clone())
    }
}

// --- Hidden object ---

pub const POOL_SIZE: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MarkerPool {
    Dangerous,
    Safe,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Marker {
    pub pool: MarkerPool,
    pub slot: usize,
}

impl Marker {
    /// Dangerous pool first, then the safe pool.
    pub fn all() -> Vec<Marker> {
        [MarkerPool::Dangerous, MarkerPool::Safe]
            .into_iter()
            .flat_map(|pool| (0..POOL_SIZE).map(move |slot| Marker { pool, slot }))
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HiddenObjectScene {
    #[serde(default = "default_dangerous")]
    pub dangerous: [String; POOL_SIZE],
    #[serde(default = "default_safe")]
    pub safe: [String; POOL_SIZE],
    #[serde(default = "default_msg_success")]
    pub msg_success: String,
    #[serde(default = "default_msg_selected_safe")]
    pub msg_selected_safe: String,
    #[serde(default = "default_msg_not_all_found")]
    pub msg_not_all_found: String,
}

fn default_dangerous() -> [String; POOL_SIZE] {
    [
        "Shiny metal cylinder in the grass".to_string(),
        "Toy-like object with wires".to_string(),
        "Unknown bag left under a bench".to_string(),
    ]
}
fn default_safe() -> [String; POOL_SIZE] {
    [
        "Football".to_string(),
        "Bicycle".to_string(),
        "Swing".to_string(),
    ]
}
fn default_msg_success() -> String {
    "Well done. You recognised the danger. Keep your distance and tell an adult.".to_string()
}
fn default_msg_selected_safe() -> String {
    "These items look safe. Pay attention to unfamiliar or odd-looking objects.".to_string()
}
fn default_msg_not_all_found() -> String {
    "You did not notice all the dangerous items. Look more carefully.".to_string()
}

impl Default for HiddenObjectScene {
    fn default() -> Self {
        Self {
            dangerous: default_dangerous(),
            safe: default_safe(),
            msg_success: default_msg_success(),
            msg_selected_safe: default_msg_selected_safe(),
            msg_not_all_found: default_msg_not_all_found(),
        }
    }
}

impl HiddenObjectScene {
    pub fn label(&self, marker: Marker) -> Option<&str> {
        let pool = match marker.pool {
            MarkerPool::Dangerous => &self.dangerous,
            MarkerPool::Safe => &self.safe,
        };
        pool.get(marker.slot).map(String::as_str)
    }
}

/// Toggle set of selected markers for one hidden object question.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HiddenObjectBoard {
    selected: BTreeSet<Marker>,
}

impl HiddenObjectBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether the marker is selected after the toggle.
    pub fn toggle(&mut self, marker: Marker) -> Result<bool, SubmissionError> {
        if marker.slot >= POOL_SIZE {
            return Err(SubmissionError::UnknownMarker);
        }
        if self.selected.remove(&marker) {
            Ok(false)
        } else {
            self.selected.insert(marker);
            Ok(true)
        }
    }

    pub fn is_selected(&self, marker: Marker) -> bool {
        self.selected.contains(&marker)
    }

    pub fn selected(&self) -> &BTreeSet<Marker> {
        &self.selected
    }

    pub fn evaluate(&self, scene: &HiddenObjectScene) -> Verdict {
        evaluate::hidden_object(&self.selected, scene)
    }
}
