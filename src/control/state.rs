use std::collections::{HashMap, HashSet};

use crate::detect::DetectorState;
use crate::roi::RoiId;

/// Per-ROI action state: the edge latch and the counter cycler.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RoiState {
    /// True while the ROI's detector keeps firing; cleared on the first
    /// non-detected frame. Edge-triggered actions fire on false -> true.
    pub active: bool,
    /// Number of edges seen by a `Counter` action.
    pub count: u64,
}

/// Persistent state of one detection control node.
///
/// Lives as long as the owning node instance; keyed by stable `RoiId`
/// so identical or overlapping bounds never collide.
#[derive(Clone, Debug)]
pub struct ControlState {
    pub current_value: f64,
    pub detector_states: HashMap<RoiId, DetectorState>,
    pub roi_states: HashMap<RoiId, RoiState>,
}

impl ControlState {
    pub fn new(starting_value: f64) -> Self {
        Self {
            current_value: starting_value,
            detector_states: HashMap::new(),
            roi_states: HashMap::new(),
        }
    }

    /// Drop state for ROIs that are no longer part of the evaluated chain,
    /// keeping both maps bounded by the chain length.
    pub(crate) fn retain_live(&mut self, live: &HashSet<RoiId>) {
        self.detector_states.retain(|id, _| live.contains(id));
        self.roi_states.retain(|id, _| live.contains(id));
    }
}
