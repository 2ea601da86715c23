use std::collections::HashSet;

use anyhow::Result;

use crate::control::action::apply_action;
use crate::control::state::ControlState;
use crate::frame::{Frame, Mask};
use crate::roi::RoiChain;

/// ROI chain evaluation engine.
///
/// One instance backs one control node. Each `evaluate` call walks the
/// chain in order: crop the frame and the ROI's selection mask to its
/// bounds, run the detector with that ROI's persistent state, union the
/// visualization into the full-frame detection mask, then apply the
/// action rule to the scalar. Later ROIs overwrite earlier ones' scalar
/// effect; there is no conflict resolution beyond last writer wins.
#[derive(Debug)]
pub struct DetectionControl {
    state: ControlState,
}

impl DetectionControl {
    pub fn new(starting_value: f64) -> Self {
        Self {
            state: ControlState::new(starting_value),
        }
    }

    /// Current scalar without evaluating a frame.
    pub fn current_value(&self) -> f64 {
        self.state.current_value
    }

    pub fn state(&self) -> &ControlState {
        &self.state
    }

    /// Evaluate one frame against the chain. Returns the updated scalar
    /// and a freshly allocated full-frame detection mask (the point-wise
    /// maximum of every ROI's visualization).
    pub fn evaluate(
        &mut self,
        frame: &Frame,
        chain: &RoiChain,
        min_value: f64,
        max_value: f64,
    ) -> Result<(f64, Mask)> {
        let mut detection_mask = Mask::zeros(frame.width(), frame.height());
        if frame.width() == 0 || frame.height() == 0 {
            log::warn!(
                "degenerate {}x{} frame, skipping ROI walk",
                frame.width(),
                frame.height()
            );
            return Ok((self.state.current_value, detection_mask));
        }

        for roi in chain.iter() {
            let bounds = roi.bounds.clamp_to(frame.width(), frame.height());
            let region_frame = frame.crop(bounds);
            let region_mask = roi.mask.crop(bounds);

            let detector_state = self.state.detector_states.entry(roi.id).or_default();
            let detection = roi
                .detector
                .detect(&region_frame, &region_mask, detector_state)?;
            log::debug!(
                "{}: detector {} scored {:.3} ({:?})",
                roi.id,
                roi.detector.name(),
                detection.score,
                roi.action
            );

            detection_mask.merge_max(bounds, &detection.visualization);

            let roi_state = self.state.roi_states.entry(roi.id).or_default();
            apply_action(
                &mut self.state.current_value,
                roi_state,
                roi.action,
                detection.score,
                roi.value,
                min_value,
                max_value,
            );
        }

        let live: HashSet<_> = chain.ids().collect();
        self.state.retain_live(&live);

        Ok((self.state.current_value, detection_mask))
    }
}
