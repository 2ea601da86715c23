use anyhow::Result;

use crate::frame::{Frame, Mask};

/// Result of running a detector over an ROI sub-region.
#[derive(Clone, Debug)]
pub struct Detection {
    /// Detection score, nominally in [0,1]. The control layer thresholds
    /// it at 0.5; out-of-range scores are accepted rather than clamped.
    pub score: f32,
    /// Per-pixel visualization of the detection, same shape as the input
    /// region. Unioned into the full-frame mask via point-wise max.
    pub visualization: Mask,
}

impl Detection {
    /// Zero score with an all-zero visualization matching the region.
    pub fn none(width: u32, height: u32) -> Self {
        Self {
            score: 0.0,
            visualization: Mask::zeros(width, height),
        }
    }
}

/// Per-ROI temporal state handed to detectors on every call.
///
/// One instance exists per `RoiId`, default-initialized on first use, so
/// a single detector can serve many ROIs without their histories mixing.
#[derive(Clone, Debug, Default)]
pub struct DetectorState {
    /// Blurred luma plane of the previous region, for frame differencing.
    pub prev_luma: Option<Vec<f32>>,
}

/// Pluggable detector capability.
///
/// `frame` and `mask` are the crops for a single ROI and always share
/// dimensions. Implementations keep any history in `state`, never in
/// `self`, so one configured detector may be shared across ROIs.
pub trait Detector: Send + Sync {
    /// Detector identifier, used in logs.
    fn name(&self) -> &'static str;

    /// Score the region and produce a visualization mask of its shape.
    fn detect(&self, frame: &Frame, mask: &Mask, state: &mut DetectorState)
        -> Result<Detection>;
}
