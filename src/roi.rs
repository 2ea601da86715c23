//! ROI records and the evaluation chain.
//!
//! A `Roi` binds a rectangular sub-area of the frame (derived from the
//! non-zero extent of its selection mask) to a detector and an action.
//! ROIs are evaluated in sequence order, first to last; later ROIs can
//! overwrite the scalar effect of earlier ones (last writer wins).
//!
//! Every ROI gets a `RoiId` from a process-wide counter at construction.
//! The id is the key for all per-ROI persistent state, so two ROIs with
//! identical bounds never collide.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::control::RoiAction;
use crate::detect::Detector;
use crate::frame::Mask;

static NEXT_ROI_ID: AtomicU64 = AtomicU64::new(0);

/// Stable per-ROI identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoiId(u64);

impl RoiId {
    fn next() -> Self {
        Self(NEXT_ROI_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for RoiId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "roi:{}", self.0)
    }
}

/// Inclusive bounding box in frame coordinates: both `(y_min, x_min)` and
/// `(y_max, x_max)` are inside the region.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RoiBounds {
    pub y_min: u32,
    pub x_min: u32,
    pub y_max: u32,
    pub x_max: u32,
}

impl RoiBounds {
    pub fn new(y_min: u32, x_min: u32, y_max: u32, x_max: u32) -> Self {
        Self {
            y_min,
            x_min,
            y_max,
            x_max,
        }
    }

    pub fn width(&self) -> u32 {
        self.x_max - self.x_min + 1
    }

    pub fn height(&self) -> u32 {
        self.y_max - self.y_min + 1
    }

    /// Clamp into a `width` x `height` plane, keeping the box non-empty
    /// and well-ordered. Zero-sized planes clamp everything to (0,0,0,0).
    pub fn clamp_to(&self, width: u32, height: u32) -> RoiBounds {
        let max_x = width.saturating_sub(1);
        let max_y = height.saturating_sub(1);
        let y_min = self.y_min.min(max_y);
        let x_min = self.x_min.min(max_x);
        RoiBounds {
            y_min,
            x_min,
            y_max: self.y_max.clamp(y_min, max_y),
            x_max: self.x_max.clamp(x_min, max_x),
        }
    }

    /// Bounding box of the non-zero mask values. An all-zero mask collapses
    /// to `(0,0,0,0)`, a single-pixel region at the origin.
    pub fn from_mask(mask: &Mask) -> RoiBounds {
        let mut bounds: Option<RoiBounds> = None;
        for y in 0..mask.height() {
            for x in 0..mask.width() {
                if mask.get(y, x) <= 0.0 {
                    continue;
                }
                bounds = Some(match bounds {
                    None => RoiBounds::new(y, x, y, x),
                    Some(b) => RoiBounds {
                        y_min: b.y_min.min(y),
                        x_min: b.x_min.min(x),
                        y_max: b.y_max.max(y),
                        x_max: b.x_max.max(x),
                    },
                });
            }
        }
        bounds.unwrap_or_default()
    }
}

/// One region of interest: selection mask, detector, action, operand.
#[derive(Clone)]
pub struct Roi {
    pub id: RoiId,
    pub bounds: RoiBounds,
    pub mask: Mask,
    pub detector: Arc<dyn Detector>,
    pub action: RoiAction,
    pub value: f64,
}

impl Roi {
    /// Build an ROI from a full-frame selection mask. Bounds are derived
    /// from the mask's non-zero extent; the id is freshly assigned.
    pub fn new(mask: Mask, detector: Arc<dyn Detector>, action: RoiAction, value: f64) -> Self {
        let bounds = RoiBounds::from_mask(&mask);
        Self {
            id: RoiId::next(),
            bounds,
            mask,
            detector,
            action,
            value,
        }
    }
}

impl fmt::Debug for Roi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Roi")
            .field("id", &self.id)
            .field("bounds", &self.bounds)
            .field("detector", &self.detector.name())
            .field("action", &self.action)
            .field("value", &self.value)
            .finish()
    }
}

/// Ordered sequence of ROIs. Evaluation walks it front to back.
#[derive(Clone, Debug, Default)]
pub struct RoiChain {
    rois: Vec<Roi>,
}

impl RoiChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an ROI; it evaluates after everything already in the chain.
    pub fn push(&mut self, roi: Roi) {
        self.rois.push(roi);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Roi> {
        self.rois.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = RoiId> + '_ {
        self.rois.iter().map(|roi| roi.id)
    }

    pub fn len(&self) -> usize {
        self.rois.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rois.is_empty()
    }
}

impl FromIterator<Roi> for RoiChain {
    fn from_iter<T: IntoIterator<Item = Roi>>(iter: T) -> Self {
        Self {
            rois: iter.into_iter().collect(),
        }
    }
}
