//! Detection-driven control nodes for a real-time node-graph pipeline.
//!
//! The host's graph editor wires three kinds of nodes together:
//!
//! 1. **Detector nodes** configure a pluggable [`Detector`]
//!    ([`MotionDetector`], [`BrightnessDetector`]).
//! 2. **ROI nodes** bind a region of the frame to a detector and a
//!    [`RoiAction`], forming an ordered [`RoiChain`].
//! 3. **Control nodes** walk the chain once per frame and aggregate the
//!    per-ROI detections into a float, int, or string output plus a
//!    full-frame visualization [`Mask`].
//!
//! Evaluation is single-threaded and synchronous; per-node state lives in
//! memory for the lifetime of the node and nowhere else. Malformed inputs
//! degrade to no-ops rather than halting the pipeline: dropping one
//! frame's update is always preferable to stalling a live preview.
//!
//! # Module Structure
//!
//! - `frame`: RGB frame and f32 mask buffers, crops, mask union
//! - `roi`: ROI records, stable ids, the evaluation chain
//! - `detect`: detector trait and the motion/brightness implementations
//! - `control`: action state machine, chain walker, typed output nodes
//! - `config`: node defaults from file and environment

pub mod config;
pub mod control;
pub mod detect;
pub mod frame;
pub mod roi;

pub use config::{
    BrightnessSettings, ControlConfig, FloatRangeSettings, IntRangeSettings, MotionSettings,
};
pub use control::{
    ControlState, DetectionControl, FloatDetectionControl, IntDetectionControl, RoiAction,
    RoiState, StringDetectionControl, DETECTION_THRESHOLD,
};
pub use detect::{BrightnessDetector, Detection, Detector, DetectorState, MotionDetector};
pub use frame::{Frame, Mask};
pub use roi::{Roi, RoiBounds, RoiChain, RoiId};
