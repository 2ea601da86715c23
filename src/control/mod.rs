mod action;
mod engine;
mod outputs;
mod state;

pub use action::{RoiAction, DETECTION_THRESHOLD};
pub use engine::DetectionControl;
pub use outputs::{FloatDetectionControl, IntDetectionControl, StringDetectionControl};
pub use state::{ControlState, RoiState};
