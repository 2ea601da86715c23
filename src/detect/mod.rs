mod brightness;
mod detector;
mod motion;

pub use brightness::BrightnessDetector;
pub use detector::{Detection, Detector, DetectorState};
pub use motion::MotionDetector;
