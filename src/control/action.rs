use serde::{Deserialize, Serialize};

use crate::control::state::RoiState;

/// Detection scores above this count as "detected" for action purposes.
pub const DETECTION_THRESHOLD: f32 = 0.5;

/// Value transition applied when an ROI's detector fires.
///
/// All actions except `Momentary` are edge-triggered: they fire once on
/// the not-detected to detected transition and re-arm on the next
/// non-detected frame. `Momentary` is level-triggered and `Trigger` is
/// edge-set / level-reset.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoiAction {
    /// Add the operand, clamped at max.
    Add,
    /// Subtract the operand, clamped at min.
    Subtract,
    /// Multiply by the operand, clamped at max.
    Multiply,
    /// Divide by the operand, clamped at min. A zero operand is a no-op.
    Divide,
    /// Set to the operand, clamped into [min,max].
    Set,
    /// Flip between min and max.
    Toggle,
    /// Force max while armed; fall back to min on the first non-detected frame.
    Trigger,
    /// Cycle `min + count mod (max-min+1)` on each edge.
    Counter,
    /// Track the detected level every frame: max if detected, else min.
    Momentary,
}

/// Apply one frame's worth of action state transition for a single ROI.
///
/// `score` is the raw detector output; `value` the ROI's operand. The
/// edge latch lives in `roi_state.active`, the counter in
/// `roi_state.count`.
pub(crate) fn apply_action(
    current: &mut f64,
    roi_state: &mut RoiState,
    action: RoiAction,
    score: f32,
    value: f64,
    min_value: f64,
    max_value: f64,
) {
    let detected = score > DETECTION_THRESHOLD;

    // Level-triggered: the output follows the detected state every frame,
    // including the edge frame.
    if action == RoiAction::Momentary {
        roi_state.active = detected;
        *current = if detected { max_value } else { min_value };
        return;
    }

    if detected && !roi_state.active {
        roi_state.active = true;
        match action {
            RoiAction::Add => *current = (*current + value).min(max_value),
            RoiAction::Subtract => *current = (*current - value).max(min_value),
            RoiAction::Multiply => *current = (*current * value).min(max_value),
            RoiAction::Divide => {
                if value != 0.0 {
                    *current = (*current / value).max(min_value);
                } else {
                    log::debug!("divide action skipped: zero operand");
                }
            }
            RoiAction::Set => *current = value.clamp(min_value, max_value),
            RoiAction::Toggle => {
                *current = if *current == min_value {
                    max_value
                } else {
                    min_value
                };
            }
            RoiAction::Trigger => *current = max_value,
            RoiAction::Counter => {
                roi_state.count += 1;
                let period = (max_value - min_value + 1.0).trunc();
                if period >= 1.0 {
                    *current = min_value + (roi_state.count % period as u64) as f64;
                }
            }
            RoiAction::Momentary => unreachable!("handled above"),
        }
    } else if !detected {
        roi_state.active = false;
        if action == RoiAction::Trigger {
            *current = min_value;
        }
    }
}
