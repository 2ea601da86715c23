//! End-to-end properties of the ROI chain walker and the action rules,
//! driven through the typed control nodes with scripted detectors.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use anyhow::Result;

use roi_control::{
    Detection, DetectionControl, Detector, DetectorState, FloatDetectionControl, Frame,
    IntDetectionControl, Mask, Roi, RoiAction, RoiChain, StringDetectionControl,
};

/// Replays a fixed score sequence, one entry per `detect` call, then
/// holds at zero. The visualization is the region filled with the score.
struct ScriptedDetector {
    scores: Mutex<VecDeque<f32>>,
}

impl ScriptedDetector {
    fn new(scores: &[f32]) -> Arc<Self> {
        Arc::new(Self {
            scores: Mutex::new(scores.iter().copied().collect()),
        })
    }
}

impl Detector for ScriptedDetector {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn detect(
        &self,
        frame: &Frame,
        _mask: &Mask,
        _state: &mut DetectorState,
    ) -> Result<Detection> {
        let score = self.scores.lock().unwrap().pop_front().unwrap_or(0.0);
        let data = vec![score; frame.width() as usize * frame.height() as usize];
        Ok(Detection {
            score,
            visualization: Mask::new(data, frame.width(), frame.height())?,
        })
    }
}

fn full_mask(width: u32, height: u32) -> Mask {
    Mask::new(vec![1.0; width as usize * height as usize], width, height).unwrap()
}

fn single_roi_chain(scores: &[f32], action: RoiAction, value: f64) -> RoiChain {
    let mut chain = RoiChain::new();
    chain.push(Roi::new(
        full_mask(8, 8),
        ScriptedDetector::new(scores),
        action,
        value,
    ));
    chain
}

#[test]
fn add_edges_accumulate_and_cap_at_max() {
    // Four detected-edges with re-arming gaps: 3, 6, 9, then capped at 10.
    let script = [0.9, 0.0, 0.9, 0.0, 0.9, 0.0, 0.9];
    let chain = single_roi_chain(&script, RoiAction::Add, 3.0);
    let mut control = FloatDetectionControl::new(0.0, 10.0, 0.0).unwrap();

    let frame = Frame::black(8, 8);
    let mut values = Vec::new();
    for _ in 0..script.len() {
        let (value, _) = control.process(&frame, &chain).unwrap();
        values.push(value);
    }
    assert_eq!(values, vec![3.0, 3.0, 6.0, 6.0, 9.0, 9.0, 10.0]);
}

#[test]
fn continuous_detection_fires_an_edge_action_once() {
    let script = [0.9, 0.9, 0.9, 0.0, 0.9];
    let chain = single_roi_chain(&script, RoiAction::Add, 1.0);
    let mut control = FloatDetectionControl::new(0.0, 10.0, 0.0).unwrap();

    let frame = Frame::black(8, 8);
    let mut values = Vec::new();
    for _ in 0..script.len() {
        let (value, _) = control.process(&frame, &chain).unwrap();
        values.push(value);
    }
    assert_eq!(values, vec![1.0, 1.0, 1.0, 1.0, 2.0]);
}

#[test]
fn counter_cycles_through_the_whole_range() {
    // min=0, max=3: period is 4 distinct values before repeating.
    let mut script = Vec::new();
    for _ in 0..8 {
        script.push(0.9);
        script.push(0.0);
    }
    let chain = single_roi_chain(&script, RoiAction::Counter, 0.0);
    let mut control = IntDetectionControl::new(0, 3, 0).unwrap();

    let frame = Frame::black(8, 8);
    let mut edge_values = Vec::new();
    for i in 0..script.len() {
        let (value, _) = control.process(&frame, &chain).unwrap();
        if i % 2 == 0 {
            edge_values.push(value);
        }
    }
    assert_eq!(edge_values, vec![1, 2, 3, 0, 1, 2, 3, 0]);
}

#[test]
fn toggle_strictly_alternates_between_bounds() {
    let script = [0.9, 0.0, 0.9, 0.0, 0.9, 0.0];
    let chain = single_roi_chain(&script, RoiAction::Toggle, 0.0);
    let mut control = FloatDetectionControl::new(0.0, 1.0, 0.0).unwrap();

    let frame = Frame::black(8, 8);
    let mut edge_values = Vec::new();
    for i in 0..script.len() {
        let (value, _) = control.process(&frame, &chain).unwrap();
        if i % 2 == 0 {
            edge_values.push(value);
        }
    }
    assert_eq!(edge_values, vec![1.0, 0.0, 1.0]);
}

#[test]
fn momentary_tracks_the_detected_level_every_frame() {
    let script = [0.9, 0.9, 0.0, 0.9, 0.0];
    let chain = single_roi_chain(&script, RoiAction::Momentary, 0.0);
    let mut control = FloatDetectionControl::new(0.0, 1.0, 0.5).unwrap();

    let frame = Frame::black(8, 8);
    let mut values = Vec::new();
    for _ in 0..script.len() {
        let (value, _) = control.process(&frame, &chain).unwrap();
        values.push(value);
    }
    // max iff detected this frame, independent of any prior state.
    assert_eq!(values, vec![1.0, 1.0, 0.0, 1.0, 0.0]);
}

#[test]
fn trigger_sets_on_edge_and_resets_on_release() {
    let script = [0.9, 0.9, 0.0, 0.0];
    let chain = single_roi_chain(&script, RoiAction::Trigger, 0.0);
    let mut control = FloatDetectionControl::new(0.0, 1.0, 0.0).unwrap();

    let frame = Frame::black(8, 8);
    let mut values = Vec::new();
    for _ in 0..script.len() {
        let (value, _) = control.process(&frame, &chain).unwrap();
        values.push(value);
    }
    assert_eq!(values, vec![1.0, 1.0, 0.0, 0.0]);
}

#[test]
fn later_rois_overwrite_earlier_ones() {
    let mut chain = RoiChain::new();
    chain.push(Roi::new(
        full_mask(8, 8),
        ScriptedDetector::new(&[0.9]),
        RoiAction::Set,
        2.0,
    ));
    chain.push(Roi::new(
        full_mask(8, 8),
        ScriptedDetector::new(&[0.9]),
        RoiAction::Set,
        7.0,
    ));
    let mut control = FloatDetectionControl::new(0.0, 10.0, 0.0).unwrap();

    let (value, _) = control.process(&Frame::black(8, 8), &chain).unwrap();
    assert_eq!(value, 7.0);
}

#[test]
fn detection_mask_is_the_pointwise_maximum_of_roi_masks() {
    // Two full-frame ROIs with different visualization levels.
    let mut chain = RoiChain::new();
    chain.push(Roi::new(
        full_mask(8, 8),
        ScriptedDetector::new(&[0.4]),
        RoiAction::Add,
        0.0,
    ));
    chain.push(Roi::new(
        full_mask(8, 8),
        ScriptedDetector::new(&[0.8]),
        RoiAction::Add,
        0.0,
    ));
    let mut control = FloatDetectionControl::new(0.0, 1.0, 0.0).unwrap();

    let (_, mask) = control.process(&Frame::black(8, 8), &chain).unwrap();
    assert_eq!(mask.width(), 8);
    assert_eq!(mask.height(), 8);
    assert!(mask.data().iter().all(|&v| (v - 0.8).abs() < 1e-6));
}

#[test]
fn string_control_cycles_its_entries() {
    let mut script = Vec::new();
    for _ in 0..4 {
        script.push(0.9);
        script.push(0.0);
    }
    let chain = single_roi_chain(&script, RoiAction::Counter, 0.0);
    let mut control = StringDetectionControl::new("alpha\nbeta\ngamma");

    let frame = Frame::black(8, 8);
    let mut edge_strings = Vec::new();
    for i in 0..script.len() {
        let (text, _) = control.process(&frame, &chain).unwrap();
        if i % 2 == 0 {
            edge_strings.push(text);
        }
    }
    assert_eq!(edge_strings, vec!["beta", "gamma", "alpha", "beta"]);
}

#[test]
fn string_control_with_blank_list_short_circuits() {
    let chain = single_roi_chain(&[0.9], RoiAction::Counter, 0.0);
    let mut control = StringDetectionControl::new("  \n\n   ");

    let frame = Frame::black(8, 8);
    let (text, mask) = control.process(&frame, &chain).unwrap();
    assert_eq!(text, "");
    assert_eq!(mask.width(), 8);
    assert_eq!(mask.height(), 8);
    assert!(mask.data().iter().all(|&v| v == 0.0));
}

#[test]
fn state_for_removed_rois_is_dropped() {
    let keep = Roi::new(
        full_mask(8, 8),
        ScriptedDetector::new(&[0.9, 0.9]),
        RoiAction::Add,
        1.0,
    );
    let drop = Roi::new(
        full_mask(8, 8),
        ScriptedDetector::new(&[0.9]),
        RoiAction::Add,
        1.0,
    );
    let keep_id = keep.id;

    let mut both = RoiChain::new();
    both.push(keep.clone());
    both.push(drop);

    let mut engine = DetectionControl::new(0.0);
    let frame = Frame::black(8, 8);
    engine.evaluate(&frame, &both, 0.0, 10.0).unwrap();
    assert_eq!(engine.state().roi_states.len(), 2);

    let mut only_keep = RoiChain::new();
    only_keep.push(keep);
    engine.evaluate(&frame, &only_keep, 0.0, 10.0).unwrap();
    assert_eq!(engine.state().roi_states.len(), 1);
    assert!(engine.state().roi_states.contains_key(&keep_id));
    assert!(engine.state().detector_states.contains_key(&keep_id));
}
