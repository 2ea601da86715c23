use anyhow::{anyhow, Result};

use crate::detect::detector::{Detection, Detector, DetectorState};
use crate::frame::{Frame, Mask};

/// Frame-differencing motion detector.
///
/// Each call box-blurs the region's luma plane and diffs it against the
/// blurred plane from the previous call, held in `DetectorState`. The
/// score is the fraction of masked pixels whose absolute difference
/// exceeds the threshold; the visualization is the masked per-pixel
/// difference. The first frame for an ROI scores zero.
pub struct MotionDetector {
    threshold: f32,
    blur_size: u32,
}

impl MotionDetector {
    /// `threshold` is the per-pixel sensitivity in [0,1]; `blur_size` is
    /// the noise-reduction kernel width, odd and in 1..=21.
    pub fn new(threshold: f32, blur_size: u32) -> Result<Self> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(anyhow!("motion threshold must be in [0,1], got {}", threshold));
        }
        if blur_size == 0 || blur_size > 21 || blur_size % 2 == 0 {
            return Err(anyhow!(
                "motion blur size must be odd and in 1..=21, got {}",
                blur_size
            ));
        }
        Ok(Self {
            threshold,
            blur_size,
        })
    }
}

impl Default for MotionDetector {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            blur_size: 5,
        }
    }
}

impl Detector for MotionDetector {
    fn name(&self) -> &'static str {
        "motion"
    }

    fn detect(
        &self,
        frame: &Frame,
        mask: &Mask,
        state: &mut DetectorState,
    ) -> Result<Detection> {
        let width = frame.width();
        let height = frame.height();
        let blurred = box_blur(
            &frame.luma(),
            width as usize,
            height as usize,
            self.blur_size,
        );
        let prev = state.prev_luma.replace(blurred.clone());

        let prev = match prev {
            Some(prev) if prev.len() == blurred.len() => prev,
            // First frame for this ROI, or the region was resized under us.
            _ => return Ok(Detection::none(width, height)),
        };

        let mut visualization = Mask::zeros(width, height);
        let mut masked = 0u32;
        let mut moving = 0u32;
        for y in 0..height {
            for x in 0..width {
                if mask.get(y, x) <= 0.0 {
                    continue;
                }
                masked += 1;
                let idx = y as usize * width as usize + x as usize;
                let diff = (blurred[idx] - prev[idx]).abs();
                visualization.set(y, x, diff.min(1.0));
                if diff > self.threshold {
                    moving += 1;
                }
            }
        }

        let score = if masked == 0 {
            0.0
        } else {
            moving as f32 / masked as f32
        };
        Ok(Detection {
            score,
            visualization,
        })
    }
}

/// Separable box blur with edge clamping. `size` 1 is a copy.
fn box_blur(plane: &[f32], width: usize, height: usize, size: u32) -> Vec<f32> {
    if size <= 1 || plane.is_empty() {
        return plane.to_vec();
    }
    let radius = (size / 2) as isize;

    let mut horizontal = vec![0.0f32; plane.len()];
    for y in 0..height {
        for x in 0..width {
            let lo = (x as isize - radius).max(0) as usize;
            let hi = (x as isize + radius).min(width as isize - 1) as usize;
            let sum: f32 = plane[y * width + lo..=y * width + hi].iter().sum();
            horizontal[y * width + x] = sum / (hi - lo + 1) as f32;
        }
    }

    let mut blurred = vec![0.0f32; plane.len()];
    for y in 0..height {
        let lo = (y as isize - radius).max(0) as usize;
        let hi = (y as isize + radius).min(height as isize - 1) as usize;
        for x in 0..width {
            let mut sum = 0.0f32;
            for row in lo..=hi {
                sum += horizontal[row * width + x];
            }
            blurred[y * width + x] = sum / (hi - lo + 1) as f32;
        }
    }
    blurred
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_frame(level: u8, width: u32, height: u32) -> Frame {
        Frame::new(
            vec![level; width as usize * height as usize * 3],
            width,
            height,
        )
        .unwrap()
    }

    fn full_mask(width: u32, height: u32) -> Mask {
        Mask::new(
            vec![1.0; width as usize * height as usize],
            width,
            height,
        )
        .unwrap()
    }

    #[test]
    fn rejects_bad_settings() {
        assert!(MotionDetector::new(1.5, 5).is_err());
        assert!(MotionDetector::new(0.1, 4).is_err());
        assert!(MotionDetector::new(0.1, 23).is_err());
        assert!(MotionDetector::new(0.1, 5).is_ok());
    }

    #[test]
    fn first_frame_scores_zero() {
        let detector = MotionDetector::default();
        let mut state = DetectorState::default();
        let r = detector
            .detect(&flat_frame(200, 4, 4), &full_mask(4, 4), &mut state)
            .unwrap();
        assert_eq!(r.score, 0.0);
        assert!(r.visualization.data().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn frame_change_scores_then_settles() {
        let detector = MotionDetector::new(0.1, 1).unwrap();
        let mut state = DetectorState::default();
        let mask = full_mask(4, 4);

        detector.detect(&flat_frame(0, 4, 4), &mask, &mut state).unwrap();
        let moved = detector
            .detect(&flat_frame(255, 4, 4), &mask, &mut state)
            .unwrap();
        assert_eq!(moved.score, 1.0);
        assert!(moved.visualization.data().iter().all(|&v| v > 0.9));

        let settled = detector
            .detect(&flat_frame(255, 4, 4), &mask, &mut state)
            .unwrap();
        assert_eq!(settled.score, 0.0);
    }

    #[test]
    fn unmasked_pixels_do_not_count() {
        let detector = MotionDetector::new(0.1, 1).unwrap();
        let mut state = DetectorState::default();
        let empty = Mask::zeros(4, 4);

        detector.detect(&flat_frame(0, 4, 4), &empty, &mut state).unwrap();
        let r = detector
            .detect(&flat_frame(255, 4, 4), &empty, &mut state)
            .unwrap();
        assert_eq!(r.score, 0.0);
    }

    #[test]
    fn resized_region_resets_history() {
        let detector = MotionDetector::new(0.1, 1).unwrap();
        let mut state = DetectorState::default();

        detector
            .detect(&flat_frame(0, 4, 4), &full_mask(4, 4), &mut state)
            .unwrap();
        let r = detector
            .detect(&flat_frame(255, 2, 2), &full_mask(2, 2), &mut state)
            .unwrap();
        assert_eq!(r.score, 0.0);
    }
}
