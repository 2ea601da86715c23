use anyhow::{anyhow, Result};

use crate::detect::detector::{Detection, Detector, DetectorState};
use crate::frame::{Frame, Mask};

/// Luma-level brightness detector. Stateless.
///
/// Scores the masked average (or maximum, when `use_average` is off)
/// normalized luma of the region. The visualization marks masked pixels
/// at or above the threshold.
pub struct BrightnessDetector {
    threshold: f32,
    use_average: bool,
}

impl BrightnessDetector {
    pub fn new(threshold: f32, use_average: bool) -> Result<Self> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(anyhow!(
                "brightness threshold must be in [0,1], got {}",
                threshold
            ));
        }
        Ok(Self {
            threshold,
            use_average,
        })
    }
}

impl Default for BrightnessDetector {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            use_average: true,
        }
    }
}

impl Detector for BrightnessDetector {
    fn name(&self) -> &'static str {
        "brightness"
    }

    fn detect(
        &self,
        frame: &Frame,
        mask: &Mask,
        _state: &mut DetectorState,
    ) -> Result<Detection> {
        let width = frame.width();
        let height = frame.height();
        let luma = frame.luma();

        let mut visualization = Mask::zeros(width, height);
        let mut masked = 0u32;
        let mut sum = 0.0f32;
        let mut peak = 0.0f32;
        for y in 0..height {
            for x in 0..width {
                if mask.get(y, x) <= 0.0 {
                    continue;
                }
                masked += 1;
                let level = luma[y as usize * width as usize + x as usize];
                sum += level;
                peak = peak.max(level);
                if level >= self.threshold {
                    visualization.set(y, x, 1.0);
                }
            }
        }

        if masked == 0 {
            return Ok(Detection::none(width, height));
        }
        let score = if self.use_average {
            sum / masked as f32
        } else {
            peak
        };
        Ok(Detection {
            score,
            visualization,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_with_level(level: u8, width: u32, height: u32) -> Frame {
        Frame::new(
            vec![level; width as usize * height as usize * 3],
            width,
            height,
        )
        .unwrap()
    }

    fn full_mask(width: u32, height: u32) -> Mask {
        Mask::new(vec![1.0; width as usize * height as usize], width, height).unwrap()
    }

    #[test]
    fn average_scores_masked_mean() {
        let detector = BrightnessDetector::default();
        let mut state = DetectorState::default();
        let r = detector
            .detect(&frame_with_level(255, 2, 2), &full_mask(2, 2), &mut state)
            .unwrap();
        assert!((r.score - 1.0).abs() < 1e-4);
        assert!(r.visualization.data().iter().all(|&v| v == 1.0));
    }

    #[test]
    fn peak_mode_scores_brightest_pixel() {
        let detector = BrightnessDetector::new(0.5, false).unwrap();
        let mut state = DetectorState::default();
        let mut frame = Frame::black(2, 2);
        frame.set_pixel(0, 0, [255, 255, 255]);

        let r = detector
            .detect(&frame, &full_mask(2, 2), &mut state)
            .unwrap();
        assert!((r.score - 1.0).abs() < 1e-4);
        // Only the bright pixel is visualized.
        assert_eq!(r.visualization.get(0, 0), 1.0);
        assert_eq!(r.visualization.get(1, 1), 0.0);
    }

    #[test]
    fn empty_mask_scores_zero() {
        let detector = BrightnessDetector::default();
        let mut state = DetectorState::default();
        let r = detector
            .detect(&frame_with_level(255, 2, 2), &Mask::zeros(2, 2), &mut state)
            .unwrap();
        assert_eq!(r.score, 0.0);
    }

    #[test]
    fn rejects_out_of_range_threshold() {
        assert!(BrightnessDetector::new(-0.1, true).is_err());
        assert!(BrightnessDetector::new(1.1, true).is_err());
    }
}
