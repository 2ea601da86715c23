//! Frame and mask buffers.
//!
//! Frames arrive from the host as packed RGB24; masks are single-channel
//! float planes in [0,1]. Both are plain buffers with explicit dimensions:
//!
//! - `Frame`: H×W×3 8-bit pixels, length-validated at construction.
//! - `Mask`: H×W f32 plane, used both for ROI selection weights and for
//!   detector visualization output.
//!
//! ROI bounds are inclusive on both ends, so a crop of `(0,0,0,0)` is a
//! single pixel. Crops allocate fresh buffers; the source is never aliased.

use anyhow::{anyhow, Result};

use crate::roi::RoiBounds;

/// Packed RGB24 frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl Frame {
    /// Wrap a packed RGB24 buffer. Fails when the length does not match
    /// `width * height * 3`.
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Result<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|v| v.checked_mul(3))
            .ok_or_else(|| anyhow!("frame dimensions overflow"))?;
        if data.len() != expected {
            return Err(anyhow!(
                "RGB frame length mismatch: expected {}, got {}",
                expected,
                data.len()
            ));
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// All-black frame, used by tests and the demo source.
    pub fn black(width: u32, height: u32) -> Self {
        Self {
            data: vec![0u8; width as usize * height as usize * 3],
            width,
            height,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw packed pixels, row-major.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// RGB triple at (y, x). Caller keeps coordinates in range.
    pub fn pixel(&self, y: u32, x: u32) -> [u8; 3] {
        let idx = (y as usize * self.width as usize + x as usize) * 3;
        [self.data[idx], self.data[idx + 1], self.data[idx + 2]]
    }

    pub fn set_pixel(&mut self, y: u32, x: u32, rgb: [u8; 3]) {
        let idx = (y as usize * self.width as usize + x as usize) * 3;
        self.data[idx..idx + 3].copy_from_slice(&rgb);
    }

    /// Copy out the sub-image covered by `bounds` (inclusive). Bounds are
    /// clamped to the frame, so degenerate inputs crop to a single pixel
    /// rather than failing.
    pub fn crop(&self, bounds: RoiBounds) -> Frame {
        if self.data.is_empty() {
            return self.clone();
        }
        let bounds = bounds.clamp_to(self.width, self.height);
        let mut data =
            Vec::with_capacity(bounds.height() as usize * bounds.width() as usize * 3);
        for y in bounds.y_min..=bounds.y_max {
            let row = (y as usize * self.width as usize + bounds.x_min as usize) * 3;
            let len = bounds.width() as usize * 3;
            data.extend_from_slice(&self.data[row..row + len]);
        }
        Frame {
            data,
            width: bounds.width(),
            height: bounds.height(),
        }
    }

    /// Normalized Rec.601 luma plane, row-major, values in [0,1].
    pub fn luma(&self) -> Vec<f32> {
        self.data
            .chunks_exact(3)
            .map(|px| {
                (0.299 * px[0] as f32 + 0.587 * px[1] as f32 + 0.114 * px[2] as f32) / 255.0
            })
            .collect()
    }
}

/// Single-channel f32 plane.
#[derive(Clone, Debug, PartialEq)]
pub struct Mask {
    data: Vec<f32>,
    width: u32,
    height: u32,
}

impl Mask {
    pub fn new(data: Vec<f32>, width: u32, height: u32) -> Result<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .ok_or_else(|| anyhow!("mask dimensions overflow"))?;
        if data.len() != expected {
            return Err(anyhow!(
                "mask length mismatch: expected {}, got {}",
                expected,
                data.len()
            ));
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    pub fn zeros(width: u32, height: u32) -> Self {
        Self {
            data: vec![0.0; width as usize * height as usize],
            width,
            height,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn get(&self, y: u32, x: u32) -> f32 {
        self.data[y as usize * self.width as usize + x as usize]
    }

    pub fn set(&mut self, y: u32, x: u32, value: f32) {
        self.data[y as usize * self.width as usize + x as usize] = value;
    }

    /// Copy out the sub-plane covered by `bounds` (inclusive, clamped).
    pub fn crop(&self, bounds: RoiBounds) -> Mask {
        if self.data.is_empty() {
            return self.clone();
        }
        let bounds = bounds.clamp_to(self.width, self.height);
        let mut data = Vec::with_capacity(bounds.height() as usize * bounds.width() as usize);
        for y in bounds.y_min..=bounds.y_max {
            let row = y as usize * self.width as usize + bounds.x_min as usize;
            data.extend_from_slice(&self.data[row..row + bounds.width() as usize]);
        }
        Mask {
            data,
            width: bounds.width(),
            height: bounds.height(),
        }
    }

    /// Union `sub` into this mask at the offset given by `bounds`, taking
    /// the point-wise maximum. Regions falling outside either plane are
    /// ignored.
    pub fn merge_max(&mut self, bounds: RoiBounds, sub: &Mask) {
        if self.data.is_empty() || sub.data.is_empty() {
            return;
        }
        let bounds = bounds.clamp_to(self.width, self.height);
        let rows = bounds.height().min(sub.height);
        let cols = bounds.width().min(sub.width);
        for j in 0..rows {
            for i in 0..cols {
                let y = bounds.y_min + j;
                let x = bounds.x_min + i;
                let merged = self.get(y, x).max(sub.get(j, i));
                self.set(y, x, merged);
            }
        }
    }

    /// Fill the rectangle covered by `bounds` (inclusive, clamped).
    pub fn fill(&mut self, bounds: RoiBounds, value: f32) {
        if self.data.is_empty() {
            return;
        }
        let bounds = bounds.clamp_to(self.width, self.height);
        for y in bounds.y_min..=bounds.y_max {
            for x in bounds.x_min..=bounds.x_max {
                self.set(y, x, value);
            }
        }
    }
}
