use anyhow::{anyhow, Result};

use crate::control::engine::DetectionControl;
use crate::frame::{Frame, Mask};
use crate::roi::RoiChain;

/// Float-valued detection control node.
pub struct FloatDetectionControl {
    min_value: f64,
    max_value: f64,
    engine: DetectionControl,
}

impl FloatDetectionControl {
    pub fn new(min_value: f64, max_value: f64, starting_value: f64) -> Result<Self> {
        if max_value < min_value {
            return Err(anyhow!(
                "maximum value {} is below minimum value {}",
                max_value,
                min_value
            ));
        }
        Ok(Self {
            min_value,
            max_value,
            engine: DetectionControl::new(starting_value),
        })
    }

    pub fn process(&mut self, frame: &Frame, chain: &RoiChain) -> Result<(f64, Mask)> {
        self.engine
            .evaluate(frame, chain, self.min_value, self.max_value)
    }

    pub fn engine(&self) -> &DetectionControl {
        &self.engine
    }
}

/// Integer-valued detection control node. Same engine, rounded output.
pub struct IntDetectionControl {
    min_value: i64,
    max_value: i64,
    engine: DetectionControl,
}

impl IntDetectionControl {
    pub fn new(min_value: i64, max_value: i64, starting_value: i64) -> Result<Self> {
        if max_value < min_value {
            return Err(anyhow!(
                "maximum value {} is below minimum value {}",
                max_value,
                min_value
            ));
        }
        Ok(Self {
            min_value,
            max_value,
            engine: DetectionControl::new(starting_value as f64),
        })
    }

    pub fn process(&mut self, frame: &Frame, chain: &RoiChain) -> Result<(i64, Mask)> {
        let (value, mask) = self.engine.evaluate(
            frame,
            chain,
            self.min_value as f64,
            self.max_value as f64,
        )?;
        Ok((value.round() as i64, mask))
    }
}

/// String-valued detection control node.
///
/// The newline-delimited `strings` input defines the output alphabet.
/// The engine runs over the normalized range `0 ..= len-1`, and the
/// rounded scalar indexes the list modulo its length, so `Counter` and
/// friends cycle through the entries. An empty or whitespace-only list
/// short-circuits to an empty string and an all-zero mask.
pub struct StringDetectionControl {
    strings: String,
    engine: DetectionControl,
}

impl StringDetectionControl {
    pub fn new(strings: impl Into<String>) -> Self {
        Self {
            strings: strings.into(),
            engine: DetectionControl::new(0.0),
        }
    }

    pub fn process(&mut self, frame: &Frame, chain: &RoiChain) -> Result<(String, Mask)> {
        let list: Vec<&str> = self
            .strings
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        if list.is_empty() {
            return Ok((String::new(), Mask::zeros(frame.width(), frame.height())));
        }

        let (value, mask) = self
            .engine
            .evaluate(frame, chain, 0.0, (list.len() - 1) as f64)?;
        let index = (value.round() as i64).rem_euclid(list.len() as i64) as usize;
        Ok((list[index].to_string(), mask))
    }
}

impl Default for StringDetectionControl {
    fn default() -> Self {
        Self::new("first string\nsecond string\nthird string")
    }
}
