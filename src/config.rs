use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_MOTION_THRESHOLD: f32 = 0.1;
const DEFAULT_MOTION_BLUR_SIZE: u32 = 5;
const DEFAULT_BRIGHTNESS_THRESHOLD: f32 = 0.5;
const DEFAULT_BRIGHTNESS_USE_AVERAGE: bool = true;
const DEFAULT_FLOAT_MIN: f64 = 0.0;
const DEFAULT_FLOAT_MAX: f64 = 1.0;
const DEFAULT_FLOAT_START: f64 = 0.5;
const DEFAULT_INT_MIN: i64 = 0;
const DEFAULT_INT_MAX: i64 = 100;
const DEFAULT_INT_START: i64 = 50;

#[derive(Debug, Deserialize, Default)]
struct ControlConfigFile {
    motion: Option<MotionConfigFile>,
    brightness: Option<BrightnessConfigFile>,
    float_range: Option<FloatRangeConfigFile>,
    int_range: Option<IntRangeConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
struct MotionConfigFile {
    threshold: Option<f32>,
    blur_size: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
struct BrightnessConfigFile {
    threshold: Option<f32>,
    use_average: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
struct FloatRangeConfigFile {
    min: Option<f64>,
    max: Option<f64>,
    start: Option<f64>,
}

#[derive(Debug, Deserialize, Default)]
struct IntRangeConfigFile {
    min: Option<i64>,
    max: Option<i64>,
    start: Option<i64>,
}

/// Default settings for detector and control nodes.
#[derive(Debug, Clone)]
pub struct ControlConfig {
    pub motion: MotionSettings,
    pub brightness: BrightnessSettings,
    pub float_range: FloatRangeSettings,
    pub int_range: IntRangeSettings,
}

#[derive(Debug, Clone)]
pub struct MotionSettings {
    pub threshold: f32,
    pub blur_size: u32,
}

#[derive(Debug, Clone)]
pub struct BrightnessSettings {
    pub threshold: f32,
    pub use_average: bool,
}

#[derive(Debug, Clone)]
pub struct FloatRangeSettings {
    pub min: f64,
    pub max: f64,
    pub start: f64,
}

#[derive(Debug, Clone)]
pub struct IntRangeSettings {
    pub min: i64,
    pub max: i64,
    pub start: i64,
}

impl ControlConfig {
    /// Load from the optional JSON file named by `ROI_CONTROL_CONFIG`,
    /// then apply `ROI_CONTROL_*` environment overrides and validate.
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("ROI_CONTROL_CONFIG").ok();
        let file_cfg = match config_path.as_deref() {
            Some(path) => Some(read_config_file(Path::new(path))?),
            None => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default());
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: ControlConfigFile) -> Self {
        let motion = MotionSettings {
            threshold: file
                .motion
                .as_ref()
                .and_then(|motion| motion.threshold)
                .unwrap_or(DEFAULT_MOTION_THRESHOLD),
            blur_size: file
                .motion
                .as_ref()
                .and_then(|motion| motion.blur_size)
                .unwrap_or(DEFAULT_MOTION_BLUR_SIZE),
        };
        let brightness = BrightnessSettings {
            threshold: file
                .brightness
                .as_ref()
                .and_then(|brightness| brightness.threshold)
                .unwrap_or(DEFAULT_BRIGHTNESS_THRESHOLD),
            use_average: file
                .brightness
                .as_ref()
                .and_then(|brightness| brightness.use_average)
                .unwrap_or(DEFAULT_BRIGHTNESS_USE_AVERAGE),
        };
        let float_range = FloatRangeSettings {
            min: file
                .float_range
                .as_ref()
                .and_then(|range| range.min)
                .unwrap_or(DEFAULT_FLOAT_MIN),
            max: file
                .float_range
                .as_ref()
                .and_then(|range| range.max)
                .unwrap_or(DEFAULT_FLOAT_MAX),
            start: file
                .float_range
                .as_ref()
                .and_then(|range| range.start)
                .unwrap_or(DEFAULT_FLOAT_START),
        };
        let int_range = IntRangeSettings {
            min: file
                .int_range
                .as_ref()
                .and_then(|range| range.min)
                .unwrap_or(DEFAULT_INT_MIN),
            max: file
                .int_range
                .as_ref()
                .and_then(|range| range.max)
                .unwrap_or(DEFAULT_INT_MAX),
            start: file
                .int_range
                .as_ref()
                .and_then(|range| range.start)
                .unwrap_or(DEFAULT_INT_START),
        };
        Self {
            motion,
            brightness,
            float_range,
            int_range,
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(threshold) = std::env::var("ROI_CONTROL_MOTION_THRESHOLD") {
            self.motion.threshold = threshold
                .parse()
                .map_err(|_| anyhow!("ROI_CONTROL_MOTION_THRESHOLD must be a float"))?;
        }
        if let Ok(blur) = std::env::var("ROI_CONTROL_MOTION_BLUR_SIZE") {
            self.motion.blur_size = blur
                .parse()
                .map_err(|_| anyhow!("ROI_CONTROL_MOTION_BLUR_SIZE must be an integer"))?;
        }
        if let Ok(threshold) = std::env::var("ROI_CONTROL_BRIGHTNESS_THRESHOLD") {
            self.brightness.threshold = threshold
                .parse()
                .map_err(|_| anyhow!("ROI_CONTROL_BRIGHTNESS_THRESHOLD must be a float"))?;
        }
        if let Ok(use_average) = std::env::var("ROI_CONTROL_BRIGHTNESS_USE_AVERAGE") {
            self.brightness.use_average = use_average
                .parse()
                .map_err(|_| anyhow!("ROI_CONTROL_BRIGHTNESS_USE_AVERAGE must be a bool"))?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.motion.threshold) {
            return Err(anyhow!("motion threshold must be in [0,1]"));
        }
        if self.motion.blur_size == 0
            || self.motion.blur_size > 21
            || self.motion.blur_size % 2 == 0
        {
            return Err(anyhow!("motion blur size must be odd and in 1..=21"));
        }
        if !(0.0..=1.0).contains(&self.brightness.threshold) {
            return Err(anyhow!("brightness threshold must be in [0,1]"));
        }
        if self.float_range.max < self.float_range.min {
            return Err(anyhow!("float range maximum is below minimum"));
        }
        if self.int_range.max < self.int_range.min {
            return Err(anyhow!("int range maximum is below minimum"));
        }
        Ok(())
    }
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self::from_file(ControlConfigFile::default())
    }
}

fn read_config_file(path: &Path) -> Result<ControlConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let cfg = serde_json::from_str(&raw)
        .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?;
    Ok(cfg)
}
