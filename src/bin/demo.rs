//! demo - synthetic end-to-end run for roi-control
//!
//! Generates noisy synthetic frames, wires a two-ROI chain (motion on the
//! left half, brightness on the right half) into a float control, and
//! prints the control value per frame.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use roi_control::{
    BrightnessDetector, ControlConfig, FloatDetectionControl, Frame, Mask, MotionDetector, Roi,
    RoiAction, RoiBounds, RoiChain,
};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Number of synthetic frames to run.
    #[arg(long, default_value_t = 60)]
    frames: u32,
    /// Frame width in pixels.
    #[arg(long, default_value_t = 320)]
    width: u32,
    /// Frame height in pixels.
    #[arg(long, default_value_t = 240)]
    height: u32,
    /// Deterministic seed for the synthetic source.
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let cfg = ControlConfig::load()?;

    let motion = Arc::new(MotionDetector::new(
        cfg.motion.threshold,
        cfg.motion.blur_size,
    )?);
    let brightness = Arc::new(BrightnessDetector::new(
        cfg.brightness.threshold,
        cfg.brightness.use_average,
    )?);

    let left = RoiBounds::new(0, 0, args.height - 1, args.width / 2 - 1);
    let right = RoiBounds::new(0, args.width / 2, args.height - 1, args.width - 1);

    let mut chain = RoiChain::new();
    chain.push(Roi::new(
        rect_mask(args.width, args.height, left),
        motion,
        RoiAction::Add,
        0.1,
    ));
    chain.push(Roi::new(
        rect_mask(args.width, args.height, right),
        brightness,
        RoiAction::Momentary,
        0.0,
    ));

    let mut control = FloatDetectionControl::new(
        cfg.float_range.min,
        cfg.float_range.max,
        cfg.float_range.start,
    )?;

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    for i in 0..args.frames {
        let frame = synthetic_frame(&mut rng, args.width, args.height, i);
        let (value, mask) = control.process(&frame, &chain)?;
        let coverage = mask.data().iter().filter(|&&v| v > 0.0).count() as f32
            / mask.data().len() as f32;
        println!(
            "frame {:3}  value {:7.3}  mask coverage {:5.1}%",
            i,
            value,
            coverage * 100.0
        );
    }

    Ok(())
}

fn rect_mask(width: u32, height: u32, bounds: RoiBounds) -> Mask {
    let mut mask = Mask::zeros(width, height);
    mask.fill(bounds, 1.0);
    mask
}

/// Noise bursts on the left half every other second; a slow brightness
/// ramp on the right half.
fn synthetic_frame(rng: &mut StdRng, width: u32, height: u32, index: u32) -> Frame {
    let mut frame = Frame::black(width, height);
    let burst = (index / 10) % 2 == 0;
    let ramp = ((index * 8) % 256) as u8;
    for y in 0..height {
        for x in 0..width {
            if x < width / 2 {
                if burst {
                    let v = rng.gen::<u8>();
                    frame.set_pixel(y, x, [v, v, v]);
                }
            } else {
                frame.set_pixel(y, x, [ramp, ramp, ramp]);
            }
        }
    }
    frame
}
