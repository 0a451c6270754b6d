use anyhow::{ensure, Context};
use gapfillcore::RunConfig;
use ndarray::Array3;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::generator::template::seasonal_curve;

/// Configuration for synthesizing an aligned value/mask image stack.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub width: usize,
    pub height: usize,
    pub seed: u64,
    /// Probability that an acquisition of a pixel is masked.
    pub cloud_fraction: f64,
    pub noise: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            width: 64,
            height: 64,
            seed: 0,
            cloud_fraction: 0.3,
            noise: 0.02,
        }
    }
}

/// Value stack `(height, width, input dates * bands)` and mask stack
/// `(height, width, input dates)`, laid out sensor-major, date-major, band-minor.
#[derive(Debug, Clone)]
pub struct SyntheticScene {
    pub values: Array3<f32>,
    pub mask: Array3<u8>,
}

pub fn build_scene(config: &SceneConfig, run: &RunConfig) -> anyhow::Result<SyntheticScene> {
    ensure!(
        (0.0..=1.0).contains(&config.cloud_fraction),
        "cloud fraction {} outside [0, 1]",
        config.cloud_fraction
    );

    let dates: Vec<(usize, i32)> = run
        .sensors
        .iter()
        .enumerate()
        .flat_map(|(sensor, s)| s.input_dates.iter().map(move |&d| (sensor, d)))
        .collect();
    let first = dates.iter().map(|&(_, d)| d).min().unwrap_or(0) as f32;
    let last = dates.iter().map(|&(_, d)| d).max().unwrap_or(0) as f32;
    let span = (last - first).max(1.0);

    let bands = run.bands;
    config
        .height
        .checked_mul(config.width)
        .and_then(|pixels| pixels.checked_mul(dates.len().checked_mul(bands)?))
        .context("overflow computing scene size")?;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut values = Array3::<f32>::zeros((config.height, config.width, dates.len() * bands));
    let mut mask = Array3::<u8>::zeros((config.height, config.width, dates.len()));

    for row in 0..config.height {
        for col in 0..config.width {
            let peak = first + span * rng.gen_range(0.3f32..0.7);
            let width = span * rng.gen_range(0.1f32..0.25);
            for (index, &(sensor, day)) in dates.iter().enumerate() {
                // each sensor sees the surface with a slightly different gain
                let gain = 1.0 - 0.05 * sensor as f32;
                for band in 0..bands {
                    let amplitude = 0.6 / (1.0 + band as f32);
                    let jitter = if config.noise > 0.0 {
                        rng.gen_range(-config.noise..config.noise)
                    } else {
                        0.0
                    };
                    values[[row, col, index * bands + band]] =
                        gain * seasonal_curve(day as f32, peak, width, 0.1, amplitude) + jitter;
                }
                mask[[row, col, index]] = u8::from(rng.gen_bool(config.cloud_fraction));
            }
        }
    }

    Ok(SyntheticScene { values, mask })
}
