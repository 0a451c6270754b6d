use crate::generator::profile::SyntheticScene;
use crate::workflow::config::WorkflowConfig;
use anyhow::Context;
use gapfillcore::processing::StackProcessor;
use gapfillcore::sensor::dates::format_day;
use gapfillcore::{FillCounts, GapFillTransform, RunConfig};
use log::info;
use ndarray::s;

pub struct WorkflowResult {
    pub width: usize,
    pub height: usize,
    pub output_bands: usize,
    /// `SENSOR:YYYYMMDD` per output date, in output order.
    pub output_days: Vec<String>,
    pub counts: FillCounts,
    /// Reconstructed series of the centre pixel.
    pub center_series: Vec<f32>,
}

#[derive(Clone)]
pub struct Runner {
    config: WorkflowConfig,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        Self { config }
    }

    /// Runs `run_config`, built once from this runner's workflow, over `scene`.
    pub fn execute(
        &self,
        run_config: RunConfig,
        scene: &SyntheticScene,
    ) -> anyhow::Result<WorkflowResult> {
        let output_days = run_config
            .sensors
            .iter()
            .flat_map(|sensor| {
                sensor
                    .output_dates
                    .iter()
                    .map(move |&day| format!("{}:{}", sensor.name, format_day(day)))
            })
            .collect();

        let transform = GapFillTransform::with_policy(run_config, self.config.radius_policy)
            .context("building gap-fill transform")?;
        let output_bands = transform.output_band_count();

        let mut processor = StackProcessor::new(transform);
        if let Some(threads) = self.config.threads {
            processor = processor.with_threads(threads);
        }
        let transform = processor.functor();
        info!(
            "{} sensors x {} bands, search radius {} (configured {}, {:?})",
            transform.sensors().len(),
            transform.bands(),
            transform.radius(),
            transform.configured_radius(),
            transform.policy()
        );
        let (output, counts) = processor
            .process(scene.values.view(), scene.mask.view())
            .context("processing image stack")?;

        let (height, width, _) = output.dim();
        let center_series = if height > 0 && width > 0 {
            output.slice(s![height / 2, width / 2, ..]).to_vec()
        } else {
            Vec::new()
        };

        Ok(WorkflowResult {
            width,
            height,
            output_bands,
            output_days,
            counts,
            center_series,
        })
    }
}
