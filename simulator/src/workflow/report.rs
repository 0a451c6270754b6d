use crate::workflow::runner::WorkflowResult;
use anyhow::Context;
use gapfillcore::FillCounts;
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

/// One JSON line summarising a run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub width: usize,
    pub height: usize,
    pub output_bands: usize,
    pub output_days: Vec<String>,
    pub counts: FillCounts,
    pub no_data_fraction: f64,
    pub center_series: Vec<f32>,
}

impl RunReport {
    pub fn from_result(result: &WorkflowResult) -> Self {
        let dates = result.counts.dates();
        let no_data_fraction = if dates > 0 {
            result.counts.no_data as f64 / dates as f64
        } else {
            0.0
        };
        Self {
            width: result.width,
            height: result.height,
            output_bands: result.output_bands,
            output_days: result.output_days.clone(),
            counts: result.counts,
            no_data_fraction,
            center_series: result.center_series.clone(),
        }
    }

    pub fn append_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating report directory {}", parent.display()))?;
        }
        let mut line = serde_json::to_string(self).context("serializing run report")?;
        line.push('\n');
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("opening report {}", path.display()))?;
        file.write_all(line.as_bytes())?;
        Ok(())
    }
}
