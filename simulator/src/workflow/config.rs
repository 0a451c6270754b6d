use anyhow::Context;
use gapfillcore::sensor::dates::{format_day, parse_day, regular_days};
use gapfillcore::{OutputSchedule, RadiusPolicy, RunConfig, SensorConfig, LEGACY_SEARCH_RADIUS};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::generator::profile::SceneConfig;

/// Output dates of one sensor, with calendar stamps instead of day numbers.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum OutputPlan {
    Explicit {
        dates: Vec<String>,
    },
    Regular {
        #[serde(default)]
        start: Option<String>,
        #[serde(default)]
        end: Option<String>,
        step: i32,
    },
    #[default]
    Input,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SensorEntry {
    pub name: String,
    /// `YYYYMMDD` or `YYYY-MM-DD`.
    pub input_dates: Vec<String>,
    #[serde(default)]
    pub output: OutputPlan,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkflowConfig {
    pub bands: usize,
    #[serde(default = "default_radius")]
    pub radius: i32,
    #[serde(default)]
    pub radius_policy: RadiusPolicy,
    #[serde(default)]
    pub threads: Option<usize>,
    #[serde(default)]
    pub scene: SceneConfig,
    pub sensors: Vec<SensorEntry>,
}

fn default_radius() -> i32 {
    LEGACY_SEARCH_RADIUS
}

fn parse_days(sensor: &str, stamps: &[String]) -> anyhow::Result<Vec<i32>> {
    stamps
        .iter()
        .map(|stamp| parse_day(stamp).with_context(|| format!("sensor {}", sensor)))
        .collect()
}

fn parse_optional(sensor: &str, stamp: Option<&String>) -> anyhow::Result<Option<i32>> {
    stamp
        .map(|stamp| parse_day(stamp).with_context(|| format!("sensor {}", sensor)))
        .transpose()
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    /// Two-sensor season in 2016: a 10-day and a 16-day revisit, resampled every `step` days.
    pub fn from_args(bands: usize, radius: i32, step: i32, scene: SceneConfig) -> Self {
        let season = |first: i32, revisit: i32| -> Vec<String> {
            let start = 16_805 + first; // 2016-01-05
            regular_days(start, 17_166, revisit)
                .into_iter()
                .map(format_day)
                .collect()
        };
        let plan = OutputPlan::Regular {
            start: None,
            end: None,
            step,
        };

        Self {
            bands,
            radius,
            radius_policy: RadiusPolicy::default(),
            threads: None,
            scene,
            sensors: vec![
                SensorEntry {
                    name: "SENTINEL".into(),
                    input_dates: season(0, 10),
                    output: plan.clone(),
                },
                SensorEntry {
                    name: "SPOT".into(),
                    input_dates: season(3, 16),
                    output: plan,
                },
            ],
        }
    }

    pub fn to_run_config(&self) -> anyhow::Result<RunConfig> {
        let sensors = self
            .sensors
            .iter()
            .map(|entry| {
                let input_dates = parse_days(&entry.name, &entry.input_dates)?;
                let schedule = match &entry.output {
                    OutputPlan::Explicit { dates } => OutputSchedule::Explicit {
                        dates: parse_days(&entry.name, dates)?,
                    },
                    OutputPlan::Regular { start, end, step } => OutputSchedule::Regular {
                        start: parse_optional(&entry.name, start.as_ref())?,
                        end: parse_optional(&entry.name, end.as_ref())?,
                        step: *step,
                    },
                    OutputPlan::Input => OutputSchedule::Input,
                };
                SensorConfig::resolve(entry.name.clone(), input_dates, &schedule)
                    .with_context(|| format!("resolving output dates of sensor {}", entry.name))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        let config = RunConfig::new(sensors, self.bands, self.radius);
        config.validate().context("validating run configuration")?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn config_from_args_produces_run_config() {
        let cfg = WorkflowConfig::from_args(4, 30, 10, SceneConfig::default());
        let run = cfg.to_run_config().unwrap();
        assert_eq!(run.sensors.len(), 2);
        assert_eq!(run.bands, 4);
        assert_eq!(run.sensors[0].input_dates[0], parse_day("20160105").unwrap());
        assert_eq!(run.sensors[1].input_dates[0], parse_day("20160108").unwrap());
        let sentinel = &run.sensors[0];
        assert_eq!(sentinel.output_dates.first(), sentinel.input_dates.first());
        assert!(sentinel.output_dates.windows(2).all(|w| w[1] - w[0] == 10));
    }

    #[test]
    fn config_load_reads_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            b"bands: 2
radius: 45
radius_policy: configured
scene:
  width: 8
  height: 6
sensors:
  - name: SENTINEL
    input_dates: ['20160105', '2016-01-15', '20160125']
    output:
      mode: explicit
      dates: ['20160110', '20160120']
  - name: LANDSAT
    input_dates: ['20160107', '20160123']
    output:
      mode: regular
      start: '20160101'
      step: 8
",
        )
        .unwrap();
        let path = temp.into_temp_path();
        let cfg = WorkflowConfig::load(&path).unwrap();
        assert_eq!(cfg.radius_policy, RadiusPolicy::Configured);
        assert_eq!(cfg.scene.width, 8);
        assert_eq!(cfg.scene.cloud_fraction, SceneConfig::default().cloud_fraction);

        let run = cfg.to_run_config().unwrap();
        assert_eq!(run.radius, 45);
        assert_eq!(run.input_date_count(), 5);
        let start = parse_day("20160101").unwrap();
        assert_eq!(
            run.sensors[1].output_dates,
            vec![start, start + 8, start + 16]
        );
        assert_eq!(run.output_band_count(), 10);
    }

    #[test]
    fn config_rejects_unsorted_or_malformed_dates() {
        let mut cfg = WorkflowConfig::from_args(1, 10, 5, SceneConfig::default());
        cfg.sensors[0].input_dates = vec!["20160201".into(), "20160101".into()];
        assert!(cfg.to_run_config().is_err());

        cfg.sensors[0].input_dates = vec!["2016-02-30".into()];
        assert!(cfg.to_run_config().is_err());
    }
}
