use crate::prelude::ConfigError;
use crate::sensor::dates::regular_days;
use serde::{Deserialize, Serialize};

/// Acquisition calendar of one sensor and the dates to reconstruct for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorConfig {
    /// Informational only.
    pub name: String,
    /// Strictly ascending acquisition days.
    pub input_dates: Vec<i32>,
    /// Days at which a value is produced, evaluated in this order.
    pub output_dates: Vec<i32>,
}

/// How the output dates of a sensor are derived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum OutputSchedule {
    Explicit {
        dates: Vec<i32>,
    },
    /// Every `step` days from `start` to `end` inclusive. Missing bounds default to the
    /// first and last input date.
    Regular {
        #[serde(default)]
        start: Option<i32>,
        #[serde(default)]
        end: Option<i32>,
        step: i32,
    },
    /// Reconstruct at the acquisition dates themselves.
    Input,
}

impl SensorConfig {
    pub fn new(name: impl Into<String>, input_dates: Vec<i32>, output_dates: Vec<i32>) -> Self {
        Self {
            name: name.into(),
            input_dates,
            output_dates,
        }
    }

    /// Builds a sensor whose output dates come from `schedule`.
    pub fn resolve(
        name: impl Into<String>,
        input_dates: Vec<i32>,
        schedule: &OutputSchedule,
    ) -> Result<Self, ConfigError> {
        let name = name.into();
        let output_dates = match schedule {
            OutputSchedule::Explicit { dates } => dates.clone(),
            OutputSchedule::Input => input_dates.clone(),
            OutputSchedule::Regular { start, end, step } => {
                if *step <= 0 {
                    return Err(ConfigError::InvalidSchedule {
                        sensor: name,
                        reason: format!("step must be positive, got {}", step),
                    });
                }
                let start = start.or_else(|| input_dates.first().copied());
                let end = end.or_else(|| input_dates.last().copied());
                match (start, end) {
                    (Some(start), Some(end)) if start > end => {
                        return Err(ConfigError::InvalidSchedule {
                            sensor: name,
                            reason: format!("start {} is after end {}", start, end),
                        });
                    }
                    (Some(start), Some(end)) => regular_days(start, end, *step),
                    _ => Vec::new(),
                }
            }
        };
        Ok(Self {
            name,
            input_dates,
            output_dates,
        })
    }

    fn check_ascending(&self) -> Result<(), ConfigError> {
        for (index, pair) in self.input_dates.windows(2).enumerate() {
            if pair[1] <= pair[0] {
                return Err(ConfigError::UnsortedInputDates {
                    sensor: self.name.clone(),
                    index: index + 1,
                    previous: pair[0],
                    date: pair[1],
                });
            }
        }
        Ok(())
    }
}

/// Sensor list plus the run-wide band count and temporal search radius.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    pub sensors: Vec<SensorConfig>,
    pub bands: usize,
    pub radius: i32,
}

impl RunConfig {
    pub fn new(sensors: Vec<SensorConfig>, bands: usize, radius: i32) -> Self {
        Self {
            sensors,
            bands,
            radius,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sensors.is_empty() {
            return Err(ConfigError::NoSensors);
        }
        if self.bands == 0 {
            return Err(ConfigError::ZeroBands);
        }
        if self.radius < 0 {
            return Err(ConfigError::NegativeRadius(self.radius));
        }
        self.sensors.iter().try_for_each(SensorConfig::check_ascending)
    }

    /// Sum of input dates over all sensors; also the mask length.
    pub fn input_date_count(&self) -> usize {
        self.sensors.iter().map(|s| s.input_dates.len()).sum()
    }

    pub fn output_date_count(&self) -> usize {
        self.sensors.iter().map(|s| s.output_dates.len()).sum()
    }

    /// Length of a flattened input pixel.
    pub fn input_len(&self) -> usize {
        self.input_date_count() * self.bands
    }

    /// Length of a flattened output pixel.
    pub fn output_band_count(&self) -> usize {
        self.output_date_count() * self.bands
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_sensors() -> RunConfig {
        RunConfig::new(
            vec![
                SensorConfig::new("SENTINEL", vec![10, 20, 30], vec![15, 25]),
                SensorConfig::new("SPOT", vec![12, 40], vec![12, 20, 40]),
            ],
            4,
            30,
        )
    }

    #[test]
    fn derived_lengths_sum_over_sensors() {
        let config = two_sensors();
        assert_eq!(config.input_date_count(), 5);
        assert_eq!(config.output_date_count(), 5);
        assert_eq!(config.input_len(), 20);
        assert_eq!(config.output_band_count(), 20);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_unsorted_and_duplicate_dates() {
        let mut config = two_sensors();
        config.sensors[1].input_dates = vec![40, 12];
        assert_eq!(
            config.validate(),
            Err(ConfigError::UnsortedInputDates {
                sensor: "SPOT".into(),
                index: 1,
                previous: 40,
                date: 12,
            })
        );

        config.sensors[1].input_dates = vec![12, 12];
        assert!(matches!(
            config.validate(),
            Err(ConfigError::UnsortedInputDates { .. })
        ));
    }

    #[test]
    fn validate_rejects_degenerate_run_settings() {
        let mut config = two_sensors();
        config.bands = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroBands));

        let mut config = two_sensors();
        config.radius = -1;
        assert_eq!(config.validate(), Err(ConfigError::NegativeRadius(-1)));

        let config = RunConfig::new(Vec::new(), 1, 0);
        assert_eq!(config.validate(), Err(ConfigError::NoSensors));
    }

    #[test]
    fn resolve_regular_schedule_defaults_to_input_span() {
        let schedule = OutputSchedule::Regular {
            start: None,
            end: None,
            step: 10,
        };
        let sensor = SensorConfig::resolve("S2", vec![3, 9, 27], &schedule).unwrap();
        assert_eq!(sensor.output_dates, vec![3, 13, 23]);

        let schedule = OutputSchedule::Regular {
            start: Some(0),
            end: None,
            step: 9,
        };
        let sensor = SensorConfig::resolve("S2", vec![3, 9, 27], &schedule).unwrap();
        assert_eq!(sensor.output_dates, vec![0, 9, 18, 27]);
    }

    #[test]
    fn resolve_rejects_bad_regular_schedule() {
        let schedule = OutputSchedule::Regular {
            start: None,
            end: None,
            step: 0,
        };
        assert!(matches!(
            SensorConfig::resolve("L8", vec![1, 2], &schedule),
            Err(ConfigError::InvalidSchedule { .. })
        ));

        let schedule = OutputSchedule::Regular {
            start: Some(50),
            end: Some(10),
            step: 5,
        };
        assert!(matches!(
            SensorConfig::resolve("L8", vec![1, 2], &schedule),
            Err(ConfigError::InvalidSchedule { .. })
        ));
    }

    #[test]
    fn resolve_input_and_explicit_schedules() {
        let sensor = SensorConfig::resolve("S2", vec![1, 5], &OutputSchedule::Input).unwrap();
        assert_eq!(sensor.output_dates, vec![1, 5]);

        let schedule = OutputSchedule::Explicit { dates: vec![7, 3] };
        let sensor = SensorConfig::resolve("S2", vec![1, 5], &schedule).unwrap();
        assert_eq!(sensor.output_dates, vec![7, 3]);

        let empty = SensorConfig::resolve(
            "S2",
            Vec::new(),
            &OutputSchedule::Regular {
                start: None,
                end: None,
                step: 5,
            },
        )
        .unwrap();
        assert!(empty.output_dates.is_empty());
    }

    #[test]
    fn run_config_deserializes_from_json() {
        let json = r#"{
            "sensors": [
                {"name": "SENTINEL", "input_dates": [1, 11], "output_dates": [6]}
            ],
            "bands": 2,
            "radius": 15
        }"#;
        let config: RunConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.sensors[0].output_dates, vec![6]);
        assert_eq!(config.output_band_count(), 2);

        let schedule: OutputSchedule =
            serde_json::from_str(r#"{"mode": "regular", "step": 5}"#).unwrap();
        assert_eq!(
            schedule,
            OutputSchedule::Regular {
                start: None,
                end: None,
                step: 5
            }
        );
    }
}
