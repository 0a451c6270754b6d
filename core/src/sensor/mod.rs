pub mod config;
pub mod dates;

pub use config::{OutputSchedule, RunConfig, SensorConfig};
pub use dates::{format_day, parse_day, regular_days};
