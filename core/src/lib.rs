//! Core temporal gap-filling and resampling engine for multi-sensor image time series.
//!
//! Each pixel carries a flattened series of acquisitions from one or more sensors
//! plus a per-date validity mask. The engine reconstructs a value at every requested
//! output date by bracketing it between the nearest valid acquisitions and
//! interpolating linearly, falling back to a copied neighbour or the no-data
//! sentinel at the edges.

pub mod math;
pub mod prelude;
pub mod processing;
pub mod sensor;
pub mod telemetry;

pub use prelude::{ConfigError, PixelFunctor, ResampleError, ResampleResult};
pub use processing::gapfill::{
    gap_fill, output_band_count, FillCounts, GapFillTransform, RadiusPolicy,
    LEGACY_SEARCH_RADIUS, NO_DATA_VALUE,
};
pub use sensor::{OutputSchedule, RunConfig, SensorConfig};
