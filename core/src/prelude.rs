use crate::processing::gapfill::FillCounts;

/// Configuration problems detected once, when a run configuration is validated.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no sensors configured")]
    NoSensors,
    #[error("band count must be at least 1")]
    ZeroBands,
    #[error("negative search radius: {0}")]
    NegativeRadius(i32),
    #[error("sensor {sensor}: input date {date} at index {index} does not follow {previous}")]
    UnsortedInputDates {
        sensor: String,
        index: usize,
        previous: i32,
        date: i32,
    },
    #[error("sensor {sensor}: invalid output schedule: {reason}")]
    InvalidSchedule { sensor: String, reason: String },
    #[error("invalid date: {0}")]
    InvalidDate(String),
}

/// Common error type for the checked entry points and the stack adapter.
#[derive(thiserror::Error, Debug)]
pub enum ResampleError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("pixel vector: expected {expected} values, got {got}")]
    PixelLength { expected: usize, got: usize },
    #[error("mask vector: expected {expected} values, got {got}")]
    MaskLength { expected: usize, got: usize },
    #[error("stack shape mismatch: {0}")]
    StackShape(String),
    #[error("thread pool: {0}")]
    ThreadPool(String),
}

pub type ResampleResult<T> = Result<T, ResampleError>;

/// Per-pixel function applied by a host raster engine.
///
/// Implementors must be stateless across pixels so the host can call
/// `apply_into` from any number of workers at once.
pub trait PixelFunctor<T, M>: Send + Sync {
    /// Number of values in one input pixel.
    fn input_len(&self) -> usize;
    /// Number of entries in one mask pixel.
    fn mask_len(&self) -> usize;
    /// Number of values written per output pixel.
    fn output_len(&self) -> usize;
    /// Value used to pre-fill output buffers.
    fn fill_value(&self) -> T;
    /// Writes one output pixel. `out` holds exactly `output_len()` values.
    fn apply_into(&self, pixel: &[T], mask: &[M], out: &mut [T], counts: &mut FillCounts);
}
