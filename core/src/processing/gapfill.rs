use std::sync::Arc;

use num_traits::{Float, NumCast, ToPrimitive, Zero};
use serde::{Deserialize, Serialize};

use crate::math::linear::LinearFit;
use crate::prelude::{ConfigError, PixelFunctor, ResampleError, ResampleResult};
use crate::processing::search::{find_bracket, nearest_valid};
use crate::sensor::{RunConfig, SensorConfig};
use crate::telemetry::log::LogManager;

/// Written for every band of an output date that has no valid neighbour.
pub const NO_DATA_VALUE: f64 = -10000.0;

/// Search radius, in days, that replaces the configured one under
/// [`RadiusPolicy::LegacyOverride`]. Wide enough to disable the window in practice.
pub const LEGACY_SEARCH_RADIUS: i32 = 365_000;

/// Whether the configured radius is honoured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RadiusPolicy {
    /// Always search with [`LEGACY_SEARCH_RADIUS`]. Matches the behaviour of the
    /// production resampler, which discards the supplied radius.
    #[default]
    LegacyOverride,
    /// Search with the radius from the run configuration.
    Configured,
}

/// How one output date was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillOutcome {
    NoData,
    CopiedBefore,
    CopiedAfter,
    Exact,
    Interpolated,
}

/// Tally of [`FillOutcome`]s, one entry per output date (not per band).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillCounts {
    pub pixels: usize,
    pub no_data: usize,
    pub copied_before: usize,
    pub copied_after: usize,
    pub exact: usize,
    pub interpolated: usize,
}

impl FillCounts {
    pub fn record(&mut self, outcome: FillOutcome) {
        match outcome {
            FillOutcome::NoData => self.no_data += 1,
            FillOutcome::CopiedBefore => self.copied_before += 1,
            FillOutcome::CopiedAfter => self.copied_after += 1,
            FillOutcome::Exact => self.exact += 1,
            FillOutcome::Interpolated => self.interpolated += 1,
        }
    }

    pub fn merge(&mut self, other: &FillCounts) {
        self.pixels += other.pixels;
        self.no_data += other.no_data;
        self.copied_before += other.copied_before;
        self.copied_after += other.copied_after;
        self.exact += other.exact;
        self.interpolated += other.interpolated;
    }

    /// Number of output dates evaluated.
    pub fn dates(&self) -> usize {
        self.no_data + self.copied_before + self.copied_after + self.exact + self.interpolated
    }
}

/// Per-pixel temporal gap-filling and resampling.
///
/// Holds an immutable, shared copy of the sensor list, so clones are cheap and can be
/// handed to every worker of a host engine.
#[derive(Debug, Clone)]
pub struct GapFillTransform {
    sensors: Arc<[SensorConfig]>,
    bands: usize,
    configured_radius: i32,
    radius: i32,
    policy: RadiusPolicy,
    input_dates: usize,
    output_len: usize,
}

impl GapFillTransform {
    /// Validates `config` and builds the transform with the default [`RadiusPolicy`].
    pub fn new(config: RunConfig) -> Result<Self, ConfigError> {
        Self::with_policy(config, RadiusPolicy::default())
    }

    pub fn with_policy(config: RunConfig, policy: RadiusPolicy) -> Result<Self, ConfigError> {
        Self::build(config, policy, true)
    }

    fn build(
        config: RunConfig,
        policy: RadiusPolicy,
        warn_on_override: bool,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let radius = match policy {
            RadiusPolicy::LegacyOverride => {
                if warn_on_override && config.radius != LEGACY_SEARCH_RADIUS {
                    LogManager::new("gapfill").warn(&format!(
                        "configured radius {} replaced by legacy search radius {}",
                        config.radius, LEGACY_SEARCH_RADIUS
                    ));
                }
                LEGACY_SEARCH_RADIUS
            }
            RadiusPolicy::Configured => config.radius,
        };

        let input_dates = config.input_date_count();
        let output_len = config.output_band_count();
        Ok(Self {
            sensors: config.sensors.into(),
            bands: config.bands,
            configured_radius: config.radius,
            radius,
            policy,
            input_dates,
            output_len,
        })
    }

    /// Radius used by the neighbour search.
    pub fn radius(&self) -> i32 {
        self.radius
    }

    /// Radius as supplied in the run configuration, before any override.
    pub fn configured_radius(&self) -> i32 {
        self.configured_radius
    }

    pub fn policy(&self) -> RadiusPolicy {
        self.policy
    }

    pub fn bands(&self) -> usize {
        self.bands
    }

    pub fn sensors(&self) -> &[SensorConfig] {
        &self.sensors
    }

    /// Values per output pixel; what a host allocates before calling the transform.
    pub fn output_band_count(&self) -> usize {
        self.output_len
    }

    /// Reconstructs one pixel into a freshly allocated vector.
    ///
    /// # Panics
    /// If `pixel` or `mask` is shorter than the configuration requires. Use
    /// [`GapFillTransform::try_transform`] for checked input.
    pub fn transform<T: Float, M: Zero>(&self, pixel: &[T], mask: &[M]) -> Vec<T> {
        let mut out = vec![T::zero(); self.output_len];
        let mut counts = FillCounts::default();
        self.transform_into(pixel, mask, &mut out, &mut counts);
        out
    }

    /// Like [`GapFillTransform::transform`], but rejects mis-sized vectors.
    pub fn try_transform<T: Float, M: Zero>(
        &self,
        pixel: &[T],
        mask: &[M],
    ) -> ResampleResult<Vec<T>> {
        let expected = self.input_dates * self.bands;
        if pixel.len() != expected {
            return Err(ResampleError::PixelLength {
                expected,
                got: pixel.len(),
            });
        }
        if mask.len() != self.input_dates {
            return Err(ResampleError::MaskLength {
                expected: self.input_dates,
                got: mask.len(),
            });
        }
        Ok(self.transform(pixel, mask))
    }

    /// Writes the reconstructed pixel into `out` in sensor, date, band order and tallies
    /// one outcome per output date into `counts`.
    pub fn transform_into<T: Float, M: Zero>(
        &self,
        pixel: &[T],
        mask: &[M],
        out: &mut [T],
        counts: &mut FillCounts,
    ) {
        debug_assert_eq!(pixel.len(), self.input_dates * self.bands);
        debug_assert_eq!(mask.len(), self.input_dates);
        debug_assert_eq!(out.len(), self.output_len);

        let bands = self.bands;
        let no_data = float_from(NO_DATA_VALUE);
        let mut chunks = out.chunks_exact_mut(bands);
        let mut offset = 0;

        for sensor in self.sensors.iter() {
            for &out_date in &sensor.output_dates {
                let bracket = find_bracket(&sensor.input_dates, out_date, self.radius);
                let before = nearest_valid(bracket.max_lo, bracket.min_lo, mask, offset);
                let after = nearest_valid(bracket.min_hi, bracket.max_hi, mask, offset);

                let Some(target) = chunks.next() else {
                    return;
                };
                let base = |id: usize| (id + offset) * bands;

                let outcome = match (before, after) {
                    (None, None) => {
                        target.fill(no_data);
                        FillOutcome::NoData
                    }
                    (None, Some(after)) => {
                        target.copy_from_slice(&pixel[base(after)..base(after) + bands]);
                        FillOutcome::CopiedAfter
                    }
                    (Some(before), None) => {
                        target.copy_from_slice(&pixel[base(before)..base(before) + bands]);
                        FillOutcome::CopiedBefore
                    }
                    (Some(before), Some(after)) if before == after => {
                        target.copy_from_slice(&pixel[base(before)..base(before) + bands]);
                        FillOutcome::Exact
                    }
                    (Some(before), Some(after)) => {
                        let x1 = float_from(sensor.input_dates[before]);
                        let x2 = float_from(sensor.input_dates[after]);
                        let x = float_from(out_date);
                        let lo = &pixel[base(before)..base(before) + bands];
                        let hi = &pixel[base(after)..base(after) + bands];
                        for ((value, &y1), &y2) in target.iter_mut().zip(lo).zip(hi) {
                            *value = match LinearFit::through(x1, y1, x2, y2) {
                                Some(fit) => fit.eval(x),
                                None => y1,
                            };
                        }
                        FillOutcome::Interpolated
                    }
                };
                counts.record(outcome);
            }
            offset += sensor.input_dates.len();
        }
        counts.pixels += 1;
    }
}

/// Transforms compare equal when they share the effective radius and band count.
/// Pixel values and sensor calendars are not part of the identity.
impl PartialEq for GapFillTransform {
    fn eq(&self, other: &Self) -> bool {
        self.radius == other.radius && self.bands == other.bands
    }
}

impl Eq for GapFillTransform {}

impl<T, M> PixelFunctor<T, M> for GapFillTransform
where
    T: Float + Send + Sync,
    M: Zero,
{
    fn input_len(&self) -> usize {
        self.input_dates * self.bands
    }

    fn mask_len(&self) -> usize {
        self.input_dates
    }

    fn output_len(&self) -> usize {
        self.output_len
    }

    fn fill_value(&self) -> T {
        float_from(NO_DATA_VALUE)
    }

    fn apply_into(&self, pixel: &[T], mask: &[M], out: &mut [T], counts: &mut FillCounts) {
        self.transform_into(pixel, mask, out, counts);
    }
}

/// Number of values per output pixel for `config`.
pub fn output_band_count(config: &RunConfig) -> usize {
    config.output_band_count()
}

/// One-shot `(pixel, mask, config) -> output` with the default [`RadiusPolicy`].
///
/// Clones and validates `config` on every call and stays silent about the radius
/// override; hosts processing many pixels should build a [`GapFillTransform`] once instead.
pub fn gap_fill<T: Float, M: Zero>(
    pixel: &[T],
    mask: &[M],
    config: &RunConfig,
) -> ResampleResult<Vec<T>> {
    GapFillTransform::build(config.clone(), RadiusPolicy::default(), false)?
        .try_transform(pixel, mask)
}

fn float_from<T: Float, V: ToPrimitive>(value: V) -> T {
    <T as NumCast>::from(value).unwrap_or_else(T::nan)
}
