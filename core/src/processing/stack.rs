use ndarray::parallel::prelude::*;
use ndarray::{Array3, ArrayView1, ArrayView2, ArrayView3, ArrayViewMut2, Axis};
use rayon::ThreadPoolBuilder;

use crate::prelude::{PixelFunctor, ResampleError, ResampleResult};
use crate::processing::gapfill::FillCounts;
use crate::telemetry::log::LogManager;
use crate::telemetry::metrics::MetricsRecorder;

/// In-memory host engine: applies a [`PixelFunctor`] to every pixel of an aligned
/// `(rows, cols, components)` value stack and mask stack.
///
/// Rows are evaluated in parallel. The whole stack must be resident; streaming is left to
/// hosts that tile their own buffers and call the functor directly.
pub struct StackProcessor<F> {
    functor: F,
    threads: Option<usize>,
    logger: LogManager,
}

impl<F> StackProcessor<F> {
    pub fn new(functor: F) -> Self {
        Self {
            functor,
            threads: None,
            logger: LogManager::new("stack"),
        }
    }

    /// Runs on a dedicated pool of `threads` workers instead of the global rayon pool.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    pub fn functor(&self) -> &F {
        &self.functor
    }

    /// Returns the output stack, pre-filled with the functor's fill value, and the
    /// outcome tally over all pixels.
    pub fn process<T, M>(
        &self,
        values: ArrayView3<T>,
        mask: ArrayView3<M>,
    ) -> ResampleResult<(Array3<T>, FillCounts)>
    where
        F: PixelFunctor<T, M>,
        T: Copy + Send + Sync,
        M: Copy + Send + Sync,
    {
        let (rows, cols, components) = values.dim();
        let (mask_rows, mask_cols, mask_components) = mask.dim();
        if (rows, cols) != (mask_rows, mask_cols) {
            return Err(ResampleError::StackShape(format!(
                "values are {}x{} pixels, mask is {}x{}",
                rows, cols, mask_rows, mask_cols
            )));
        }
        if components != self.functor.input_len() {
            return Err(ResampleError::StackShape(format!(
                "values carry {} components per pixel, expected {}",
                components,
                self.functor.input_len()
            )));
        }
        if mask_components != self.functor.mask_len() {
            return Err(ResampleError::StackShape(format!(
                "mask carries {} layers, expected {}",
                mask_components,
                self.functor.mask_len()
            )));
        }

        let mut output = Array3::from_elem(
            (rows, cols, self.functor.output_len()),
            self.functor.fill_value(),
        );
        let metrics = MetricsRecorder::new();

        match self.threads {
            Some(threads) => {
                let pool = ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()
                    .map_err(|err| ResampleError::ThreadPool(err.to_string()))?;
                pool.install(|| self.fill_rows(&values, &mask, &mut output, &metrics));
            }
            None => self.fill_rows(&values, &mask, &mut output, &metrics),
        }

        let counts = metrics.snapshot();
        self.logger.record(&format!(
            "{}x{} pixels -> {} bands; no-data {}, copied {}, exact {}, interpolated {}",
            rows,
            cols,
            self.functor.output_len(),
            counts.no_data,
            counts.copied_before + counts.copied_after,
            counts.exact,
            counts.interpolated
        ));
        Ok((output, counts))
    }

    fn fill_rows<T, M>(
        &self,
        values: &ArrayView3<T>,
        mask: &ArrayView3<M>,
        output: &mut Array3<T>,
        metrics: &MetricsRecorder,
    ) where
        F: PixelFunctor<T, M>,
        T: Copy + Send + Sync,
        M: Copy + Send + Sync,
    {
        output
            .axis_iter_mut(Axis(0))
            .into_par_iter()
            .zip(values.axis_iter(Axis(0)).into_par_iter())
            .zip(mask.axis_iter(Axis(0)).into_par_iter())
            .for_each(|((out_row, value_row), mask_row)| {
                let counts = self.fill_row(out_row, value_row, mask_row);
                metrics.record(&counts);
            });
    }

    fn fill_row<T, M>(
        &self,
        mut out_row: ArrayViewMut2<T>,
        value_row: ArrayView2<T>,
        mask_row: ArrayView2<M>,
    ) -> FillCounts
    where
        F: PixelFunctor<T, M>,
        T: Copy,
        M: Copy,
    {
        let mut counts = FillCounts::default();
        // used only when a lane is not contiguous in memory
        let mut pixel_buf: Vec<T> = Vec::new();
        let mut mask_buf: Vec<M> = Vec::new();
        let mut out_buf: Vec<T> = Vec::new();

        for ((mut out_px, px), px_mask) in out_row
            .outer_iter_mut()
            .zip(value_row.outer_iter())
            .zip(mask_row.outer_iter())
        {
            let pixel = match px.as_slice() {
                Some(slice) => slice,
                None => {
                    pixel_buf.clear();
                    pixel_buf.extend(px.iter().copied());
                    &pixel_buf[..]
                }
            };
            let pixel_mask = match px_mask.as_slice() {
                Some(slice) => slice,
                None => {
                    mask_buf.clear();
                    mask_buf.extend(px_mask.iter().copied());
                    &mask_buf[..]
                }
            };

            match out_px.as_slice_mut() {
                Some(target) => self
                    .functor
                    .apply_into(pixel, pixel_mask, target, &mut counts),
                None => {
                    out_buf.clear();
                    out_buf.resize(out_px.len(), self.functor.fill_value());
                    self.functor
                        .apply_into(pixel, pixel_mask, &mut out_buf, &mut counts);
                    out_px.assign(&ArrayView1::from(&out_buf[..]));
                }
            }
        }

        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::gapfill::{GapFillTransform, RadiusPolicy, NO_DATA_VALUE};
    use crate::sensor::{RunConfig, SensorConfig};

    fn transform() -> GapFillTransform {
        let config = RunConfig::new(
            vec![SensorConfig::new("SENTINEL", vec![0, 10], vec![0, 5, 10])],
            1,
            20,
        );
        GapFillTransform::with_policy(config, RadiusPolicy::Configured).unwrap()
    }

    fn scene() -> (Array3<f32>, Array3<u8>) {
        // pixel (r, c) ramps from r*10 to r*10 + c over days 0..10
        let values = Array3::from_shape_fn((2, 3, 2), |(r, c, d)| {
            (r * 10) as f32 + if d == 0 { 0.0 } else { c as f32 }
        });
        let mut mask = Array3::zeros((2, 3, 2));
        mask[[1, 2, 0]] = 1u8;
        mask[[1, 2, 1]] = 1u8;
        mask[[0, 1, 0]] = 1u8;
        (values, mask)
    }

    #[test]
    fn processes_every_pixel_of_the_stack() {
        let (values, mask) = scene();
        let processor = StackProcessor::new(transform());
        let (output, counts) = processor.process(values.view(), mask.view()).unwrap();

        assert_eq!(processor.functor().output_band_count(), 3);
        assert_eq!(output.dim(), (2, 3, 3));
        assert_eq!(output[[0, 2, 1]], 1.0);
        assert_eq!(output[[1, 0, 1]], 10.0);
        // day 0 masked: both edges copy day 10
        assert_eq!(output[[0, 1, 0]], 1.0);
        assert_eq!(output[[0, 1, 1]], 1.0);
        assert!(output
            .slice(ndarray::s![1, 2, ..])
            .iter()
            .all(|&v| v == NO_DATA_VALUE as f32));

        assert_eq!(counts.pixels, 6);
        assert_eq!(counts.dates(), 18);
        assert_eq!(counts.no_data, 3);
    }

    #[test]
    fn dedicated_pool_matches_global_pool() {
        let (values, mask) = scene();
        let global = StackProcessor::new(transform())
            .process(values.view(), mask.view())
            .unwrap();
        let pooled = StackProcessor::new(transform())
            .with_threads(2)
            .process(values.view(), mask.view())
            .unwrap();
        assert_eq!(global.0, pooled.0);
        assert_eq!(global.1, pooled.1);
    }

    #[test]
    fn strided_lanes_give_the_same_result() {
        let (values, mask) = scene();
        let planar_values = values.view().permuted_axes([2, 0, 1]).to_owned();
        let planar_mask = mask.view().permuted_axes([2, 0, 1]).to_owned();
        let strided_values = planar_values.view().permuted_axes([1, 2, 0]);
        let strided_mask = planar_mask.view().permuted_axes([1, 2, 0]);

        let processor = StackProcessor::new(transform());
        let (expected, _) = processor.process(values.view(), mask.view()).unwrap();
        let (output, _) = processor.process(strided_values, strided_mask).unwrap();
        assert_eq!(output, expected);
    }

    #[test]
    fn rejects_misaligned_stacks() {
        let (values, mask) = scene();
        let processor = StackProcessor::new(transform());

        let short_mask = Array3::<u8>::zeros((2, 2, 2));
        assert!(matches!(
            processor.process(values.view(), short_mask.view()),
            Err(ResampleError::StackShape(_))
        ));

        let extra_band = Array3::<f32>::zeros((2, 3, 3));
        assert!(matches!(
            processor.process(extra_band.view(), mask.view()),
            Err(ResampleError::StackShape(_))
        ));

        let extra_layer = Array3::<u8>::zeros((2, 3, 3));
        assert!(matches!(
            processor.process(values.view(), extra_layer.view()),
            Err(ResampleError::StackShape(_))
        ));
    }
}
