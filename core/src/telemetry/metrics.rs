use std::sync::Mutex;

use crate::processing::gapfill::FillCounts;

/// Shared accumulator for fill outcomes. Workers merge a local tally once per row.
pub struct MetricsRecorder {
    inner: Mutex<FillCounts>,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(FillCounts::default()),
        }
    }

    pub fn record(&self, counts: &FillCounts) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.merge(counts);
        }
    }

    pub fn snapshot(&self) -> FillCounts {
        if let Ok(metrics) = self.inner.lock() {
            *metrics
        } else {
            FillCounts::default()
        }
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}
