//! Traversal statistics

use std::time::Duration;

/// Statistics from one traversal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DriveStats {
    /// Number of elements processed
    pub items: u64,

    /// Number of batches split off; zero for element-wise traversal
    pub batches: u64,

    /// Total traversal time
    pub elapsed: Duration,

    /// Whether the batches were processed on the worker pool
    pub parallel: bool,
}

impl DriveStats {
    /// Throughput over the whole traversal
    #[allow(clippy::cast_precision_loss)]
    pub fn items_per_sec(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.items as f64 / secs
        } else {
            0.0
        }
    }

    /// Mean batch length
    #[allow(clippy::cast_precision_loss)]
    pub fn mean_batch_len(&self) -> f64 {
        if self.batches == 0 {
            0.0
        } else {
            self.items as f64 / self.batches as f64
        }
    }
}
