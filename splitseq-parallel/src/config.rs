//! Driver configuration

use serde::{Deserialize, Serialize};
use splitseq_core::{Error, Result};

/// Configuration for a [`Driver`](crate::Driver)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Number of worker threads
    pub worker_threads: usize,

    /// Hand batches to the worker pool; `false` traverses on the caller
    pub parallel: bool,

    /// Prefix of worker thread names
    pub thread_name_prefix: String,

    /// Batches fetched ahead per worker before fetching waits for a result
    pub batches_per_worker: usize,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            worker_threads: num_cpus::get(),
            parallel: true,
            thread_name_prefix: "splitseq-worker".into(),
            batches_per_worker: 2,
        }
    }
}

impl DriverConfig {
    /// A parallel configuration with `worker_threads` workers
    pub fn with_workers(worker_threads: usize) -> Self {
        Self {
            worker_threads,
            ..Self::default()
        }
    }

    /// A configuration that never leaves the calling thread
    pub fn sequential() -> Self {
        Self {
            worker_threads: 1,
            parallel: false,
            ..Self::default()
        }
    }

    /// Most batches handed to the pool and not yet finished
    pub fn max_in_flight(&self) -> usize {
        self.worker_threads.saturating_mul(self.batches_per_worker)
    }

    /// Parse and validate a configuration from JSON
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the configuration can be used
    pub fn validate(&self) -> Result<()> {
        if self.worker_threads == 0 {
            return Err(Error::InvalidArgument(
                "Worker thread count must be greater than 0".into(),
            ));
        }
        if self.batches_per_worker == 0 {
            return Err(Error::InvalidArgument(
                "Batches per worker must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}
