//! Core traits and the fixed-batch splitting algorithm for sequential sources
//!
//! This crate turns a strictly sequential, pull-based data source into a
//! sequence that can be divided into independent prefix batches. A driver
//! keeps fetching on one thread and hands the batches to other workers, so
//! the processing of already-fetched elements runs in parallel while the
//! fetching itself stays sequential.

#![warn(missing_docs)]

pub mod batch;
pub mod characteristics;
pub mod config;
pub mod error;
pub mod sequence;
pub mod sink;
pub mod source;
pub mod stream;

// Re-export key types for convenience
pub use batch::Batch;
pub use characteristics::Characteristics;
pub use config::SplitConfig;
pub use error::{Error, Result};
pub use sequence::{
    Advance, BatchSplittable, Closeable, Comparator, SizeEstimate, Splittable,
    DEFAULT_BATCH_SIZE,
};
pub use sink::{CollectingSink, Sink};
pub use source::{Cursor, PullSequence, PullSource};
pub use stream::SequenceStream;
