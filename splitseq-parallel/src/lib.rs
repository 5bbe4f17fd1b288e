//! Drivers for splittable sequences
//!
//! A [`Driver`] keeps fetching on the calling thread and processes the split
//! batches on a dedicated rayon pool.

pub mod config;
pub mod driver;
pub mod stats;

pub use config::DriverConfig;
pub use driver::Driver;
pub use stats::DriveStats;
