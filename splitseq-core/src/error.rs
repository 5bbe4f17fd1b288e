//! Error types for splittable sequences

use std::io;
use thiserror::Error;

/// Result type for sequence operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for sequence operations
#[derive(Error, Debug)]
pub enum Error {
    /// IO error raised by an underlying source or cursor
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Operation called in a state where it has no meaning
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Produced value does not have the expected shape
    #[error("Data type mismatch: {0}")]
    TypeMismatch(String),

    /// Pull source asked for an element after it ran dry
    #[error("Source exhausted")]
    SourceExhausted,

    /// Configuration could not be parsed
    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),

    /// Sink refused or failed to consume a batch
    #[error("Sink error: {0}")]
    Sink(String),

    /// Driver could not be set up or failed during traversal
    #[error("Driver error: {0}")]
    Driver(String),
}
