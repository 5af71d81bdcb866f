//! Error types for heartfile
//!
//! Only construction and configuration can fail with these. The liveness path
//! itself (`Heart::beat`, scheduler ticks) never returns errors; it reports
//! failures through `tracing` warnings instead.

use thiserror::Error;

/// The primary error type for heartfile operations.
#[derive(Error, Debug)]
pub enum HeartError {
    /// Configuration-related errors (invalid values, unreadable config file, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Standard I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A Heart was built outside of a tokio runtime
    #[error("No tokio runtime available to drive heartbeats")]
    NoRuntime,
}

/// A specialized `Result` type for heartfile operations.
pub type Result<T> = std::result::Result<T, HeartError>;
