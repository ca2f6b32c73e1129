//! Error types for the NASR CLI
//!
//! User-facing errors with actionable messages.

use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Comprehensive error type for CLI operations
#[derive(Error, Debug)]
pub enum CliError {
    /// The reading engine failed
    #[error("{0}")]
    Dist(#[from] nasr_dist::DistError),

    /// A shared utility failed (checksum, parsing)
    #[error("{0}")]
    Common(#[from] nasr_common::NasrError),

    /// File system operation failed
    #[error("File operation failed: {0}. Check the path and read permissions.")]
    Io(#[from] std::io::Error),

    /// JSON output failed to serialize
    #[error("Failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),

    /// A parse task panicked or was aborted
    #[error("Parse task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    /// The given path is neither an archive nor a directory
    #[error("Path not found: '{0}'. Provide a distribution archive (.zip) or an extracted directory.")]
    BadPath(String),
}
