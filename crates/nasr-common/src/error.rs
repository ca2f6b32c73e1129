//! Error types shared across the NASR workspace

use thiserror::Error;

/// Result type alias for common NASR operations
pub type Result<T> = std::result::Result<T, NasrError>;

/// Base error type for the shared utilities
#[derive(Error, Debug)]
pub enum NasrError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(String),
}
