//! Error types for distribution reading and record assembly
//!
//! `DistError` covers the engine's own failures; `DecodeError` is the typed
//! error a per-file row decoder raises. Whether a `DecodeError` aborts the
//! parse or is skipped and counted is decided by the registry's per-file
//! policy, never by the decoder itself.

use crate::records::RecordKey;
use thiserror::Error;

/// Result type alias for distribution operations
pub type Result<T> = std::result::Result<T, DistError>;

/// Error type for the distribution-reading engine
#[derive(Error, Debug)]
pub enum DistError {
    /// Requested file absent from the backing store
    #[error("File not found in distribution: '{0}'. Check the distribution format matches its layout.")]
    ResourceNotFound(String),

    /// Underlying filesystem error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP container error
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// CSV layer error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Operation attempted on the empty placeholder distribution
    #[error("No distribution loaded: this is a null placeholder with no contents")]
    NullDistribution,

    /// No cycle date could be located for this distribution
    #[error("No effective cycle date found in distribution")]
    CycleNotFound,

    /// A parse coordinator was driven out of order
    #[error("Parse of {record_type} already {state}; a coordinator runs exactly once")]
    InvalidState {
        record_type: &'static str,
        state: &'static str,
    },

    /// A row decoder failed under the fail-fast policy
    #[error("Decoding '{file}' aborted by fail-fast policy: {source}")]
    Decode {
        file: String,
        #[source]
        source: DecodeError,
    },

    /// The background read task died without delivering a result
    #[error("Background read task failed: {0}")]
    Task(String),
}

/// Typed error raised by a per-file row decoder
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("missing required field '{field}'")]
    MissingField { field: String },

    #[error("invalid value '{value}' for field '{field}'")]
    InvalidValue { field: String, value: String },

    #[error("truncated row: need {expected} bytes/columns, got {actual}")]
    TruncatedRow { expected: usize, actual: usize },

    #[error("unrecognized row code '{code}'")]
    UnrecognizedRow { code: String },

    #[error("row references unknown parent record {parent}")]
    UnknownParentRecord { parent: RecordKey },
}
