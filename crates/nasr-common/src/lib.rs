//! NASR Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared error handling, logging bootstrap, and checksum utilities for the
//! NASR workspace crates.
//!
//! # Overview
//!
//! - **Error Handling**: the base error type shared by the tooling crates
//! - **Logging**: `tracing` subscriber configuration and initialization
//! - **Checksums**: integrity verification for downloaded distribution archives
//!
//! # Example
//!
//! ```no_run
//! use nasr_common::{Result, checksum};
//! use nasr_common::checksum::ChecksumAlgorithm;
//!
//! fn verify_archive(path: &str, expected: &str) -> Result<()> {
//!     checksum::verify_file_checksum(path, expected, ChecksumAlgorithm::Sha256)?;
//!     Ok(())
//! }
//! ```

pub mod checksum;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use error::{NasrError, Result};
