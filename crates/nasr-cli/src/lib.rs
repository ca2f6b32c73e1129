//! NASR CLI Library
//!
//! Command implementations behind the `nasr` binary: parse record types out
//! of a distribution, print its cycle date, verify an archive checksum.

pub mod commands;
pub mod error;
pub mod progress;

pub use error::{CliError, Result};
