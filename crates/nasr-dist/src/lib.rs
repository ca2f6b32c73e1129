//! NASR Distribution Reading Engine
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Streaming reader and record assembler for the periodically published
//! NASR dataset: a large collection of related text files delivered as a
//! ZIP archive or a plain directory, in a fixed-width or CSV layout.
//!
//! # Overview
//!
//! - [`Distribution`]: the root handle for one dataset snapshot
//! - [`ReadCoordinator`]: serialized, progress-reporting access to the
//!   snapshot's single backing handle, as a blocking callback or an async
//!   line stream
//! - [`ParseCoordinator`]: assembles one record type by merging rows from
//!   the registry's ordered file list into keyed composite records
//! - [`DataStore`]: the immutable sink for finished record sets
//!
//! # Example
//!
//! ```no_run
//! use nasr_dist::{DataStore, Distribution, LayoutFormat, ParseCoordinator, RecordType};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> nasr_dist::Result<()> {
//!     let dist = Arc::new(Distribution::open_archive(
//!         "28DaySubscription.zip",
//!         LayoutFormat::FixedWidth,
//!     )?);
//!     let store = DataStore::new();
//!
//!     let mut parse = ParseCoordinator::new(Arc::clone(&dist), RecordType::Airport);
//!     let report = parse.run(&store).await?;
//!     println!("{} airports", report.records);
//!     Ok(())
//! }
//! ```

pub mod cycle;
pub mod distribution;
pub mod error;
pub mod parse;
pub mod reader;
pub mod records;
pub mod registry;
pub mod store;

// Re-export the engine's public surface
pub use cycle::Cycle;
pub use distribution::{detect_format, Distribution, LayoutFormat};
pub use error::{DecodeError, DistError, Result};
pub use parse::{ParseCoordinator, ParseReport, ParseState};
pub use reader::lines::{LineReader, LineSplitter, ReaderConfig};
pub use reader::progress::ReadProgress;
pub use reader::{LineStream, ReadCoordinator, ReadStats};
pub use records::decoder::{RawRow, RowDecoder};
pub use records::{CompositeRecord, Fragment, RecordKey, RecordSet};
pub use registry::{spec_for, RecordType, RecordTypeSpec, RowPolicy};
pub use store::DataStore;
