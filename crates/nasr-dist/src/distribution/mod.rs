//! Distribution handles: one snapshot of the published dataset
//!
//! A [`Distribution`] is constructed once per snapshot and never mutated
//! afterwards; the cycle date and the CSV scratch extraction are lazy,
//! computed at most once. All file access goes through the distribution's
//! [`ReadCoordinator`].

pub(crate) mod backing;

use crate::cycle::{self, Cycle};
use crate::error::{DistError, Result};
use crate::reader::lines::ReaderConfig;
use crate::reader::ReadCoordinator;
use backing::{ArchiveBacking, Backing, DirectoryBacking, NullBacking};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::{Mutex, OnceCell};
use tokio::task;
use tracing::info;

/// Textual layout of a distribution's record files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutFormat {
    /// One record per line, each field in a constant column range
    FixedWidth,
    /// Comma-separated files with a header row naming columns
    Csv,
}

impl std::fmt::Display for LayoutFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LayoutFormat::FixedWidth => write!(f, "fixed-width"),
            LayoutFormat::Csv => write!(f, "csv"),
        }
    }
}

impl std::str::FromStr for LayoutFormat {
    type Err = nasr_common::NasrError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fixed" | "fixed-width" | "txt" => Ok(LayoutFormat::FixedWidth),
            "csv" => Ok(LayoutFormat::Csv),
            other => Err(nasr_common::NasrError::Parse(format!(
                "unknown layout format '{other}'"
            ))),
        }
    }
}

/// Where a distribution's bytes live
#[derive(Debug, Clone)]
enum Location {
    Archive(PathBuf),
    Directory(PathBuf),
    Null,
}

impl Location {
    /// Base name used for display and for the CSV cycle token
    fn name(&self) -> String {
        match self {
            Location::Archive(p) | Location::Directory(p) => p
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            Location::Null => "(null)".to_string(),
        }
    }
}

/// Root handle for one dataset snapshot
pub struct Distribution {
    format: LayoutFormat,
    location: Location,
    backing: Arc<Mutex<Box<dyn Backing>>>,
    reader: ReadCoordinator,
    cycle: OnceCell<Cycle>,
    // Scratch directory holding an archived CSV distribution's extracted
    // files; populated at most once per distribution.
    scratch: OnceCell<TempDir>,
}

impl Distribution {
    /// Open a ZIP-compressed distribution archive
    pub fn open_archive(path: impl Into<PathBuf>, format: LayoutFormat) -> Result<Self> {
        let path = path.into();
        let backing = ArchiveBacking::open_path(&path)?;
        info!(path = %path.display(), %format, "opened archive distribution");
        Ok(Self::assemble(format, Location::Archive(path), Box::new(backing)))
    }

    /// Open a distribution that has already been decompressed to a directory
    pub fn open_directory(path: impl Into<PathBuf>, format: LayoutFormat) -> Result<Self> {
        let path = path.into();
        if !path.is_dir() {
            return Err(DistError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("distribution directory not found: {}", path.display()),
            )));
        }
        info!(path = %path.display(), %format, "opened directory distribution");
        Ok(Self::assemble(
            format,
            Location::Directory(path.clone()),
            Box::new(DirectoryBacking::new(path)),
        ))
    }

    /// The empty placeholder distribution; every read fails with
    /// [`DistError::NullDistribution`]
    pub fn null() -> Self {
        Self::assemble(LayoutFormat::FixedWidth, Location::Null, Box::new(NullBacking))
    }

    fn assemble(format: LayoutFormat, location: Location, backing: Box<dyn Backing>) -> Self {
        let backing = Arc::new(Mutex::new(backing));
        let reader = ReadCoordinator::new(Arc::clone(&backing), ReaderConfig::default());
        Self {
            format,
            location,
            backing,
            reader,
            cycle: OnceCell::new(),
            scratch: OnceCell::new(),
        }
    }

    /// Tune chunk size and overflow ceiling for subsequent reads
    pub fn with_reader_config(mut self, config: ReaderConfig) -> Self {
        self.reader = ReadCoordinator::new(Arc::clone(&self.backing), config);
        self
    }

    pub fn format(&self) -> LayoutFormat {
        self.format
    }

    /// Base name of the archive or directory this distribution came from
    pub fn location_name(&self) -> String {
        self.location.name()
    }

    /// The coordinator serializing access to this distribution's handle
    pub fn reader(&self) -> &ReadCoordinator {
        &self.reader
    }

    /// Effective cycle date of this snapshot, parsed at most once
    pub async fn cycle(&self) -> Result<Cycle> {
        self.cycle
            .get_or_try_init(|| cycle::resolve(self))
            .await
            .map(|cycle| *cycle)
    }

    /// Resolve the concrete backing before parsing begins
    ///
    /// A CSV distribution delivered as a single archive is extracted to a
    /// scratch directory exactly once per distribution; afterwards the live
    /// backing is that directory. Every other combination is already
    /// readable in place.
    pub(crate) async fn prepare(&self) -> Result<()> {
        if self.format != LayoutFormat::Csv || !matches!(self.location, Location::Archive(_)) {
            return Ok(());
        }
        self.scratch
            .get_or_try_init(|| async {
                let guard = Arc::clone(&self.backing).lock_owned().await;
                task::spawn_blocking(move || {
                    let mut guard = guard;
                    let scratch = tempfile::tempdir()?;
                    guard.extract_all(scratch.path())?;
                    *guard = Box::new(DirectoryBacking::new(scratch.path()));
                    info!(dest = %scratch.path().display(), "archived CSV distribution extracted to scratch");
                    Ok::<_, DistError>(scratch)
                })
                .await
                .map_err(|e| DistError::Task(e.to_string()))?
            })
            .await?;
        Ok(())
    }
}

impl std::fmt::Debug for Distribution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Distribution")
            .field("format", &self.format)
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

/// Guess the layout format from a distribution's path
///
/// CSV snapshots are published under names carrying a `CSV` marker (e.g.
/// `28_Dec_2023_CSV.zip`); anything else is assumed fixed-width.
pub fn detect_format(path: &Path) -> LayoutFormat {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_uppercase())
        .unwrap_or_default();
    if name.contains("CSV") {
        LayoutFormat::Csv
    } else {
        LayoutFormat::FixedWidth
    }
}
