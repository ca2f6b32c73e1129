//! Backing-store polymorphism: archive, directory, or null placeholder
//!
//! All downstream code depends only on the [`Backing`] trait; the concrete
//! store is selected once when the distribution is opened. Handles are not
//! safe for concurrent entry extraction, which is why the read coordinator
//! serializes every access.

use crate::error::{DistError, Result};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::debug;
use zip::result::ZipError;
use zip::ZipArchive;

/// An opened file within a backing store: a raw byte reader plus the
/// declared (uncompressed) size
pub(crate) struct ByteSource<'a> {
    pub reader: Box<dyn Read + 'a>,
    pub size: u64,
}

/// One backing store's ability to serve named files as byte streams
///
/// EOF is the usual zero-length read; I/O errors are distinct. No line
/// buffering happens here, only byte delivery.
pub(crate) trait Backing: Send {
    /// Declared size of a named file, or `ResourceNotFound`
    fn stat(&mut self, name: &str) -> Result<u64>;

    /// Open a named file for reading
    fn open(&mut self, name: &str) -> Result<ByteSource<'_>>;

    /// Extract every file entry into `dest` (archives only)
    fn extract_all(&mut self, dest: &Path) -> Result<()>;

    /// Short tag for logging
    fn kind(&self) -> &'static str;
}

/// ZIP archive backing; entries are decompressed on the fly per chunk
pub(crate) struct ArchiveBacking {
    archive: ZipArchive<BufReader<File>>,
}

impl ArchiveBacking {
    pub(crate) fn open_path(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let archive = ZipArchive::new(BufReader::new(file))?;
        Ok(Self { archive })
    }
}

impl Backing for ArchiveBacking {
    fn stat(&mut self, name: &str) -> Result<u64> {
        match self.archive.by_name(name) {
            Ok(entry) => Ok(entry.size()),
            Err(ZipError::FileNotFound) => Err(DistError::ResourceNotFound(name.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    fn open(&mut self, name: &str) -> Result<ByteSource<'_>> {
        match self.archive.by_name(name) {
            Ok(entry) => Ok(ByteSource {
                size: entry.size(),
                reader: Box::new(entry),
            }),
            Err(ZipError::FileNotFound) => Err(DistError::ResourceNotFound(name.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    fn extract_all(&mut self, dest: &Path) -> Result<()> {
        for index in 0..self.archive.len() {
            let mut entry = self.archive.by_index(index)?;
            if entry.is_dir() {
                continue;
            }
            let Some(relative) = entry.enclosed_name().map(Path::to_path_buf) else {
                debug!(entry = entry.name(), "skipping entry with unsafe path");
                continue;
            };
            let target = dest.join(relative);
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let mut out = File::create(&target)?;
            std::io::copy(&mut entry, &mut out)?;
        }
        debug!(entries = self.archive.len(), dest = %dest.display(), "archive extracted");
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "archive"
    }
}

/// Plain-directory backing; raw file reads under a root
pub(crate) struct DirectoryBacking {
    root: PathBuf,
}

impl DirectoryBacking {
    pub(crate) fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, name: &str) -> Result<PathBuf> {
        let path = self.root.join(name);
        if path.is_file() {
            Ok(path)
        } else {
            Err(DistError::ResourceNotFound(name.to_string()))
        }
    }
}

impl Backing for DirectoryBacking {
    fn stat(&mut self, name: &str) -> Result<u64> {
        let path = self.resolve(name)?;
        Ok(std::fs::metadata(path)?.len())
    }

    fn open(&mut self, name: &str) -> Result<ByteSource<'_>> {
        let path = self.resolve(name)?;
        let size = std::fs::metadata(&path)?.len();
        Ok(ByteSource {
            reader: Box::new(File::open(path)?),
            size,
        })
    }

    fn extract_all(&mut self, _dest: &Path) -> Result<()> {
        // Directory backings are already on disk; nothing to extract.
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "directory"
    }
}

/// Placeholder backing used before any real distribution is attached
pub(crate) struct NullBacking;

impl Backing for NullBacking {
    fn stat(&mut self, _name: &str) -> Result<u64> {
        Err(DistError::NullDistribution)
    }

    fn open(&mut self, _name: &str) -> Result<ByteSource<'_>> {
        Err(DistError::NullDistribution)
    }

    fn extract_all(&mut self, _dest: &Path) -> Result<()> {
        Err(DistError::NullDistribution)
    }

    fn kind(&self) -> &'static str {
        "null"
    }
}
