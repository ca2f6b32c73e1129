//! Byte-level read progress, safe to poll from any thread

use std::io::Read;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Progress of the current file-read operation
///
/// `consumed` rises monotonically within one read and never exceeds the
/// file's declared total. Only the read coordinator writes it; everyone else
/// is a reader.
#[derive(Debug, Default)]
pub struct ReadProgress {
    consumed: AtomicU64,
    total: AtomicU64,
}

impl ReadProgress {
    /// Reset for a new file-read operation with the declared total size
    pub(crate) fn begin(&self, total: u64) {
        self.total.store(total, Ordering::Release);
        self.consumed.store(0, Ordering::Release);
    }

    /// Record `n` more bytes consumed, clamped to the declared total
    pub(crate) fn advance(&self, n: u64) {
        let total = self.total.load(Ordering::Acquire);
        let prev = self.consumed.fetch_add(n, Ordering::AcqRel);
        // Single writer per read operation, so the clamp cannot race another
        // advance.
        if prev + n > total {
            self.consumed.store(total, Ordering::Release);
        }
    }

    /// Bytes consumed so far in the current read
    pub fn consumed(&self) -> u64 {
        self.consumed.load(Ordering::Acquire)
    }

    /// Declared total size of the file being read
    pub fn total(&self) -> u64 {
        self.total.load(Ordering::Acquire)
    }

    /// Completion in `0.0..=1.0`; `1.0` for an empty file
    pub fn fraction(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            1.0
        } else {
            self.consumed() as f64 / total as f64
        }
    }
}

/// `Read` wrapper that reports consumed bytes to a shared [`ReadProgress`]
pub(crate) struct CountingReader<R> {
    inner: R,
    progress: Arc<ReadProgress>,
}

impl<R: Read> CountingReader<R> {
    pub(crate) fn new(inner: R, progress: Arc<ReadProgress>) -> Self {
        Self { inner, progress }
    }
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.progress.advance(n as u64);
        Ok(n)
    }
}
