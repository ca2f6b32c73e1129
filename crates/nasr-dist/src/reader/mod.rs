//! Serialized access to a distribution's live backing handle
//!
//! Archive and file handles are not safe for concurrent entry extraction,
//! so the [`ReadCoordinator`] is the only component allowed to touch one. It
//! guarantees at most one active read per distribution: every read acquires
//! the handle mutex and holds it until the read completes, fails, or is
//! cancelled. The lock is released on every exit path because it lives in a
//! guard.

pub mod lines;
pub mod progress;

use crate::distribution::backing::Backing;
use crate::error::{DistError, Result};
use lines::{LineReader, ReaderConfig};
use progress::{CountingReader, ReadProgress};
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio::sync::Mutex;
use tokio::task;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::Stream;
use tracing::{debug, warn};

/// Outcome counters for one completed file read
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadStats {
    /// Lines delivered to the consumer
    pub lines: u64,
    /// Times the splitter's overflow valve force-emitted a delimiter-less
    /// buffer
    pub oversized_lines: u64,
}

/// Owner of the single mutable backing handle of one distribution
pub struct ReadCoordinator {
    backing: Arc<Mutex<Box<dyn Backing>>>,
    config: ReaderConfig,
    progress: Arc<ReadProgress>,
}

impl ReadCoordinator {
    pub(crate) fn new(backing: Arc<Mutex<Box<dyn Backing>>>, config: ReaderConfig) -> Self {
        Self {
            backing,
            config,
            progress: Arc::new(ReadProgress::default()),
        }
    }

    /// Progress of the read currently holding the handle
    pub fn progress(&self) -> Arc<ReadProgress> {
        Arc::clone(&self.progress)
    }

    /// Stream a file's lines into `on_line` on the calling thread
    ///
    /// Blocks until the whole file has been read; the exclusivity lock is
    /// held for the duration and released on every exit path, including a
    /// callback error. Fails with [`DistError::ResourceNotFound`] if `path`
    /// is absent from the backing store.
    ///
    /// Must not be called from an async context; use
    /// [`stream_lines`](Self::stream_lines) there.
    pub fn read_lines<F>(&self, path: &str, mut on_line: F) -> Result<ReadStats>
    where
        F: FnMut(&[u8]) -> Result<()>,
    {
        let mut backing = self.backing.blocking_lock();
        debug!(path, kind = backing.kind(), "read (blocking)");

        let source = backing.open(path)?;
        self.progress.begin(source.size);
        let counted = CountingReader::new(source.reader, Arc::clone(&self.progress));
        let mut reader = LineReader::with_config(counted, self.config);

        let mut lines = 0u64;
        for line in &mut reader {
            on_line(&line?)?;
            lines += 1;
        }

        let stats = ReadStats {
            lines,
            oversized_lines: reader.oversized_lines(),
        };
        if stats.oversized_lines > 0 {
            warn!(path, count = stats.oversized_lines, "oversized lines force-emitted");
        }
        Ok(stats)
    }

    /// Stream a file's lines without blocking the consumer's scheduler
    ///
    /// Acquires the exclusivity lock, then runs the actual reading (and any
    /// decompression) on a blocking worker thread; lines arrive through a
    /// bounded channel so the producer never runs more than one chunk ahead
    /// of the consumer. Dropping the returned stream cancels the read: the
    /// producer notices on its next send, returns, and releases both the
    /// handle and the lock before any other caller can proceed.
    ///
    /// Fails with [`DistError::ResourceNotFound`] before any line is
    /// delivered if `path` is absent.
    pub async fn stream_lines(&self, path: &str) -> Result<LineStream> {
        let guard = Arc::clone(&self.backing).lock_owned().await;
        debug!(path, kind = guard.kind(), "read (stream)");

        // Probe for the entry while we already hold the lock so an absent
        // path fails here rather than as the stream's first item.
        let probe = path.to_string();
        let (mut guard, stat) = task::spawn_blocking(move || {
            let mut guard = guard;
            let stat = guard.stat(&probe);
            (guard, stat)
        })
        .await
        .map_err(|e| DistError::Task(e.to_string()))?;
        stat?;

        let (tx, rx) = mpsc::channel::<Result<Vec<u8>>>(1);
        let stats = Arc::new(StreamStatsInner::default());
        let worker_stats = Arc::clone(&stats);
        let progress = Arc::clone(&self.progress);
        let config = self.config;
        let path = path.to_string();

        task::spawn_blocking(move || {
            let outcome = (|| -> Result<()> {
                let source = guard.open(&path)?;
                progress.begin(source.size);
                let counted = CountingReader::new(source.reader, progress);
                let mut reader = LineReader::with_config(counted, config);

                while let Some(line) = reader.next() {
                    let line = line?;
                    if tx.blocking_send(Ok(line)).is_err() {
                        // Consumer cancelled; stop immediately.
                        return Ok(());
                    }
                    worker_stats.lines.fetch_add(1, Ordering::Relaxed);
                    worker_stats
                        .oversized
                        .store(reader.oversized_lines(), Ordering::Relaxed);
                }
                Ok(())
            })();

            if let Err(err) = outcome {
                let _ = tx.blocking_send(Err(err));
            }
            // `guard` drops here: handle closed, lock released.
        });

        Ok(LineStream {
            inner: ReceiverStream::new(rx),
            stats,
        })
    }
}

#[derive(Debug, Default)]
struct StreamStatsInner {
    lines: AtomicU64,
    oversized: AtomicU64,
}

/// Suspendable sequence of lines produced by
/// [`ReadCoordinator::stream_lines`]
///
/// Lines arrive strictly in file order, exactly once. Dropping the stream
/// mid-read cancels the underlying read and frees the distribution handle.
#[derive(Debug)]
pub struct LineStream {
    inner: ReceiverStream<Result<Vec<u8>>>,
    stats: Arc<StreamStatsInner>,
}

impl LineStream {
    /// Counters observed so far; final once the stream has ended
    pub fn stats(&self) -> ReadStats {
        ReadStats {
            lines: self.stats.lines.load(Ordering::Relaxed),
            oversized_lines: self.stats.oversized.load(Ordering::Relaxed),
        }
    }
}

impl Stream for LineStream {
    type Item = Result<Vec<u8>>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
