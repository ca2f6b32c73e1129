//! Chunk-to-line reconstruction
//!
//! `LineSplitter` turns an arbitrary chunk stream into complete logical
//! lines; `LineReader` drives it from any `std::io::Read`. This is the one
//! canonical line-producing primitive: both coordinator APIs (blocking
//! callback and async stream) are thin adapters over `LineReader`.
//!
//! Delimiters are CRLF or bare LF; real distributions mix both. A delimiter
//! at buffer position zero emits a zero-length line, so the number of lines
//! always equals the number of delimiters (plus one if the file ends with
//! unterminated data).

use std::io::Read;

/// Default chunk size pulled from the backing store per read
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Default ceiling before a delimiter-less buffer is force-emitted
pub const DEFAULT_MAX_LINE: usize = 1024 * 1024;

/// Tunables for a line read
///
/// Smaller chunk sizes trade CPU for lower peak memory; useful for very
/// large archive entries.
#[derive(Debug, Clone, Copy)]
pub struct ReaderConfig {
    /// Bytes requested from the backing store per chunk
    pub chunk_size: usize,
    /// Buffer ceiling before the overflow valve force-emits (see below)
    pub max_line: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_line: DEFAULT_MAX_LINE,
        }
    }
}

/// Reassembles delimiter-terminated lines from arbitrary chunks
///
/// Push chunks with [`push`](Self::push), then drain complete lines with
/// [`next_line`](Self::next_line) until it returns `None`; call
/// [`finish`](Self::finish) once at end of input to flush an unterminated
/// tail.
///
/// If the internal buffer reaches `max_line` without a delimiter, the whole
/// buffer is force-emitted as one line and counted in
/// [`oversized_lines`](Self::oversized_lines). This bounds memory on
/// malformed input; the read continues afterwards.
#[derive(Debug)]
pub struct LineSplitter {
    buf: Vec<u8>,
    // Bytes of `buf` already searched without finding a delimiter.
    scanned: usize,
    max_line: usize,
    oversized: u64,
}

impl LineSplitter {
    pub fn new(max_line: usize) -> Self {
        Self {
            buf: Vec::new(),
            scanned: 0,
            max_line,
            oversized: 0,
        }
    }

    /// Append one chunk of raw bytes
    pub fn push(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    /// Pop the next complete line, without its delimiter
    ///
    /// Returns `None` when the buffered bytes hold no complete line; push
    /// another chunk and retry.
    pub fn next_line(&mut self) -> Option<Vec<u8>> {
        if let Some(pos) = self.buf[self.scanned..].iter().position(|&b| b == b'\n') {
            let nl = self.scanned + pos;
            let mut end = nl;
            if end > 0 && self.buf[end - 1] == b'\r' {
                end -= 1;
            }
            let line = self.buf[..end].to_vec();
            self.buf.drain(..=nl);
            self.scanned = 0;
            return Some(line);
        }

        self.scanned = self.buf.len();

        if self.buf.len() >= self.max_line {
            // Overflow valve: no delimiter within the ceiling.
            self.oversized += 1;
            self.scanned = 0;
            return Some(std::mem::take(&mut self.buf));
        }

        None
    }

    /// Flush the final unterminated line at end of input, if any
    pub fn finish(&mut self) -> Option<Vec<u8>> {
        if self.buf.is_empty() {
            None
        } else {
            self.scanned = 0;
            Some(std::mem::take(&mut self.buf))
        }
    }

    /// Number of times the overflow valve fired
    pub fn oversized_lines(&self) -> u64 {
        self.oversized
    }
}

/// Iterator over the lines of a byte source
///
/// Pulls chunks lazily: the next chunk is requested only once every complete
/// line of the previous chunk has been yielded, so the reader never runs
/// more than one chunk ahead of its consumer.
pub struct LineReader<R: Read> {
    src: R,
    splitter: LineSplitter,
    chunk: Vec<u8>,
    eof: bool,
    failed: bool,
}

impl<R: Read> LineReader<R> {
    pub fn new(src: R) -> Self {
        Self::with_config(src, ReaderConfig::default())
    }

    pub fn with_config(src: R, config: ReaderConfig) -> Self {
        Self {
            src,
            splitter: LineSplitter::new(config.max_line.max(1)),
            chunk: vec![0u8; config.chunk_size.max(1)],
            eof: false,
            failed: false,
        }
    }

    /// Number of times the overflow valve fired so far
    pub fn oversized_lines(&self) -> u64 {
        self.splitter.oversized_lines()
    }
}

impl<R: Read> Iterator for LineReader<R> {
    type Item = std::io::Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            if let Some(line) = self.splitter.next_line() {
                return Some(Ok(line));
            }
            if self.eof {
                return self.splitter.finish().map(Ok);
            }
            match self.src.read(&mut self.chunk) {
                Ok(0) => self.eof = true,
                Ok(n) => self.splitter.push(&self.chunk[..n]),
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e));
                },
            }
        }
    }
}
