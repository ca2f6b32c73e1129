//! Progress bar utilities for CLI operations
//!
//! Renders the read coordinator's byte-progress side-channel while a
//! distribution is being parsed.

use indicatif::{ProgressBar, ProgressStyle};
use nasr_dist::ReadProgress;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Create a progress bar for a distribution read
pub fn create_read_progress(message: &str) -> ProgressBar {
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg}\n{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {bytes}/{total_bytes}")
            .expect("Invalid progress bar template")
            .progress_chars("#>-"),
    );
    pb.set_message(message.to_string());
    pb
}

/// Mirror `progress` onto `bar` until the returned task is aborted
///
/// The coordinator resets the side-channel per file, so the bar tracks
/// whichever file currently holds the read lock.
pub fn spawn_ticker(bar: ProgressBar, progress: Arc<ReadProgress>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(100));
        loop {
            interval.tick().await;
            bar.set_length(progress.total());
            bar.set_position(progress.consumed());
        }
    })
}

/// Format bytes into human-readable string
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    if unit_idx == 0 {
        format!("{} {}", size as u64, UNITS[unit_idx])
    } else {
        format!("{:.2} {}", size, UNITS[unit_idx])
    }
}
