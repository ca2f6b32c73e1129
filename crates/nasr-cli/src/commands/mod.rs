//! Command implementations for the `nasr` binary

use crate::error::{CliError, Result};
use crate::progress;
use nasr_common::checksum::{self, ChecksumAlgorithm};
use nasr_dist::{
    detect_format, DataStore, Distribution, LayoutFormat, ParseCoordinator, ParseReport,
    RecordType,
};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Open a distribution from an archive file or an extracted directory
fn open_distribution(path: &Path, format: LayoutFormat) -> Result<Distribution> {
    if path.is_dir() {
        Ok(Distribution::open_directory(path, format)?)
    } else if path.is_file() {
        Ok(Distribution::open_archive(path, format)?)
    } else {
        Err(CliError::BadPath(path.display().to_string()))
    }
}

fn resolve_format(path: &Path, format: Option<LayoutFormat>) -> LayoutFormat {
    format.unwrap_or_else(|| {
        let detected = detect_format(path);
        debug!(%detected, "layout format detected from path");
        detected
    })
}

/// Parse record types from a distribution and report per-type counts
pub async fn parse(
    path: &Path,
    format: Option<LayoutFormat>,
    types: &[RecordType],
    json_output: bool,
    show_progress: bool,
) -> Result<()> {
    let format = resolve_format(path, format);
    let dist = Arc::new(open_distribution(path, format)?);
    let store = Arc::new(DataStore::new());

    let cycle = match dist.cycle().await {
        Ok(cycle) => {
            info!(%cycle, "distribution cycle");
            Some(cycle)
        },
        Err(err) => {
            debug!(%err, "no cycle date available");
            None
        },
    };

    let requested: Vec<RecordType> = if types.is_empty() {
        RecordType::all().to_vec()
    } else {
        types.to_vec()
    };

    let ticker = show_progress.then(|| {
        let bar = progress::create_read_progress("Reading distribution");
        (bar.clone(), progress::spawn_ticker(bar, dist.reader().progress()))
    });

    // One task per record type; their reads serialize on the shared handle,
    // decoding and merging run concurrently.
    let handles: Vec<_> = requested
        .iter()
        .map(|&record_type| {
            let dist = Arc::clone(&dist);
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                ParseCoordinator::new(dist, record_type).run(&store).await
            })
        })
        .collect();

    let mut reports: Vec<ParseReport> = Vec::with_capacity(handles.len());
    let mut first_error: Option<CliError> = None;
    for handle in handles {
        match handle.await? {
            Ok(report) => reports.push(report),
            Err(err) => first_error = first_error.or(Some(err.into())),
        }
    }

    if let Some((bar, ticker)) = ticker {
        ticker.abort();
        bar.finish_and_clear();
    }

    if let Some(err) = first_error {
        return Err(err);
    }

    if json_output {
        let mut records = serde_json::Map::new();
        for report in &reports {
            if let Some(set) = store.get(report.record_type).await {
                records.insert(report.record_type.to_string(), serde_json::to_value(&*set)?);
            }
        }
        let output = json!({
            "cycle": cycle.map(|c| c.to_string()),
            "reports": reports,
            "records": records,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        if let Some(cycle) = cycle {
            println!("effective date: {cycle}");
        }
        for report in &reports {
            print!("{}: {} records", report.record_type, report.records);
            if !report.skipped_rows.is_empty() {
                let detail: Vec<String> = report
                    .skipped_rows
                    .iter()
                    .map(|(file, count)| format!("{file}={count}"))
                    .collect();
                print!(" (skipped rows: {})", detail.join(", "));
            }
            if report.oversized_lines > 0 {
                print!(" (oversized lines: {})", report.oversized_lines);
            }
            println!();
        }
    }

    Ok(())
}

/// Print the effective cycle date of a distribution
pub async fn cycle(path: &Path, format: Option<LayoutFormat>) -> Result<()> {
    let format = resolve_format(path, format);
    let dist = open_distribution(path, format)?;
    let cycle = dist.cycle().await?;
    println!("{cycle}");
    Ok(())
}

/// Verify a downloaded archive against an expected checksum
pub async fn verify(path: &Path, digest: &str, algorithm: ChecksumAlgorithm) -> Result<()> {
    let size = std::fs::metadata(path)?.len();
    info!(path = %path.display(), size = %progress::format_bytes(size), %algorithm, "verifying archive");

    checksum::verify_file_checksum(path, digest, algorithm)?;
    println!("OK: {} {}", algorithm, digest.to_lowercase());
    Ok(())
}
