//! Cycle metadata: the effective date of a distribution snapshot
//!
//! Fixed-width distributions announce their cycle in a README line of the
//! shape `"AIS subscriber files effective date December 28, 2023."`; CSV
//! snapshots embed a `DD_Mon_YYYY` token in the archive or directory name.

use crate::distribution::{Distribution, LayoutFormat};
use crate::error::{DistError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tokio_stream::StreamExt;
use tracing::debug;

const README_FILE: &str = "README.txt";
const README_PREFIX: &str = "AIS subscriber files effective date ";

/// The effective date associated with a distribution snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cycle {
    pub effective: NaiveDate,
}

impl std::fmt::Display for Cycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.effective.format("%Y-%m-%d"))
    }
}

/// Resolve the cycle for a distribution, reading through its coordinator
pub(crate) async fn resolve(dist: &Distribution) -> Result<Cycle> {
    match dist.format() {
        LayoutFormat::FixedWidth => from_readme(dist).await,
        LayoutFormat::Csv => from_location_name(&dist.location_name()),
    }
}

async fn from_readme(dist: &Distribution) -> Result<Cycle> {
    let mut stream = dist.reader().stream_lines(README_FILE).await?;
    while let Some(line) = stream.next().await {
        let line = line?;
        let text = String::from_utf8_lossy(&line);
        if let Some(rest) = text.trim_start().strip_prefix(README_PREFIX) {
            let date_text = rest.trim().trim_end_matches('.');
            let effective = NaiveDate::parse_from_str(date_text, "%B %d, %Y")
                .map_err(|_| DistError::CycleNotFound)?;
            debug!(%effective, "cycle parsed from README");
            return Ok(Cycle { effective });
        }
    }
    Err(DistError::CycleNotFound)
}

/// Parse a `DD_Mon_YYYY` token out of an archive or directory name such as
/// `28_Dec_2023_CSV.zip`
fn from_location_name(name: &str) -> Result<Cycle> {
    let tokens: Vec<&str> = name
        .split(|c: char| c == '_' || c == '.' || c == '-' || c == ' ')
        .filter(|t| !t.is_empty())
        .collect();
    for window in tokens.windows(3) {
        let candidate = format!("{} {} {}", window[0], window[1], window[2]);
        if let Ok(effective) = NaiveDate::parse_from_str(&candidate, "%d %b %Y") {
            debug!(%effective, name, "cycle parsed from location name");
            return Ok(Cycle { effective });
        }
    }
    Err(DistError::CycleNotFound)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_from_csv_archive_name() {
        let cycle = from_location_name("28_Dec_2023_CSV.zip").unwrap();
        assert_eq!(cycle.effective, NaiveDate::from_ymd_opt(2023, 12, 28).unwrap());
    }

    #[test]
    fn test_cycle_from_csv_directory_name() {
        let cycle = from_location_name("08_Aug_2024").unwrap();
        assert_eq!(cycle.effective, NaiveDate::from_ymd_opt(2024, 8, 8).unwrap());
    }

    #[test]
    fn test_cycle_missing_from_name() {
        assert!(matches!(
            from_location_name("subscription_current.zip"),
            Err(DistError::CycleNotFound)
        ));
    }

    #[tokio::test]
    async fn test_cycle_from_readme_line() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("README.txt"),
            "National Airspace System Resources\r\nAIS subscriber files effective date December 28, 2023.\r\n",
        )
        .unwrap();

        let dist = Distribution::open_directory(dir.path(), LayoutFormat::FixedWidth).unwrap();
        let cycle = dist.cycle().await.unwrap();
        assert_eq!(cycle.effective, NaiveDate::from_ymd_opt(2023, 12, 28).unwrap());

        // Cached: a second call works without re-reading.
        assert_eq!(dist.cycle().await.unwrap(), cycle);
    }

    #[tokio::test]
    async fn test_cycle_absent_readme() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("README.txt"), "no date here\n").unwrap();

        let dist = Distribution::open_directory(dir.path(), LayoutFormat::FixedWidth).unwrap();
        assert!(matches!(dist.cycle().await, Err(DistError::CycleNotFound)));
    }
}
