//! Record-type assembly: drives reads, decoding, and key-based merging
//!
//! One [`ParseCoordinator`] assembles one record type from one
//! distribution. Coordinators for different record types may run
//! concurrently against the same distribution: their reads are serialized
//! by the read coordinator, while decoding and merging proceed
//! independently.

use crate::distribution::Distribution;
use crate::error::{DecodeError, DistError, Result};
use crate::records::decoder::{RawRow, RowDecoder};
use crate::records::{CompositeRecord, Fragment, RecordKey, RecordSet};
use crate::registry::{self, PlannedFile, RecordType, RowPolicy};
use crate::store::DataStore;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio_stream::StreamExt;
use tracing::{debug, info, warn};

/// Assembly progress of one record type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
    NotStarted,
    Preparing,
    Parsing,
    Finishing,
    Done,
}

impl ParseState {
    fn name(self) -> &'static str {
        match self {
            ParseState::NotStarted => "not started",
            ParseState::Preparing => "preparing",
            ParseState::Parsing => "parsing",
            ParseState::Finishing => "finishing",
            ParseState::Done => "done",
        }
    }
}

/// Outcome of one record type's assembly
#[derive(Debug, Clone, Serialize)]
pub struct ParseReport {
    pub record_type: RecordType,
    /// Composite records committed to the store
    pub records: usize,
    /// Rows dropped under the skip-and-count policy, per file
    pub skipped_rows: BTreeMap<String, u64>,
    /// Times the splitter's overflow valve fired across this type's files
    pub oversized_lines: u64,
}

/// Drives one record type's assembly to completion
pub struct ParseCoordinator {
    dist: Arc<Distribution>,
    record_type: RecordType,
    state: ParseState,
    records: HashMap<RecordKey, CompositeRecord>,
    skipped: BTreeMap<String, u64>,
    oversized_lines: u64,
}

impl ParseCoordinator {
    pub fn new(dist: Arc<Distribution>, record_type: RecordType) -> Self {
        Self {
            dist,
            record_type,
            state: ParseState::NotStarted,
            records: HashMap::new(),
            skipped: BTreeMap::new(),
            oversized_lines: 0,
        }
    }

    pub fn state(&self) -> ParseState {
        self.state
    }

    /// Assemble the record type and commit the result to `store`
    ///
    /// Runs exactly once; a second call is rejected. A record type with no
    /// files registered for the distribution's format commits an empty set
    /// and succeeds.
    pub async fn run(&mut self, store: &DataStore) -> Result<ParseReport> {
        if self.state != ParseState::NotStarted {
            return Err(DistError::InvalidState {
                record_type: self.record_type.name(),
                state: self.state.name(),
            });
        }

        self.state = ParseState::Preparing;
        self.dist.prepare().await?;

        self.state = ParseState::Parsing;
        let plan = registry::spec_for(self.record_type).plan(self.dist.format());
        if plan.is_empty() {
            debug!(record_type = %self.record_type, format = %self.dist.format(),
                "no files registered for this format; committing empty set");
        }
        for planned in &plan {
            self.parse_file(planned).await?;
        }

        self.state = ParseState::Finishing;
        let records: Vec<CompositeRecord> = self.records.drain().map(|(_, record)| record).collect();
        let report = ParseReport {
            record_type: self.record_type,
            records: records.len(),
            skipped_rows: self.skipped.clone(),
            oversized_lines: self.oversized_lines,
        };
        store
            .commit(RecordSet::new(self.record_type, records))
            .await;

        self.state = ParseState::Done;
        info!(record_type = %self.record_type, records = report.records, "record type assembled");
        Ok(report)
    }

    async fn parse_file(&mut self, planned: &PlannedFile) -> Result<()> {
        let file = planned.file();
        debug!(record_type = %self.record_type, file, "parsing file");

        let mut decoder = planned.decoder();
        decoder
            .prepare(&self.dist)
            .map_err(|source| DistError::Decode {
                file: file.to_string(),
                source,
            })?;

        let mut stream = self.dist.reader().stream_lines(file).await?;

        match planned {
            PlannedFile::Fixed(_) => {
                while let Some(line) = stream.next().await {
                    let line = line?;
                    let decoded = decoder.decode(RawRow::Fixed(&line));
                    self.absorb(planned, decoded)?;
                }
            },
            PlannedFile::Csv(_) => {
                let mut headers: Option<csv::StringRecord> = None;
                while let Some(line) = stream.next().await {
                    let line = line?;
                    if line.iter().all(u8::is_ascii_whitespace) {
                        continue;
                    }
                    let Some(record) = parse_csv_record(&line)? else {
                        continue;
                    };
                    if headers.is_none() {
                        // First data-bearing line names the columns.
                        headers = Some(record);
                        continue;
                    }
                    if let Some(header_row) = headers.as_ref() {
                        let decoded = decoder.decode(RawRow::Csv {
                            headers: header_row,
                            record: &record,
                        });
                        self.absorb(planned, decoded)?;
                    }
                }
            },
        }

        let trailing = decoder.finish();
        match trailing {
            Ok(fragments) => {
                for fragment in fragments {
                    self.merge(planned, fragment)?;
                }
            },
            Err(error) => self.tolerate(planned, error)?,
        }

        let stats = stream.stats();
        self.oversized_lines += stats.oversized_lines;
        if let Some(&skipped) = self.skipped.get(file) {
            warn!(record_type = %self.record_type, file, skipped, "rows skipped under policy");
        }
        Ok(())
    }

    /// Route one decode outcome: merge a fragment or apply the file policy
    fn absorb(
        &mut self,
        planned: &PlannedFile,
        decoded: std::result::Result<Option<Fragment>, DecodeError>,
    ) -> Result<()> {
        match decoded {
            Ok(Some(fragment)) => self.merge(planned, fragment),
            Ok(None) => Ok(()),
            Err(error) => self.tolerate(planned, error),
        }
    }

    fn merge(&mut self, planned: &PlannedFile, fragment: Fragment) -> Result<()> {
        match fragment {
            Fragment::Base { key, fields } => {
                self.records
                    .entry(key.clone())
                    .or_insert_with(|| CompositeRecord::new(key))
                    .merge_fields(fields);
                Ok(())
            },
            Fragment::Child {
                parent,
                section,
                fields,
            } => match self.records.get_mut(&parent) {
                Some(record) => {
                    record.push_section_row(section, fields);
                    Ok(())
                },
                None => self.tolerate(planned, DecodeError::UnknownParentRecord { parent }),
            },
        }
    }

    fn tolerate(&mut self, planned: &PlannedFile, error: DecodeError) -> Result<()> {
        match planned.policy() {
            RowPolicy::FailFast => Err(DistError::Decode {
                file: planned.file().to_string(),
                source: error,
            }),
            RowPolicy::SkipAndCount => {
                *self.skipped.entry(planned.file().to_string()).or_default() += 1;
                debug!(file = planned.file(), %error, "row skipped");
                Ok(())
            },
        }
    }
}

/// Parse the single CSV record contained in one line
fn parse_csv_record(line: &[u8]) -> Result<Option<csv::StringRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(line);
    match reader.records().next() {
        Some(record) => Ok(Some(record?)),
        None => Ok(None),
    }
}
