//! Static record-type registry
//!
//! Maps each logical record type to its backing files per layout format,
//! the order those files must be processed in, each file's
//! tolerance policy, and the decoder for its rows. Everything here is
//! configuration: files defining parent entities are listed before the
//! files that reference them by key, and that ordering is never inferred at
//! runtime.

use crate::distribution::LayoutFormat;
use crate::records::decoder::{
    col, ColumnSpec, CsvRowDecoder, FixedRowSpec, FixedWidthDecoder, RowDecoder,
};
use serde::{Deserialize, Serialize};

/// A logical entity category of the dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordType {
    Airport,
    Navaid,
    Airway,
    Fix,
}

impl RecordType {
    pub fn all() -> [RecordType; 4] {
        [
            RecordType::Airport,
            RecordType::Navaid,
            RecordType::Airway,
            RecordType::Fix,
        ]
    }

    pub fn name(self) -> &'static str {
        match self {
            RecordType::Airport => "airport",
            RecordType::Navaid => "navaid",
            RecordType::Airway => "airway",
            RecordType::Fix => "fix",
        }
    }
}

impl std::fmt::Display for RecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for RecordType {
    type Err = nasr_common::NasrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "airport" | "apt" => Ok(RecordType::Airport),
            "navaid" | "nav" => Ok(RecordType::Navaid),
            "airway" | "awy" => Ok(RecordType::Airway),
            "fix" => Ok(RecordType::Fix),
            other => Err(nasr_common::NasrError::Parse(format!(
                "unknown record type '{other}'"
            ))),
        }
    }
}

/// What happens when a row of a file fails to decode or references an
/// unknown parent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RowPolicy {
    /// Abort the record type's assembly on the first bad row
    FailFast,
    /// Drop the row, count it, keep going; some published files are known
    /// to contain orphaned rows that must not abort ingestion
    SkipAndCount,
}

/// The single fixed-width file backing a record type
#[derive(Debug, Clone, Copy)]
pub struct FixedFileSpec {
    pub file: &'static str,
    pub policy: RowPolicy,
    pub rows: &'static [FixedRowSpec],
}

/// One CSV file backing (part of) a record type
#[derive(Debug, Clone, Copy)]
pub struct CsvFileSpec {
    pub file: &'static str,
    pub policy: RowPolicy,
    /// Header names forming the record key (parent key for child files)
    pub key: &'static [&'static str],
    /// `None` for the base file; child files append to this section
    pub section: Option<&'static str>,
}

/// Registry entry for one record type
#[derive(Debug, Clone, Copy)]
pub struct RecordTypeSpec {
    pub record_type: RecordType,
    pub fixed: Option<&'static FixedFileSpec>,
    /// Ordered: base files first, then children
    pub csv: &'static [CsvFileSpec],
}

/// A concrete file to read for one record type under one format
#[derive(Clone, Copy)]
pub(crate) enum PlannedFile {
    Fixed(&'static FixedFileSpec),
    Csv(&'static CsvFileSpec),
}

impl PlannedFile {
    pub(crate) fn file(&self) -> &'static str {
        match self {
            PlannedFile::Fixed(spec) => spec.file,
            PlannedFile::Csv(spec) => spec.file,
        }
    }

    pub(crate) fn policy(&self) -> RowPolicy {
        match self {
            PlannedFile::Fixed(spec) => spec.policy,
            PlannedFile::Csv(spec) => spec.policy,
        }
    }

    pub(crate) fn decoder(&self) -> Box<dyn RowDecoder> {
        match self {
            PlannedFile::Fixed(spec) => Box::new(FixedWidthDecoder::new(spec.rows)),
            PlannedFile::Csv(spec) => Box::new(CsvRowDecoder::new(spec.key, spec.section)),
        }
    }
}

impl RecordTypeSpec {
    /// The ordered file plan for this type under the given format; empty
    /// when the type is not published in that format
    pub(crate) fn plan(&self, format: LayoutFormat) -> Vec<PlannedFile> {
        match format {
            LayoutFormat::FixedWidth => self.fixed.map(PlannedFile::Fixed).into_iter().collect(),
            LayoutFormat::Csv => self.csv.iter().map(PlannedFile::Csv).collect(),
        }
    }

    /// File names in processing order, for reporting
    pub fn files(&self, format: LayoutFormat) -> Vec<&'static str> {
        self.plan(format).iter().map(PlannedFile::file).collect()
    }
}

/// Look up the registry entry for a record type
pub fn spec_for(record_type: RecordType) -> &'static RecordTypeSpec {
    match record_type {
        RecordType::Airport => &AIRPORT,
        RecordType::Navaid => &NAVAID,
        RecordType::Airway => &AIRWAY,
        RecordType::Fix => &FIX,
    }
}

// ----------------------------------------------------------------------------
// Registry tables
//
// Column maps cover the identity and headline fields of each row kind, not
// the complete published field catalogue.
// ----------------------------------------------------------------------------

const APT_KEY: &[ColumnSpec] = &[col("site_number", 3, 11), col("site_type", 14, 2)];

static AIRPORT_FIXED: FixedFileSpec = FixedFileSpec {
    file: "APT.txt",
    // Published remark rows are known to reference retired sites.
    policy: RowPolicy::SkipAndCount,
    rows: &[
        FixedRowSpec {
            code: "APT",
            key: APT_KEY,
            fields: &[
                col("facility_id", 16, 4),
                col("name", 20, 30),
                col("city", 50, 26),
                col("state", 76, 2),
            ],
            section: None,
        },
        FixedRowSpec {
            code: "ATT",
            key: APT_KEY,
            fields: &[col("sequence", 16, 2), col("schedule", 18, 30)],
            section: Some("attendance"),
        },
        FixedRowSpec {
            code: "RWY",
            key: APT_KEY,
            fields: &[
                col("runway_id", 16, 7),
                col("length", 23, 5),
                col("surface", 28, 12),
            ],
            section: Some("runways"),
        },
        FixedRowSpec {
            code: "RMK",
            key: APT_KEY,
            fields: &[col("element", 16, 13), col("text", 29, 171)],
            section: Some("remarks"),
        },
    ],
};

static AIRPORT: RecordTypeSpec = RecordTypeSpec {
    record_type: RecordType::Airport,
    fixed: Some(&AIRPORT_FIXED),
    csv: &[
        CsvFileSpec {
            file: "APT_BASE.csv",
            policy: RowPolicy::FailFast,
            key: &["SITE_NO", "SITE_TYPE_CODE"],
            section: None,
        },
        CsvFileSpec {
            file: "APT_RWY.csv",
            policy: RowPolicy::FailFast,
            key: &["SITE_NO", "SITE_TYPE_CODE"],
            section: Some("runways"),
        },
        CsvFileSpec {
            file: "APT_RMK.csv",
            policy: RowPolicy::SkipAndCount,
            key: &["SITE_NO", "SITE_TYPE_CODE"],
            section: Some("remarks"),
        },
    ],
};

const NAV_KEY: &[ColumnSpec] = &[col("nav_id", 4, 8), col("nav_type", 12, 20)];

static NAVAID_FIXED: FixedFileSpec = FixedFileSpec {
    file: "NAV.txt",
    policy: RowPolicy::FailFast,
    rows: &[
        FixedRowSpec {
            code: "NAV1",
            key: NAV_KEY,
            fields: &[
                col("name", 32, 30),
                col("city", 62, 26),
                col("state", 88, 2),
            ],
            section: None,
        },
        FixedRowSpec {
            code: "NAV2",
            key: NAV_KEY,
            fields: &[col("text", 32, 200)],
            section: Some("remarks"),
        },
    ],
};

static NAVAID: RecordTypeSpec = RecordTypeSpec {
    record_type: RecordType::Navaid,
    fixed: Some(&NAVAID_FIXED),
    csv: &[
        CsvFileSpec {
            file: "NAV_BASE.csv",
            policy: RowPolicy::FailFast,
            key: &["NAV_ID", "NAV_TYPE"],
            section: None,
        },
        CsvFileSpec {
            file: "NAV_RMK.csv",
            policy: RowPolicy::SkipAndCount,
            key: &["NAV_ID", "NAV_TYPE"],
            section: Some("remarks"),
        },
    ],
};

const AWY_KEY: &[ColumnSpec] = &[col("designator", 4, 5)];

static AIRWAY_FIXED: FixedFileSpec = FixedFileSpec {
    file: "AWY.txt",
    policy: RowPolicy::FailFast,
    rows: &[
        FixedRowSpec {
            code: "AWY1",
            key: AWY_KEY,
            fields: &[col("airway_type", 9, 2)],
            section: None,
        },
        FixedRowSpec {
            code: "AWY2",
            key: AWY_KEY,
            fields: &[col("sequence", 9, 5), col("point", 14, 30)],
            section: Some("points"),
        },
    ],
};

// Airways are not published in the CSV layout; requesting them from a CSV
// distribution yields an empty, successful result.
static AIRWAY: RecordTypeSpec = RecordTypeSpec {
    record_type: RecordType::Airway,
    fixed: Some(&AIRWAY_FIXED),
    csv: &[],
};

// Fixes are the converse: CSV-only.
static FIX: RecordTypeSpec = RecordTypeSpec {
    record_type: RecordType::Fix,
    fixed: None,
    csv: &[CsvFileSpec {
        file: "FIX_BASE.csv",
        policy: RowPolicy::FailFast,
        key: &["FIX_ID", "STATE_CODE"],
        section: None,
    }],
};
