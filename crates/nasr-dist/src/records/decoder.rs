//! Per-file row decoders
//!
//! Decoders are the boundary between the reading engine and the record
//! catalogue: the engine presents one line or CSV row at a time (never with
//! read-ahead) and the decoder either emits a [`Fragment`] or raises a typed
//! [`DecodeError`]. Tolerance for decode errors is the parse coordinator's
//! call, driven by the registry's per-file policy, never the decoder's.
//!
//! The two built-in decoders are table-driven: a fixed-width decoder over
//! column maps and a CSV decoder over header names. The full per-type field
//! catalogue of the source dataset is deliberately not reproduced here.

use crate::distribution::Distribution;
use crate::error::DecodeError;
use crate::records::{Fragment, RecordKey};

/// One line or row, as presented to a decoder
pub enum RawRow<'a> {
    /// A raw fixed-width line, without its delimiter
    Fixed(&'a [u8]),
    /// A CSV record together with the file's header row
    Csv {
        headers: &'a csv::StringRecord,
        record: &'a csv::StringRecord,
    },
}

/// A per-file decoder turning rows into record fragments
pub trait RowDecoder: Send {
    /// Called once before the file is read
    fn prepare(&mut self, dist: &Distribution) -> Result<(), DecodeError> {
        let _ = dist;
        Ok(())
    }

    /// Decode one row; `Ok(None)` means the row carries no record data
    /// (blank lines, spacer rows)
    fn decode(&mut self, row: RawRow<'_>) -> Result<Option<Fragment>, DecodeError>;

    /// Called once after the last row; may flush buffered fragments
    fn finish(&mut self) -> Result<Vec<Fragment>, DecodeError> {
        Ok(Vec::new())
    }
}

/// A named constant column range of a fixed-width line
#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub start: usize,
    pub len: usize,
}

/// Constant constructor so registry tables stay readable
pub const fn col(name: &'static str, start: usize, len: usize) -> ColumnSpec {
    ColumnSpec { name, start, len }
}

/// Layout of one row kind within a fixed-width file
///
/// Base rows (`section: None`) define a record keyed by `key`; child rows
/// reference the parent record through the same key columns and append to
/// the named section.
#[derive(Debug, Clone, Copy)]
pub struct FixedRowSpec {
    /// Row type code at the start of the line (e.g. `APT`, `NAV1`)
    pub code: &'static str,
    pub key: &'static [ColumnSpec],
    pub fields: &'static [ColumnSpec],
    pub section: Option<&'static str>,
}

/// Table-driven decoder for a fixed-width file
pub struct FixedWidthDecoder {
    rows: &'static [FixedRowSpec],
}

impl FixedWidthDecoder {
    pub fn new(rows: &'static [FixedRowSpec]) -> Self {
        Self { rows }
    }

    fn key_for(spec: &FixedRowSpec, line: &[u8]) -> Result<RecordKey, DecodeError> {
        let mut parts = Vec::with_capacity(spec.key.len());
        for column in spec.key {
            if column.start >= line.len() {
                return Err(DecodeError::TruncatedRow {
                    expected: column.start + column.len,
                    actual: line.len(),
                });
            }
            let value = extract(line, column);
            if value.is_empty() {
                return Err(DecodeError::MissingField {
                    field: column.name.to_string(),
                });
            }
            parts.push(value);
        }
        Ok(RecordKey::new(parts))
    }
}

fn extract(line: &[u8], column: &ColumnSpec) -> String {
    if column.start >= line.len() {
        return String::new();
    }
    let end = (column.start + column.len).min(line.len());
    String::from_utf8_lossy(&line[column.start..end])
        .trim()
        .to_string()
}

impl RowDecoder for FixedWidthDecoder {
    fn decode(&mut self, row: RawRow<'_>) -> Result<Option<Fragment>, DecodeError> {
        let RawRow::Fixed(line) = row else {
            return Err(DecodeError::InvalidValue {
                field: "layout".to_string(),
                value: "fixed-width decoder fed a CSV row".to_string(),
            });
        };

        if line.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }

        let Some(spec) = self.rows.iter().find(|r| line.starts_with(r.code.as_bytes())) else {
            let code = String::from_utf8_lossy(&line[..line.len().min(4)]).trim().to_string();
            return Err(DecodeError::UnrecognizedRow { code });
        };

        let key = Self::key_for(spec, line)?;
        let fields = spec
            .fields
            .iter()
            .map(|column| (column.name.to_string(), extract(line, column)))
            .collect();

        Ok(Some(match spec.section {
            None => Fragment::Base { key, fields },
            Some(section) => Fragment::Child {
                parent: key,
                section,
                fields,
            },
        }))
    }
}

/// Header-driven decoder for one CSV file
pub struct CsvRowDecoder {
    key_headers: &'static [&'static str],
    section: Option<&'static str>,
    key_indices: Option<Vec<usize>>,
}

impl CsvRowDecoder {
    pub fn new(key_headers: &'static [&'static str], section: Option<&'static str>) -> Self {
        Self {
            key_headers,
            section,
            key_indices: None,
        }
    }

    fn resolve_indices(&mut self, headers: &csv::StringRecord) -> Result<&[usize], DecodeError> {
        if self.key_indices.is_none() {
            let mut indices = Vec::with_capacity(self.key_headers.len());
            for name in self.key_headers {
                let index = headers
                    .iter()
                    .position(|h| h.trim().eq_ignore_ascii_case(name))
                    .ok_or_else(|| DecodeError::MissingField {
                        field: name.to_string(),
                    })?;
                indices.push(index);
            }
            self.key_indices = Some(indices);
        }
        Ok(self.key_indices.as_deref().unwrap_or(&[]))
    }
}

impl RowDecoder for CsvRowDecoder {
    fn decode(&mut self, row: RawRow<'_>) -> Result<Option<Fragment>, DecodeError> {
        let RawRow::Csv { headers, record } = row else {
            return Err(DecodeError::InvalidValue {
                field: "layout".to_string(),
                value: "CSV decoder fed a fixed-width line".to_string(),
            });
        };

        if record.iter().all(|field| field.trim().is_empty()) {
            return Ok(None);
        }

        let mut parts = Vec::with_capacity(self.key_headers.len());
        for (slot, index) in self.resolve_indices(headers)?.to_vec().into_iter().enumerate() {
            let value = record.get(index).map(str::trim).unwrap_or_default();
            if value.is_empty() {
                if record.len() <= index {
                    return Err(DecodeError::TruncatedRow {
                        expected: index + 1,
                        actual: record.len(),
                    });
                }
                return Err(DecodeError::MissingField {
                    field: self.key_headers[slot].to_string(),
                });
            }
            parts.push(value.to_string());
        }
        let key = RecordKey::new(parts);

        let fields = headers
            .iter()
            .enumerate()
            .map(|(index, header)| {
                let value = record.get(index).map(str::trim).unwrap_or_default();
                (header.trim().to_string(), value.to_string())
            })
            .collect();

        Ok(Some(match self.section {
            None => Fragment::Base { key, fields },
            Some(section) => Fragment::Child {
                parent: key,
                section,
                fields,
            },
        }))
    }
}
