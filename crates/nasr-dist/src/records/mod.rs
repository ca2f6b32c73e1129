//! Composite records and the fragments they are assembled from
//!
//! A record type's entities are merged from rows contributed by one or more
//! files. Each row decodes to a [`Fragment`] carrying a [`RecordKey`]; the
//! parse coordinator merges fragments into [`CompositeRecord`]s, which
//! become immutable once committed as a [`RecordSet`].

pub mod decoder;

use crate::registry::RecordType;
use serde::Serialize;
use std::collections::BTreeMap;

/// Composite identity used to merge rows from different files
///
/// For airports this is the site number plus the site type code; for
/// navaids the identifier plus the facility type. Within one record-type
/// assembly, each key maps to at most one composite record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RecordKey(Vec<String>);

impl RecordKey {
    pub fn new<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(parts.into_iter().map(Into::into).collect())
    }

    pub fn parts(&self) -> &[String] {
        &self.0
    }
}

impl std::fmt::Display for RecordKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.join("/"))
    }
}

/// A decoder's contribution from one row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// Defines (or updates) a record's own fields
    Base {
        key: RecordKey,
        fields: Vec<(String, String)>,
    },
    /// Appends one row to a named child section of an existing record
    Child {
        parent: RecordKey,
        section: &'static str,
        fields: Vec<(String, String)>,
    },
}

/// The per-record-type entity under construction
///
/// Mutable only inside the parse coordinator that owns it; handed off by
/// value at commit time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompositeRecord {
    pub key: RecordKey,
    pub fields: BTreeMap<String, String>,
    pub sections: BTreeMap<&'static str, Vec<BTreeMap<String, String>>>,
}

impl CompositeRecord {
    pub(crate) fn new(key: RecordKey) -> Self {
        Self {
            key,
            fields: BTreeMap::new(),
            sections: BTreeMap::new(),
        }
    }

    /// Later writes to the same key update fields; they never duplicate the
    /// record.
    pub(crate) fn merge_fields(&mut self, fields: Vec<(String, String)>) {
        for (name, value) in fields {
            self.fields.insert(name, value);
        }
    }

    pub(crate) fn push_section_row(&mut self, section: &'static str, fields: Vec<(String, String)>) {
        self.sections
            .entry(section)
            .or_default()
            .push(fields.into_iter().collect());
    }

    /// Convenience accessor for a single field
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Rows of a named child section, empty if the section never appeared
    pub fn section(&self, name: &str) -> &[BTreeMap<String, String>] {
        self.sections.get(name).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// The finished, immutable set of composite records for one record type
#[derive(Debug, Serialize)]
pub struct RecordSet {
    pub record_type: RecordType,
    records: Vec<CompositeRecord>,
}

impl RecordSet {
    /// Build a set from assembled records; sorts by key so iteration order
    /// is deterministic and lookups can bisect.
    pub(crate) fn new(record_type: RecordType, mut records: Vec<CompositeRecord>) -> Self {
        records.sort_by(|a, b| a.key.cmp(&b.key));
        Self {
            record_type,
            records,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CompositeRecord> {
        self.records.iter()
    }

    pub fn get(&self, key: &RecordKey) -> Option<&CompositeRecord> {
        self.records
            .binary_search_by(|record| record.key.cmp(key))
            .ok()
            .map(|index| &self.records[index])
    }
}
