//! Record and dataset model
//!
//! A record is one roster row: an ordered mapping from column name to cell
//! value. Columns are shared between all records of a dataset.

use chrono::{DateTime, Utc};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::borrow::Cow;
use std::path::PathBuf;
use std::sync::Arc;

/// Well-known column headers, compared with surrounding whitespace ignored
pub mod columns {
    pub const IDENTIFIER: &str = "Roll No.";
    pub const NAME: &str = "Name of the student";
    pub const PROGRAM: &str = "B.Tech./M. Tech./MCA";
    pub const ORGANIZATION: &str = "Name of organization";
    pub const COMPENSATION: &str = "Package p.a. (Lakhs)";
    pub const ON_CAMPUS: &str = "On campus";
    pub const OFF_CAMPUS: &str = "Off campus";
}

/// A single cell. Every null-like source value is `Null`.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Null,
}

impl FieldValue {
    /// String form used for text matching. `None` for null cells.
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            FieldValue::Text(s) => Some(Cow::Borrowed(s.as_str())),
            FieldValue::Integer(i) => Some(Cow::Owned(i.to_string())),
            FieldValue::Float(f) => Some(Cow::Owned(f.to_string())),
            FieldValue::Null => None,
        }
    }

    /// Numeric interpretation; text is parsed after trimming.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Integer(i) => Some(*i as f64),
            FieldValue::Float(f) => Some(*f),
            FieldValue::Text(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
            FieldValue::Null => None,
        }
    }

    /// Present and not blank
    pub fn is_present(&self) -> bool {
        match self {
            FieldValue::Null => false,
            FieldValue::Text(s) => !s.trim().is_empty(),
            _ => true,
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Text(s) => serializer.serialize_str(s),
            FieldValue::Integer(i) => serializer.serialize_i64(*i),
            FieldValue::Float(f) => serializer.serialize_f64(*f),
            FieldValue::Null => serializer.serialize_none(),
        }
    }
}

/// One roster row
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    columns: Arc<[String]>,
    values: Vec<FieldValue>,
}

impl Record {
    /// Build a record; `values` shorter than `columns` are padded with nulls.
    pub fn new(columns: Arc<[String]>, mut values: Vec<FieldValue>) -> Self {
        values.resize(columns.len(), FieldValue::Null);
        Self { columns, values }
    }

    /// Value at a resolved column position
    pub fn at(&self, position: Option<usize>) -> &FieldValue {
        position
            .and_then(|i| self.values.get(i))
            .unwrap_or(&FieldValue::Null)
    }

    /// Value by exact column name; absent columns read as null
    pub fn get(&self, column: &str) -> &FieldValue {
        self.at(self.columns.iter().position(|c| c == column))
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (column, value) in self.columns.iter().zip(&self.values) {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

/// Positions of the well-known columns within a dataset's header
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldIndex {
    pub identifier: Option<usize>,
    pub name: Option<usize>,
    pub program: Option<usize>,
    pub organization: Option<usize>,
    pub compensation: Option<usize>,
    pub on_campus: Option<usize>,
    pub off_campus: Option<usize>,
}

impl FieldIndex {
    pub fn resolve(header: &[String]) -> Self {
        let find = |wanted: &str| header.iter().position(|h| h.trim() == wanted);
        Self {
            identifier: find(columns::IDENTIFIER),
            name: find(columns::NAME),
            program: find(columns::PROGRAM),
            organization: find(columns::ORGANIZATION),
            compensation: find(columns::COMPENSATION),
            on_campus: find(columns::ON_CAMPUS),
            off_campus: find(columns::OFF_CAMPUS),
        }
    }
}

/// Selects a dataset in the registry
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DatasetKey {
    Default,
    Year(String),
}

impl DatasetKey {
    /// Map an optional request parameter to a key. Blank means default.
    pub fn from_param(param: Option<&str>) -> Self {
        match param.map(str::trim) {
            Some(k) if !k.is_empty() => DatasetKey::Year(k.to_string()),
            _ => DatasetKey::Default,
        }
    }
}

impl std::fmt::Display for DatasetKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatasetKey::Default => write!(f, "default"),
            DatasetKey::Year(k) => write!(f, "{}", k),
        }
    }
}

/// An immutable, fully loaded roster
#[derive(Debug)]
pub struct Dataset {
    pub key: DatasetKey,
    pub source: PathBuf,
    pub loaded_at: DateTime<Utc>,
    pub fields: FieldIndex,
    columns: Arc<[String]>,
    records: Vec<Record>,
}

impl Dataset {
    pub fn new(key: DatasetKey, source: PathBuf, columns: Arc<[String]>, records: Vec<Record>) -> Self {
        Self {
            key,
            source,
            loaded_at: Utc::now(),
            fields: FieldIndex::resolve(&columns),
            columns,
            records,
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn summary(&self) -> DatasetSummary {
        DatasetSummary {
            key: self.key.to_string(),
            source: self.source.display().to_string(),
            records: self.len(),
            columns: self.columns().to_vec(),
            loaded_at: self.loaded_at,
        }
    }
}

/// Metadata of a loaded dataset, as reported by `/health`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub key: String,
    pub source: String,
    pub records: usize,
    pub columns: Vec<String>,
    pub loaded_at: DateTime<Utc>,
}

/// Canonical string form of an identifier cell.
///
/// Integral floats lose their `.0` and exponent; digit strings are kept as-is.
pub fn canonicalize_identifier(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return trimmed.to_string();
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() && v.fract() == 0.0 => format!("{:.0}", v),
        _ => trimmed.to_string(),
    }
}
