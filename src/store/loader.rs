//! Source file parsing
//!
//! Turns a cleaned roster export (spreadsheet, CSV or records-oriented
//! JSON) into a [`Dataset`]. Null-like cells are unified to
//! [`FieldValue::Null`] and the identifier column is canonicalised here, once, so that queries never
//! have to care about the raw representation.

use super::record::{canonicalize_identifier, Dataset, DatasetKey, FieldIndex, FieldValue, Record};
use calamine::{open_workbook_auto, Data, Reader};
use serde_json::Value as JsonValue;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no source file for dataset {0}")]
    Missing(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("spreadsheet error: {0}")]
    Sheet(#[from] calamine::Error),
    #[error("unsupported file extension: {0}")]
    Unsupported(String),
    #[error("unexpected source shape: {0}")]
    Shape(String),
}

/// Extensions probed, in order, when resolving a dataset's source file
pub const SOURCE_EXTENSIONS: &[&str] = &["xlsx", "xls", "csv", "json"];

/// Load a dataset from a file. Dispatch by extension.
pub fn load_file(key: DatasetKey, path: &Path) -> Result<Dataset, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let (columns, rows) = match ext.as_str() {
        "csv" => read_csv(path)?,
        "json" => read_json(path)?,
        "xlsx" | "xls" => read_sheet(path)?,
        other => return Err(LoadError::Unsupported(other.to_string())),
    };

    let columns: Arc<[String]> = columns.into();
    let id_position = FieldIndex::resolve(&columns).identifier;

    let records: Vec<Record> = rows
        .into_iter()
        .map(|mut values| {
            if let Some(cell) = id_position.and_then(|i| values.get_mut(i)) {
                *cell = identifier_cell(cell);
            }
            Record::new(Arc::clone(&columns), values)
        })
        .collect();

    debug!(
        "Parsed {} records with {} columns from {}",
        records.len(),
        columns.len(),
        path.display()
    );

    Ok(Dataset::new(key, path.to_path_buf(), columns, records))
}

type Rows = (Vec<String>, Vec<Vec<FieldValue>>);

fn read_csv(path: &Path) -> Result<Rows, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)?;

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
    // Identifiers stay text so leading zeros survive typing
    let id_position = FieldIndex::resolve(&headers).identifier;

    let mut rows = Vec::new();
    for result in reader.records() {
        let row = result?;
        let mut values: Vec<FieldValue> = row
            .iter()
            .take(headers.len())
            .enumerate()
            .map(|(i, raw)| {
                if Some(i) == id_position {
                    text_cell(raw)
                } else {
                    parse_cell(raw)
                }
            })
            .collect();
        values.resize(headers.len(), FieldValue::Null);
        rows.push(values);
    }

    Ok((headers, rows))
}

/// First worksheet; the first row is the header
fn read_sheet(path: &Path) -> Result<Rows, LoadError> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| LoadError::Shape("workbook has no worksheets".to_string()))??;

    let mut sheet_rows = range.rows();
    let headers: Vec<String> = match sheet_rows.next() {
        Some(row) => row.iter().map(|cell| cell.to_string()).collect(),
        None => return Ok((Vec::new(), Vec::new())),
    };
    let id_position = FieldIndex::resolve(&headers).identifier;

    let rows = sheet_rows
        .map(|row| {
            let mut values: Vec<FieldValue> = row
                .iter()
                .take(headers.len())
                .enumerate()
                .map(|(i, cell)| sheet_cell(cell, Some(i) == id_position))
                .collect();
            values.resize(headers.len(), FieldValue::Null);
            values
        })
        .collect();

    Ok((headers, rows))
}

/// Expected layout is `df.to_json(orient="records")`:
///
/// ```json
/// [{"Roll No.": 20201101000.0, "Name of the student": "Ravi", "On campus": null}, ...]
/// ```
fn read_json(path: &Path) -> Result<Rows, LoadError> {
    let text = std::fs::read_to_string(path)?;
    let root: JsonValue = serde_json::from_str(&text)?;

    let items = root
        .as_array()
        .ok_or_else(|| LoadError::Shape("top-level value is not an array".to_string()))?;

    // Column order is first-seen order across all rows
    let mut headers: Vec<String> = Vec::new();
    for (i, item) in items.iter().enumerate() {
        let obj = item
            .as_object()
            .ok_or_else(|| LoadError::Shape(format!("row {} is not an object", i)))?;
        for key in obj.keys() {
            if !headers.iter().any(|h| h == key) {
                headers.push(key.clone());
            }
        }
    }

    let rows = items
        .iter()
        .filter_map(JsonValue::as_object)
        .map(|obj| {
            headers
                .iter()
                .map(|h| obj.get(h).map(json_cell).unwrap_or(FieldValue::Null))
                .collect()
        })
        .collect();

    Ok((headers, rows))
}

/// Type a raw text cell
pub fn parse_cell(raw: &str) -> FieldValue {
    let trimmed = raw.trim();
    if is_null_like(trimmed) {
        return FieldValue::Null;
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return FieldValue::Integer(i);
    }
    match trimmed.parse::<f64>() {
        Ok(f) if f.is_finite() => FieldValue::Float(f),
        _ => FieldValue::Text(raw.to_string()),
    }
}

fn text_cell(raw: &str) -> FieldValue {
    if is_null_like(raw.trim()) {
        FieldValue::Null
    } else {
        FieldValue::Text(raw.to_string())
    }
}

fn json_cell(value: &JsonValue) -> FieldValue {
    match value {
        JsonValue::Null => FieldValue::Null,
        JsonValue::String(s) if is_null_like(s.trim()) => FieldValue::Null,
        JsonValue::String(s) => FieldValue::Text(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                FieldValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                FieldValue::Float(f)
            } else {
                FieldValue::Text(n.to_string())
            }
        }
        other => FieldValue::Text(other.to_string()),
    }
}

fn sheet_cell(cell: &Data, identifier: bool) -> FieldValue {
    match cell {
        Data::Empty => FieldValue::Null,
        Data::Int(i) => FieldValue::Integer(*i),
        Data::Float(f) if !f.is_finite() => FieldValue::Null,
        Data::Float(f) => FieldValue::Float(*f),
        Data::String(s) if identifier => text_cell(s),
        Data::String(s) => parse_cell(s),
        other => text_cell(&other.to_string()),
    }
}

fn is_null_like(trimmed: &str) -> bool {
    trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan")
}

fn identifier_cell(cell: &FieldValue) -> FieldValue {
    match cell {
        FieldValue::Null => FieldValue::Null,
        FieldValue::Integer(i) => FieldValue::Text(i.to_string()),
        FieldValue::Float(f) if f.fract() == 0.0 => FieldValue::Text(format!("{:.0}", f)),
        FieldValue::Float(f) => FieldValue::Text(f.to_string()),
        FieldValue::Text(s) => FieldValue::Text(canonicalize_identifier(s)),
    }
}
