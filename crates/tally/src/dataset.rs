//! The tabular source: one [`Record`] per CSV row, read-only once loaded.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

use crate::error::{Result, TallyError};

pub const CAUSE: &str = "Cause";
pub const TYPE: &str = "Type";
pub const YEAR: &str = "Year";
pub const TOTAL_DEATHS: &str = "Total Deaths";
pub const SOURCE: &str = "Source";

pub const REQUIRED_COLUMNS: [&str; 5] = [CAUSE, TYPE, YEAR, TOTAL_DEATHS, SOURCE];

/// A numeric column that did not hold a usable number
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("column '{column}' holds '{value}', expected {expected}")]
pub struct FieldError {
  pub column: String,
  pub value: String,
  pub expected: &'static str,
}

/// Stable identity of a row, stored next to its vector in the index.
///
/// SHA-256 of the row's embedding text plus the occurrence ordinal of that
/// text, so identical rows stay distinguishable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowKey(String);

impl RowKey {
  pub fn new(text: &str, occurrence: usize) -> Self {
    let digest = hex::encode(Sha256::digest(text.as_bytes()));
    Self(format!("{digest}#{occurrence}"))
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for RowKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Record {
  columns: Arc<[String]>,
  values: Vec<String>,
}

impl Record {
  /// Short rows are padded with empty cells, long rows truncated to the header
  pub fn new(columns: Arc<[String]>, mut values: Vec<String>) -> Self {
    values.resize(columns.len(), String::new());
    Self { columns, values }
  }

  pub fn get(&self, column: &str) -> Option<&str> {
    self.columns.iter().position(|c| c == column).map(|i| self.values[i].as_str())
  }

  /// Cell value, or an empty string for a column the dataset does not have
  pub fn field(&self, column: &str) -> &str {
    self.get(column).unwrap_or("")
  }

  pub fn cause(&self) -> &str {
    self.field(CAUSE)
  }

  pub fn kind(&self) -> &str {
    self.field(TYPE)
  }

  pub fn source(&self) -> &str {
    self.field(SOURCE)
  }

  pub fn year(&self) -> std::result::Result<i32, FieldError> {
    let raw = self.field(YEAR);
    parse_integral(raw)
      .and_then(|v| i32::try_from(v).ok())
      .ok_or_else(|| field_error(YEAR, raw, "a year"))
  }

  pub fn total_deaths(&self) -> std::result::Result<u64, FieldError> {
    let raw = self.field(TOTAL_DEATHS);
    parse_integral(raw)
      .and_then(|v| u64::try_from(v).ok())
      .ok_or_else(|| field_error(TOTAL_DEATHS, raw, "a non-negative count"))
  }

  pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
    self.columns.iter().map(String::as_str).zip(self.values.iter().map(String::as_str))
  }

  /// Every value in column order, joined by a single space
  pub fn embedding_text(&self) -> String {
    self.values.join(" ")
  }

  pub fn to_json_map(&self) -> serde_json::Map<String, serde_json::Value> {
    self
      .fields()
      .map(|(column, value)| (column.to_string(), serde_json::Value::String(value.to_string())))
      .collect()
  }
}

fn field_error(column: &str, value: &str, expected: &'static str) -> FieldError {
  FieldError { column: column.to_string(), value: value.to_string(), expected }
}

/// Integers, or floats with no fractional part (`"500.0"`)
fn parse_integral(raw: &str) -> Option<i64> {
  let trimmed = raw.trim();
  if let Ok(value) = trimmed.parse::<i64>() {
    return Some(value);
  }
  let value = trimmed.parse::<f64>().ok()?;
  (value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64)
    .then_some(value as i64)
}

#[derive(Debug, Clone)]
pub struct Dataset {
  path: Option<PathBuf>,
  columns: Arc<[String]>,
  records: Vec<Record>,
  keys: Vec<RowKey>,
  positions: HashMap<RowKey, usize>,
}

impl Dataset {
  /// Load a delimited file. Missing cells become empty strings.
  pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
    let path = path.as_ref();
    if !path.is_file() {
      return Err(TallyError::DatasetNotFound { path: path.to_path_buf() });
    }

    let csv_error = |source| TallyError::Csv { path: path.to_path_buf(), source };

    let mut reader =
      csv::ReaderBuilder::new().flexible(true).from_path(path).map_err(csv_error)?;
    let columns: Vec<String> =
      reader.headers().map_err(csv_error)?.iter().map(|h| h.trim().to_string()).collect();

    if let Some(missing) = REQUIRED_COLUMNS.iter().find(|c| !columns.iter().any(|h| h == *c)) {
      return Err(TallyError::MissingColumn {
        path: path.to_path_buf(),
        column: missing.to_string(),
      });
    }

    let mut rows = Vec::new();
    for row in reader.records() {
      let row = row.map_err(csv_error)?;
      rows.push(row.iter().map(str::to_string).collect());
    }

    let mut dataset = Self::from_rows(columns, rows);
    dataset.path = Some(path.to_path_buf());
    tracing::debug!(rows = dataset.len(), path = %path.display(), "dataset loaded");
    Ok(dataset)
  }

  pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
    let columns: Arc<[String]> = columns.into();
    let records: Vec<Record> =
      rows.into_iter().map(|values| Record::new(columns.clone(), values)).collect();

    let mut occurrences: HashMap<String, usize> = HashMap::new();
    let keys: Vec<RowKey> = records
      .iter()
      .map(|record| {
        let text = record.embedding_text();
        let seen = occurrences.entry(text.clone()).or_insert(0);
        let key = RowKey::new(&text, *seen);
        *seen += 1;
        key
      })
      .collect();

    let positions = keys.iter().enumerate().map(|(i, key)| (key.clone(), i)).collect();

    Self { path: None, columns, records, keys, positions }
  }

  pub fn path(&self) -> Option<&Path> {
    self.path.as_deref()
  }

  pub fn columns(&self) -> &[String] {
    &self.columns
  }

  pub fn records(&self) -> &[Record] {
    &self.records
  }

  pub fn get(&self, row: usize) -> Option<&Record> {
    self.records.get(row)
  }

  /// One key per row, in row order
  pub fn keys(&self) -> &[RowKey] {
    &self.keys
  }

  pub fn key(&self, row: usize) -> Option<&RowKey> {
    self.keys.get(row)
  }

  /// Row currently holding the record that was indexed under `key`
  pub fn position_of(&self, key: &RowKey) -> Option<usize> {
    self.positions.get(key).copied()
  }

  pub fn len(&self) -> usize {
    self.records.len()
  }

  pub fn is_empty(&self) -> bool {
    self.records.is_empty()
  }
}
