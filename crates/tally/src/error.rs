//! Construction-time failures.
//!
//! Everything in here means the deployment is broken (missing files, no
//! credential, a provider that disagrees with the index). Query-time
//! problems live in [`crate::aggregation::AggregationError`] and are
//! returned as values.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TallyError {
  #[error("Dataset file not found: {}", path.display())]
  DatasetNotFound { path: PathBuf },

  #[error("Failed to parse dataset {}: {source}", path.display())]
  Csv {
    path: PathBuf,
    #[source]
    source: csv::Error,
  },

  #[error("Dataset {} is missing required column '{column}'", path.display())]
  MissingColumn { path: PathBuf, column: String },

  #[error("Vector index not found at {}. Run `tally index` first.", path.display())]
  IndexNotFound { path: PathBuf },

  #[error("Vector index at {} is unreadable: {message}", path.display())]
  IndexCorrupt { path: PathBuf, message: String },

  #[error("Embedding credential missing: set {variable}")]
  MissingCredential { variable: String },

  #[error("Embedding dimension mismatch: expected {expected}, provider returned {actual}")]
  DimensionMismatch { expected: usize, actual: usize },

  #[error("Index was built with model '{index_model}' but the provider uses '{provider_model}'")]
  ModelMismatch { index_model: String, provider_model: String },

  #[error("Embedding provider error: {message}")]
  Provider { message: String },

  #[error("Configuration error: {message}")]
  Config { message: String },

  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),

  #[error("Serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl TallyError {
  pub fn provider(message: impl Into<String>) -> Self {
    Self::Provider { message: message.into() }
  }

  pub fn config(message: impl Into<String>) -> Self {
    Self::Config { message: message.into() }
  }

  pub fn index_corrupt(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
    Self::IndexCorrupt { path: path.into(), message: message.into() }
  }
}

pub type Result<T> = std::result::Result<T, TallyError>;
