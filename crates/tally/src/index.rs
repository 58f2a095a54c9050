//! Flat squared-L2 vector index over dataset rows.
//!
//! Each entry carries the [`RowKey`] of the row it was built from. Hits are
//! resolved back to rows by key, never by position, so a re-sorted dataset
//! still maps correctly.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::dataset::{Dataset, RowKey};
use crate::embedding::EmbeddingProvider;
use crate::error::{Result, TallyError};
use crate::similarity;

pub const FORMAT_VERSION: u32 = 1;
pub const METRIC: &str = "l2sq";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
  pub key: RowKey,
  pub vector: Vec<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorIndex {
  version: u32,
  model: String,
  metric: String,
  /// 0 until the first vector is added
  dimension: usize,
  entries: Vec<IndexEntry>,
}

/// What [`ensure_index`] did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
  Built { entries: usize, dimension: usize },
  /// An index already existed; nothing was embedded or written
  Skipped { path: PathBuf },
}

impl VectorIndex {
  pub fn new(model: impl Into<String>) -> Self {
    Self {
      version: FORMAT_VERSION,
      model: model.into(),
      metric: METRIC.to_string(),
      dimension: 0,
      entries: Vec::new(),
    }
  }

  /// Append a vector. The first one fixes the dimension for all others.
  pub fn push(&mut self, key: RowKey, vector: Vec<f32>) -> Result<()> {
    if vector.is_empty() {
      return Err(TallyError::provider("provider returned an empty embedding"));
    }
    if self.dimension == 0 {
      self.dimension = vector.len();
    } else if vector.len() != self.dimension {
      return Err(TallyError::DimensionMismatch { expected: self.dimension, actual: vector.len() });
    }

    self.entries.push(IndexEntry { key, vector });
    Ok(())
  }

  pub fn model(&self) -> &str {
    &self.model
  }

  pub fn dimension(&self) -> usize {
    self.dimension
  }

  pub fn entries(&self) -> &[IndexEntry] {
    &self.entries
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// k nearest entries to `query`, nearest first
  pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(&IndexEntry, f32)>> {
    if self.is_empty() || k == 0 {
      return Ok(Vec::new());
    }
    if query.len() != self.dimension {
      return Err(TallyError::DimensionMismatch { expected: self.dimension, actual: query.len() });
    }

    let vectors = self.entries.iter().map(|e| e.vector.as_slice());
    Ok(
      similarity::nearest(vectors, query, k)
        .into_iter()
        .map(|(position, distance)| (&self.entries[position], distance))
        .collect(),
    )
  }

  /// Write the index to `path`. Refuses to replace an existing file.
  pub fn persist(&self, path: &Path) -> Result<()> {
    if path.exists() {
      return Err(TallyError::Io(io::Error::new(
        io::ErrorKind::AlreadyExists,
        format!("{} already exists", path.display()),
      )));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
      fs::create_dir_all(parent)?;
    }

    let file_name = path.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();
    let staging = path.with_file_name(format!("{file_name}.tmp"));
    fs::write(&staging, serde_json::to_vec(self)?)?;
    fs::rename(&staging, path)?;

    tracing::debug!(path = %path.display(), entries = self.len(), "index written");
    Ok(())
  }

  pub fn load(path: &Path) -> Result<Self> {
    if !path.is_file() {
      return Err(TallyError::IndexNotFound { path: path.to_path_buf() });
    }

    let bytes = fs::read(path)?;
    let index: VectorIndex =
      serde_json::from_slice(&bytes).map_err(|e| TallyError::index_corrupt(path, e.to_string()))?;
    index.validate(path)?;

    tracing::debug!(path = %path.display(), entries = index.len(), dimension = index.dimension, "index loaded");
    Ok(index)
  }

  fn validate(&self, path: &Path) -> Result<()> {
    if self.version != FORMAT_VERSION {
      return Err(TallyError::index_corrupt(path, format!("unsupported format version {}", self.version)));
    }
    if self.metric != METRIC {
      return Err(TallyError::index_corrupt(path, format!("unsupported metric '{}'", self.metric)));
    }
    if let Some(bad) = self.entries.iter().find(|e| e.vector.len() != self.dimension) {
      return Err(TallyError::index_corrupt(
        path,
        format!("entry {} has {} values, index dimension is {}", bad.key, bad.vector.len(), self.dimension),
      ));
    }
    Ok(())
  }
}

/// Embed every row of `dataset`, in order, into a new index
pub fn build_index(dataset: &Dataset, provider: &dyn EmbeddingProvider) -> Result<VectorIndex> {
  let mut index = VectorIndex::new(provider.model());
  if dataset.is_empty() {
    return Ok(index);
  }

  let texts: Vec<String> = dataset.records().iter().map(|r| r.embedding_text()).collect();
  let vectors = provider.embed_documents(&texts)?;
  if vectors.len() != texts.len() {
    return Err(TallyError::provider(format!(
      "asked for {} embeddings, received {}",
      texts.len(),
      vectors.len()
    )));
  }

  for (key, vector) in dataset.keys().iter().zip(vectors) {
    index.push(key.clone(), vector)?;
  }

  Ok(index)
}

/// Build and persist an index at `path` unless one is already there
pub fn ensure_index(
  dataset: &Dataset,
  provider: &dyn EmbeddingProvider,
  path: &Path,
) -> Result<BuildOutcome> {
  if path.exists() {
    bentley::info!("Index already exists at {}. Delete it to rebuild.", path.display());
    return Ok(BuildOutcome::Skipped { path: path.to_path_buf() });
  }

  bentley::info!("Embedding {} rows with {}...", dataset.len(), provider.model());
  let index = build_index(dataset, provider)?;
  index.persist(path)?;

  Ok(BuildOutcome::Built { entries: index.len(), dimension: index.dimension() })
}
