//! Query-time nearest-neighbour lookup over the persisted index.
//!
//! A [`Retriever`] is built once by the host and shared read-only; it never
//! builds an index on its own.

use std::path::Path;

use crate::config::Settings;
use crate::dataset::{Dataset, Record};
use crate::embedding::{CohereEmbeddings, EmbeddingProvider};
use crate::error::{Result, TallyError};
use crate::index::VectorIndex;

pub const DEFAULT_TOP_K: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct RetrievalResult {
  /// Position of the record in the loaded dataset
  pub row: usize,
  pub record: Record,
  /// Squared Euclidean distance to the query, lower is closer
  pub distance: f32,
}

impl RetrievalResult {
  /// Every dataset column plus `distance`
  pub fn to_json(&self) -> serde_json::Value {
    let mut map = self.record.to_json_map();
    map.insert("distance".to_string(), serde_json::json!(self.distance));
    serde_json::Value::Object(map)
  }
}

pub struct Retriever {
  dataset: Dataset,
  index: VectorIndex,
  provider: Box<dyn EmbeddingProvider>,
}

impl std::fmt::Debug for Retriever {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Retriever")
      .field("rows", &self.dataset.len())
      .field("entries", &self.index.len())
      .field("model", &self.provider.model())
      .finish()
  }
}

impl Retriever {
  pub fn load(
    dataset_path: &Path,
    index_path: &Path,
    provider: Box<dyn EmbeddingProvider>,
  ) -> Result<Self> {
    let dataset = Dataset::load(dataset_path)?;
    let index = VectorIndex::load(index_path)?;
    Self::from_parts(dataset, index, provider)
  }

  /// Production wiring: dataset and index from `settings`, Cohere embeddings
  pub fn open(settings: &Settings) -> Result<Self> {
    let dataset = Dataset::load(&settings.dataset_path)?;
    let provider = CohereEmbeddings::from_settings(settings)?;
    let index = VectorIndex::load(&settings.index_path)?;
    Self::from_parts(dataset, index, Box::new(provider))
  }

  pub fn from_parts(
    dataset: Dataset,
    index: VectorIndex,
    provider: Box<dyn EmbeddingProvider>,
  ) -> Result<Self> {
    if index.model() != provider.model() {
      return Err(TallyError::ModelMismatch {
        index_model: index.model().to_string(),
        provider_model: provider.model().to_string(),
      });
    }

    let stale = index.entries().iter().filter(|e| dataset.position_of(&e.key).is_none()).count();
    if stale > 0 {
      bentley::warn!(
        "{} of {} index entries no longer match a dataset row and will be skipped",
        stale,
        index.len()
      );
    }
    if index.len() != dataset.len() {
      bentley::warn!("Index has {} entries but the dataset has {} rows", index.len(), dataset.len());
    }

    Ok(Self { dataset, index, provider })
  }

  pub fn dataset(&self) -> &Dataset {
    &self.dataset
  }

  pub fn index(&self) -> &VectorIndex {
    &self.index
  }

  /// Up to `k` records nearest to `query`, nearest first.
  ///
  /// Hits whose key no longer resolves to a dataset row are dropped, so fewer
  /// than `k` results may come back. Empty index or dataset gives an empty
  /// result without calling the provider.
  pub fn get_relevant(&self, query: &str, k: usize) -> Result<Vec<RetrievalResult>> {
    if k == 0 || self.index.is_empty() || self.dataset.is_empty() {
      return Ok(Vec::new());
    }

    let query_vector = self.provider.embed_query(query)?;
    let hits = self.index.search(&query_vector, k)?;
    tracing::debug!(query, k, hits = hits.len(), "vector search");

    let results = hits
      .into_iter()
      .filter_map(|(entry, distance)| {
        let row = self.dataset.position_of(&entry.key)?;
        let record = self.dataset.get(row)?.clone();
        Some(RetrievalResult { row, record, distance })
      })
      .collect();

    Ok(results)
  }
}
