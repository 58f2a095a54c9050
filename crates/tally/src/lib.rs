//! Tally - Retrieval and Statistics over Reported Causes of Death
//!
//! Builds a keyed vector index over the rows of a causes-of-death dataset,
//! answers nearest-neighbour queries against it, and computes deterministic
//! per-year extremes and multi-year trends straight from the table.

pub mod aggregation;
pub mod commands;
pub mod config;
pub mod dataset;
pub mod embedding;
pub mod error;
pub mod index;
pub mod query;
pub mod report;
pub mod retriever;
pub mod similarity;

pub use aggregation::{AggregationError, Direction, Extreme, TrendSummary};
pub use config::Settings;
pub use dataset::{Dataset, Record, RowKey};
pub use embedding::{CohereEmbeddings, EmbeddingProvider};
pub use error::{Result, TallyError};
pub use index::{build_index, ensure_index, BuildOutcome, VectorIndex};
pub use retriever::{RetrievalResult, Retriever, DEFAULT_TOP_K};
