//! Embedding providers.
//!
//! The index and the retriever only see [`EmbeddingProvider`]; the Cohere
//! client is the production implementation and tests plug in their own.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::Settings;
use crate::error::{Result, TallyError};

/// Cohere accepts at most this many texts per embed call
const MAX_BATCH: usize = 96;
const USER_AGENT: &str = concat!("tally/", env!("CARGO_PKG_VERSION"));

/// Source of embedding vectors. Same model and dimension at build and query time.
pub trait EmbeddingProvider: Send + Sync {
  /// Model identifier, persisted with the index
  fn model(&self) -> &str;

  /// One vector per text, in input order
  fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

  fn embed_query(&self, text: &str) -> Result<Vec<f32>>;
}

impl<T: EmbeddingProvider + ?Sized> EmbeddingProvider for Arc<T> {
  fn model(&self) -> &str {
    (**self).model()
  }

  fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
    (**self).embed_documents(texts)
  }

  fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
    (**self).embed_query(text)
  }
}

impl<T: EmbeddingProvider + ?Sized> EmbeddingProvider for Box<T> {
  fn model(&self) -> &str {
    (**self).model()
  }

  fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
    (**self).embed_documents(texts)
  }

  fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
    (**self).embed_query(text)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputType {
  SearchDocument,
  SearchQuery,
}

impl InputType {
  fn as_str(self) -> &'static str {
    match self {
      InputType::SearchDocument => "search_document",
      InputType::SearchQuery => "search_query",
    }
  }
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
  texts: &'a [String],
  model: &'a str,
  input_type: &'static str,
  truncate: &'static str,
}

#[derive(Deserialize)]
struct EmbedResponse {
  embeddings: Vec<Vec<f32>>,
}

#[derive(Deserialize)]
struct ErrorBody {
  message: String,
}

/// Blocking client for Cohere's `/v1/embed` endpoint
pub struct CohereEmbeddings {
  client: reqwest::blocking::Client,
  api_key: String,
  model: String,
  endpoint: String,
}

impl CohereEmbeddings {
  pub fn new(api_key: String, model: String, api_base: &str) -> Result<Self> {
    let client = reqwest::blocking::Client::builder()
      .user_agent(USER_AGENT)
      .build()
      .map_err(|e| TallyError::provider(format!("failed to create HTTP client: {e}")))?;

    Ok(Self {
      client,
      api_key,
      model,
      endpoint: format!("{}/v1/embed", api_base.trim_end_matches('/')),
    })
  }

  /// Fails with [`TallyError::MissingCredential`] when the API key is not set
  pub fn from_settings(settings: &Settings) -> Result<Self> {
    let api_key = settings.credential()?;
    Self::new(api_key, settings.model.clone(), &settings.api_base)
  }

  fn embed(&self, texts: &[String], input_type: InputType) -> Result<Vec<Vec<f32>>> {
    let mut vectors = Vec::with_capacity(texts.len());

    for batch in texts.chunks(MAX_BATCH) {
      tracing::debug!(size = batch.len(), input_type = input_type.as_str(), "embed request");
      let request = EmbedRequest {
        texts: batch,
        model: &self.model,
        input_type: input_type.as_str(),
        truncate: "END",
      };

      let response = self
        .client
        .post(&self.endpoint)
        .bearer_auth(&self.api_key)
        .json(&request)
        .send()
        .map_err(|e| TallyError::provider(format!("request failed: {e}")))?;

      let status = response.status();
      let body = response
        .text()
        .map_err(|e| TallyError::provider(format!("failed to read response: {e}")))?;

      let mut embedded = parse_response(status.as_u16(), &body)?;
      if embedded.len() != batch.len() {
        return Err(TallyError::provider(format!(
          "asked for {} embeddings, received {}",
          batch.len(),
          embedded.len()
        )));
      }
      vectors.append(&mut embedded);
    }

    Ok(vectors)
  }
}

impl EmbeddingProvider for CohereEmbeddings {
  fn model(&self) -> &str {
    &self.model
  }

  fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
    self.embed(texts, InputType::SearchDocument)
  }

  fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
    let texts = [text.to_string()];
    self
      .embed(&texts, InputType::SearchQuery)?
      .pop()
      .ok_or_else(|| TallyError::provider("empty response for query embedding"))
  }
}

fn parse_response(status: u16, body: &str) -> Result<Vec<Vec<f32>>> {
  if !(200..300).contains(&status) {
    let message = serde_json::from_str::<ErrorBody>(body)
      .map(|e| e.message)
      .unwrap_or_else(|_| body.trim().to_string());
    return Err(TallyError::provider(format!("HTTP {status}: {message}")));
  }

  let parsed: EmbedResponse = serde_json::from_str(body)
    .map_err(|e| TallyError::provider(format!("invalid embed response: {e}")))?;
  Ok(parsed.embeddings)
}
