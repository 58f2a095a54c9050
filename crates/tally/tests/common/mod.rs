#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use tally::{EmbeddingProvider, Result, TallyError};

pub const HEADER: &str = "Cause,Type,Year,Total Deaths,Source";
pub const MODEL: &str = "keyword-test";

/// Deterministic bag-of-words embedder: every word bumps one hashed bucket.
pub struct KeywordEmbedder {
  pub dimension: usize,
  pub model: String,
  calls: AtomicUsize,
}

impl KeywordEmbedder {
  pub fn new(dimension: usize) -> Self {
    Self { dimension, model: MODEL.to_string(), calls: AtomicUsize::new(0) }
  }

  pub fn with_model(mut self, model: &str) -> Self {
    self.model = model.to_string();
    self
  }

  pub fn calls(&self) -> usize {
    self.calls.load(Ordering::SeqCst)
  }

  fn vector(&self, text: &str) -> Vec<f32> {
    let mut vector = vec![0.0; self.dimension];
    for word in text.split_whitespace() {
      let word = word.to_lowercase();
      let hash = word.bytes().fold(2_166_136_261u32, |h, b| (h ^ b as u32).wrapping_mul(16_777_619));
      vector[hash as usize % self.dimension] += 1.0;
    }
    vector
  }
}

impl EmbeddingProvider for KeywordEmbedder {
  fn model(&self) -> &str {
    &self.model
  }

  fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    Ok(texts.iter().map(|t| self.vector(t)).collect())
  }

  fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    Ok(self.vector(text))
  }
}

/// Returns vectors whose length grows with every row
pub struct DriftingEmbedder;

impl EmbeddingProvider for DriftingEmbedder {
  fn model(&self) -> &str {
    MODEL
  }

  fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
    Ok(texts.iter().enumerate().map(|(i, _)| vec![1.0; 4 + i]).collect())
  }

  fn embed_query(&self, _text: &str) -> Result<Vec<f32>> {
    Ok(vec![1.0; 4])
  }
}

pub struct FailingEmbedder;

impl EmbeddingProvider for FailingEmbedder {
  fn model(&self) -> &str {
    MODEL
  }

  fn embed_documents(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
    Err(TallyError::provider("service unavailable"))
  }

  fn embed_query(&self, _text: &str) -> Result<Vec<f32>> {
    Err(TallyError::provider("service unavailable"))
  }
}

pub fn write_dataset(dir: &Path, rows: &[&str]) -> PathBuf {
  let path = dir.join("deaths.csv");
  let mut content = String::from(HEADER);
  for row in rows {
    content.push('\n');
    content.push_str(row);
  }
  content.push('\n');
  fs::write(&path, content).unwrap();
  path
}

pub fn sample_rows() -> Vec<&'static str> {
  vec![
    "Flu,Penyakit,2015,100,Kemenkes",
    "Heart Disease,Penyakit,2015,500,Kemenkes",
    "Banjir,Bencana Alam,2016,20,BNPB",
    "Demam Berdarah,Penyakit,2016,300,Kemenkes",
    "Demam Berdarah,Penyakit,2017,450,Kemenkes",
    "Kerusuhan,Bencana Sosial,2017,12,Polri",
  ]
}
