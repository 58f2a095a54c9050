use anyhow::{Context, Result};
use colored::*;
use std::fs;
use std::path::Path;

use crate::config::Settings;
use crate::dataset::Dataset;
use crate::embedding::CohereEmbeddings;
use crate::index::{self, BuildOutcome};
use crate::query;
use crate::report;
use crate::retriever::Retriever;

/// Build the vector index, or report that one already exists
pub fn build_index(settings: &Settings, force: bool) -> Result<()> {
  if !force && settings.index_path.exists() {
    print_skipped(&settings.index_path);
    return Ok(());
  }

  let dataset = Dataset::load(&settings.dataset_path).context("Failed to load dataset")?;
  let provider = CohereEmbeddings::from_settings(settings)?;

  if force && settings.index_path.exists() {
    bentley::warn!("Removing existing index at {}", settings.index_path.display());
    fs::remove_file(&settings.index_path).with_context(|| {
      format!("Failed to remove existing index {}", settings.index_path.display())
    })?;
  }

  bentley::announce!("Building vector index from {}", settings.dataset_path.display());
  match index::ensure_index(&dataset, &provider, &settings.index_path)? {
    BuildOutcome::Built { entries, dimension } => {
      bentley::success!("Indexed {} rows ({} dimensions)", entries, dimension);
      println!("{} Index written to {}", "✓".green(), settings.index_path.display().to_string().cyan());
    }
    BuildOutcome::Skipped { path } => print_skipped(&path),
  }

  Ok(())
}

fn print_skipped(path: &Path) {
  println!(
    "{} Index already exists at {}; nothing rebuilt (use --force to rebuild)",
    "ℹ".blue(),
    path.display().to_string().cyan()
  );
}

pub fn search(settings: &Settings, terms: &[String], k: usize, json: bool) -> Result<()> {
  let retriever = Retriever::open(settings)?;
  let query = terms.join(" ");
  let results = retriever.get_relevant(&query, k)?;

  if json {
    let values: Vec<serde_json::Value> = results.iter().map(|r| r.to_json()).collect();
    println!("{}", serde_json::to_string_pretty(&values)?);
    return Ok(());
  }

  if results.is_empty() {
    println!("No matches found for: {}", query.yellow());
    return Ok(());
  }

  for result in &results {
    let record = &result.record;
    println!(
      "{} {} {} {}",
      format!("[{:.4}]", result.distance).dimmed(),
      record.cause().bold(),
      format!("({})", record.kind()).blue(),
      record.field(crate::dataset::YEAR).yellow()
    );
    println!(
      "    {} deaths, source: {}",
      record.field(crate::dataset::TOTAL_DEATHS),
      record.source()
    );
  }

  Ok(())
}

/// Highest/lowest cause for a year. Works without the index or a credential.
pub fn extremes(settings: &Settings, terms: &[String]) -> Result<()> {
  let dataset = Dataset::load(&settings.dataset_path).context("Failed to load dataset")?;
  println!("{}", query::find_extremes_text(&dataset, &terms.join(" ")));
  Ok(())
}

pub fn trend(settings: &Settings, terms: &[String]) -> Result<()> {
  let retriever = Retriever::open(settings)?;
  println!("{}", query::analyze_trend_text(&retriever, &terms.join(" ")));
  Ok(())
}

pub fn info(settings: &Settings, terms: &[String]) -> Result<()> {
  let retriever = Retriever::open(settings)?;
  println!("{}", report::cause_digest(&retriever, &terms.join(" ")));
  Ok(())
}

pub fn recommend(settings: &Settings, terms: &[String]) -> Result<()> {
  let retriever = Retriever::open(settings)?;
  println!("{}", report::recommendations(&retriever, &terms.join(" ")));
  Ok(())
}
