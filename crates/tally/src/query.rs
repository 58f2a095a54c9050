//! Free-text front end for the aggregation functions.
//!
//! Turns questions like "penyebab kematian tertinggi tahun 2015" into typed
//! calls and renders either the answer or the failure as display text.

use regex::Regex;
use std::sync::OnceLock;

use crate::aggregation::{self, AggregationError, Direction};
use crate::dataset::Dataset;
use crate::retriever::Retriever;

const HIGHEST_TOKENS: [&str; 2] = ["tertinggi", "highest"];
const LOWEST_TOKENS: [&str; 2] = ["terendah", "lowest"];
const NOISE_WORDS: [&str; 6] = ["penyakit", "analisis", "tren", "trend", "analysis", "disease"];

fn year_pattern() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| Regex::new(r"\b(\d{4})\b").expect("year pattern is valid"))
}

/// First standalone 4-digit number in `text`
pub fn extract_year(text: &str) -> Option<i32> {
  year_pattern().captures(text).and_then(|c| c[1].parse().ok())
}

/// Case-insensitive substring match; "highest" wins when both appear
pub fn extract_direction(text: &str) -> Option<Direction> {
  let lower = text.to_lowercase();
  if HIGHEST_TOKENS.iter().any(|t| lower.contains(t)) {
    Some(Direction::Highest)
  } else if LOWEST_TOKENS.iter().any(|t| lower.contains(t)) {
    Some(Direction::Lowest)
  } else {
    None
  }
}

/// The question with noise words such as "tren" or "penyakit" removed
pub fn trend_term(text: &str) -> String {
  text
    .split_whitespace()
    .filter(|word| {
      let bare = word.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase();
      !NOISE_WORDS.contains(&bare.as_str())
    })
    .collect::<Vec<_>>()
    .join(" ")
}

/// Extremes lookup driven by a free-text question.
///
/// Checks run in order: year present, data for that year, direction.
pub fn find_extremes_query(dataset: &Dataset, text: &str) -> Result<aggregation::Extreme, AggregationError> {
  let year = extract_year(text).ok_or(AggregationError::NoYear)?;

  match extract_direction(text) {
    Some(direction) => aggregation::find_extremes(dataset, year, direction),
    None if dataset.records().iter().any(|r| r.year() == Ok(year)) => {
      Err(AggregationError::AmbiguousDirection)
    }
    None => Err(AggregationError::NoDataForYear { year }),
  }
}

pub fn find_extremes_text(dataset: &Dataset, text: &str) -> String {
  match find_extremes_query(dataset, text) {
    Ok(extreme) => extreme.to_string(),
    Err(e) => e.to_string(),
  }
}

pub fn analyze_trend_text(retriever: &Retriever, text: &str) -> String {
  match aggregation::analyze_trend(retriever, &trend_term(text)) {
    Ok(summary) => summary.to_string(),
    Err(e) => e.to_string(),
  }
}
