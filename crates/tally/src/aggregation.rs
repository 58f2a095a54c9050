//! Deterministic statistics computed straight from dataset rows.
//!
//! Both entry points take typed parameters; free-text parsing lives in
//! [`crate::query`]. Failures are [`AggregationError`] values meant to be
//! shown to the user, never panics.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use thiserror::Error;

use crate::dataset::{Dataset, FieldError, Record};
use crate::report::group_thousands;
use crate::retriever::{RetrievalResult, Retriever};

/// Rows fetched from the vector index before the cause filter is applied
pub const TREND_CANDIDATES: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
  Highest,
  Lowest,
}

impl Direction {
  pub fn label(self) -> &'static str {
    match self {
      Direction::Highest => "highest",
      Direction::Lowest => "lowest",
    }
  }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AggregationError {
  #[error("No year found in the question.")]
  NoYear,

  #[error("No data for year {year}.")]
  NoDataForYear { year: i32 },

  #[error("Ambiguous query: ask for the highest (tertinggi) or lowest (terendah) cause of death.")]
  AmbiguousDirection,

  #[error("Nothing to search for: the question has no search term.")]
  EmptyTerm,

  #[error("No historical data found for '{term}'.")]
  NoHistoricalData { term: String },

  #[error("Data was found, but none of it matches '{term}' specifically.")]
  NoMatchingData { term: String },

  #[error("Data for '{term}' was found, but {years} distinct year(s) is not enough for a trend.")]
  InsufficientData { term: String, years: usize },

  #[error("Dataset row {row} is malformed: {source}")]
  MalformedField {
    row: usize,
    #[source]
    source: FieldError,
  },

  #[error("Retrieval failed: {message}")]
  Retrieval { message: String },
}

fn malformed(row: usize) -> impl Fn(FieldError) -> AggregationError {
  move |source| AggregationError::MalformedField { row, source }
}

/// The single highest or lowest record within one year
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extreme {
  pub year: i32,
  pub direction: Direction,
  pub row: usize,
  pub cause: String,
  pub kind: String,
  pub total_deaths: u64,
}

/// Record with the largest (or smallest) death count reported for `year`.
///
/// Ties go to the lowest dataset row. Rows whose year cannot be parsed never
/// match; a matching row with an unusable count is an error.
pub fn find_extremes(
  dataset: &Dataset,
  year: i32,
  direction: Direction,
) -> Result<Extreme, AggregationError> {
  let mut best: Option<(usize, &Record, u64)> = None;

  for (row, record) in dataset.records().iter().enumerate() {
    match record.year() {
      Ok(record_year) if record_year == year => {}
      Ok(_) => continue,
      Err(e) => {
        tracing::debug!(row, error = %e, "skipping row without a usable year");
        continue;
      }
    }

    let deaths = record.total_deaths().map_err(malformed(row))?;
    let replaces = match best {
      None => true,
      Some((_, _, current)) => match direction {
        Direction::Highest => deaths > current,
        Direction::Lowest => deaths < current,
      },
    };
    if replaces {
      best = Some((row, record, deaths));
    }
  }

  let (row, record, total_deaths) = best.ok_or(AggregationError::NoDataForYear { year })?;
  Ok(Extreme {
    year,
    direction,
    row,
    cause: record.cause().to_string(),
    kind: record.kind().to_string(),
    total_deaths,
  })
}

impl fmt::Display for Extreme {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "Analysis for year {}:", self.year)?;
    writeln!(f, "- Cause of death with the {} count: {}", self.direction.label(), self.cause)?;
    writeln!(f, "- Type: {}", self.kind)?;
    write!(f, "- Total deaths: {} people.", group_thousands(self.total_deaths))
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearPoint {
  pub year: i32,
  pub total_deaths: u64,
}

/// Statistics for one cause across years, one report per year
#[derive(Debug, Clone, PartialEq)]
pub struct TrendSummary {
  pub term: String,
  /// Most frequent cause label among the yearly reports
  pub cause: String,
  pub first_year: i32,
  pub last_year: i32,
  /// Number of distinct years
  pub reports: usize,
  pub mean: f64,
  pub max: YearPoint,
  pub min: YearPoint,
  /// Yearly reports, year ascending
  pub points: Vec<YearPoint>,
}

/// Trend of the cause named by `term` across the years it was reported
pub fn analyze_trend(retriever: &Retriever, term: &str) -> Result<TrendSummary, AggregationError> {
  let term = term.trim();
  if term.is_empty() {
    return Err(AggregationError::EmptyTerm);
  }

  let candidates = retriever
    .get_relevant(term, TREND_CANDIDATES)
    .map_err(|e| AggregationError::Retrieval { message: e.to_string() })?;

  summarize_trend(term, &candidates)
}

/// Trend statistics over already-retrieved candidates.
///
/// Keeps candidates whose cause contains the first word of `term`
/// (case-insensitive), then the first candidate per year in retrieval order.
pub fn summarize_trend(
  term: &str,
  candidates: &[RetrievalResult],
) -> Result<TrendSummary, AggregationError> {
  let term = term.trim();
  let keyword = term.split_whitespace().next().ok_or(AggregationError::EmptyTerm)?.to_lowercase();

  if candidates.is_empty() {
    return Err(AggregationError::NoHistoricalData { term: term.to_string() });
  }

  let matching: Vec<&RetrievalResult> =
    candidates.iter().filter(|c| c.record.cause().to_lowercase().contains(&keyword)).collect();
  if matching.is_empty() {
    return Err(AggregationError::NoMatchingData { term: term.to_string() });
  }

  let mut seen_years = HashSet::new();
  let mut yearly: Vec<(YearPoint, &str)> = Vec::new();
  for candidate in matching {
    let year = candidate.record.year().map_err(malformed(candidate.row))?;
    if !seen_years.insert(year) {
      continue;
    }
    let total_deaths = candidate.record.total_deaths().map_err(malformed(candidate.row))?;
    yearly.push((YearPoint { year, total_deaths }, candidate.record.cause()));
  }
  yearly.sort_by_key(|(point, _)| point.year);

  if yearly.len() < 2 {
    return Err(AggregationError::InsufficientData { term: term.to_string(), years: yearly.len() });
  }

  let points: Vec<YearPoint> = yearly.iter().map(|(point, _)| *point).collect();
  let cause = most_frequent(yearly.iter().map(|(_, cause)| *cause));

  // u128 so counts near the u64 limit cannot overflow
  let total: u128 = points.iter().map(|p| u128::from(p.total_deaths)).sum();
  let mean = total as f64 / points.len() as f64;

  // first extreme in year order wins ties
  let mut max = points[0];
  let mut min = points[0];
  for point in &points[1..] {
    if point.total_deaths > max.total_deaths {
      max = *point;
    }
    if point.total_deaths < min.total_deaths {
      min = *point;
    }
  }

  Ok(TrendSummary {
    term: term.to_string(),
    cause,
    first_year: points[0].year,
    last_year: points[points.len() - 1].year,
    reports: points.len(),
    mean,
    max,
    min,
    points,
  })
}

/// Mode of the labels; ties go to the lexicographically smallest
fn most_frequent<'a>(labels: impl Iterator<Item = &'a str>) -> String {
  let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
  for label in labels {
    *counts.entry(label).or_default() += 1;
  }

  let mut best: Option<(&str, usize)> = None;
  for (label, count) in counts {
    if best.map_or(true, |(_, best_count)| count > best_count) {
      best = Some((label, count));
    }
  }
  best.map(|(label, _)| label.to_string()).unwrap_or_default()
}

impl fmt::Display for TrendSummary {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mean = self.mean.round().max(0.0) as u64;
    writeln!(f, "Trend analysis for '{}', {} - {}:", self.cause, self.first_year, self.last_year)?;
    writeln!(f, "- Yearly reports: {}", self.reports)?;
    writeln!(f, "- Average deaths: {} per year", group_thousands(mean))?;
    writeln!(f, "- Peak: {} deaths ({})", group_thousands(self.max.total_deaths), self.max.year)?;
    write!(f, "- Lowest: {} deaths ({})", group_thousands(self.min.total_deaths), self.min.year)
  }
}
