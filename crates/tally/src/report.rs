//! Retrieval-backed summaries for the assistant's information and advice tools.

use std::collections::HashSet;

use crate::retriever::{RetrievalResult, Retriever, DEFAULT_TOP_K};

const NATURAL_DISASTER_ADVICE: &str =
  "Natural disasters: follow early warnings from BMKG, keep an emergency bag ready, and know your evacuation routes.";
const DISEASE_ADVICE: &str =
  "Diseases: keep a healthy lifestyle, get regular check-ups, and follow the government vaccination programme.";
const SOCIAL_DISASTER_ADVICE: &str =
  "Social disasters: stay alert to your surroundings and follow the applicable safety protocols.";

/// `1234567` -> `"1,234,567"`
pub fn group_thousands(value: u64) -> String {
  let digits = value.to_string();
  let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
  for (i, ch) in digits.chars().enumerate() {
    if i > 0 && (digits.len() - i) % 3 == 0 {
      grouped.push(',');
    }
    grouped.push(ch);
  }
  grouped
}

/// One line per distinct cause among the nearest records for `topic`
pub fn cause_digest(retriever: &Retriever, topic: &str) -> String {
  match retriever.get_relevant(topic, DEFAULT_TOP_K) {
    Ok(results) => render_cause_digest(topic, &results),
    Err(e) => format!("Could not search the database for '{topic}': {e}"),
  }
}

pub fn render_cause_digest(topic: &str, results: &[RetrievalResult]) -> String {
  if results.is_empty() {
    return format!("No information about '{topic}' is available in the internal database.");
  }

  let mut seen = HashSet::new();
  let lines: Vec<String> = results
    .iter()
    .filter(|r| !r.record.cause().is_empty() && seen.insert(r.record.cause().to_string()))
    .map(|r| {
      let record = &r.record;
      let deaths = record
        .total_deaths()
        .map(group_thousands)
        .unwrap_or_else(|_| record.field(crate::dataset::TOTAL_DEATHS).to_string());
      format!(
        "- '{}' (type: {}): {} deaths recorded in {}. (Source: {}).",
        record.cause(),
        record.kind(),
        deaths,
        record.field(crate::dataset::YEAR),
        record.source()
      )
    })
    .collect();

  if lines.is_empty() {
    return format!("Data for '{topic}' was found, but none of it could be summarised.");
  }

  format!("Summary of information found for '{topic}':\n{}", lines.join("\n"))
}

/// General advice for the categories of the nearest records for `topic`
pub fn recommendations(retriever: &Retriever, topic: &str) -> String {
  match retriever.get_relevant(topic, DEFAULT_TOP_K) {
    Ok(results) => render_recommendations(&results),
    Err(e) => format!("Could not search the database for '{topic}': {e}"),
  }
}

pub fn render_recommendations(results: &[RetrievalResult]) -> String {
  if results.is_empty() {
    return "No information found. General advice: look after your health and consult a medical professional.".to_string();
  }

  let mut advice: Vec<&str> = Vec::new();
  for result in results {
    let kind = result.record.kind();
    let line = if kind.contains("Bencana Alam") {
      Some(NATURAL_DISASTER_ADVICE)
    } else if kind.contains("Penyakit") || kind.contains("Non Alam") {
      Some(DISEASE_ADVICE)
    } else if kind.contains("Bencana Sosial") {
      Some(SOCIAL_DISASTER_ADVICE)
    } else {
      None
    };

    if let Some(line) = line.filter(|l| !advice.contains(l)) {
      advice.push(line);
    }
  }

  if advice.is_empty() {
    return "No specific recommendation can be given from the available data. Please look after your health.".to_string();
  }

  format!("Based on the categories identified, some general recommendations:\n- {}", advice.join("\n- "))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::dataset::{Dataset, REQUIRED_COLUMNS};

  fn results(rows: &[[&str; 5]]) -> Vec<RetrievalResult> {
    let data = Dataset::from_rows(
      REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect(),
      rows.iter().map(|r| r.iter().map(|v| v.to_string()).collect()).collect(),
    );
    data
      .records()
      .iter()
      .enumerate()
      .map(|(row, record)| RetrievalResult { row, record: record.clone(), distance: 0.0 })
      .collect()
  }

  #[test]
  fn test_group_thousands() {
    assert_eq!(group_thousands(0), "0");
    assert_eq!(group_thousands(999), "999");
    assert_eq!(group_thousands(1000), "1,000");
    assert_eq!(group_thousands(1234567), "1,234,567");
  }

  #[test]
  fn test_digest_one_line_per_cause() {
    let found = results(&[
      ["Flu", "Penyakit", "2015", "1500", "Kemenkes"],
      ["Flu", "Penyakit", "2016", "1700", "Kemenkes"],
      ["", "Penyakit", "2016", "1", "x"],
      ["Banjir", "Bencana Alam", "2016", "20", "BNPB"],
    ]);
    let text = render_cause_digest("flu", &found);
    assert!(text.starts_with("Summary of information found for 'flu':"));
    assert_eq!(text.lines().count(), 3);
    assert!(text.contains("1,500 deaths recorded in 2015"));
    assert!(!text.contains("1,700"));
  }

  #[test]
  fn test_digest_empty_and_unnamed() {
    assert!(render_cause_digest("flu", &[]).contains("No information"));
    let unnamed = results(&[["", "Penyakit", "2016", "1", "x"]]);
    assert!(render_cause_digest("flu", &unnamed).contains("none of it could be summarised"));
  }

  #[test]
  fn test_recommendations_by_category() {
    let found = results(&[
      ["Banjir", "Bencana Alam", "2016", "20", "BNPB"],
      ["Flu", "Bencana Non Alam dan Penyakit", "2015", "1", "x"],
      ["Gempa", "Bencana Alam", "2017", "5", "BNPB"],
    ]);
    let text = render_recommendations(&found);
    assert_eq!(text.matches("Natural disasters").count(), 1);
    assert!(text.contains("Diseases"));
    assert!(!text.contains("Social disasters"));
  }

  #[test]
  fn test_recommendations_fallbacks() {
    assert!(render_recommendations(&[]).contains("No information found"));
    let other = results(&[["X", "Lainnya", "2016", "1", "x"]]);
    assert!(render_recommendations(&other).contains("No specific recommendation"));
  }
}
