mod common;

use common::{write_dataset, sample_rows, DriftingEmbedder, FailingEmbedder, KeywordEmbedder};
use std::fs;
use tally::{build_index, ensure_index, BuildOutcome, Dataset, TallyError, VectorIndex};

#[test]
fn test_build_index_one_entry_per_row_in_order() {
  let temp = tempfile::tempdir().unwrap();
  let dataset = Dataset::load(write_dataset(temp.path(), &sample_rows())).unwrap();
  let provider = KeywordEmbedder::new(32);

  let index = build_index(&dataset, &provider).unwrap();

  assert_eq!(index.len(), dataset.len());
  assert_eq!(index.dimension(), 32);
  assert_eq!(index.model(), "keyword-test");
  for (row, entry) in index.entries().iter().enumerate() {
    assert_eq!(dataset.position_of(&entry.key), Some(row));
  }
}

#[test]
fn test_build_index_rejects_dimension_drift() {
  let temp = tempfile::tempdir().unwrap();
  let dataset = Dataset::load(write_dataset(temp.path(), &sample_rows())).unwrap();

  let err = build_index(&dataset, &DriftingEmbedder).unwrap_err();
  assert!(matches!(err, TallyError::DimensionMismatch { expected: 4, actual: 5 }));
}

#[test]
fn test_build_index_propagates_provider_failure() {
  let temp = tempfile::tempdir().unwrap();
  let dataset = Dataset::load(write_dataset(temp.path(), &sample_rows())).unwrap();

  let err = build_index(&dataset, &FailingEmbedder).unwrap_err();
  assert!(err.to_string().contains("service unavailable"));
}

#[test]
fn test_empty_dataset_builds_empty_index_without_provider() {
  let temp = tempfile::tempdir().unwrap();
  let dataset = Dataset::load(write_dataset(temp.path(), &[])).unwrap();
  let provider = KeywordEmbedder::new(8);

  let index = build_index(&dataset, &provider).unwrap();
  assert!(index.is_empty());
  assert_eq!(provider.calls(), 0);
}

#[test]
fn test_ensure_index_builds_then_skips() {
  let temp = tempfile::tempdir().unwrap();
  let dataset = Dataset::load(write_dataset(temp.path(), &sample_rows())).unwrap();
  let index_path = temp.path().join("data").join("index.json");
  let provider = KeywordEmbedder::new(16);

  let first = ensure_index(&dataset, &provider, &index_path).unwrap();
  assert_eq!(first, BuildOutcome::Built { entries: 6, dimension: 16 });
  assert_eq!(provider.calls(), 1);
  let written = fs::read(&index_path).unwrap();

  let second = ensure_index(&dataset, &provider, &index_path).unwrap();
  assert_eq!(second, BuildOutcome::Skipped { path: index_path.clone() });
  assert_eq!(provider.calls(), 1);
  assert_eq!(fs::read(&index_path).unwrap(), written);
}

#[test]
fn test_ensure_index_never_overwrites_foreign_file() {
  let temp = tempfile::tempdir().unwrap();
  let dataset = Dataset::load(write_dataset(temp.path(), &sample_rows())).unwrap();
  let index_path = temp.path().join("index.json");
  fs::write(&index_path, "placeholder").unwrap();

  let outcome = ensure_index(&dataset, &KeywordEmbedder::new(16), &index_path).unwrap();
  assert!(matches!(outcome, BuildOutcome::Skipped { .. }));
  assert_eq!(fs::read_to_string(&index_path).unwrap(), "placeholder");
}

#[test]
fn test_persisted_index_round_trips() {
  let temp = tempfile::tempdir().unwrap();
  let dataset = Dataset::load(write_dataset(temp.path(), &sample_rows())).unwrap();
  let index_path = temp.path().join("index.json");
  let provider = KeywordEmbedder::new(16);

  ensure_index(&dataset, &provider, &index_path).unwrap();
  let loaded = VectorIndex::load(&index_path).unwrap();
  assert_eq!(loaded, build_index(&dataset, &provider).unwrap());
}
