use serial_test::serial;
use std::env;
use std::path::PathBuf;
use tally::config::{DATASET_ENV, INDEX_ENV, MODEL_ENV};
use tally::{Settings, TallyError};

fn clear_env() {
  for name in [DATASET_ENV, INDEX_ENV, MODEL_ENV, "TALLY_TEST_CREDENTIAL"] {
    env::remove_var(name);
  }
}

#[test]
#[serial]
fn test_env_overrides_file_values() {
  clear_env();
  let temp = tempfile::tempdir().unwrap();
  let config = temp.path().join("tally.json");
  std::fs::write(&config, r#"{"dataset_path": "from-file.csv", "model": "file-model"}"#).unwrap();

  env::set_var(DATASET_ENV, "/data/from-env.csv");
  let settings = Settings::load(Some(&config)).unwrap();
  clear_env();

  assert_eq!(settings.dataset_path, PathBuf::from("/data/from-env.csv"));
  assert_eq!(settings.model, "file-model");
}

#[test]
#[serial]
fn test_blank_env_values_are_ignored() {
  clear_env();
  env::set_var(INDEX_ENV, "   ");
  env::set_var(MODEL_ENV, "embed-english-v3.0");
  let settings = Settings::default().with_env_overrides();
  clear_env();

  assert_eq!(settings.index_path, Settings::default().index_path);
  assert_eq!(settings.model, "embed-english-v3.0");
}

#[test]
#[serial]
fn test_credential_from_configured_variable() {
  clear_env();
  let settings =
    Settings { credential_env: "TALLY_TEST_CREDENTIAL".to_string(), ..Default::default() };
  assert!(matches!(settings.credential(), Err(TallyError::MissingCredential { .. })));

  env::set_var("TALLY_TEST_CREDENTIAL", " secret ");
  let credential = settings.credential();
  clear_env();

  assert_eq!(credential.unwrap(), "secret");
}
