//! Runtime settings for the dataset, the index file and the embedding provider.
//!
//! Load order: built-in defaults, then the first config file found, then
//! `TALLY_*` environment overrides.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Result, TallyError};

const LOCAL_CONFIG_PATHS: [&str; 2] = ["tally.json", ".tally/config.json"];

pub const DATASET_ENV: &str = "TALLY_DATASET";
pub const INDEX_ENV: &str = "TALLY_INDEX";
pub const MODEL_ENV: &str = "TALLY_MODEL";
pub const API_BASE_ENV: &str = "TALLY_API_BASE";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
  /// Delimited dataset file (one record per row)
  #[serde(default = "default_dataset_path")]
  pub dataset_path: PathBuf,
  /// Persisted vector index
  #[serde(default = "default_index_path")]
  pub index_path: PathBuf,
  /// Embedding model, must be the same at build and query time
  #[serde(default = "default_model")]
  pub model: String,
  #[serde(default = "default_api_base")]
  pub api_base: String,
  /// Name of the environment variable holding the provider API key
  #[serde(default = "default_credential_env")]
  pub credential_env: String,
}

fn default_dataset_path() -> PathBuf {
  PathBuf::from("data/Penyebab Kematian di Indonesia yang Dilaporkan - Clean.csv")
}
fn default_index_path() -> PathBuf {
  PathBuf::from("data/tally_index.json")
}
fn default_model() -> String {
  "embed-multilingual-v3.0".to_string()
}
fn default_api_base() -> String {
  "https://api.cohere.com".to_string()
}
fn default_credential_env() -> String {
  "COHERE_API_KEY".to_string()
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      dataset_path: default_dataset_path(),
      index_path: default_index_path(),
      model: default_model(),
      api_base: default_api_base(),
      credential_env: default_credential_env(),
    }
  }
}

impl Settings {
  /// Load settings from a specific JSON file, without env overrides
  pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| {
      TallyError::config(format!("cannot read config file {}: {e}", path.display()))
    })?;
    serde_json::from_str(&content)
      .map_err(|e| TallyError::config(format!("invalid config file {}: {e}", path.display())))
  }

  /// Resolve settings for this process.
  ///
  /// An explicit path must exist. Without one, the local config paths and
  /// then `~/.tally/config.json` are tried before falling back to defaults.
  pub fn load(explicit: Option<&Path>) -> Result<Self> {
    let base = match explicit {
      Some(path) => Self::load_from_file(path)?,
      None => match find_config_file() {
        Some(path) => {
          tracing::debug!(path = %path.display(), "using config file");
          Self::load_from_file(path)?
        }
        None => Self::default(),
      },
    };

    Ok(base.with_env_overrides())
  }

  pub fn with_env_overrides(mut self) -> Self {
    if let Some(value) = non_empty_env(DATASET_ENV) {
      self.dataset_path = PathBuf::from(value);
    }
    if let Some(value) = non_empty_env(INDEX_ENV) {
      self.index_path = PathBuf::from(value);
    }
    if let Some(value) = non_empty_env(MODEL_ENV) {
      self.model = value;
    }
    if let Some(value) = non_empty_env(API_BASE_ENV) {
      self.api_base = value;
    }
    self
  }

  /// Read the provider API key from the configured variable
  pub fn credential(&self) -> Result<String> {
    non_empty_env(&self.credential_env)
      .ok_or_else(|| TallyError::MissingCredential { variable: self.credential_env.clone() })
  }
}

fn non_empty_env(name: &str) -> Option<String> {
  env::var(name).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn find_config_file() -> Option<PathBuf> {
  let local = LOCAL_CONFIG_PATHS.iter().map(PathBuf::from).find(|p| p.exists());

  local.or_else(|| {
    dirs::home_dir().map(|home| home.join(".tally").join("config.json")).filter(|p| p.exists())
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io::Write;

  #[test]
  fn test_defaults() {
    let settings = Settings::default();
    assert_eq!(settings.model, "embed-multilingual-v3.0");
    assert_eq!(settings.credential_env, "COHERE_API_KEY");
    assert!(settings.dataset_path.to_string_lossy().ends_with(".csv"));
  }

  #[test]
  fn test_partial_file_keeps_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"index_path": "/srv/tally/index.json"}}"#).unwrap();

    let settings = Settings::load_from_file(file.path()).unwrap();
    assert_eq!(settings.index_path, PathBuf::from("/srv/tally/index.json"));
    assert_eq!(settings.model, default_model());
  }

  #[test]
  fn test_invalid_file_is_config_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "not json").unwrap();

    let err = Settings::load_from_file(file.path()).unwrap_err();
    assert!(matches!(err, TallyError::Config { .. }));
  }

  #[test]
  fn test_missing_explicit_file_fails() {
    let result = Settings::load(Some(Path::new("/definitely/not/here/tally.json")));
    assert!(result.is_err());
  }

  #[test]
  fn test_credential_missing() {
    let settings =
      Settings { credential_env: "TALLY_TEST_UNSET_CREDENTIAL".to_string(), ..Default::default() };
    let err = settings.credential().unwrap_err();
    assert!(err.to_string().contains("TALLY_TEST_UNSET_CREDENTIAL"));
  }
}
