//! Errors for the IO-bearing parts of the service (config files, saved progress).
//! The learning engine itself never fails; it answers with `Option`s and empty
//! collections instead.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
  #[error("io error on {}: {source}", path.display())]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("invalid json: {0}")]
  Json(#[from] serde_json::Error),

  #[error("invalid toml in {}: {source}", path.display())]
  Toml {
    path: PathBuf,
    #[source]
    source: toml::de::Error,
  },

  #[error("malformed progress record: {0}")]
  Malformed(String),
}

impl StoreError {
  pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
    StoreError::Io { path: path.into(), source }
  }
}

pub type StoreResult<T> = Result<T, StoreError>;
