//! Configuration: service settings from the environment and an optional curriculum
//! override from TOML.
//!
//! Curriculum TOML schema:
//!
//! ```toml
//! [[level_sets]]
//! id = "katakana"
//! name = "Katakana"
//!
//! [[level_sets.characters]]
//! id = "ka_a"
//! character = "ア"
//! romanizations = ["a"]
//! pronunciation = "ah"
//!
//! [sentences]
//! short = ["I have a cat"]
//! ```
//!
//! An omitted `[sentences]` table keeps the built-in sentence bank; an empty
//! `level_sets` list keeps the built-in level sets.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{error, info};

use crate::curriculum::Curriculum;
use crate::domain::{LevelSet, SentenceBank};
use crate::error::{StoreError, StoreResult};
use crate::seeds::{seed_level_sets, seed_sentence_bank};

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_PROGRESS_PATH: &str = "./data/progress.json";

#[derive(Clone, Debug, Deserialize, Default)]
pub struct CurriculumConfig {
  #[serde(default)]
  pub level_sets: Vec<LevelSet>,
  #[serde(default)]
  pub sentences: Option<SentenceBank>,
}

impl CurriculumConfig {
  pub fn from_toml_str(s: &str, path: &Path) -> StoreResult<Self> {
    toml::from_str(s).map_err(|source| StoreError::Toml { path: path.to_path_buf(), source })
  }

  pub fn from_path(path: &Path) -> StoreResult<Self> {
    let s = std::fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;
    Self::from_toml_str(&s, path)
  }

  /// Merge with the built-in seeds.
  pub fn into_curriculum(self) -> Curriculum {
    let level_sets = if self.level_sets.is_empty() { seed_level_sets() } else { self.level_sets };
    let sentences = self.sentences.unwrap_or_else(seed_sentence_bank);
    Curriculum::new(level_sets, sentences)
  }
}

/// Load `CurriculumConfig` from CURRICULUM_CONFIG_PATH. On any read/parse error, returns None.
pub fn load_curriculum_config_from_env() -> Option<CurriculumConfig> {
  let path = PathBuf::from(std::env::var("CURRICULUM_CONFIG_PATH").ok()?);
  match CurriculumConfig::from_path(&path) {
    Ok(cfg) => {
      info!(target: "kana_reader", path = %path.display(), level_sets = cfg.level_sets.len(), "Loaded curriculum config (TOML)");
      Some(cfg)
    }
    Err(e) => {
      error!(target: "kana_reader", path = %path.display(), error = %e, "Failed to load curriculum config; using built-in seeds");
      None
    }
  }
}

/// Curriculum from the environment, falling back to the built-in one.
pub fn curriculum_from_env() -> Curriculum {
  load_curriculum_config_from_env().map(CurriculumConfig::into_curriculum).unwrap_or_default()
}

#[derive(Clone, Debug)]
pub struct ServiceConfig {
  pub port: u16,
  pub progress_path: PathBuf,
  pub pronunciation_log: bool,
}

impl Default for ServiceConfig {
  fn default() -> Self {
    Self {
      port: DEFAULT_PORT,
      progress_path: PathBuf::from(DEFAULT_PROGRESS_PATH),
      pronunciation_log: false,
    }
  }
}

impl ServiceConfig {
  /// PORT, PROGRESS_PATH and PRONUNCIATION_LOG; anything unset or unparsable keeps its default.
  pub fn from_env() -> Self {
    Self::from_lookup(|k| std::env::var(k).ok())
  }

  pub fn from_lookup<F>(lookup: F) -> Self
  where
    F: Fn(&str) -> Option<String>,
  {
    let defaults = Self::default();
    Self {
      port: lookup("PORT").and_then(|p| p.parse::<u16>().ok()).unwrap_or(defaults.port),
      progress_path: lookup("PROGRESS_PATH").map(PathBuf::from).unwrap_or(defaults.progress_path),
      pronunciation_log: lookup("PRONUNCIATION_LOG").map(|v| v == "1" || v.eq_ignore_ascii_case("true")).unwrap_or(false),
    }
  }
}
