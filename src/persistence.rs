//! Saved progress: the record shape, the `ProgressStore` seam, and two stores
//! (a JSON file for the server, memory for tests and ephemeral sessions).
//!
//! A record that fails validation is treated as absent and the store is reset,
//! so a corrupted save never blocks startup.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{StoreError, StoreResult};
use crate::progress::{GameAction, GameState};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
  pub unlocked_characters: Vec<String>,
  pub completed_levels: Vec<String>,
  pub current_level_set_id: String,
  pub current_character_index: usize,
  /// Milliseconds since the Unix epoch.
  pub timestamp: u64,
}

impl ProgressRecord {
  pub fn from_state(state: &GameState) -> Self {
    Self {
      unlocked_characters: state.unlocked_characters.to_vec(),
      completed_levels: state.completed_levels.to_vec(),
      current_level_set_id: state.current_level_set_id.clone(),
      current_character_index: state.current_character_index,
      timestamp: now_millis(),
    }
  }

  pub fn into_action(self) -> GameAction {
    GameAction::LoadProgress {
      unlocked_characters: self.unlocked_characters,
      completed_levels: self.completed_levels,
      level_set_id: self.current_level_set_id,
      character_index: self.current_character_index,
    }
  }

  /// Strict decode: every field must be present with the right type.
  pub fn from_json(raw: &str) -> StoreResult<Self> {
    let record: ProgressRecord = serde_json::from_str(raw)?;
    if record.current_level_set_id.is_empty() {
      return Err(StoreError::Malformed("empty currentLevelSetId".into()));
    }
    Ok(record)
  }
}

fn now_millis() -> u64 {
  SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis() as u64).unwrap_or(0)
}

pub trait ProgressStore: Send + Sync {
  /// `Ok(None)` when nothing valid is stored.
  fn load(&self) -> StoreResult<Option<ProgressRecord>>;
  fn save(&self, record: &ProgressRecord) -> StoreResult<()>;
  fn reset(&self) -> StoreResult<()>;
}

impl<T: ProgressStore + ?Sized> ProgressStore for Arc<T> {
  fn load(&self) -> StoreResult<Option<ProgressRecord>> {
    (**self).load()
  }

  fn save(&self, record: &ProgressRecord) -> StoreResult<()> {
    (**self).save(record)
  }

  fn reset(&self) -> StoreResult<()> {
    (**self).reset()
  }
}

/// One JSON document on disk.
#[derive(Debug)]
pub struct JsonFileStore {
  path: PathBuf,
}

impl JsonFileStore {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }
}

impl ProgressStore for JsonFileStore {
  fn load(&self) -> StoreResult<Option<ProgressRecord>> {
    let raw = match std::fs::read_to_string(&self.path) {
      Ok(s) => s,
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
        debug!(target: "progress", path = %self.path.display(), "No saved progress");
        return Ok(None);
      }
      Err(e) => return Err(StoreError::io(&self.path, e)),
    };

    match ProgressRecord::from_json(&raw) {
      Ok(record) => {
        info!(target: "progress", path = %self.path.display(), level_set = %record.current_level_set_id, character_index = record.current_character_index, "Loaded saved progress");
        Ok(Some(record))
      }
      Err(e) => {
        warn!(target: "progress", path = %self.path.display(), error = %e, "Invalid progress data found, resetting");
        self.reset()?;
        Ok(None)
      }
    }
  }

  fn save(&self, record: &ProgressRecord) -> StoreResult<()> {
    if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
      std::fs::create_dir_all(dir).map_err(|e| StoreError::io(dir, e))?;
    }
    let body = serde_json::to_string_pretty(record)?;
    let tmp = self.path.with_extension("json.tmp");
    std::fs::write(&tmp, body).map_err(|e| StoreError::io(&tmp, e))?;
    std::fs::rename(&tmp, &self.path).map_err(|e| StoreError::io(&self.path, e))?;
    debug!(target: "progress", path = %self.path.display(), "Saved progress");
    Ok(())
  }

  fn reset(&self) -> StoreResult<()> {
    match std::fs::remove_file(&self.path) {
      Ok(()) => Ok(()),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
      Err(e) => Err(StoreError::io(&self.path, e)),
    }
  }
}

/// Keeps the record in memory only.
#[derive(Debug, Default)]
pub struct MemoryStore {
  record: Mutex<Option<ProgressRecord>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_record(record: ProgressRecord) -> Self {
    Self { record: Mutex::new(Some(record)) }
  }

  fn slot(&self) -> std::sync::MutexGuard<'_, Option<ProgressRecord>> {
    // A poisoned lock still holds a usable record.
    self.record.lock().unwrap_or_else(|p| p.into_inner())
  }
}

impl ProgressStore for MemoryStore {
  fn load(&self) -> StoreResult<Option<ProgressRecord>> {
    Ok(self.slot().clone())
  }

  fn save(&self, record: &ProgressRecord) -> StoreResult<()> {
    *self.slot() = Some(record.clone());
    Ok(())
  }

  fn reset(&self) -> StoreResult<()> {
    *self.slot() = None;
    Ok(())
  }
}
