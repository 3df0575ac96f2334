//! Game progress as an immutable snapshot plus a reducer.
//!
//! `reduce` consumes the previous snapshot and returns the next one; it performs no
//! IO. Unlocked characters and completed levels only ever grow, except on
//! `Initialize`/`Reset` and on `JumpToLevel`, which recomputes both from the
//! curriculum. The level-scoped history is cleared on every level change.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::content::LevelHistory;
use crate::curriculum::Curriculum;
use crate::domain::{
  CharacterMapping, ContentItem, FeedbackType, LevelProgress, LevelSetProgress, OrderedIdSet, OverallProgress,
  ProgressInfo, ValidationResult,
};

/// Completed-level id: `"{levelSetId}-{characterIndex}"`.
pub fn level_id(level_set_id: &str, character_index: usize) -> String {
  format!("{level_set_id}-{character_index}")
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
  pub current_level_set_id: String,
  pub current_character_index: usize,
  pub current_content_index: usize,
  pub current_level_total_questions: usize,
  pub history: LevelHistory,
  pub unlocked_characters: OrderedIdSet,
  pub completed_levels: OrderedIdSet,
  pub current_content_item: Option<ContentItem>,
  pub user_input: String,
  pub show_feedback: bool,
  pub feedback_message: String,
  pub feedback_type: FeedbackType,
  pub is_complete: bool,
  pub menu_open: bool,
  pub show_level_transition: bool,
  pub show_level_set_transition: bool,
}

impl GameState {
  /// (level set, character index) pair identifying the active level.
  pub fn level_key(&self) -> (&str, usize) {
    (&self.current_level_set_id, self.current_character_index)
  }

  fn clear_level_scope(&mut self) {
    self.history = LevelHistory::default();
    self.current_content_item = None;
    self.user_input.clear();
    self.show_feedback = false;
  }
}

#[derive(Clone, Debug)]
pub enum GameAction {
  Initialize,
  LoadProgress {
    unlocked_characters: Vec<String>,
    completed_levels: Vec<String>,
    level_set_id: String,
    character_index: usize,
  },
  SetInput(String),
  SubmitResult(ValidationResult),
  AdvanceContent,
  AdvanceLevel { new_character: CharacterMapping },
  AdvanceLevelSet { level_set_id: String, first_character: Option<CharacterMapping> },
  ToggleMenu,
  JumpToLevel { level_set_id: String, character_index: usize },
  ShowLevelTransition(bool),
  ShowLevelSetTransition(bool),
  SetCurrentItem(Option<ContentItem>),
  UpdateLevelMetadata { total_questions: usize },
  UpdateHistory(LevelHistory),
  ResetLevelState,
  CompleteGame,
  Reset,
}

impl GameAction {
  pub fn name(&self) -> &'static str {
    match self {
      GameAction::Initialize => "initialize",
      GameAction::LoadProgress { .. } => "load_progress",
      GameAction::SetInput(_) => "set_input",
      GameAction::SubmitResult(_) => "submit_result",
      GameAction::AdvanceContent => "advance_content",
      GameAction::AdvanceLevel { .. } => "advance_level",
      GameAction::AdvanceLevelSet { .. } => "advance_level_set",
      GameAction::ToggleMenu => "toggle_menu",
      GameAction::JumpToLevel { .. } => "jump_to_level",
      GameAction::ShowLevelTransition(_) => "show_level_transition",
      GameAction::ShowLevelSetTransition(_) => "show_level_set_transition",
      GameAction::SetCurrentItem(_) => "set_current_item",
      GameAction::UpdateLevelMetadata { .. } => "update_level_metadata",
      GameAction::UpdateHistory(_) => "update_history",
      GameAction::ResetLevelState => "reset_level_state",
      GameAction::CompleteGame => "complete_game",
      GameAction::Reset => "reset",
    }
  }
}

/// Apply `action` to `state` and return the next snapshot.
pub fn reduce(mut state: GameState, action: GameAction, curriculum: &Curriculum) -> GameState {
  debug!(target: "progress", action = action.name(), level_set = %state.current_level_set_id, character_index = state.current_character_index, "Reducing");
  match action {
    GameAction::Initialize | GameAction::Reset => GameState::default(),

    GameAction::LoadProgress { unlocked_characters, completed_levels, level_set_id, character_index } => {
      state.unlocked_characters = unlocked_characters.into();
      state.completed_levels = completed_levels.into();
      state.current_level_set_id = level_set_id;
      state.current_character_index = character_index;
      state
    }

    GameAction::SetInput(text) => {
      state.user_input = text;
      state.show_feedback = false;
      state
    }

    GameAction::SubmitResult(result) => {
      state.show_feedback = true;
      state.feedback_type = if result.is_correct { FeedbackType::Success } else { FeedbackType::Error };
      state.feedback_message = result.feedback;
      state
    }

    GameAction::AdvanceContent => {
      state.current_content_index += 1;
      state.current_content_item = None;
      state.user_input.clear();
      state.show_feedback = false;
      state
    }

    GameAction::AdvanceLevel { new_character } => {
      let finished = level_id(&state.current_level_set_id, state.current_character_index);
      state.completed_levels.insert(finished);
      state.unlocked_characters.insert(new_character.id);
      state.current_character_index = state.current_character_index.saturating_add(1);
      state.current_content_index = 0;
      state.clear_level_scope();
      state.show_level_transition = true;
      state
    }

    GameAction::AdvanceLevelSet { level_set_id, first_character } => {
      state.current_level_set_id = level_set_id;
      state.current_character_index = 0;
      state.current_content_index = 0;
      state.clear_level_scope();
      state.show_level_set_transition = true;
      state.show_level_transition = first_character.is_some();
      if let Some(c) = first_character {
        state.unlocked_characters.insert(c.id);
      }
      state
    }

    GameAction::ToggleMenu => {
      state.menu_open = !state.menu_open;
      state
    }

    GameAction::JumpToLevel { level_set_id, character_index } => jump_to_level(state, &level_set_id, character_index, curriculum),

    GameAction::ShowLevelTransition(show) => {
      state.show_level_transition = show;
      state
    }

    GameAction::ShowLevelSetTransition(show) => {
      state.show_level_set_transition = show;
      state
    }

    GameAction::SetCurrentItem(item) => {
      state.current_content_item = item;
      state
    }

    GameAction::UpdateLevelMetadata { total_questions } => {
      state.current_level_total_questions = total_questions;
      state
    }

    GameAction::UpdateHistory(history) => {
      state.history = history;
      state
    }

    GameAction::ResetLevelState => {
      state.history = LevelHistory::default();
      state.current_content_index = 0;
      state.current_content_item = None;
      state
    }

    GameAction::CompleteGame => {
      state.is_complete = true;
      state.show_feedback = false;
      state
    }
  }
}

/// Unlock everything before the target and rebuild both progress sets from scratch.
fn jump_to_level(mut state: GameState, level_set_id: &str, character_index: usize, curriculum: &Curriculum) -> GameState {
  let (Some(target_index), Some(target)) = (curriculum.level_set_index(level_set_id), curriculum.level_set(level_set_id)) else {
    warn!(target: "progress", %level_set_id, "Jump to unknown level set ignored");
    return state;
  };
  if !curriculum.has_level(level_set_id, character_index) {
    warn!(target: "progress", %level_set_id, character_index, "Jump past the end of the level set ignored");
    return state;
  }

  let mut unlocked = OrderedIdSet::new();
  let mut completed = OrderedIdSet::new();

  for set in &curriculum.level_sets()[..target_index] {
    for (j, c) in set.character_mappings.iter().enumerate() {
      unlocked.insert(c.id.clone());
      completed.insert(level_id(&set.id, j));
    }
  }
  for (j, c) in target.character_mappings.iter().enumerate().take(character_index.saturating_add(1)) {
    unlocked.insert(c.id.clone());
    if j < character_index {
      completed.insert(level_id(level_set_id, j));
    }
  }

  debug!(target: "progress", %level_set_id, character_index, unlocked = unlocked.len(), completed = completed.len(), "Jumped to level");
  state.current_level_set_id = level_set_id.to_string();
  state.current_character_index = character_index;
  state.current_content_index = 0;
  state.unlocked_characters = unlocked;
  state.completed_levels = completed;
  state.clear_level_scope();
  state.menu_open = false;
  state
}

/// Progress-bar projection of `state`.
pub fn progress_info(state: &GameState, curriculum: &Curriculum) -> ProgressInfo {
  let set = curriculum.level_set_or_first(&state.current_level_set_id);
  let level_name = set
    .and_then(|s| s.character_mappings.get(state.current_character_index))
    .map(|c| c.character.clone())
    .unwrap_or_else(|| "Starting".to_string());

  ProgressInfo {
    current_level_progress: LevelProgress {
      completed: state.current_content_index,
      total: state.current_level_total_questions,
      level_name,
    },
    level_set_progress: LevelSetProgress {
      completed: state.current_character_index,
      total: set.map(|s| s.character_mappings.len().max(1)).unwrap_or(1),
      set_name: set.map(|s| s.name.clone()).unwrap_or_default(),
    },
    overall_progress: OverallProgress {
      completed: state.completed_levels.len(),
      total: curriculum.total_levels(),
    },
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn curriculum() -> Curriculum {
    Curriculum::default()
  }

  fn char_at(c: &Curriculum, set: &str, i: usize) -> CharacterMapping {
    c.level_set(set).unwrap().character_mappings[i].clone()
  }

  #[test]
  fn advance_level_unlocks_completes_and_clears_history() {
    let c = curriculum();
    let mut s = reduce(GameState::default(), GameAction::AdvanceLevelSet {
      level_set_id: "katakana".into(),
      first_character: Some(char_at(&c, "katakana", 0)),
    }, &c);
    s.history.used_sentences.insert("I have a cat".into());
    s.current_content_index = 3;

    let s = reduce(s, GameAction::AdvanceLevel { new_character: char_at(&c, "katakana", 1) }, &c);
    assert_eq!(s.current_character_index, 1);
    assert_eq!(s.current_content_index, 0);
    assert!(s.history.used_sentences.is_empty());
    assert!(s.completed_levels.contains("katakana-0"));
    assert_eq!(s.unlocked_characters.iter().collect::<Vec<_>>(), vec!["ka_a", "ka_i"]);
    assert!(s.show_level_transition);
  }

  #[test]
  fn advance_level_set_without_first_character() {
    let c = curriculum();
    let s = reduce(GameState::default(), GameAction::AdvanceLevelSet { level_set_id: "hiragana".into(), first_character: None }, &c);
    assert!(s.show_level_set_transition);
    assert!(!s.show_level_transition);
    assert!(s.unlocked_characters.is_empty());
  }

  #[test]
  fn load_progress_only_touches_persisted_fields() {
    let c = curriculum();
    let s = reduce(GameState::default(), GameAction::LoadProgress {
      unlocked_characters: vec!["ka_a".into(), "ka_i".into()],
      completed_levels: vec!["katakana-0".into()],
      level_set_id: "katakana".into(),
      character_index: 1,
    }, &c);
    assert_eq!(s.current_character_index, 1);
    assert_eq!(s.current_content_index, 0);
    assert!(s.current_content_item.is_none());
    assert_eq!(s.unlocked_characters.len(), 2);
  }

  #[test]
  fn input_and_feedback() {
    let c = curriculum();
    let s = reduce(GameState::default(), GameAction::SubmitResult(ValidationResult {
      is_correct: false,
      expected: "a".into(),
      provided: "b".into(),
      feedback: "Correct romanization: a".into(),
    }), &c);
    assert!(s.show_feedback);
    assert_eq!(s.feedback_type, FeedbackType::Error);
    let s = reduce(s, GameAction::SetInput("a".into()), &c);
    assert!(!s.show_feedback);
    assert_eq!(s.user_input, "a");
    let s = reduce(s, GameAction::AdvanceContent, &c);
    assert_eq!(s.current_content_index, 1);
    assert!(s.user_input.is_empty());
  }

  #[test]
  fn jump_unlocks_prior_sets_and_is_idempotent() {
    let c = curriculum();
    let kata_len = c.level_set("katakana").unwrap().character_mappings.len();
    let once = reduce(GameState::default(), GameAction::JumpToLevel { level_set_id: "hiragana".into(), character_index: 2 }, &c);
    assert_eq!(once.current_level_set_id, "hiragana");
    assert_eq!(once.unlocked_characters.len(), kata_len + 3);
    assert_eq!(once.completed_levels.len(), kata_len + 2);
    assert!(once.completed_levels.contains("hiragana-1"));
    assert!(!once.completed_levels.contains("hiragana-2"));

    let twice = reduce(once.clone(), GameAction::JumpToLevel { level_set_id: "hiragana".into(), character_index: 2 }, &c);
    assert_eq!(twice.unlocked_characters, once.unlocked_characters);
    assert_eq!(twice.completed_levels, once.completed_levels);
  }

  #[test]
  fn jump_backwards_replaces_rather_than_unions() {
    let c = curriculum();
    let far = reduce(GameState::default(), GameAction::JumpToLevel { level_set_id: "jlpt_n5".into(), character_index: 4 }, &c);
    let back = reduce(far, GameAction::JumpToLevel { level_set_id: "katakana".into(), character_index: 1 }, &c);
    assert_eq!(back.unlocked_characters.iter().collect::<Vec<_>>(), vec!["ka_a", "ka_i"]);
    assert_eq!(back.completed_levels.iter().collect::<Vec<_>>(), vec!["katakana-0"]);
  }

  #[test]
  fn jump_to_unknown_set_is_a_no_op() {
    let c = curriculum();
    let mut before = GameState::default();
    before.current_level_set_id = "katakana".into();
    before.menu_open = true;
    let after = reduce(before.clone(), GameAction::JumpToLevel { level_set_id: "nope".into(), character_index: 0 }, &c);
    assert_eq!(after, before);
  }

  #[test]
  fn jump_past_the_last_character_is_a_no_op() {
    let c = curriculum();
    let len = c.level_set("katakana").unwrap().character_mappings.len();
    let before = reduce(GameState::default(), GameAction::JumpToLevel { level_set_id: "hiragana".into(), character_index: 2 }, &c);
    for character_index in [len, len + 1, usize::MAX] {
      let after = reduce(before.clone(), GameAction::JumpToLevel { level_set_id: "katakana".into(), character_index }, &c);
      assert_eq!(after, before, "index {character_index}");
    }
  }

  #[test]
  fn complete_then_reset() {
    let c = curriculum();
    let s = reduce(GameState::default(), GameAction::JumpToLevel { level_set_id: "katakana".into(), character_index: 3 }, &c);
    let s = reduce(s, GameAction::CompleteGame, &c);
    assert!(s.is_complete);
    let s = reduce(s, GameAction::Reset, &c);
    assert_eq!(s, GameState::default());
  }

  #[test]
  fn progress_projection() {
    let c = curriculum();
    let mut s = reduce(GameState::default(), GameAction::JumpToLevel { level_set_id: "katakana".into(), character_index: 2 }, &c);
    s = reduce(s, GameAction::UpdateLevelMetadata { total_questions: 5 }, &c);
    s = reduce(s, GameAction::AdvanceContent, &c);
    let info = progress_info(&s, &c);
    assert_eq!(info.current_level_progress.completed, 1);
    assert_eq!(info.current_level_progress.total, 5);
    assert_eq!(info.current_level_progress.level_name, "ウ");
    assert_eq!(info.level_set_progress.completed, 2);
    assert_eq!(info.level_set_progress.set_name, "Katakana");
    assert_eq!(info.overall_progress.completed, 2);
    assert_eq!(info.overall_progress.total, c.total_levels());
  }
}
