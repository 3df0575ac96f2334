//! Application state: the curriculum plus one learner session.
//!
//! `Session` owns the current `GameState` and drives it only through
//! `progress::reduce`. Around each transition it keeps the level-derived fields in
//! sync, pulls content items on demand, and writes the progress record whenever a
//! persisted field changes. `AppState` wraps a session behind a tokio `RwLock` for
//! the HTTP and WebSocket handlers.

use std::sync::Arc;

use rand::Rng;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use crate::config::{curriculum_from_env, ServiceConfig};
use crate::content::{exercises_per_level, generate_at, validate, GenerationContext};
use crate::curriculum::Curriculum;
use crate::domain::{CharacterMapping, ContentItem, OrderedIdSet, ProgressInfo, ValidationResult};
use crate::parser::{parse, SentenceReplacement};
use crate::persistence::{JsonFileStore, ProgressRecord, ProgressStore};
use crate::progress::{progress_info, reduce, GameAction, GameState};
use crate::pronunciation::{pronouncer_for, Pronouncer};

/// Menu entry for one level set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelSetSummary {
  pub id: String,
  pub name: String,
  pub description: String,
  pub explanation: String,
  pub character_count: usize,
  pub complete: bool,
}

/// Persisted fields, compared to decide whether a save is due.
#[derive(Clone, Debug, PartialEq, Eq)]
struct SavedShape {
  level_set_id: String,
  character_index: usize,
  unlocked: OrderedIdSet,
  completed: OrderedIdSet,
}

impl SavedShape {
  fn of(state: &GameState) -> Self {
    Self {
      level_set_id: state.current_level_set_id.clone(),
      character_index: state.current_character_index,
      unlocked: state.unlocked_characters.clone(),
      completed: state.completed_levels.clone(),
    }
  }
}

pub struct Session {
  curriculum: Arc<Curriculum>,
  state: GameState,
  store: Box<dyn ProgressStore>,
  pronouncer: Box<dyn Pronouncer>,
  loaded: bool,
}

impl Session {
  /// Restore saved progress, or start at the first level set.
  #[instrument(level = "info", skip_all)]
  pub fn open(curriculum: Arc<Curriculum>, store: Box<dyn ProgressStore>, pronouncer: Box<dyn Pronouncer>) -> Self {
    let mut session = Self { curriculum, state: GameState::default(), store, pronouncer, loaded: false };

    let saved = session.store.load().unwrap_or_else(|e| {
      warn!(target: "progress", error = %e, "Failed to read saved progress; starting fresh");
      None
    });
    let saved = saved.filter(|record| {
      let known = session.curriculum.has_level(&record.current_level_set_id, record.current_character_index);
      if !known {
        warn!(target: "progress", level_set = %record.current_level_set_id, character_index = record.current_character_index, "Saved level is not in the curriculum; starting fresh");
      }
      known
    });
    match saved {
      Some(record) => session.dispatch(record.into_action()),
      None => {
        session.dispatch(GameAction::Initialize);
        session.start_first_level_set();
      }
    }

    session.loaded = true;
    session.save();
    info!(target: "progress", level_set = %session.state.current_level_set_id, character_index = session.state.current_character_index, unlocked = session.state.unlocked_characters.len(), "Session ready");
    session
  }

  pub fn state(&self) -> &GameState {
    &self.state
  }

  pub fn curriculum(&self) -> &Curriculum {
    &self.curriculum
  }

  /// Reduce `action`, then re-derive level metadata and persist when needed.
  /// Only level and level-set advances introduce a character aloud.
  pub fn dispatch(&mut self, action: GameAction) {
    let introduces_character = matches!(
      action,
      GameAction::AdvanceLevel { .. } | GameAction::AdvanceLevelSet { first_character: Some(_), .. }
    );
    let before = SavedShape::of(&self.state);
    let state = std::mem::take(&mut self.state);
    self.state = reduce(state, action, &self.curriculum);

    let after = SavedShape::of(&self.state);
    let level_changed = (before.level_set_id.as_str(), before.character_index) != self.state.level_key();
    if level_changed {
      let total_questions = exercises_per_level(self.state.current_character_index);
      let state = std::mem::take(&mut self.state);
      let state = reduce(state, GameAction::UpdateLevelMetadata { total_questions }, &self.curriculum);
      self.state = reduce(state, GameAction::ResetLevelState, &self.curriculum);
      debug!(target: "progress", level_set = %self.state.current_level_set_id, character_index = self.state.current_character_index, total_questions, "Level changed");
    }

    if introduces_character && self.loaded && self.pronouncer.is_supported() {
      if let Some(c) = self.current_character() {
        self.pronouncer.pronounce(c);
      }
    }

    if before != after {
      self.save();
    }
  }

  fn save(&self) {
    if !self.loaded || self.state.current_level_set_id.is_empty() {
      return;
    }
    if let Err(e) = self.store.save(&ProgressRecord::from_state(&self.state)) {
      warn!(target: "progress", error = %e, "Failed to save progress");
    }
  }

  fn start_first_level_set(&mut self) {
    let Some(first) = self.curriculum.first_level_set() else {
      warn!(target: "progress", "Curriculum has no level sets");
      return;
    };
    let action = GameAction::AdvanceLevelSet {
      level_set_id: first.id.clone(),
      first_character: first.character_mappings.first().cloned(),
    };
    self.dispatch(action);
  }

  pub fn current_character(&self) -> Option<&CharacterMapping> {
    self
      .curriculum
      .level_set_or_first(&self.state.current_level_set_id)
      .and_then(|s| s.character_mappings.get(self.state.current_character_index))
  }

  /// The item at the current index, generating it first when none is held.
  pub fn current_item<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<ContentItem> {
    if self.state.current_content_item.is_some()
      || self.state.is_complete
      || self.state.current_content_index >= self.state.current_level_total_questions
    {
      return self.state.current_content_item.clone();
    }

    let curriculum = Arc::clone(&self.curriculum);
    let Some(set) = curriculum.level_set_or_first(&self.state.current_level_set_id) else {
      return None;
    };
    let index = self.state.current_character_index.min(set.character_mappings.len());
    let unlocked = curriculum.unlocked_characters(&self.state.unlocked_characters);
    let ctx = GenerationContext {
      content_index: self.state.current_content_index,
      current_character: set.character_mappings.get(self.state.current_character_index),
      previous_characters: &set.character_mappings[..index],
      unlocked_characters: &unlocked,
      current_level_index: self.state.current_character_index,
      sentence_bank: curriculum.sentences(),
      level_set_id: &set.id,
    };
    let generated = generate_at(&ctx, self.state.history.clone(), rng);

    self.dispatch(GameAction::SetCurrentItem(generated.item.clone()));
    self.dispatch(GameAction::UpdateHistory(generated.history));
    generated.item
  }

  /// Validate `answer` against the held item. `None` when no item is held.
  pub fn submit_answer(&mut self, answer: &str) -> Option<ValidationResult> {
    let item = self.state.current_content_item.clone()?;
    let result = validate(&item, answer);
    debug!(target: "progress", item = %item.id(), correct = result.is_correct, "Answer checked");
    self.dispatch(GameAction::SetInput(answer.to_string()));
    self.dispatch(GameAction::SubmitResult(result.clone()));
    Some(result)
  }

  pub fn submit(&mut self, answer: &str) -> bool {
    self.submit_answer(answer).is_some_and(|r| r.is_correct)
  }

  /// Move to the next item, level, level set, or finish the game.
  pub fn advance_to_next(&mut self) {
    let at_level_end = self.state.current_content_index.saturating_add(1) >= self.state.current_level_total_questions;
    if !at_level_end {
      self.dispatch(GameAction::AdvanceContent);
      return;
    }

    let curriculum = Arc::clone(&self.curriculum);
    let Some(set) = curriculum.level_set_or_first(&self.state.current_level_set_id) else {
      return;
    };
    let next_index = self.state.current_character_index.saturating_add(1);
    if next_index >= set.character_mappings.len() {
      match curriculum.next_level_set(&set.id) {
        Some(next) => {
          info!(target: "progress", from = %set.id, to = %next.id, "Level set complete");
          self.dispatch(GameAction::AdvanceLevelSet {
            level_set_id: next.id.clone(),
            first_character: next.character_mappings.first().cloned(),
          });
        }
        None => {
          info!(target: "progress", "Game complete");
          self.dispatch(GameAction::CompleteGame);
        }
      }
    } else if let Some(next) = set.character_mappings.get(next_index) {
      self.dispatch(GameAction::AdvanceLevel { new_character: next.clone() });
    }
  }

  /// Next item without any level progress; stays put on the last item of a level.
  pub fn advance_without_progress(&mut self) {
    if self.state.current_content_index.saturating_add(1) >= self.state.current_level_total_questions {
      debug!(target: "progress", "Skip ignored at end of level");
      return;
    }
    self.dispatch(GameAction::AdvanceContent);
  }

  /// Returns false, leaving the state untouched, for an unknown level set or an
  /// index past its last character.
  pub fn jump_to_level(&mut self, level_set_id: &str, character_index: usize) -> bool {
    if !self.curriculum.has_level(level_set_id, character_index) {
      debug!(target: "progress", %level_set_id, character_index, "Jump target rejected");
      return false;
    }
    self.dispatch(GameAction::JumpToLevel { level_set_id: level_set_id.to_string(), character_index });
    true
  }

  /// Forget all progress and start over.
  pub fn reset(&mut self) {
    if let Err(e) = self.store.reset() {
      warn!(target: "progress", error = %e, "Failed to reset saved progress");
    }
    self.dispatch(GameAction::Reset);
    self.start_first_level_set();
  }

  pub fn toggle_menu(&mut self) {
    self.dispatch(GameAction::ToggleMenu);
  }

  pub fn dismiss_transitions(&mut self) {
    self.dispatch(GameAction::ShowLevelTransition(false));
    self.dispatch(GameAction::ShowLevelSetTransition(false));
  }

  pub fn progress(&self) -> ProgressInfo {
    progress_info(&self.state, &self.curriculum)
  }

  pub fn level_set_summaries(&self) -> Vec<LevelSetSummary> {
    self
      .curriculum
      .level_sets()
      .iter()
      .map(|s| LevelSetSummary {
        id: s.id.clone(),
        name: s.name.clone(),
        description: s.description.clone(),
        explanation: s.explanation.clone(),
        character_count: s.character_mappings.len(),
        complete: self.curriculum.is_level_set_complete(s, &self.state.unlocked_characters),
      })
      .collect()
  }

  /// Replacement slots of `display_text` against the unlocked characters.
  pub fn parse_sentence(&self, display_text: &str) -> Vec<SentenceReplacement> {
    let unlocked = self.curriculum.unlocked_characters(&self.state.unlocked_characters);
    parse(display_text, &unlocked)
  }
}

pub struct AppState {
  pub curriculum: Arc<Curriculum>,
  session: RwLock<Session>,
}

impl AppState {
  /// Build state from env: curriculum TOML (or seeds), progress file, pronouncer.
  pub fn new() -> Self {
    Self::from_config(&ServiceConfig::from_env())
  }

  #[instrument(level = "info", skip_all)]
  pub fn from_config(cfg: &ServiceConfig) -> Self {
    let curriculum = Arc::new(curriculum_from_env());
    info!(target: "kana_reader", level_sets = curriculum.level_sets().len(), sentences = curriculum.sentences().len(), progress_path = %cfg.progress_path.display(), "Curriculum ready");
    Self::with_parts(curriculum, Box::new(JsonFileStore::new(cfg.progress_path.clone())), pronouncer_for(cfg.pronunciation_log))
  }

  pub fn with_parts(curriculum: Arc<Curriculum>, store: Box<dyn ProgressStore>, pronouncer: Box<dyn Pronouncer>) -> Self {
    let session = Session::open(Arc::clone(&curriculum), store, pronouncer);
    Self { curriculum, session: RwLock::new(session) }
  }

  pub async fn snapshot(&self) -> GameState {
    self.session.read().await.state().clone()
  }

  pub async fn current_item(&self) -> Option<ContentItem> {
    let mut session = self.session.write().await;
    let mut rng = rand::thread_rng();
    session.current_item(&mut rng)
  }

  pub async fn submit_answer(&self, answer: &str) -> Option<ValidationResult> {
    self.session.write().await.submit_answer(answer)
  }

  pub async fn advance(&self) -> ProgressInfo {
    let mut session = self.session.write().await;
    session.advance_to_next();
    session.progress()
  }

  pub async fn skip(&self) -> ProgressInfo {
    let mut session = self.session.write().await;
    session.advance_without_progress();
    session.progress()
  }

  pub async fn jump_to_level(&self, level_set_id: &str, character_index: usize) -> Option<ProgressInfo> {
    let mut session = self.session.write().await;
    session.jump_to_level(level_set_id, character_index).then(|| session.progress())
  }

  pub async fn reset(&self) -> ProgressInfo {
    let mut session = self.session.write().await;
    session.reset();
    session.progress()
  }

  pub async fn toggle_menu(&self) -> GameState {
    let mut session = self.session.write().await;
    session.toggle_menu();
    session.state().clone()
  }

  pub async fn dismiss_transitions(&self) -> GameState {
    let mut session = self.session.write().await;
    session.dismiss_transitions();
    session.state().clone()
  }

  pub async fn progress(&self) -> ProgressInfo {
    self.session.read().await.progress()
  }

  pub async fn level_set_summaries(&self) -> Vec<LevelSetSummary> {
    self.session.read().await.level_set_summaries()
  }

  pub async fn parse_sentence(&self, display_text: &str) -> Vec<SentenceReplacement> {
    self.session.read().await.parse_sentence(display_text)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::Mutex;

  use crate::domain::{LevelSet, SentenceBank};
  use crate::persistence::MemoryStore;
  use crate::pronunciation::UnsupportedPronouncer;
  use rand::rngs::StdRng;
  use rand::SeedableRng;

  /// Keeps the ids of every character it was asked to say.
  #[derive(Clone, Default)]
  struct Recorder(Arc<Mutex<Vec<String>>>);

  impl Recorder {
    fn spoken(&self) -> Vec<String> {
      self.0.lock().unwrap().clone()
    }
  }

  impl Pronouncer for Recorder {
    fn is_supported(&self) -> bool {
      true
    }

    fn pronounce(&self, character: &CharacterMapping) {
      self.0.lock().unwrap().push(character.id.clone());
    }
  }

  fn open_with(curriculum: Curriculum, store: Arc<MemoryStore>) -> Session {
    Session::open(Arc::new(curriculum), Box::new(store), Box::new(UnsupportedPronouncer))
  }

  fn answer_for(item: &ContentItem) -> String {
    match item {
      ContentItem::Sentence { original_text, .. } => original_text.clone(),
      ContentItem::Question { accepted_answers, .. } => accepted_answers[0].clone(),
    }
  }

  fn tiny_curriculum() -> Curriculum {
    let set = LevelSet {
      id: "tiny".into(),
      name: "Tiny".into(),
      description: String::new(),
      explanation: String::new(),
      character_mappings: vec![CharacterMapping::kana("ka_a", "ア", &["a"], "ah")],
    };
    let bank = SentenceBank { short: vec!["I have a cat".into()], ..SentenceBank::default() };
    Curriculum::new(vec![set], bank)
  }

  #[test]
  fn fresh_session_starts_at_first_set_and_saves() {
    let store = Arc::new(MemoryStore::new());
    let s = open_with(Curriculum::default(), Arc::clone(&store));
    assert_eq!(s.state().current_level_set_id, "katakana");
    assert_eq!(s.state().unlocked_characters.iter().collect::<Vec<_>>(), vec!["ka_a"]);
    assert_eq!(s.state().current_level_total_questions, exercises_per_level(0));
    let saved = store.load().unwrap().unwrap();
    assert_eq!(saved.current_level_set_id, "katakana");
    assert_eq!(saved.unlocked_characters, vec!["ka_a".to_string()]);
  }

  #[test]
  fn saved_progress_is_restored() {
    let store = Arc::new(MemoryStore::new());
    {
      let mut s = open_with(Curriculum::default(), Arc::clone(&store));
      assert!(s.jump_to_level("hiragana", 1));
    }
    let s = open_with(Curriculum::default(), Arc::clone(&store));
    assert_eq!(s.state().level_key(), ("hiragana", 1));
    assert!(s.state().unlocked_characters.contains("hi_i"));
    assert_eq!(s.state().current_level_total_questions, exercises_per_level(1));
    assert_eq!(s.state().current_content_index, 0);
  }

  #[test]
  fn playing_through_a_level_advances_to_the_next_character() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut s = open_with(Curriculum::default(), Arc::new(MemoryStore::new()));
    let total = s.state().current_level_total_questions;

    for i in 0..total {
      let item = s.current_item(&mut rng).expect("level 0 always has content");
      assert_eq!(s.current_item(&mut rng).as_ref(), Some(&item), "pulling twice returns the held item");
      assert!(s.submit(&answer_for(&item)));
      s.advance_to_next();
      if i + 1 < total {
        assert_eq!(s.state().current_content_index, i + 1);
        assert!(s.state().current_content_item.is_none());
      }
    }

    assert_eq!(s.state().level_key(), ("katakana", 1));
    assert_eq!(s.state().current_content_index, 0);
    assert!(s.state().completed_levels.contains("katakana-0"));
    assert!(s.state().unlocked_characters.contains("ka_i"));
    assert!(s.state().history.used_sentences.is_empty());
    assert_eq!(s.state().current_level_total_questions, exercises_per_level(1));
  }

  #[test]
  fn skip_never_leaves_the_level() {
    let mut s = open_with(Curriculum::default(), Arc::new(MemoryStore::new()));
    let total = s.state().current_level_total_questions;
    for _ in 0..total + 3 {
      s.advance_without_progress();
    }
    assert_eq!(s.state().current_content_index, total - 1);
    assert_eq!(s.state().current_character_index, 0);
  }

  #[test]
  fn submit_without_item_is_false() {
    let mut s = open_with(Curriculum::default(), Arc::new(MemoryStore::new()));
    assert!(s.submit_answer("a").is_none());
    assert!(!s.submit("a"));
  }

  #[test]
  fn wrong_answer_sets_error_feedback() {
    let mut rng = StdRng::seed_from_u64(11);
    let mut s = open_with(Curriculum::default(), Arc::new(MemoryStore::new()));
    s.current_item(&mut rng).unwrap();
    let result = s.submit_answer("definitely wrong").unwrap();
    assert!(!result.is_correct);
    assert!(s.state().show_feedback);
    assert_eq!(s.state().feedback_message, result.feedback);
  }

  #[test]
  fn last_level_of_last_set_completes_the_game() {
    let mut s = open_with(tiny_curriculum(), Arc::new(MemoryStore::new()));
    for _ in 0..s.state().current_level_total_questions {
      s.advance_to_next();
    }
    assert!(s.state().is_complete);
    assert!(s.current_item(&mut StdRng::seed_from_u64(1)).is_none());
  }

  #[test]
  fn finishing_a_set_moves_to_the_next_one() {
    let mut s = open_with(Curriculum::default(), Arc::new(MemoryStore::new()));
    let last = s.curriculum().level_set("katakana").unwrap().character_mappings.len() - 1;
    assert!(s.jump_to_level("katakana", last));
    for _ in 0..s.state().current_level_total_questions {
      s.advance_to_next();
    }
    assert_eq!(s.state().level_key(), ("hiragana", 0));
    assert!(s.state().show_level_set_transition);
    assert!(s.state().unlocked_characters.contains("hi_a"));
  }

  #[test]
  fn reset_starts_over() {
    let store = Arc::new(MemoryStore::new());
    let mut s = open_with(Curriculum::default(), Arc::clone(&store));
    s.jump_to_level("hiragana", 4);
    s.reset();
    assert_eq!(s.state().level_key(), ("katakana", 0));
    assert_eq!(s.state().completed_levels.len(), 0);
    assert_eq!(store.load().unwrap().unwrap().current_level_set_id, "katakana");
  }

  #[test]
  fn unknown_jump_is_rejected() {
    let mut s = open_with(Curriculum::default(), Arc::new(MemoryStore::new()));
    let before = s.state().clone();
    assert!(!s.jump_to_level("nope", 0));
    assert_eq!(s.state(), &before);
  }

  #[test]
  fn jump_past_the_last_character_is_rejected() {
    let store = Arc::new(MemoryStore::new());
    let mut s = open_with(Curriculum::default(), Arc::clone(&store));
    let len = s.curriculum().level_set("katakana").unwrap().character_mappings.len();
    let before = s.state().clone();
    let saved = store.load().unwrap();
    for character_index in [len, 99, usize::MAX] {
      assert!(!s.jump_to_level("katakana", character_index), "index {character_index}");
      assert_eq!(s.state(), &before);
    }
    assert_eq!(store.load().unwrap(), saved);
    assert!(s.jump_to_level("katakana", len - 1));
  }

  #[test]
  fn saved_level_outside_the_curriculum_starts_fresh() {
    let record = ProgressRecord {
      unlocked_characters: vec!["ka_a".into()],
      completed_levels: vec![],
      current_level_set_id: "katakana".into(),
      current_character_index: usize::MAX,
      timestamp: 0,
    };
    let store = Arc::new(MemoryStore::with_record(record));
    let s = open_with(Curriculum::default(), Arc::clone(&store));
    assert_eq!(s.state().level_key(), ("katakana", 0));
    assert_eq!(s.state().current_level_total_questions, exercises_per_level(0));
    assert_eq!(store.load().unwrap().unwrap().current_character_index, 0);
  }

  #[test]
  fn same_sized_progress_change_is_saved() {
    let store = Arc::new(MemoryStore::new());
    let mut s = open_with(Curriculum::default(), Arc::clone(&store));
    assert_eq!(store.load().unwrap().unwrap().unlocked_characters, vec!["ka_a".to_string()]);
    s.dispatch(GameAction::LoadProgress {
      unlocked_characters: vec!["hi_a".into()],
      completed_levels: vec![],
      level_set_id: "katakana".into(),
      character_index: 0,
    });
    assert_eq!(store.load().unwrap().unwrap().unlocked_characters, vec!["hi_a".to_string()]);
  }

  #[test]
  fn only_level_advances_are_pronounced() {
    let recorder = Recorder::default();
    let mut s = Session::open(Arc::new(Curriculum::default()), Box::new(MemoryStore::new()), Box::new(recorder.clone()));
    assert!(recorder.spoken().is_empty(), "opening the session is silent");

    assert!(s.jump_to_level("hiragana", 3));
    s.dismiss_transitions();
    assert!(s.jump_to_level("hiragana", 5));
    s.toggle_menu();
    s.advance_without_progress();
    assert!(recorder.spoken().is_empty(), "jumps and skips are silent");

    for _ in 0..s.state().current_level_total_questions {
      s.advance_to_next();
    }
    assert_eq!(s.state().level_key(), ("hiragana", 6));
    let sixth = s.current_character().unwrap().id.clone();
    assert_eq!(recorder.spoken(), vec![sixth.clone()]);

    let last = s.curriculum().level_set("hiragana").unwrap().character_mappings.len() - 1;
    assert!(s.jump_to_level("hiragana", last));
    for _ in 0..s.state().current_level_total_questions {
      s.advance_to_next();
    }
    let first_of_next = s.curriculum().next_level_set("hiragana").unwrap().character_mappings[0].id.clone();
    assert_eq!(recorder.spoken(), vec![sixth, first_of_next]);
  }

  #[test]
  fn summaries_and_parse_follow_unlocks() {
    let mut s = open_with(Curriculum::default(), Arc::new(MemoryStore::new()));
    s.jump_to_level("hiragana", 0);
    let summaries = s.level_set_summaries();
    assert!(summaries[0].complete);
    assert!(!summaries[1].complete);
    assert_eq!(summaries[0].character_count, 15);

    let slots = s.parse_sentence("I hアve ア cアt");
    assert_eq!(slots.len(), 3);
    assert!(slots.iter().all(|r| r.expected == "a"));
  }
}
