//! Read-only curriculum: ordered level sets plus the sentence bank.

use crate::domain::{CharacterMapping, LevelSet, OrderedIdSet, SentenceBank};
use crate::seeds::{seed_level_sets, seed_sentence_bank};

#[derive(Clone, Debug)]
pub struct Curriculum {
  level_sets: Vec<LevelSet>,
  sentences: SentenceBank,
}

impl Default for Curriculum {
  fn default() -> Self {
    Self::new(seed_level_sets(), seed_sentence_bank())
  }
}

impl Curriculum {
  pub fn new(level_sets: Vec<LevelSet>, sentences: SentenceBank) -> Self {
    Self { level_sets, sentences }
  }

  pub fn level_sets(&self) -> &[LevelSet] {
    &self.level_sets
  }

  pub fn sentences(&self) -> &SentenceBank {
    &self.sentences
  }

  pub fn level_set(&self, id: &str) -> Option<&LevelSet> {
    self.level_sets.iter().find(|s| s.id == id)
  }

  pub fn level_set_index(&self, id: &str) -> Option<usize> {
    self.level_sets.iter().position(|s| s.id == id)
  }

  pub fn first_level_set(&self) -> Option<&LevelSet> {
    self.level_sets.first()
  }

  /// The set following `id`, if any.
  pub fn next_level_set(&self, id: &str) -> Option<&LevelSet> {
    self.level_set_index(id).and_then(|i| self.level_sets.get(i + 1))
  }

  /// Level set `id`, or the first one when `id` is unknown.
  pub fn level_set_or_first(&self, id: &str) -> Option<&LevelSet> {
    self.level_set(id).or_else(|| self.first_level_set())
  }

  /// First mapping with this id across all level sets.
  pub fn character(&self, id: &str) -> Option<&CharacterMapping> {
    self.level_sets.iter().flat_map(|s| s.character_mappings.iter()).find(|c| c.id == id)
  }

  /// Mappings for `unlocked`, in unlock order. Unknown ids are skipped.
  pub fn unlocked_characters(&self, unlocked: &OrderedIdSet) -> Vec<CharacterMapping> {
    unlocked.iter().filter_map(|id| self.character(id)).cloned().collect()
  }

  /// A set counts as complete for navigation when it is empty or all of its
  /// characters are unlocked. This is independent of the completed-levels record.
  pub fn is_level_set_complete(&self, set: &LevelSet, unlocked: &OrderedIdSet) -> bool {
    set.character_mappings.iter().all(|c| unlocked.contains(&c.id))
  }

  /// Whether `character_index` names a level of set `id`. An empty set has the
  /// single level 0.
  pub fn has_level(&self, id: &str, character_index: usize) -> bool {
    self.level_set(id).is_some_and(|s| character_index < s.character_mappings.len().max(1))
  }

  /// Levels in the whole curriculum; an empty set still counts as one.
  pub fn total_levels(&self) -> usize {
    self.level_sets.iter().map(|s| s.character_mappings.len().max(1)).sum()
  }
}
