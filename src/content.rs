//! On-demand content generation for a character level.
//!
//! Every pull yields one `ContentItem`: a sentence (35%) or a question (65%).
//! Questions pick a character from the current level set with triangular weighting
//! towards the most recent one and never repeat a character within a level; a
//! failed question draw falls back to a sentence. Sentences come from the short
//! bucket of the bank and are rewritten with the glyphs of the current level set only.

use std::collections::BTreeSet;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::domain::{CharacterMapping, ContentItem, SentenceBank, SentenceLength, ValidationResult};
use crate::questions::current_character_questions;
use crate::selector::select_for_character;
use crate::text::substitute;
use crate::util::normalize_answer;

/// Probability that a pull produces a sentence.
pub const SENTENCE_PROBABILITY: f64 = 0.35;
/// Candidate sentences fetched per sentence pull.
pub const SENTENCE_CANDIDATES: usize = 10;
/// Sentence exercises added on top of the questions of every character level.
pub const SENTENCES_PER_LEVEL: usize = 2;
const BASE_QUESTIONS: usize = 2;

/// Level-scoped deduplication sets. Cleared on every level or level-set change.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelHistory {
  pub used_characters: BTreeSet<String>,
  pub used_sentences: BTreeSet<String>,
}

/// Curriculum position and inputs for one pull.
#[derive(Clone, Copy, Debug)]
pub struct GenerationContext<'a> {
  pub content_index: usize,
  pub current_character: Option<&'a CharacterMapping>,
  /// Earlier characters of the same level set, in unlock order.
  pub previous_characters: &'a [CharacterMapping],
  /// Every unlocked character across level sets. Not used for substitution so
  /// glyphs from other level sets never leak into this set's sentences.
  pub unlocked_characters: &'a [CharacterMapping],
  pub current_level_index: usize,
  pub sentence_bank: &'a SentenceBank,
  pub level_set_id: &'a str,
}

/// Result of a pull: the item (if any) and the updated history.
#[derive(Clone, Debug)]
pub struct Generated {
  pub item: Option<ContentItem>,
  pub history: LevelHistory,
}

/// Produce the item for `ctx.content_index`.
///
/// Returns no item when there is no current character or when no sentence in the
/// bank mentions it and the question path did not produce one. Callers must not
/// re-pull the same index in a loop on `None`.
#[instrument(level = "debug", skip_all, fields(index = ctx.content_index, level_set = ctx.level_set_id))]
pub fn generate_at<R: Rng + ?Sized>(ctx: &GenerationContext<'_>, mut history: LevelHistory, rng: &mut R) -> Generated {
  let Some(current) = ctx.current_character else {
    return Generated { item: None, history };
  };

  if !rng.gen_bool(SENTENCE_PROBABILITY) {
    let pool = most_recent_first(current, ctx.previous_characters);
    match select_triangular(&pool, ctx.current_level_index, &history.used_characters, rng) {
      Some(selected) if !history.used_characters.contains(&selected.id) => {
        history.used_characters.insert(selected.id.clone());
        if let Some(q) = current_character_questions(selected, 1, rng).into_iter().next() {
          let id = format!("{}-question-{}", ctx.level_set_id, ctx.content_index);
          debug!(target: "content", character = %selected.id, %id, "Generated question");
          return Generated { item: Some(ContentItem::from_question(q, id)), history };
        }
        warn!(target: "content", character = %selected.id, "Character has no answers for a question; using a sentence");
      }
      _ => debug!(target: "content", "No unused character drawn; using a sentence"),
    }
  }

  let item = sentence_item(ctx, current, &mut history.used_sentences);
  Generated { item, history }
}

/// `[current, newest previous, …, oldest previous]`.
fn most_recent_first<'a>(current: &'a CharacterMapping, previous: &'a [CharacterMapping]) -> Vec<&'a CharacterMapping> {
  std::iter::once(current).chain(previous.iter().rev()).collect()
}

/// Triangular lottery over `current_level_index + 1` recency slots.
///
/// Slot `i` (0 = most recent) has weight `max_level - i`. The drawn slot indexes
/// into the unused part of `pool`, clamped to its last element.
pub fn select_triangular<'a, R: Rng + ?Sized>(
  pool: &[&'a CharacterMapping],
  current_level_index: usize,
  used: &BTreeSet<String>,
  rng: &mut R,
) -> Option<&'a CharacterMapping> {
  let unused: Vec<&CharacterMapping> = pool.iter().copied().filter(|c| !used.contains(&c.id)).collect();
  if unused.is_empty() {
    return None;
  }

  let max_level = current_level_index + 1;
  let total = max_level * (max_level + 1) / 2;
  let draw = ((rng.gen::<f64>() * total as f64) as usize).min(total - 1);

  let mut cumulative = 0;
  for slot in 0..max_level {
    let weight = max_level - slot;
    if draw < cumulative + weight {
      return Some(unused[slot.min(unused.len() - 1)]);
    }
    cumulative += weight;
  }
  unused.first().copied()
}

fn sentence_item(ctx: &GenerationContext<'_>, current: &CharacterMapping, used: &mut BTreeSet<String>) -> Option<ContentItem> {
  let candidates = select_for_character(ctx.sentence_bank, current, SENTENCE_CANDIDATES, SentenceLength::Short);
  if candidates.is_empty() {
    warn!(target: "content", character = %current.id, "No sentence mentions this character");
    return None;
  }

  let unused: Vec<&String> = candidates.iter().filter(|s| !used.contains(*s)).collect();
  let chosen = if unused.is_empty() {
    candidates[ctx.content_index % candidates.len()].clone()
  } else {
    unused[ctx.content_index % unused.len()].clone()
  };
  used.insert(chosen.clone());

  let level_set_characters = std::iter::once(current).chain(ctx.previous_characters.iter());
  let display_text = substitute(&chosen, level_set_characters);
  let id = format!("{}-sentence-{}", ctx.level_set_id, ctx.content_index);
  debug!(target: "content", %id, reused = unused.is_empty(), "Generated sentence");
  Some(ContentItem::Sentence { id, display_text, original_text: chosen })
}

/// Questions in a character level: 2 at level 0, plus one each time the level
/// index reaches the next triangular number (1, 3, 6, 10, …).
pub fn calculate_questions_per_level(level_index: usize) -> usize {
  BASE_QUESTIONS.saturating_add(triangular_root(level_index))
}

/// Largest `n` with `n * (n + 1) / 2 <= value`.
fn triangular_root(value: usize) -> usize {
  let triangle = |n: usize| (n as u128) * (n as u128 + 1) / 2;
  let target = value as u128;
  // Float estimate, then settle the rounding exactly.
  let mut n = (((8.0 * value as f64 + 1.0).sqrt() - 1.0) / 2.0) as usize;
  while n > 0 && triangle(n) > target {
    n -= 1;
  }
  while triangle(n + 1) <= target {
    n += 1;
  }
  n
}

/// Total exercises of a character level: its questions plus the sentence slots.
pub fn exercises_per_level(level_index: usize) -> usize {
  calculate_questions_per_level(level_index).saturating_add(SENTENCES_PER_LEVEL)
}

/// How a question's accepted answers should be described in feedback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnswerKind {
  Meaning,
  Romanization,
}

const MEANING_WORDS: [&str; 5] = ["one", "two", "three", "four", "five"];

/// Guess the answer kind from the accepted answers alone.
///
/// Only the number words are recognised as meanings; every other answer list reads
/// as romanizations. Items do not carry their question kind, so this is the single
/// place to swap in an explicit tag.
pub fn answer_kind(accepted: &[String]) -> AnswerKind {
  if accepted.iter().any(|a| MEANING_WORDS.contains(&a.to_lowercase().as_str())) {
    AnswerKind::Meaning
  } else {
    AnswerKind::Romanization
  }
}

/// Check `answer` against `item`. Comparison ignores case and edge whitespace.
pub fn validate(item: &ContentItem, answer: &str) -> ValidationResult {
  let normalized = normalize_answer(answer);
  match item {
    ContentItem::Sentence { original_text, .. } => {
      let is_correct = normalize_answer(original_text) == normalized;
      ValidationResult {
        is_correct,
        expected: original_text.clone(),
        provided: answer.to_string(),
        feedback: if is_correct { "Perfect!".into() } else { format!("Correct answer: {original_text}") },
      }
    }
    ContentItem::Question { accepted_answers, .. } => {
      let is_correct = accepted_answers.iter().any(|a| normalize_answer(a) == normalized);
      let feedback = if is_correct {
        "Correct!".to_string()
      } else {
        let joined = accepted_answers.join(" / ");
        match answer_kind(accepted_answers) {
          AnswerKind::Meaning => format!("Correct meaning: {joined}"),
          AnswerKind::Romanization => format!("Correct romanization: {joined}"),
        }
      };
      ValidationResult {
        is_correct,
        expected: accepted_answers.first().cloned().unwrap_or_default(),
        provided: answer.to_string(),
        feedback,
      }
    }
  }
}
