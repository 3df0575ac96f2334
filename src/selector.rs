//! Sentence-bank filtering for a target character.
//!
//! Selection is deterministic (first-match order inside each bucket); callers add
//! randomness on top when they need it.

use tracing::debug;

use crate::domain::{CharacterMapping, SentenceBank, SentenceLength};
use crate::text::mentions;

/// Up to `count` sentences from `bank` that mention `character`.
///
/// The preferred bucket is searched first. When it yields fewer than `count`
/// matches the other two buckets are appended in short → medium → long order,
/// skipping sentences already taken, until `count` is reached or the bank runs out.
pub fn select_for_character(
  bank: &SentenceBank,
  character: &CharacterMapping,
  count: usize,
  preferred: SentenceLength,
) -> Vec<String> {
  let mut selected: Vec<String> = Vec::new();

  let buckets = std::iter::once(preferred).chain(SentenceLength::ALL.into_iter().filter(|l| *l != preferred));
  for length in buckets {
    if selected.len() >= count {
      break;
    }
    for sentence in bank.bucket(length) {
      if selected.len() >= count {
        break;
      }
      if mentions(sentence, character) && !selected.contains(sentence) {
        selected.push(sentence.clone());
      }
    }
  }

  debug!(target: "content", character = %character.id, requested = count, found = selected.len(), "Selected sentences");
  selected
}
