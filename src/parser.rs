//! Recovering fill-in slots from a substituted sentence, and the interactive
//! editor state a learner works through while answering a sentence exercise.
//!
//! Offsets are char (code point) indices into the display text. Every matched
//! glyph is its own slot, so a two-glyph kanji compound yields two slots.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::CharacterMapping;
use crate::util::is_japanese;

/// One embedded-glyph slot inside a displayed sentence.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentenceReplacement {
  pub original: String,
  pub expected: String,
  pub start_index: usize,
  pub end_index: usize,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub character_id: Option<String>,
}

fn primary_answer(mapping: &CharacterMapping) -> Option<&str> {
  let answers = if mapping.is_kanji() && !mapping.translations().is_empty() {
    mapping.translations()
  } else {
    mapping.romanizations.as_slice()
  };
  answers.first().map(String::as_str)
}

/// Scan `display_text` for glyphs known to `available`, in reading order.
pub fn parse<'a, I>(display_text: &str, available: I) -> Vec<SentenceReplacement>
where
  I: IntoIterator<Item = &'a CharacterMapping>,
{
  // Later mappings for the same glyph shadow earlier ones.
  let by_glyph: HashMap<&str, &CharacterMapping> = available
    .into_iter()
    .map(|m| (m.character.as_str(), m))
    .collect();

  let mut slots: Vec<SentenceReplacement> = display_text
    .chars()
    .enumerate()
    .filter(|(_, ch)| is_japanese(*ch))
    .filter_map(|(i, ch)| {
      let mut buf = [0u8; 4];
      let glyph: &str = ch.encode_utf8(&mut buf);
      let mapping = by_glyph.get(glyph)?;
      let expected = primary_answer(mapping)?;
      Some(SentenceReplacement {
        original: glyph.to_string(),
        expected: expected.to_lowercase(),
        start_index: i,
        end_index: i + 1,
        character_id: Some(mapping.id.clone()),
      })
    })
    .collect();

  slots.sort_by_key(|s| s.start_index);
  slots
}

/// A slot plus the learner's working state for it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorSlot {
  #[serde(flatten)]
  pub replacement: SentenceReplacement,
  pub user_input: String,
  pub is_complete: bool,
  pub is_correct: bool,
  pub is_skipped: bool,
}

/// Grade of a finished sentence exercise.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EditorScore {
  Perfect,
  Almost,
  NotQuite,
}

/// Slot-by-slot answering session over one sentence.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentenceEditor {
  display_text: String,
  slots: Vec<EditorSlot>,
  cursor: usize,
}

impl SentenceEditor {
  pub fn new<'a, I>(display_text: &str, available: I) -> Self
  where
    I: IntoIterator<Item = &'a CharacterMapping>,
  {
    let slots = parse(display_text, available)
      .into_iter()
      .map(|replacement| EditorSlot {
        replacement,
        user_input: String::new(),
        is_complete: false,
        is_correct: false,
        is_skipped: false,
      })
      .collect();
    Self { display_text: display_text.to_string(), slots, cursor: 0 }
  }

  pub fn slots(&self) -> &[EditorSlot] {
    &self.slots
  }

  /// Index of the slot currently receiving input.
  pub fn cursor(&self) -> usize {
    self.cursor
  }

  pub fn is_finished(&self) -> bool {
    self.cursor >= self.slots.len()
  }

  /// Append a letter to the active slot. Non-letters are ignored.
  /// The slot completes as correct the moment its input equals the expected text.
  pub fn type_char(&mut self, ch: char) {
    if !ch.is_ascii_alphabetic() {
      return;
    }
    let Some(slot) = self.slots.get_mut(self.cursor) else { return };
    slot.user_input.push(ch.to_ascii_lowercase());
    if slot.user_input == slot.replacement.expected {
      slot.is_complete = true;
      slot.is_correct = true;
      self.cursor += 1;
    }
  }

  pub fn backspace(&mut self) {
    if let Some(slot) = self.slots.get_mut(self.cursor) {
      slot.user_input.pop();
    }
  }

  /// Give up on the active slot; it shows the expected text and counts as wrong.
  pub fn skip(&mut self) {
    let Some(slot) = self.slots.get_mut(self.cursor) else { return };
    slot.is_complete = true;
    slot.is_correct = false;
    slot.is_skipped = true;
    slot.user_input = slot.replacement.expected.clone();
    self.cursor += 1;
  }

  /// `None` until every slot is complete.
  pub fn score(&self) -> Option<EditorScore> {
    if !self.is_finished() {
      return None;
    }
    let total = self.slots.len();
    let correct = self.slots.iter().filter(|s| s.is_correct).count();
    Some(if correct == total {
      EditorScore::Perfect
    } else if correct + 1 == total {
      EditorScore::Almost
    } else {
      EditorScore::NotQuite
    })
  }

  /// Display text with each completed slot replaced by its input and the active
  /// slot showing partial input when there is any.
  pub fn rendered(&self) -> String {
    let chars: Vec<char> = self.display_text.chars().collect();
    let mut out = String::with_capacity(self.display_text.len());
    let mut last = 0;
    for (i, slot) in self.slots.iter().enumerate() {
      let r = &slot.replacement;
      out.extend(&chars[last..r.start_index]);
      let shown = if slot.is_complete || (i == self.cursor && !slot.user_input.is_empty()) {
        slot.user_input.as_str()
      } else {
        r.original.as_str()
      };
      out.push_str(shown);
      last = r.end_index;
    }
    out.extend(&chars[last..]);
    out
  }
}
