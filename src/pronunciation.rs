//! Pronunciation seam. Speech synthesis belongs to the client; the server only
//! decides when a character should be spoken.

use tracing::info;

use crate::domain::CharacterMapping;

/// Speaking rate requested from synthesizers, slower than normal speech.
pub const SPEECH_RATE: f32 = 0.6;

pub trait Pronouncer: Send + Sync {
  fn is_supported(&self) -> bool;
  fn pronounce(&self, character: &CharacterMapping);
}

/// No speech available. Callers check `is_supported` and skip.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnsupportedPronouncer;

impl Pronouncer for UnsupportedPronouncer {
  fn is_supported(&self) -> bool {
    false
  }

  fn pronounce(&self, _character: &CharacterMapping) {}
}

/// Records each request as a log event, for clients that tail the log stream.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingPronouncer;

impl Pronouncer for TracingPronouncer {
  fn is_supported(&self) -> bool {
    true
  }

  fn pronounce(&self, character: &CharacterMapping) {
    info!(target: "kana_reader", id = %character.id, glyph = %character.character, hint = %character.pronunciation, rate = SPEECH_RATE, "Pronounce");
  }
}

pub fn pronouncer_for(enabled: bool) -> Box<dyn Pronouncer> {
  if enabled {
    Box::new(TracingPronouncer)
  } else {
    Box::new(UnsupportedPronouncer)
  }
}
