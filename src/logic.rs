//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! Each function takes the shared `AppState`, performs one session operation and
//! logs the outcome under the `kana_reader` target.

use tracing::{info, instrument, warn};

use crate::domain::{ContentItem, ProgressInfo, ValidationResult};
use crate::parser::SentenceReplacement;
use crate::state::{AppState, LevelSetSummary};
use crate::util::trunc_for_log;

#[instrument(level = "info", skip(state))]
pub async fn current_content(state: &AppState) -> Option<ContentItem> {
  let item = state.current_item().await;
  match &item {
    Some(i) => info!(target: "kana_reader", id = %i.id(), character = i.character_id().unwrap_or("-"), sentence = i.is_sentence(), "Content served"),
    None => info!(target: "kana_reader", "No content at this position"),
  }
  item
}

/// Validate against the held item. Without one, the answer is reported as incorrect.
#[instrument(level = "info", skip(state, answer), fields(answer_len = answer.len()))]
pub async fn submit_answer(state: &AppState, answer: &str) -> ValidationResult {
  match state.submit_answer(answer).await {
    Some(result) => {
      info!(target: "kana_reader", correct = result.is_correct, provided = %trunc_for_log(answer, 40), "Answer evaluated");
      result
    }
    None => {
      warn!(target: "kana_reader", "Answer submitted with no content item");
      ValidationResult {
        is_correct: false,
        expected: String::new(),
        provided: answer.to_string(),
        feedback: "No content item to answer.".into(),
      }
    }
  }
}

#[instrument(level = "info", skip(state))]
pub async fn advance(state: &AppState) -> ProgressInfo {
  state.advance().await
}

#[instrument(level = "info", skip(state))]
pub async fn skip(state: &AppState) -> ProgressInfo {
  state.skip().await
}

#[instrument(level = "info", skip(state))]
pub async fn jump_to_level(state: &AppState, level_set_id: &str, character_index: usize) -> Result<ProgressInfo, String> {
  match state.jump_to_level(level_set_id, character_index).await {
    Some(p) => {
      info!(target: "kana_reader", %level_set_id, character_index, "Jumped to level");
      Ok(p)
    }
    None if state.curriculum.level_set(level_set_id).is_none() => {
      warn!(target: "kana_reader", %level_set_id, "Jump to unknown level set");
      Err(format!("Unknown levelSetId: {level_set_id}"))
    }
    None => {
      warn!(target: "kana_reader", %level_set_id, character_index, "Jump past the end of the level set");
      Err(format!("Level set {level_set_id} has no characterIndex {character_index}"))
    }
  }
}

#[instrument(level = "info", skip(state))]
pub async fn reset(state: &AppState) -> ProgressInfo {
  info!(target: "kana_reader", "Progress reset requested");
  state.reset().await
}

pub async fn progress(state: &AppState) -> ProgressInfo {
  state.progress().await
}

pub async fn level_sets(state: &AppState) -> Vec<LevelSetSummary> {
  state.level_set_summaries().await
}

#[instrument(level = "info", skip(state, display_text), fields(text_len = display_text.len()))]
pub async fn parse_sentence(state: &AppState, display_text: &str) -> Vec<SentenceReplacement> {
  let replacements = state.parse_sentence(display_text).await;
  info!(target: "kana_reader", slots = replacements.len(), "Sentence parsed");
  replacements
}
