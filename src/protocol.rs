//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Field names are camelCase on the wire; WS messages are tagged by `type`.

use serde::{Deserialize, Serialize};

use crate::domain::{ContentItem, ProgressInfo, ValidationResult};
use crate::parser::SentenceReplacement;
use crate::progress::GameState;
use crate::state::LevelSetSummary;

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
  Ping,
  GetContent,
  SubmitAnswer {
    answer: String,
  },
  Advance,
  Skip,
  JumpToLevel {
    #[serde(rename = "levelSetId")]
    level_set_id: String,
    #[serde(rename = "characterIndex")]
    character_index: usize,
  },
  Reset,
  GetProgress,
  GetLevelSets,
  GetState,
  ToggleMenu,
  DismissTransitions,
  ParseSentence {
    #[serde(rename = "displayText")]
    display_text: String,
  },
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
  Pong,
  Content {
    item: Option<ContentItem>,
  },
  AnswerResult {
    #[serde(flatten)]
    result: ValidationResult,
  },
  Progress {
    progress: ProgressInfo,
  },
  LevelSets {
    #[serde(rename = "levelSets")]
    level_sets: Vec<LevelSetSummary>,
  },
  State {
    state: Box<GameState>,
  },
  Replacements {
    replacements: Vec<SentenceReplacement>,
  },
  Error {
    message: String,
  },
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Deserialize)]
pub struct AnswerIn {
  pub answer: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JumpIn {
  pub level_set_id: String,
  pub character_index: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseIn {
  pub display_text: String,
}

#[derive(Serialize)]
pub struct HealthOut {
  pub ok: bool,
}

#[derive(Serialize)]
pub struct ErrorOut {
  pub message: String,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn client_messages_parse_from_tagged_json() {
    let m: ClientWsMessage = serde_json::from_str(r#"{"type":"jump_to_level","levelSetId":"hiragana","characterIndex":2}"#).unwrap();
    assert!(matches!(m, ClientWsMessage::JumpToLevel { ref level_set_id, character_index: 2 } if level_set_id == "hiragana"));
    let m: ClientWsMessage = serde_json::from_str(r#"{"type":"parse_sentence","displayText":"cアt"}"#).unwrap();
    assert!(matches!(m, ClientWsMessage::ParseSentence { .. }));
    assert!(serde_json::from_str::<ClientWsMessage>(r#"{"type":"teleport"}"#).is_err());
  }

  #[test]
  fn answer_result_is_flattened() {
    let msg = ServerWsMessage::AnswerResult {
      result: ValidationResult { is_correct: true, expected: "a".into(), provided: "A".into(), feedback: "Correct!".into() },
    };
    let v = serde_json::to_value(&msg).unwrap();
    assert_eq!(v["type"], "answer_result");
    assert_eq!(v["isCorrect"], true);
    assert_eq!(v["feedback"], "Correct!");
  }
}
