//! WebSocket upgrade + message loop. Each client message is parsed as JSON and
//! forwarded to core logic; every request gets exactly one JSON reply.

use std::sync::Arc;
use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

use crate::logic;
use crate::protocol::{ClientWsMessage, ServerWsMessage};
use crate::state::AppState;

#[instrument(level = "info", skip(ws, state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "kana_reader", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state, Uuid::new_v4()))
}

#[instrument(level = "info", skip(socket, state), fields(%conn))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>, conn: Uuid) {
  info!(target: "kana_reader", "WebSocket connected");
  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        let out = reply_for(&txt, &state).await;
        if let Err(e) = socket.send(Message::Text(out)).await {
          error!(target: "kana_reader", error = %e, "WS send error");
          break;
        }
      }
      Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
      Message::Close(_) => break,
      _ => {}
    }
  }
  info!(target: "kana_reader", "WebSocket disconnected");
}

/// Parse, dispatch, serialize.
pub async fn reply_for(txt: &str, state: &AppState) -> String {
  let reply_msg = match serde_json::from_str::<ClientWsMessage>(txt) {
    Ok(incoming) => {
      debug!(target: "kana_reader", "WS received: {:?}", &incoming);
      handle_client_ws(incoming, state).await
    }
    Err(e) => ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) },
  };

  serde_json::to_string(&reply_msg).unwrap_or_else(|e| {
    serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
  })
}

async fn handle_client_ws(msg: ClientWsMessage, state: &AppState) -> ServerWsMessage {
  match msg {
    ClientWsMessage::Ping => ServerWsMessage::Pong,

    ClientWsMessage::GetContent => ServerWsMessage::Content { item: logic::current_content(state).await },

    ClientWsMessage::SubmitAnswer { answer } => ServerWsMessage::AnswerResult { result: logic::submit_answer(state, &answer).await },

    ClientWsMessage::Advance => ServerWsMessage::Progress { progress: logic::advance(state).await },

    ClientWsMessage::Skip => ServerWsMessage::Progress { progress: logic::skip(state).await },

    ClientWsMessage::JumpToLevel { level_set_id, character_index } => {
      match logic::jump_to_level(state, &level_set_id, character_index).await {
        Ok(progress) => ServerWsMessage::Progress { progress },
        Err(message) => ServerWsMessage::Error { message },
      }
    }

    ClientWsMessage::Reset => ServerWsMessage::Progress { progress: logic::reset(state).await },

    ClientWsMessage::GetProgress => ServerWsMessage::Progress { progress: logic::progress(state).await },

    ClientWsMessage::GetLevelSets => ServerWsMessage::LevelSets { level_sets: logic::level_sets(state).await },

    ClientWsMessage::GetState => ServerWsMessage::State { state: Box::new(state.snapshot().await) },

    ClientWsMessage::ToggleMenu => ServerWsMessage::State { state: Box::new(state.toggle_menu().await) },

    ClientWsMessage::DismissTransitions => ServerWsMessage::State { state: Box::new(state.dismiss_transitions().await) },

    ClientWsMessage::ParseSentence { display_text } => {
      ServerWsMessage::Replacements { replacements: logic::parse_sentence(state, &display_text).await }
    }
  }
}
