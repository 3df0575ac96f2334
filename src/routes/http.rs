//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.

use std::sync::Arc;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use tracing::instrument;

use crate::logic;
use crate::protocol::*;
use crate::state::AppState;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

pub async fn http_get_content(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(logic::current_content(&state).await)
}

#[instrument(level = "info", skip(state, body), fields(answer_len = body.answer.len()))]
pub async fn http_post_answer(
  State(state): State<Arc<AppState>>,
  Json(body): Json<AnswerIn>,
) -> impl IntoResponse {
  Json(logic::submit_answer(&state, &body.answer).await)
}

pub async fn http_post_advance(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(logic::advance(&state).await)
}

pub async fn http_post_skip(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(logic::skip(&state).await)
}

#[instrument(level = "info", skip(state, body), fields(level_set_id = %body.level_set_id, character_index = body.character_index))]
pub async fn http_post_jump(
  State(state): State<Arc<AppState>>,
  Json(body): Json<JumpIn>,
) -> impl IntoResponse {
  match logic::jump_to_level(&state, &body.level_set_id, body.character_index).await {
    Ok(progress) => (StatusCode::OK, Json(progress)).into_response(),
    Err(message) => (StatusCode::NOT_FOUND, Json(ErrorOut { message })).into_response(),
  }
}

pub async fn http_post_reset(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(logic::reset(&state).await)
}

pub async fn http_get_progress(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(logic::progress(&state).await)
}

pub async fn http_get_level_sets(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(logic::level_sets(&state).await)
}

pub async fn http_get_state(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(state.snapshot().await)
}

pub async fn http_post_menu(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(state.toggle_menu().await)
}

pub async fn http_post_dismiss(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(state.dismiss_transitions().await)
}

#[instrument(level = "info", skip(state, body), fields(text_len = body.display_text.len()))]
pub async fn http_post_parse(
  State(state): State<Arc<AppState>>,
  Json(body): Json<ParseIn>,
) -> impl IntoResponse {
  Json(logic::parse_sentence(&state, &body.display_text).await)
}
