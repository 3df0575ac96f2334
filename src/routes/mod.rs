//! Router assembly: HTTP endpoints, WebSocket upgrade, static files, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;
pub mod ws;

/// Build the application router with:
/// - WebSocket at `/ws`
/// - JSON API under `/api/v1/...`
/// - Static SPA from `./static` with index fallback
/// - permissive CORS and per-request trace spans
pub fn build_router(state: Arc<AppState>) -> Router {
    let static_service = ServeDir::new("./static")
        .append_index_html_on_directories(true)
        .not_found_service(ServeFile::new("./static/index.html"));

    Router::new()
        .route("/ws", get(ws::ws_upgrade))
        .route("/api/v1/health", get(http::http_health))
        .route("/api/v1/content", get(http::http_get_content))
        .route("/api/v1/answer", post(http::http_post_answer))
        .route("/api/v1/advance", post(http::http_post_advance))
        .route("/api/v1/skip", post(http::http_post_skip))
        .route("/api/v1/jump", post(http::http_post_jump))
        .route("/api/v1/reset", post(http::http_post_reset))
        .route("/api/v1/progress", get(http::http_get_progress))
        .route("/api/v1/level_sets", get(http::http_get_level_sets))
        .route("/api/v1/state", get(http::http_get_state))
        .route("/api/v1/menu", post(http::http_post_menu))
        .route("/api/v1/dismiss", post(http::http_post_dismiss))
        .route("/api/v1/parse", post(http::http_post_parse))
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .fallback_service(static_service)
}
