//! Kana Reader · learning engine server
//!
//! - Axum HTTP + WebSocket API over one learner session
//! - Progress saved as JSON after every change
//! - Static SPA fallback (./static/index.html)
//!
//! Important env variables:
//!   PORT                   : u16 (default 3000)
//!   CURRICULUM_CONFIG_PATH : TOML with level sets and sentences (built-in seeds otherwise)
//!   PROGRESS_PATH          : saved progress file (default ./data/progress.json)
//!   PRONUNCIATION_LOG      : "1" to emit pronunciation requests as log events
//!   LOG_LEVEL              : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT             : "pretty" (default) or "json"

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::info;

use kana_reader::config::ServiceConfig;
use kana_reader::routes::build_router;
use kana_reader::state::AppState;
use kana_reader::telemetry;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  let cfg = ServiceConfig::from_env();
  let state = Arc::new(AppState::from_config(&cfg));
  let app = build_router(state);

  let addr = SocketAddr::from(([0, 0, 0, 0], cfg.port));
  let listener = TcpListener::bind(addr).await?;
  info!(target: "kana_reader", %addr, "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(target: "kana_reader", error = %e, "Failed to listen for ctrl-c");
    std::future::pending::<()>().await;
  }
  info!(target: "kana_reader", "Shutdown signal received");
}
