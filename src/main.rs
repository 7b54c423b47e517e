//! Flashcards · Widget Backend
//!
//! - Axum HTTP + WebSocket API for the flashcard generator and the YouTube summarizer
//! - Remote generation through a configurable webhook, local synthesis as fallback
//! - Static widget pages (./static by default)
//!
//! Important env variables:
//!   PORT                   : u16 (default 3000)
//!   FLASHCARDS_CONFIG_PATH : path to TOML config (server, webhooks, generation)
//!   FLASHCARDS_WEBHOOK_URL : enables remote flashcard generation if present
//!   SUMMARY_WEBHOOK_URL    : enables the YouTube summarizer if present
//!   WEBHOOK_TIMEOUT_SECS   : bound on each webhook call (default 300)
//!   LOG_LEVEL              : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT             : "pretty" (default) or "json"

mod telemetry;
mod util;
mod error;
mod domain;
mod config;
mod synth;
mod normalize;
mod upload;
mod summary;
mod webhook;
mod pipeline;
mod session;
mod export;
mod state;
mod protocol;
mod routes;
#[cfg(test)]
mod test_support;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::info;

use crate::config::AppConfig;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  let config = AppConfig::load();
  let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));

  // Shared application state (config, webhook client, ingestion pipeline).
  let state = Arc::new(AppState::new(config));

  // Build the HTTP router with routes, CORS and tracing layers.
  let app = build_router(state.clone());

  let listener = TcpListener::bind(addr).await?;
  info!(target: "flashcards_backend", %addr, "HTTP server listening");
  axum::serve(listener, app).await?;
  Ok(())
}
