//! Loading service configuration (server, webhooks, generation defaults) from TOML.
//!
//! The file is located through FLASHCARDS_CONFIG_PATH; every field has a default.
//! A handful of env variables override the file afterwards (see `apply_env`).

use std::time::Duration;

use serde::Deserialize;
use tracing::{error, info, warn};

use crate::domain::{CardCount, REMOTE_TIMEOUT};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
  #[serde(default)]
  pub server: ServerCfg,
  #[serde(default)]
  pub webhooks: WebhookCfg,
  #[serde(default)]
  pub generation: GenerationCfg,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ServerCfg {
  pub port: u16,
  /// Directory holding the widget pages.
  pub static_dir: String,
}

impl Default for ServerCfg {
  fn default() -> Self {
    Self { port: 3000, static_dir: "./static".into() }
  }
}

/// Remote endpoints. A missing URL disables that remote call.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct WebhookCfg {
  pub flashcards_url: Option<String>,
  pub summary_url: Option<String>,
  pub timeout_secs: u64,
  pub user_agent: String,
}

impl Default for WebhookCfg {
  fn default() -> Self {
    Self {
      flashcards_url: None,
      summary_url: None,
      timeout_secs: REMOTE_TIMEOUT.as_secs(),
      user_agent: "flashcards-backend/0.1".into(),
    }
  }
}

impl WebhookCfg {
  pub fn timeout(&self) -> Duration { Duration::from_secs(self.timeout_secs) }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct GenerationCfg {
  pub default_card_count: i64,
}

impl Default for GenerationCfg {
  fn default() -> Self { Self { default_card_count: CardCount::default().get() as i64 } }
}

impl GenerationCfg {
  pub fn default_count(&self) -> CardCount { CardCount::clamped(self.default_card_count) }
}

impl AppConfig {
  /// File (if any) then env overrides. Never fails; problems are logged.
  pub fn load() -> Self {
    let mut cfg = load_config_from_env_path().unwrap_or_default();
    cfg.apply_env(|key| std::env::var(key).ok());
    cfg
  }

  /// Apply PORT / FLASHCARDS_WEBHOOK_URL / SUMMARY_WEBHOOK_URL / WEBHOOK_TIMEOUT_SECS.
  pub fn apply_env<F: Fn(&str) -> Option<String>>(&mut self, lookup: F) {
    if let Some(port) = lookup("PORT") {
      match port.parse::<u16>() {
        Ok(p) => self.server.port = p,
        Err(e) => warn!(target: "flashcards_backend", %port, error = %e, "Ignoring invalid PORT"),
      }
    }
    if let Some(url) = lookup("FLASHCARDS_WEBHOOK_URL").filter(|u| !u.trim().is_empty()) {
      self.webhooks.flashcards_url = Some(url);
    }
    if let Some(url) = lookup("SUMMARY_WEBHOOK_URL").filter(|u| !u.trim().is_empty()) {
      self.webhooks.summary_url = Some(url);
    }
    if let Some(secs) = lookup("WEBHOOK_TIMEOUT_SECS") {
      match secs.parse::<u64>() {
        Ok(s) if s > 0 => self.webhooks.timeout_secs = s,
        _ => warn!(target: "flashcards_backend", %secs, "Ignoring invalid WEBHOOK_TIMEOUT_SECS"),
      }
    }
  }
}

/// Attempt to load `AppConfig` from FLASHCARDS_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_config_from_env_path() -> Option<AppConfig> {
  let path = std::env::var("FLASHCARDS_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<AppConfig>(&s) {
      Ok(cfg) => {
        info!(target: "flashcards_backend", %path, "Loaded config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "flashcards_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "flashcards_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}
