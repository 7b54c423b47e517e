//! YouTube summary widget support: URL validation and reply rendering.
//! There is no local fallback; failures are shown verbatim.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::error::SummaryError;

static YOUTUBE_WATCH: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^https://(www\.)?youtube\.com/watch\?v=").expect("static youtube regex"));

/// Trim and check the URL against `https://[www.]youtube.com/watch?v=...`.
pub fn validate_youtube_url(raw: &str) -> Result<&str, SummaryError> {
  let url = raw.trim();
  if url.is_empty() || !YOUTUBE_WATCH.is_match(url) {
    return Err(SummaryError::InvalidUrl);
  }
  Ok(url)
}

/// Use a non-empty `summary` field when present, otherwise the raw JSON.
pub fn render_summary(value: &Value) -> String {
  match value.get("summary") {
    Some(Value::String(s)) if !s.is_empty() => s.clone(),
    Some(Value::Number(n)) if n.as_f64() != Some(0.0) => n.to_string(),
    Some(Value::Bool(true)) => "true".into(),
    Some(v @ (Value::Array(_) | Value::Object(_))) => v.to_string(),
    _ => value.to_string(),
  }
}

/// Text shown to the user when summarizing failed.
pub fn error_text(err: &SummaryError) -> String {
  match err {
    SummaryError::InvalidUrl => err.to_string(),
    other => format!("Error: {other}"),
  }
}
