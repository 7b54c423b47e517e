//! Minimal client for the two remote webhooks (flashcards + video summary).
//!
//! Each call is a single JSON POST bounded by the configured timeout; there is
//! no retry. Calls are instrumented and log statuses, latencies and response
//! sizes (bodies only truncated, at debug level).

use std::time::{Duration, Instant};

use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, instrument};

use crate::config::WebhookCfg;
use crate::domain::{FlashcardSet, GenerationRequest, SourceMaterial};
use crate::error::{GenerationError, SummaryError};
use crate::normalize::normalize_response;
use crate::summary::render_summary;
use crate::util::{prefix_chars, trunc_for_log};

/// How much of a failing body is echoed back in the error message.
const ERROR_BODY_PREFIX: usize = 200;

#[derive(Clone)]
pub struct WebhookClient {
  pub client: reqwest::Client,
  pub flashcards_url: Option<String>,
  pub summary_url: Option<String>,
  pub timeout: Duration,
  pub user_agent: String,
}

/// Why a raw POST did not produce a response body.
enum PostFailure {
  TimedOut,
  Transport(reqwest::Error),
}

impl WebhookClient {
  pub fn new(cfg: &WebhookCfg) -> Result<Self, reqwest::Error> {
    let client = reqwest::Client::builder().build()?;
    Ok(Self {
      client,
      flashcards_url: cfg.flashcards_url.clone(),
      summary_url: cfg.summary_url.clone(),
      timeout: cfg.timeout(),
      user_agent: cfg.user_agent.clone(),
    })
  }

  #[cfg(test)]
  pub fn with_timeout(mut self, timeout: Duration) -> Self {
    self.timeout = timeout;
    self
  }

  pub fn has_flashcards(&self) -> bool { self.flashcards_url.is_some() }

  /// POST `body` as JSON and read the full response text, bounded by `self.timeout`.
  async fn post_json<T: Serialize>(&self, url: &str, body: &T) -> Result<(StatusCode, String), PostFailure> {
    let call = async {
      let res = self.client.post(url)
        .header(USER_AGENT, &self.user_agent)
        .header(CONTENT_TYPE, "application/json")
        .json(body).send().await?;
      let status = res.status();
      // Read the body even on failure; it is logged and echoed in the error.
      let text = res.text().await?;
      Ok::<_, reqwest::Error>((status, text))
    };
    match tokio::time::timeout(self.timeout, call).await {
      Err(_) => Err(PostFailure::TimedOut),
      Ok(Err(e)) if e.is_timeout() => Err(PostFailure::TimedOut),
      Ok(Err(e)) => Err(PostFailure::Transport(e)),
      Ok(Ok(r)) => Ok(r),
    }
  }

  /// One remote generation attempt. Returns normalized cards or the failure.
  #[instrument(target = "generation", level = "info", skip(self, payload), fields(source = payload.source, card_count = payload.card_count))]
  pub async fn request_flashcards(&self, payload: &FlashcardPayload) -> Result<FlashcardSet, GenerationError> {
    let url = self.flashcards_url.as_deref()
      .ok_or_else(|| GenerationError::NetworkError("flashcard webhook is not configured".into()))?;

    let start = Instant::now();
    let (status, body) = match self.post_json(url, payload).await {
      Ok(r) => r,
      Err(PostFailure::TimedOut) => {
        error!(target: "generation", elapsed = ?start.elapsed(), timeout = ?self.timeout, "Webhook timed out");
        return Err(GenerationError::Timeout(self.timeout));
      }
      Err(PostFailure::Transport(e)) => {
        error!(target: "generation", elapsed = ?start.elapsed(), error = %e, "Webhook request failed");
        return Err(GenerationError::NetworkError(e.to_string()));
      }
    };
    info!(target: "generation", %status, body_len = body.len(), elapsed = ?start.elapsed(), "Webhook responded");
    debug!(target: "generation", body = %trunc_for_log(&body, 512), "Raw webhook response");

    if !status.is_success() {
      return Err(GenerationError::NetworkError(format!(
        "Webhook returned status {}: {}",
        status.as_u16(),
        prefix_chars(&body, ERROR_BODY_PREFIX)
      )));
    }

    let cards = normalize_response(&body)?;
    info!(target: "generation", cards = cards.len(), "Flashcards loaded from webhook");
    Ok(cards)
  }

  /// Forward a video URL to the summary webhook and render the reply.
  #[instrument(target = "summary", level = "info", skip(self), fields(url_len = video_url.len()))]
  pub async fn summarize(&self, video_url: &str) -> Result<String, SummaryError> {
    let url = self.summary_url.as_deref().ok_or(SummaryError::NotConfigured)?;

    let start = Instant::now();
    let (status, body) = match self.post_json(url, &SummaryPayload { url: video_url }).await {
      Ok(r) => r,
      Err(PostFailure::TimedOut) => return Err(SummaryError::Timeout(self.timeout)),
      Err(PostFailure::Transport(e)) => return Err(SummaryError::Network(e.to_string())),
    };
    info!(target: "summary", %status, body_len = body.len(), elapsed = ?start.elapsed(), "Summary webhook responded");

    if !status.is_success() {
      return Err(SummaryError::Server(status.as_u16()));
    }
    let value: Value = serde_json::from_str(&body).map_err(|e| SummaryError::Network(e.to_string()))?;
    Ok(render_summary(&value))
  }
}

// --- Webhook DTOs ---

/// Request body for the flashcard webhook (`source` is "text" or "file").
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlashcardPayload {
  #[serde(flatten)]
  pub body: PayloadBody,
  pub card_count: usize,
  pub timestamp: String,
  pub source: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum PayloadBody {
  Text { content: String },
  File { binary: BinaryPart },
}

#[derive(Debug, Serialize)]
pub struct BinaryPart {
  pub file: FilePart,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilePart {
  pub data: String,
  pub file_name: String,
  pub mime_type: &'static str,
  pub file_size: u64,
}

impl FlashcardPayload {
  pub fn for_request(req: &GenerationRequest, now: DateTime<Utc>) -> Self {
    let body = match &req.source {
      SourceMaterial::Text(content) => PayloadBody::Text { content: content.clone() },
      SourceMaterial::File(file) => PayloadBody::File {
        binary: BinaryPart {
          file: FilePart {
            data: file.to_base64(),
            file_name: file.file_name.clone(),
            mime_type: file.mime_type(),
            file_size: file.size(),
          },
        },
      },
    };
    Self {
      body,
      card_count: req.count.get(),
      timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
      source: req.source.kind(),
    }
  }
}

#[derive(Serialize)]
struct SummaryPayload<'a> {
  url: &'a str,
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::{Arc, Mutex};

  use axum::{extract::State, http::StatusCode as HttpStatus, routing::post, Json, Router};
  use chrono::TimeZone;
  use serde_json::json;

  use crate::domain::{CardCount, Flashcard};
  use crate::test_support::{client_for, spawn_webhook, unused_url};
  use crate::upload::{UploadedFile, MIME_DOCX};

  fn text_request(content: &str, count: i64) -> GenerationRequest {
    GenerationRequest::new(SourceMaterial::Text(content.into()), Some(count), CardCount::default()).unwrap()
  }

  fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap()
  }

  #[test]
  fn text_payload_shape() {
    let payload = FlashcardPayload::for_request(&text_request("Some notes", 7), fixed_now());
    let v = serde_json::to_value(&payload).unwrap();
    assert_eq!(v, json!({
      "content": "Some notes",
      "cardCount": 7,
      "timestamp": "2024-05-01T12:30:00.000Z",
      "source": "text"
    }));
  }

  #[test]
  fn file_payload_shape() {
    let file = UploadedFile::new("cloud.docx", MIME_DOCX, b"PK\x03\x04".to_vec()).unwrap();
    let req = GenerationRequest::new(SourceMaterial::File(file), None, CardCount::default()).unwrap();
    let v = serde_json::to_value(FlashcardPayload::for_request(&req, fixed_now())).unwrap();
    assert_eq!(v["source"], "file");
    assert_eq!(v["cardCount"], 5);
    assert_eq!(v["binary"]["file"]["data"], "UEsDBA==");
    assert_eq!(v["binary"]["file"]["fileName"], "cloud.docx");
    assert_eq!(v["binary"]["file"]["mimeType"], MIME_DOCX);
    assert_eq!(v["binary"]["file"]["fileSize"], 4);
    assert!(v.get("content").is_none());
  }

  #[tokio::test]
  async fn direct_response_is_loaded_and_payload_is_sent() {
    let seen: Arc<Mutex<Option<Value>>> = Arc::new(Mutex::new(None));
    let app = Router::new()
      .route("/hook", post(|State(seen): State<Arc<Mutex<Option<Value>>>>, Json(body): Json<Value>| async move {
        *seen.lock().unwrap() = Some(body);
        Json(json!({ "flashcards": [{ "question": "Q", "answer": "A" }] }))
      }))
      .with_state(seen.clone());
    let url = spawn_webhook(app).await;

    let client = client_for(&url, Duration::from_secs(5));
    let payload = FlashcardPayload::for_request(&text_request("Rust ownership rules", 1), Utc::now());
    let cards = client.request_flashcards(&payload).await.unwrap();
    assert_eq!(cards, vec![Flashcard::new("Q", "A")]);

    let sent = seen.lock().unwrap().clone().unwrap();
    assert_eq!(sent["content"], "Rust ownership rules");
    assert_eq!(sent["cardCount"], 1);
    assert_eq!(sent["source"], "text");
  }

  #[tokio::test]
  async fn wrapped_response_is_loaded() {
    let app = Router::new().route("/hook", post(|| async {
      let inner = json!({ "flashcards": [{ "question": "Q1", "answer": "A1" }, { "question": "Q2", "answer": "A2" }] });
      Json(json!([{ "output": inner.to_string() }]))
    }));
    let url = spawn_webhook(app).await;

    let client = client_for(&url, Duration::from_secs(5));
    let payload = FlashcardPayload::for_request(&text_request("x", 2), Utc::now());
    let cards = client.request_flashcards(&payload).await.unwrap();
    assert_eq!(cards.len(), 2);
    assert_eq!(cards[1].answer, "A2");
  }

  #[tokio::test]
  async fn non_success_status_is_network_error_with_body_prefix() {
    let app = Router::new().route("/hook", post(|| async { (HttpStatus::INTERNAL_SERVER_ERROR, "boom") }));
    let url = spawn_webhook(app).await;

    let client = client_for(&url, Duration::from_secs(5));
    let payload = FlashcardPayload::for_request(&text_request("x", 2), Utc::now());
    let err = client.request_flashcards(&payload).await.unwrap_err();
    assert_eq!(err, GenerationError::NetworkError("Webhook returned status 500: boom".into()));
  }

  #[tokio::test]
  async fn unexpected_shape_is_reported() {
    let app = Router::new().route("/hook", post(|| async { Json(json!({ "cards": [] })) }));
    let url = spawn_webhook(app).await;

    let client = client_for(&url, Duration::from_secs(5));
    let payload = FlashcardPayload::for_request(&text_request("x", 2), Utc::now());
    let err = client.request_flashcards(&payload).await.unwrap_err();
    assert!(matches!(err, GenerationError::InvalidResponseShape(_)));
  }

  #[tokio::test]
  async fn slow_webhook_times_out() {
    let app = Router::new().route("/hook", post(|| async {
      tokio::time::sleep(Duration::from_secs(5)).await;
      Json(json!({ "flashcards": [] }))
    }));
    let url = spawn_webhook(app).await;

    let client = client_for(&url, Duration::from_millis(100));
    let payload = FlashcardPayload::for_request(&text_request("x", 2), Utc::now());
    let err = client.request_flashcards(&payload).await.unwrap_err();
    assert_eq!(err, GenerationError::Timeout(Duration::from_millis(100)));
  }

  #[tokio::test]
  async fn unreachable_webhook_is_network_error() {
    let client = client_for(&unused_url().await, Duration::from_secs(5));
    let payload = FlashcardPayload::for_request(&text_request("x", 2), Utc::now());
    let err = client.request_flashcards(&payload).await.unwrap_err();
    assert!(matches!(err, GenerationError::NetworkError(_)), "{err:?}");
  }

  #[tokio::test]
  async fn summarize_reads_summary_field_or_raw_json() {
    let app = Router::new()
      .route("/hook", post(|Json(body): Json<Value>| async move {
        if body["url"].as_str().unwrap_or_default().ends_with("abc") {
          Json(json!({ "summary": "A short video." }))
        } else {
          Json(json!({ "text": "no summary key" }))
        }
      }));
    let url = spawn_webhook(app).await;
    let client = client_for(&url, Duration::from_secs(5));

    let s = client.summarize("https://www.youtube.com/watch?v=abc").await.unwrap();
    assert_eq!(s, "A short video.");
    let raw = client.summarize("https://youtube.com/watch?v=xyz").await.unwrap();
    assert_eq!(raw, r#"{"text":"no summary key"}"#);
  }

  #[tokio::test]
  async fn summarize_reports_server_status() {
    let app = Router::new().route("/hook", post(|| async { HttpStatus::NOT_FOUND }));
    let url = spawn_webhook(app).await;
    let client = client_for(&url, Duration::from_secs(5));
    let err = client.summarize("https://youtube.com/watch?v=1").await.unwrap_err();
    assert_eq!(err, SummaryError::Server(404));
    assert_eq!(format!("Error: {err}"), "Error: Server error: 404");
  }

  #[tokio::test]
  async fn summarize_without_url_is_not_configured() {
    let mut client = client_for("http://127.0.0.1:1/hook", Duration::from_secs(1));
    client.summary_url = None;
    assert_eq!(client.summarize("https://youtube.com/watch?v=1").await, Err(SummaryError::NotConfigured));
  }
}
