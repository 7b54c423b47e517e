//! Ingestion pipeline: one remote attempt, then local synthesis on failure.
//!
//! Flow:
//! 1) Build the webhook payload (text, or base64 document) and POST it once.
//! 2) Normalize whichever response envelope comes back.
//! 3) On network error, timeout or bad shape, extract text (documents only)
//!    and synthesize cards locally. Nothing is cached or retried.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{error, info, instrument, warn};

use crate::domain::{CardOrigin, FlashcardSet, GenerationRequest, SourceMaterial};
use crate::error::GenerationError;
use crate::synth::synthesize;
use crate::upload::DocumentExtractor;
use crate::webhook::{FlashcardPayload, WebhookClient};

/// Result of one generation request.
#[derive(Clone, Debug)]
pub struct Generation {
  pub cards: FlashcardSet,
  pub origin: CardOrigin,
  /// User-facing explanation when the remote attempt failed.
  pub notice: Option<String>,
}

#[derive(Clone)]
pub struct IngestionPipeline {
  webhook: Option<WebhookClient>,
  extractor: Arc<dyn DocumentExtractor>,
}

impl IngestionPipeline {
  pub fn new(webhook: Option<WebhookClient>, extractor: Arc<dyn DocumentExtractor>) -> Self {
    Self { webhook, extractor }
  }

  pub fn remote_enabled(&self) -> bool {
    self.webhook.as_ref().is_some_and(WebhookClient::has_flashcards)
  }

  #[instrument(target = "generation", level = "info", skip(self, req), fields(source = req.source.kind(), count = req.count.get()))]
  pub async fn generate(&self, req: &GenerationRequest) -> Result<Generation, GenerationError> {
    let Some(webhook) = self.webhook.as_ref().filter(|w| w.has_flashcards()) else {
      let cards = self.synthesize_locally(req)?;
      info!(target: "generation", cards = cards.len(), origin = "local", "No flashcard webhook; synthesized locally");
      return Ok(Generation { cards, origin: CardOrigin::Local, notice: None });
    };

    let payload = FlashcardPayload::for_request(req, Utc::now());
    match webhook.request_flashcards(&payload).await {
      Ok(cards) => Ok(Generation { cards, origin: CardOrigin::Remote, notice: None }),
      Err(e) if !e.is_remote_failure() => Err(e),
      Err(e) => {
        warn!(target: "generation", error = %e, "Remote generation failed; falling back to local synthesis");
        let cards = self.synthesize_locally(req)?;
        info!(target: "generation", cards = cards.len(), origin = "local_fallback", "Synthesized fallback cards");
        Ok(Generation { cards, origin: CardOrigin::LocalFallback, notice: Some(fallback_notice(&e)) })
      }
    }
  }

  fn synthesize_locally(&self, req: &GenerationRequest) -> Result<FlashcardSet, GenerationError> {
    let text = match &req.source {
      SourceMaterial::Text(t) => t.clone(),
      SourceMaterial::File(f) => self.extractor.extract_text(f).map_err(|e| {
        error!(target: "generation", file_name = %f.file_name, error = %e, "Text extraction failed");
        e
      })?,
    };
    Ok(synthesize(&text, req.count.get()))
  }
}

fn describe_timeout(d: Duration) -> String {
  let secs = d.as_secs();
  match secs {
    60 => "over 1 minute".into(),
    s if s >= 60 && s % 60 == 0 => format!("over {} minutes", s / 60),
    1 => "over 1 second".into(),
    s if s > 0 => format!("over {s} seconds"),
    _ => format!("over {} ms", d.as_millis()),
  }
}

/// Message shown alongside locally generated cards.
pub fn fallback_notice(err: &GenerationError) -> String {
  match err {
    GenerationError::Timeout(d) => format!(
      "The request took too long ({}). Please try with a smaller file or less flashcards. Generating flashcards locally instead.",
      describe_timeout(*d)
    ),
    other => format!("Error connecting to the server: {other}\n\nGenerating flashcards locally instead."),
  }
}
