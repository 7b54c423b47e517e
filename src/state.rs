//! Application state: configuration, the webhook client and the ingestion pipeline.
//!
//! Built once at startup and shared read-only between handlers. Per-client
//! mutable state (current cards, active index) lives in `FlashcardSession`.

use std::sync::Arc;

use tracing::{error, info, instrument};

use crate::config::AppConfig;
use crate::domain::{CardCount, GenerationRequest, SourceMaterial};
use crate::error::{RequestError, SummaryError};
use crate::pipeline::{Generation, IngestionPipeline};
use crate::summary::validate_youtube_url;
use crate::upload::{DocumentExtractor, SimulatedExtractor};
use crate::webhook::WebhookClient;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub webhook: Option<WebhookClient>,
    pub pipeline: IngestionPipeline,
}

impl AppState {
    /// Build state from config with the simulated document extractor.
    #[instrument(level = "info", skip_all)]
    pub fn new(config: AppConfig) -> Self {
        Self::with_extractor(config, Arc::new(SimulatedExtractor))
    }

    pub fn with_extractor(config: AppConfig, extractor: Arc<dyn DocumentExtractor>) -> Self {
        let webhook = match WebhookClient::new(&config.webhooks) {
            Ok(client) => Some(client),
            Err(e) => {
                error!(target: "flashcards_backend", error = %e, "Failed to build HTTP client; webhooks disabled");
                None
            }
        };

        match &config.webhooks.flashcards_url {
            Some(url) => info!(target: "flashcards_backend", %url, timeout_secs = config.webhooks.timeout_secs, "Flashcard webhook enabled."),
            None => info!(target: "flashcards_backend", "Flashcard webhook disabled (no FLASHCARDS_WEBHOOK_URL). Using local synthesis."),
        }
        if config.webhooks.summary_url.is_none() {
            info!(target: "flashcards_backend", "Summary webhook disabled (no SUMMARY_WEBHOOK_URL).");
        }

        let pipeline = IngestionPipeline::new(webhook.clone(), extractor);
        Self { config, webhook, pipeline }
    }

    pub fn default_count(&self) -> CardCount {
        self.config.generation.default_count()
    }

    /// Validate the request, then run the pipeline.
    #[instrument(level = "info", skip(self, source), fields(source = source.kind()))]
    pub async fn generate(&self, source: SourceMaterial, count: Option<i64>) -> Result<Generation, RequestError> {
        let req = GenerationRequest::new(source, count, self.default_count())?;
        Ok(self.pipeline.generate(&req).await?)
    }

    /// Validate the URL before anything is sent, then call the summary webhook.
    #[instrument(level = "info", skip(self, raw_url))]
    pub async fn summarize(&self, raw_url: &str) -> Result<String, SummaryError> {
        let url = validate_youtube_url(raw_url)?;
        let webhook = self.webhook.as_ref().ok_or(SummaryError::NotConfigured)?;
        webhook.summarize(url).await
    }
}
