//! HTTP endpoint handlers. These are thin wrappers that forward to state/pipeline logic.
//! Each handler is instrumented; validation failures come back as `{ "error": ... }`.

use std::sync::Arc;
use axum::{
  extract::State,
  http::{header, StatusCode},
  response::{IntoResponse, Response},
  Json,
};
use chrono::Utc;
use rand::{rngs::StdRng, SeedableRng};
use tracing::{info, instrument, warn};

use crate::error::{GenerationError, RequestError, SummaryError, UploadError};
use crate::export::{export_file_name, to_pretty_json};
use crate::protocol::*;
use crate::session::shuffled;
use crate::state::AppState;
use crate::summary::error_text;

/// Error reply: status plus a user-facing message.
#[derive(Debug)]
pub struct ApiError(pub StatusCode, pub String);

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    (self.0, Json(ErrorOut { error: self.1 })).into_response()
  }
}

impl From<RequestError> for ApiError {
  fn from(e: RequestError) -> Self {
    let status = match &e {
      RequestError::Generation(GenerationError::EmptyInput | GenerationError::InvalidCount(_)) => StatusCode::BAD_REQUEST,
      RequestError::Generation(GenerationError::ExtractionError(_)) => StatusCode::UNPROCESSABLE_ENTITY,
      RequestError::Generation(GenerationError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
      RequestError::Generation(_) => StatusCode::BAD_GATEWAY,
      RequestError::Upload(UploadError::UnsupportedType(_)) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
      RequestError::Upload(UploadError::TooLarge { .. }) => StatusCode::PAYLOAD_TOO_LARGE,
      RequestError::Upload(_) => StatusCode::BAD_REQUEST,
    };
    ApiError(status, e.to_string())
  }
}

impl From<SummaryError> for ApiError {
  fn from(e: SummaryError) -> Self {
    let status = match &e {
      SummaryError::InvalidUrl => StatusCode::BAD_REQUEST,
      SummaryError::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
      SummaryError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
      SummaryError::Server(_) | SummaryError::Network(_) => StatusCode::BAD_GATEWAY,
    };
    ApiError(status, error_text(&e))
  }
}

#[instrument(level = "info", skip(state))]
pub async fn http_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(HealthOut { ok: true, remote_generation: state.pipeline.remote_enabled() })
}

#[instrument(level = "info", skip(state, body))]
pub async fn http_post_flashcards(
  State(state): State<Arc<AppState>>,
  Json(body): Json<GenerateIn>,
) -> Result<Json<GenerateOut>, ApiError> {
  let (source, count) = body.into_parts().map_err(RequestError::from)?;
  let generation = state.generate(source, count).await.map_err(|e| {
    warn!(target: "generation", error = %e, "Generation request rejected");
    ApiError::from(e)
  })?;
  info!(target: "generation", cards = generation.cards.len(), origin = ?generation.origin, "HTTP flashcards served");
  Ok(Json(generation.into()))
}

#[instrument(level = "info", skip(body), fields(cards = body.flashcards.len()))]
pub async fn http_post_shuffle(Json(body): Json<CardsIn>) -> impl IntoResponse {
  let flashcards = shuffled(&body.flashcards, &mut StdRng::from_entropy());
  Json(CardsOut { flashcards })
}

#[instrument(level = "info", skip(body), fields(cards = body.flashcards.len()))]
pub async fn http_post_export(Json(body): Json<CardsIn>) -> Result<Response, ApiError> {
  let json = to_pretty_json(&body.flashcards)
    .map_err(|e| ApiError(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
  let file_name = export_file_name(Utc::now().timestamp_millis());
  info!(target: "flashcards_backend", %file_name, bytes = json.len(), "Export prepared");
  Ok((
    [
      (header::CONTENT_TYPE, "application/json".to_string()),
      (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{file_name}\"")),
    ],
    json,
  ).into_response())
}

#[instrument(level = "info", skip(state, body), fields(url_len = body.url.len()))]
pub async fn http_post_summary(
  State(state): State<Arc<AppState>>,
  Json(body): Json<SummaryIn>,
) -> Result<Json<SummaryOut>, ApiError> {
  let text = state.summarize(&body.url).await.map_err(|e| {
    warn!(target: "summary", error = %e, "Summary failed");
    ApiError::from(e)
  })?;
  Ok(Json(SummaryOut { text }))
}
