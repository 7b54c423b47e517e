//! WebSocket upgrade + message loop. Each connection owns one `FlashcardSession`;
//! messages are handled one at a time, so a generation never overlaps another
//! on the same session. We reply with a single JSON message per request.

use std::sync::Arc;
use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use chrono::Utc;
use rand::{rngs::StdRng, SeedableRng};
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

use crate::domain::SourceMaterial;
use crate::error::RequestError;
use crate::protocol::{ClientWsMessage, ServerWsMessage};
use crate::session::FlashcardSession;
use crate::state::AppState;
use crate::summary::error_text;
use crate::upload::UploadedFile;

#[instrument(level = "info", skip(ws, state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "flashcards_backend", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state), fields(session_id = tracing::field::Empty))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  let session_id = Uuid::new_v4();
  tracing::Span::current().record("session_id", tracing::field::display(session_id));
  info!(target: "flashcards_backend", "WebSocket connected");

  let mut session = FlashcardSession::new(state.default_count());
  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        // Parse, dispatch, serialize response.
        let reply_msg = match serde_json::from_str::<ClientWsMessage>(&txt) {
          Ok(incoming) => {
            debug!(target: "flashcards_backend", msg_len = txt.len(), "WS message received");
            handle_client_ws(incoming, &state, &mut session).await
          }
          Err(e) => ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) },
        };

        let out = serde_json::to_string(&reply_msg).unwrap_or_else(|e| {
          serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
        });

        if let Err(e) = socket.send(Message::Text(out)).await {
          error!(target: "flashcards_backend", error = %e, "WS send error");
          break;
        }
      }
      Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
      Message::Close(_) => break,
      _ => {}
    }
  }
  info!(target: "flashcards_backend", "WebSocket disconnected");
}

fn no_cards() -> ServerWsMessage {
  ServerWsMessage::Error { message: "No flashcards yet. Generate some first.".into() }
}

async fn generate_into(
  state: &AppState,
  session: &mut FlashcardSession,
  source: Result<SourceMaterial, RequestError>,
) -> ServerWsMessage {
  let count = i64::try_from(session.card_count().get()).ok();
  let result = match source {
    Ok(source) => state.generate(source, count).await,
    Err(e) => Err(e),
  };
  match result {
    Ok(generation) => {
      let notice = generation.notice.clone();
      let origin = generation.origin;
      session.load(generation);
      info!(target: "generation", total = session.cards().len(), ?origin, "WS flashcards generated");
      ServerWsMessage::Generated { total: session.cards().len(), origin, notice, card: session.current() }
    }
    Err(e) => ServerWsMessage::Error { message: e.to_string() },
  }
}

#[instrument(level = "info", skip_all)]
pub(crate) async fn handle_client_ws(
  msg: ClientWsMessage,
  state: &AppState,
  session: &mut FlashcardSession,
) -> ServerWsMessage {
  match msg {
    ClientWsMessage::Ping => ServerWsMessage::Pong,

    ClientWsMessage::SetCardCount { value } => {
      let count = session.set_card_count(value);
      ServerWsMessage::CardCount { value: count.get() }
    }

    ClientWsMessage::GenerateText { content } => {
      generate_into(state, session, Ok(SourceMaterial::Text(content))).await
    }

    ClientWsMessage::GenerateFile { file_name, mime_type, data } => {
      let source = UploadedFile::from_base64(&file_name, &mime_type, &data)
        .map(SourceMaterial::File)
        .map_err(RequestError::from);
      generate_into(state, session, source).await
    }

    ClientWsMessage::Next => session.next().map(|card| ServerWsMessage::Card { card }).unwrap_or_else(no_cards),

    ClientWsMessage::Prev => session.prev().map(|card| ServerWsMessage::Card { card }).unwrap_or_else(no_cards),

    ClientWsMessage::Shuffle => {
      let card = session.shuffle(&mut StdRng::from_entropy());
      card.map(|card| ServerWsMessage::Card { card }).unwrap_or_else(no_cards)
    }

    ClientWsMessage::Export => {
      if session.is_empty() {
        return no_cards();
      }
      match session.export(Utc::now().timestamp_millis()) {
        Ok((file_name, json)) => {
          info!(target: "flashcards_backend", %file_name, origin = ?session.origin(), "WS export prepared");
          ServerWsMessage::Export { file_name, json }
        }
        Err(e) => ServerWsMessage::Error { message: format!("Export failed: {e}") },
      }
    }

    ClientWsMessage::Summarize { url } => match state.summarize(&url).await {
      Ok(text) => ServerWsMessage::Summary { text },
      Err(e) => ServerWsMessage::Error { message: error_text(&e) },
    },
  }
}
