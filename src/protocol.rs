//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Field names are camelCase on the wire to match the widget scripts.

use serde::{Deserialize, Serialize};

use crate::domain::{CardOrigin, Flashcard, SourceMaterial};
use crate::error::UploadError;
use crate::pipeline::Generation;
use crate::session::CardView;
use crate::upload::UploadedFile;

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    SetCardCount {
        value: i64,
    },
    GenerateText {
        content: String,
    },
    GenerateFile {
        #[serde(rename = "fileName")]
        file_name: String,
        #[serde(rename = "mimeType")]
        mime_type: String,
        data: String,
    },
    Next,
    Prev,
    Shuffle,
    Export,
    Summarize {
        url: String,
    },
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    CardCount {
        value: usize,
    },
    Generated {
        total: usize,
        origin: CardOrigin,
        #[serde(skip_serializing_if = "Option::is_none")]
        notice: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        card: Option<CardView>,
    },
    Card {
        #[serde(flatten)]
        card: CardView,
    },
    Export {
        #[serde(rename = "fileName")]
        file_name: String,
        json: String,
    },
    Summary {
        text: String,
    },
    Error {
        message: String,
    },
}

//
// HTTP request/response DTOs
//

/// Body of `POST /api/v1/flashcards`, tagged by `source` like the webhook payload.
#[derive(Debug, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum GenerateIn {
    Text {
        content: String,
        #[serde(rename = "cardCount", default)]
        card_count: Option<i64>,
    },
    File {
        #[serde(rename = "fileName")]
        file_name: String,
        #[serde(rename = "mimeType")]
        mime_type: String,
        /// Base64, optionally as a data URL.
        data: String,
        #[serde(rename = "cardCount", default)]
        card_count: Option<i64>,
    },
}

impl GenerateIn {
    /// Decode and validate the upload (if any); no request is sent on error.
    pub fn into_parts(self) -> Result<(SourceMaterial, Option<i64>), UploadError> {
        match self {
            GenerateIn::Text { content, card_count } => Ok((SourceMaterial::Text(content), card_count)),
            GenerateIn::File { file_name, mime_type, data, card_count } => {
                let file = UploadedFile::from_base64(&file_name, &mime_type, &data)?;
                Ok((SourceMaterial::File(file), card_count))
            }
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GenerateOut {
    pub flashcards: Vec<Flashcard>,
    pub origin: CardOrigin,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

impl From<Generation> for GenerateOut {
    fn from(g: Generation) -> Self {
        Self { flashcards: g.cards, origin: g.origin, notice: g.notice }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct CardsIn {
    pub flashcards: Vec<Flashcard>,
}

#[derive(Debug, Serialize)]
pub struct CardsOut {
    pub flashcards: Vec<Flashcard>,
}

#[derive(Deserialize)]
pub struct SummaryIn {
    pub url: String,
}
#[derive(Serialize)]
pub struct SummaryOut {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorOut {
    pub error: String,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
    #[serde(rename = "remoteGeneration")]
    pub remote_generation: bool,
}
