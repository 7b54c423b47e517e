//! Domain models: flashcards, card counts, source material and generation requests.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::GenerationError;
use crate::upload::UploadedFile;

pub const MIN_CARDS: i64 = 1;
pub const MAX_CARDS: i64 = 50;
pub const DEFAULT_CARDS: i64 = 5;

/// Upper bound for a single remote generation attempt.
pub const REMOTE_TIMEOUT: Duration = Duration::from_secs(300);

/// A question/answer pair. Immutable once produced.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Flashcard {
  pub question: String,
  pub answer: String,
}

impl Flashcard {
  pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
    Self { question: question.into(), answer: answer.into() }
  }
}

/// Ordered cards; order defines navigation order.
pub type FlashcardSet = Vec<Flashcard>;

/// Where a set of cards came from.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CardOrigin {
  Remote,         // produced by the flashcard webhook
  LocalFallback,  // webhook failed, synthesized locally
  Local,          // no webhook configured
}

/// Requested number of cards, always within [MIN_CARDS, MAX_CARDS].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct CardCount(usize);

impl CardCount {
  /// Strict constructor used at submission time.
  pub fn new(n: i64) -> Result<Self, GenerationError> {
    if (MIN_CARDS..=MAX_CARDS).contains(&n) {
      Ok(Self(n as usize))
    } else {
      Err(GenerationError::InvalidCount(n))
    }
  }

  /// Clamp a raw input value into range (live input normalization).
  pub fn clamped(n: i64) -> Self {
    Self(n.clamp(MIN_CARDS, MAX_CARDS) as usize)
  }

  pub fn get(self) -> usize { self.0 }
}

impl Default for CardCount {
  fn default() -> Self { Self(DEFAULT_CARDS as usize) }
}

/// What the user handed us: pasted text or a validated document.
#[derive(Clone, Debug)]
pub enum SourceMaterial {
  Text(String),
  File(UploadedFile),
}

impl SourceMaterial {
  pub fn kind(&self) -> &'static str {
    match self {
      SourceMaterial::Text(_) => "text",
      SourceMaterial::File(_) => "file",
    }
  }
}

/// A validated request: non-empty source and a count in range.
#[derive(Clone, Debug)]
pub struct GenerationRequest {
  pub source: SourceMaterial,
  pub count: CardCount,
}

impl GenerationRequest {
  /// Validate raw input. `count` of `None` means "use the default".
  pub fn new(source: SourceMaterial, count: Option<i64>, default: CardCount) -> Result<Self, GenerationError> {
    let count = match count {
      Some(n) => CardCount::new(n)?,
      None => default,
    };
    let source = match source {
      SourceMaterial::Text(t) => {
        let trimmed = t.trim();
        if trimmed.is_empty() { return Err(GenerationError::EmptyInput); }
        SourceMaterial::Text(trimmed.to_string())
      }
      SourceMaterial::File(f) => {
        if f.bytes.is_empty() { return Err(GenerationError::EmptyInput); }
        SourceMaterial::File(f)
      }
    };
    Ok(Self { source, count })
  }
}
