//! Webhook response normalization.
//!
//! The flashcard webhook answers in one of two envelopes:
//!   (a) `[{ "output": "<json string with {\"flashcards\": [...]}>" }, ...]`
//!   (b) `{ "flashcards": [...] }`
//!
//! `classify` resolves the raw JSON into a `ResponseEnvelope`, then
//! `into_cards` validates the array. Shape (a) is always tried first.

use serde::Deserialize;
use serde_json::Value;

use crate::domain::{Flashcard, FlashcardSet};
use crate::error::GenerationError;

#[derive(Debug, Clone, PartialEq)]
pub enum ResponseEnvelope {
  /// Array-wrapped envelope; `output` is a JSON-encoded string.
  Wrapped { output: String },
  /// Object with a direct `flashcards` field.
  Direct { flashcards: Value },
}

#[derive(Deserialize)]
struct CardsBody {
  flashcards: Value,
}

fn shape_err(msg: impl Into<String>) -> GenerationError {
  GenerationError::InvalidResponseShape(msg.into())
}

/// Decide which envelope a response uses.
pub fn classify(value: Value) -> Result<ResponseEnvelope, GenerationError> {
  match value {
    Value::Array(mut items) => {
      if items.is_empty() {
        return Err(shape_err("empty response array"));
      }
      match items.swap_remove(0) {
        Value::Object(mut first) => match first.remove("output") {
          Some(Value::String(output)) if !output.is_empty() => Ok(ResponseEnvelope::Wrapped { output }),
          Some(_) => Err(shape_err("`output` is not a non-empty JSON string")),
          None => Err(shape_err("first array element has no `output` field")),
        },
        _ => Err(shape_err("first array element is not an object")),
      }
    }
    Value::Object(mut obj) => match obj.remove("flashcards") {
      Some(flashcards) => Ok(ResponseEnvelope::Direct { flashcards }),
      None => Err(shape_err("No flashcards found in response")),
    },
    other => Err(shape_err(format!("unexpected JSON {}", json_kind(&other)))),
  }
}

impl ResponseEnvelope {
  /// Extract and validate the card array.
  pub fn into_cards(self) -> Result<FlashcardSet, GenerationError> {
    let flashcards = match self {
      ResponseEnvelope::Wrapped { output } => {
        let inner: CardsBody = serde_json::from_str(&output)
          .map_err(|e| shape_err(format!("Invalid flashcards format in response: {e}")))?;
        inner.flashcards
      }
      ResponseEnvelope::Direct { flashcards } => flashcards,
    };
    cards_from_array(flashcards)
  }
}

fn cards_from_array(value: Value) -> Result<FlashcardSet, GenerationError> {
  let items = match value {
    Value::Array(items) => items,
    other => return Err(shape_err(format!("`flashcards` is {} rather than an array", json_kind(&other)))),
  };
  if items.is_empty() {
    return Err(shape_err("`flashcards` array is empty"));
  }
  items
    .into_iter()
    .enumerate()
    .map(|(i, item)| {
      serde_json::from_value::<Flashcard>(item)
        .map_err(|e| shape_err(format!("card {i} is malformed: {e}")))
    })
    .collect()
}

/// Parse a raw response body and normalize it to a card list.
pub fn normalize_response(body: &str) -> Result<FlashcardSet, GenerationError> {
  let value: Value = serde_json::from_str(body)
    .map_err(|e| shape_err(format!("response is not JSON: {e}")))?;
  classify(value)?.into_cards()
}

fn json_kind(v: &Value) -> &'static str {
  match v {
    Value::Null => "null",
    Value::Bool(_) => "a boolean",
    Value::Number(_) => "a number",
    Value::String(_) => "a string",
    Value::Array(_) => "an array",
    Value::Object(_) => "an object",
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn wrapped_envelope_extracts_inner_array() {
    let inner = json!({ "flashcards": [
      { "question": "Q1", "answer": "A1" },
      { "question": "Q2", "answer": "A2" }
    ]})
    .to_string();
    let body = json!([{ "output": inner }, { "output": "ignored" }]).to_string();

    let cards = normalize_response(&body).unwrap();
    assert_eq!(cards, vec![Flashcard::new("Q1", "A1"), Flashcard::new("Q2", "A2")]);
  }

  #[test]
  fn direct_envelope_extracts_array() {
    let body = r#"{"flashcards":[{"question":"What is Rust?","answer":"A language"}],"meta":1}"#;
    let cards = normalize_response(body).unwrap();
    assert_eq!(cards, vec![Flashcard::new("What is Rust?", "A language")]);
  }

  #[test]
  fn classify_prefers_wrapped_shape() {
    let env = classify(json!([{ "output": "{}" }])).unwrap();
    assert_eq!(env, ResponseEnvelope::Wrapped { output: "{}".into() });
    let env = classify(json!({ "flashcards": [] })).unwrap();
    assert_eq!(env, ResponseEnvelope::Direct { flashcards: json!([]) });
  }

  #[test]
  fn neither_shape_is_rejected() {
    for body in [
      r#"{"cards":[]}"#,
      r#"[]"#,
      r#"[{"text":"x"}]"#,
      r#""flashcards""#,
      r#"not json"#,
    ] {
      match normalize_response(body) {
        Err(GenerationError::InvalidResponseShape(_)) => {}
        other => panic!("{body}: expected InvalidResponseShape, got {other:?}"),
      }
    }
  }

  #[test]
  fn empty_or_malformed_arrays_are_rejected() {
    for body in [
      r#"{"flashcards":[]}"#,
      r#"{"flashcards":"nope"}"#,
      r#"{"flashcards":[{"question":"only"}]}"#,
      r#"[{"output":"{\"flashcards\":[]}"}]"#,
      r#"[{"output":"not json at all"}]"#,
      r#"[{"output":"{\"other\":1}"}]"#,
    ] {
      assert!(
        matches!(normalize_response(body), Err(GenerationError::InvalidResponseShape(_))),
        "{body} should be rejected"
      );
    }
  }
}
