//! JSON export of a flashcard set.
//! Produces a pretty-printed array of `{question, answer}` objects and the
//! download name `flashcards-<unix-epoch-ms>.json`.

use crate::domain::Flashcard;

pub fn export_file_name(epoch_ms: i64) -> String {
    format!("flashcards-{epoch_ms}.json")
}

pub fn to_pretty_json(cards: &[Flashcard]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(cards)
}
