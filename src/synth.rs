//! Local flashcard synthesis used when the webhook is unavailable.
//!
//! Pure string heuristics: sentence splitting, length filters and a rotating
//! set of question starters. No randomness, so identical inputs always give
//! identical cards.

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::{Flashcard, FlashcardSet};

/// Candidate sentences must be longer than this (trimmed, in chars).
const MIN_CANDIDATE_CHARS: usize = 20;
/// Sentences shorter than this never become a primary card.
const MIN_CARD_SENTENCE_CHARS: usize = 30;
/// A primary card needs strictly more space-delimited tokens than this.
const MIN_CARD_TOKENS: usize = 5;
const KEY_PHRASE_TOKENS: usize = 3;

pub const NO_CONTENT_PLACEHOLDER: &str = "No additional content available.";

const QUESTION_STARTERS: [&str; 8] = [
  "What does the text say about",
  "Explain the concept of",
  "What is the key point regarding",
  "Describe",
  "What can you tell me about",
  "Define the term",
  "What is meant by",
  "Summarize the information about",
];

static SENTENCE_BOUNDARY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[.!?]+").expect("static sentence regex"));

fn char_len(s: &str) -> usize { s.chars().count() }

/// Split on `.`, `!`, `?` runs and keep pieces whose trimmed length exceeds 20 chars.
/// Pieces are returned untrimmed, in source order.
pub fn candidate_sentences(text: &str) -> Vec<&str> {
  SENTENCE_BOUNDARY
    .split(text)
    .filter(|s| char_len(s.trim()) > MIN_CANDIDATE_CHARS)
    .collect()
}

/// First three space-delimited tokens with `,.:;` removed.
fn key_phrase(sentence: &str) -> String {
  sentence
    .split(' ')
    .take(KEY_PHRASE_TOKENS)
    .collect::<Vec<_>>()
    .join(" ")
    .chars()
    .filter(|c| !matches!(c, ',' | '.' | ':' | ';'))
    .collect()
}

fn question_for(sentence: &str, index: usize) -> String {
  let starter = QUESTION_STARTERS[index % QUESTION_STARTERS.len()];
  format!("{} \"{}...\"?", starter, key_phrase(sentence))
}

/// Produce exactly `count` cards from `text`.
pub fn synthesize(text: &str, count: usize) -> FlashcardSet {
  let sentences = candidate_sentences(text);
  let mut cards: FlashcardSet = Vec::with_capacity(count);

  for raw in &sentences {
    if cards.len() >= count { break; }
    let sentence = raw.trim();
    if char_len(sentence) < MIN_CARD_SENTENCE_CHARS { continue; }
    if sentence.split(' ').count() <= MIN_CARD_TOKENS { continue; }
    let question = question_for(sentence, cards.len());
    cards.push(Flashcard::new(question, sentence));
  }

  // Pad by cycling through the candidates, indexed by the running card total.
  while cards.len() < count {
    let n = cards.len();
    let answer = if sentences.is_empty() {
      NO_CONTENT_PLACEHOLDER.to_string()
    } else {
      let revisited = sentences[n % sentences.len()].trim();
      if revisited.is_empty() { NO_CONTENT_PLACEHOLDER.to_string() } else { revisited.to_string() }
    };
    cards.push(Flashcard::new(
      format!("What is a key concept from the text? (Card {})", n + 1),
      answer,
    ));
  }

  cards
}

#[cfg(test)]
mod tests {
  use super::*;

  const PASSAGE: &str = "Machine learning is a subset of AI that provides systems the ability to learn. \
    It focuses on the development of computer programs that can access data! \
    Short one. \
    Deep learning is part of a broader family of machine learning methods?";

  #[test]
  fn returns_exactly_count_cards() {
    for count in 1..=50 {
      assert_eq!(synthesize(PASSAGE, count).len(), count, "count = {count}");
    }
    assert_eq!(synthesize("x", 7).len(), 7);
  }

  #[test]
  fn is_deterministic() {
    assert_eq!(synthesize(PASSAGE, 9), synthesize(PASSAGE, 9));
  }

  #[test]
  fn primary_cards_follow_source_order_and_rotate_starters() {
    let cards = synthesize(PASSAGE, 3);
    assert_eq!(
      cards[0].question,
      "What does the text say about \"Machine learning is...\"?"
    );
    assert_eq!(
      cards[0].answer,
      "Machine learning is a subset of AI that provides systems the ability to learn"
    );
    assert_eq!(cards[1].question, "Explain the concept of \"It focuses on...\"?");
    assert_eq!(
      cards[2].question,
      "What is the key point regarding \"Deep learning is...\"?"
    );
  }

  #[test]
  fn key_phrase_strips_punctuation() {
    assert_eq!(key_phrase("Types: of, cloud; computing include"), "Types of cloud");
  }

  #[test]
  fn pads_by_cycling_candidates() {
    let cards = synthesize(PASSAGE, 5);
    let candidates = candidate_sentences(PASSAGE);
    assert_eq!(candidates.len(), 3);
    assert_eq!(cards[3].question, "What is a key concept from the text? (Card 4)");
    // 3 % 3 == 0 and 4 % 3 == 1
    assert_eq!(cards[3].answer, candidates[0].trim());
    assert_eq!(cards[4].answer, candidates[1].trim());
  }

  #[test]
  fn no_usable_sentences_yields_placeholders() {
    let cards = synthesize("Too short. Tiny! Nope?", 4);
    assert_eq!(cards.len(), 4);
    assert!(cards.iter().all(|c| c.answer == NO_CONTENT_PLACEHOLDER));
    assert_eq!(cards[0].question, "What is a key concept from the text? (Card 1)");
  }

  #[test]
  fn short_sentences_only_feed_padding() {
    let text = "AI is a field. It studies agents. Agents act in environments.";
    let cards = synthesize(text, 2);
    assert_eq!(cards.len(), 2);
    for card in &cards {
      assert!(text.contains(&card.answer), "answer {:?} not from source", card.answer);
      assert!(card.question.starts_with("What is a key concept from the text?"));
    }
  }

  #[test]
  fn few_tokens_are_skipped() {
    // Long enough in chars but only four tokens.
    let text = "Incomprehensibilities notwithstanding, extraordinarily characteristically uncharacteristic.";
    let cards = synthesize(text, 1);
    assert!(cards[0].question.starts_with("What is a key concept"));
  }
}
