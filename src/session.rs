//! Per-client flashcard session: the current set, the active card and the
//! pending card count. Owned by a single controller (one WebSocket connection),
//! so it is never shared or concurrently mutated.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use crate::domain::{CardCount, CardOrigin, Flashcard, FlashcardSet};
use crate::export::{export_file_name, to_pretty_json};
use crate::pipeline::Generation;

/// What the display layer needs to render one card.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardView {
    /// 1-based position.
    pub position: usize,
    pub total: usize,
    pub question: String,
    pub answer: String,
    pub has_prev: bool,
    pub has_next: bool,
}

/// A permutation of `cards`; the input is left untouched.
pub fn shuffled<R: Rng + ?Sized>(cards: &[Flashcard], rng: &mut R) -> FlashcardSet {
    let mut reordered = cards.to_vec();
    reordered.shuffle(rng);
    reordered
}

#[derive(Clone, Debug, Default)]
pub struct FlashcardSession {
    cards: FlashcardSet,
    index: usize,
    card_count: CardCount,
    origin: Option<CardOrigin>,
}

impl FlashcardSession {
    pub fn new(card_count: CardCount) -> Self {
        Self { card_count, ..Self::default() }
    }

    pub fn card_count(&self) -> CardCount {
        self.card_count
    }

    /// Clamp and store the count used by the next generation.
    pub fn set_card_count(&mut self, raw: i64) -> CardCount {
        self.card_count = CardCount::clamped(raw);
        self.card_count
    }

    pub fn cards(&self) -> &[Flashcard] {
        &self.cards
    }

    pub fn origin(&self) -> Option<CardOrigin> {
        self.origin
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Replace the set wholesale and rewind to the first card.
    pub fn load(&mut self, generation: Generation) {
        self.cards = generation.cards;
        self.origin = Some(generation.origin);
        self.index = 0;
    }

    pub fn current(&self) -> Option<CardView> {
        let card = self.cards.get(self.index)?;
        Some(CardView {
            position: self.index + 1,
            total: self.cards.len(),
            question: card.question.clone(),
            answer: card.answer.clone(),
            has_prev: self.index > 0,
            has_next: self.index + 1 < self.cards.len(),
        })
    }

    /// Move forward; stays on the last card.
    pub fn next(&mut self) -> Option<CardView> {
        if self.index + 1 < self.cards.len() {
            self.index += 1;
        }
        self.current()
    }

    /// Move back; stays on the first card.
    pub fn prev(&mut self) -> Option<CardView> {
        if self.index > 0 {
            self.index -= 1;
        }
        self.current()
    }

    /// New ordering of the same cards; display returns to the first position.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<CardView> {
        self.cards = shuffled(&self.cards, rng);
        self.index = 0;
        self.current()
    }

    /// `(file name, pretty JSON)` for a client-side download.
    pub fn export(&self, now_ms: i64) -> Result<(String, String), serde_json::Error> {
        Ok((export_file_name(now_ms), to_pretty_json(&self.cards)?))
    }
}
