//! The visible deck and the pointer at its active card.

use records::RestaurantRecord;

/// What the presentation layer should show for the deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeckStatus {
    /// Filtering produced no cards at all.
    Empty,
    /// There is an active card.
    Active,
    /// Every card of a non-empty deck has been committed.
    Exhausted,
}

/// `(deck, index)` with `0 <= index <= deck.len()`.
#[derive(Debug, Clone, Default)]
pub struct DeckCursor {
    deck: Vec<RestaurantRecord>,
    index: usize,
}

impl DeckCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the deck and point at its first card.
    pub fn reset(&mut self, deck: Vec<RestaurantRecord>) {
        self.deck = deck;
        self.index = 0;
    }

    pub fn current(&self) -> Option<&RestaurantRecord> {
        self.deck.get(self.index)
    }

    /// Up to `n` cards after the current one, without advancing.
    pub fn peek(&self, n: usize) -> &[RestaurantRecord] {
        let start = (self.index + 1).min(self.deck.len());
        let end = start.saturating_add(n).min(self.deck.len());
        &self.deck[start..end]
    }

    /// Move past the current card. No-op (returns false) once exhausted.
    pub fn advance(&mut self) -> bool {
        if self.index >= self.deck.len() {
            return false;
        }
        self.index += 1;
        true
    }

    pub fn remaining(&self) -> usize {
        self.deck.len() - self.index
    }

    /// Cards committed since the last reset.
    pub fn position(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.deck.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deck.is_empty()
    }

    pub fn status(&self) -> DeckStatus {
        if self.deck.is_empty() {
            DeckStatus::Empty
        } else if self.index == self.deck.len() {
            DeckStatus::Exhausted
        } else {
            DeckStatus::Active
        }
    }
}
