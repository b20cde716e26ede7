//! The draw engine.
//!
//! A [`Deck`] holds the cards not yet drawn this session; a [`Spread`]
//! holds the (at most three) cards drawn so far. [`draw`] moves one card
//! from the first to the second.

use std::sync::Arc;

use rand::Rng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::card::{CardDefinition, CardId, Orientation, SpreadPosition};
use crate::catalog::Catalog;
use crate::error::{CoreError, CoreResult};

/// Probability that a drawn card lands reversed. Fixed, not configurable.
pub const REVERSAL_PROBABILITY: f64 = 0.25;

/// Number of cards in a spread.
pub const SPREAD_SIZE: usize = 3;

/// A card placed in the spread.
///
/// Position and orientation are fixed when the card is drawn; the only
/// mutable bit is `revealed`, which goes from false to true once.
#[derive(Debug, Clone)]
pub struct DrawnCard {
    card: Arc<CardDefinition>,
    position: SpreadPosition,
    reversed: bool,
    revealed: bool,
}

impl DrawnCard {
    /// The shared card definition.
    pub fn card(&self) -> &Arc<CardDefinition> {
        &self.card
    }

    /// Spread slot, assigned by draw order.
    pub fn position(&self) -> SpreadPosition {
        self.position
    }

    /// Whether the card landed reversed.
    pub fn is_reversed(&self) -> bool {
        self.reversed
    }

    /// Upright or reversed.
    pub fn orientation(&self) -> Orientation {
        Orientation::from_reversed(self.reversed)
    }

    /// Whether the reveal sequence has turned this card face up.
    pub fn is_revealed(&self) -> bool {
        self.revealed
    }
}

/// Cards not yet drawn this session.
#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Arc<CardDefinition>>,
}

impl Deck {
    /// A fresh deck holding every card of the catalog.
    pub fn full(catalog: &Catalog) -> Self {
        Self {
            cards: catalog.cards().to_vec(),
        }
    }

    /// Remaining cards in their current (visual) order.
    pub fn cards(&self) -> &[Arc<CardDefinition>] {
        &self.cards
    }

    /// Number of remaining cards.
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Whether the deck is empty.
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Whether a card is still in the deck.
    pub fn contains(&self, id: &CardId) -> bool {
        self.cards.iter().any(|c| &c.id == id)
    }

    /// Reorder the remaining cards. Purely cosmetic: draws sample
    /// uniformly whatever the order.
    pub fn shuffle(&mut self, rng: &mut StdRng) {
        self.cards.shuffle(rng);
    }

    /// Remove and return a uniformly chosen card.
    fn take_random(&mut self, rng: &mut StdRng) -> Option<Arc<CardDefinition>> {
        if self.cards.is_empty() {
            return None;
        }
        let index = rng.random_range(0..self.cards.len());
        Some(self.cards.remove(index))
    }
}

/// The cards drawn so far, in draw order.
#[derive(Debug, Clone, Default)]
pub struct Spread {
    cards: Vec<DrawnCard>,
}

impl Spread {
    /// An empty spread.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drawn cards in draw order.
    pub fn cards(&self) -> &[DrawnCard] {
        &self.cards
    }

    /// Number of drawn cards.
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Whether nothing has been drawn.
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Whether all three cards are drawn.
    pub fn is_complete(&self) -> bool {
        self.cards.len() >= SPREAD_SIZE
    }

    /// Drawn card at an index.
    pub fn get(&self, index: usize) -> Option<&DrawnCard> {
        self.cards.get(index)
    }

    /// The position the next draw will fill.
    pub fn next_position(&self) -> Option<SpreadPosition> {
        SpreadPosition::for_draw(self.cards.len())
    }

    /// Number of face-up cards.
    pub fn revealed_count(&self) -> usize {
        self.cards.iter().filter(|c| c.revealed).count()
    }

    /// Whether every drawn card is face up.
    pub fn all_revealed(&self) -> bool {
        !self.cards.is_empty() && self.cards.iter().all(|c| c.revealed)
    }

    /// Turn the first face-down card face up and return its index.
    ///
    /// Cards are revealed strictly in draw order; `None` once every drawn
    /// card is face up.
    pub fn reveal_next(&mut self) -> Option<usize> {
        let index = self.revealed_count();
        let card = self.cards.get_mut(index)?;
        card.revealed = true;
        Some(index)
    }

    /// Drawn cards ordered Past, Present, Future regardless of storage.
    pub fn in_position_order(&self) -> Vec<&DrawnCard> {
        let mut cards: Vec<&DrawnCard> = self.cards.iter().collect();
        cards.sort_by_key(|c| c.position);
        cards
    }
}

/// Draw one card from `deck` into `spread`.
///
/// Picks uniformly among the remaining cards, removes it from the deck,
/// assigns the next spread position, and decides the orientation with
/// [`REVERSAL_PROBABILITY`]. Fails with [`CoreError::DeckExhausted`] when
/// the spread is full or the deck is empty; neither side is touched then.
pub fn draw<'a>(
    deck: &mut Deck,
    spread: &'a mut Spread,
    rng: &mut StdRng,
) -> CoreResult<&'a DrawnCard> {
    let position = spread.next_position().ok_or(CoreError::DeckExhausted)?;
    let card = deck.take_random(rng).ok_or(CoreError::DeckExhausted)?;
    let reversed = rng.random_bool(REVERSAL_PROBABILITY);

    tracing::debug!(card = %card.name, %position, reversed, "card drawn");

    spread.cards.push(DrawnCard {
        card,
        position,
        reversed,
        revealed: false,
    });
    spread.cards.last().ok_or(CoreError::DeckExhausted)
}
