//! Data owned by one reading session.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use mystic_core::{Deck, Spread};

/// One reading, from the submitted question to the interpretation.
///
/// Created when a question is submitted, discarded on reset. Only the
/// [`SessionMachine`](crate::SessionMachine) mutates it.
#[derive(Debug, Clone)]
pub struct Session {
    pub(crate) id: Uuid,
    pub(crate) generation: u64,
    pub(crate) started_at: DateTime<Utc>,
    pub(crate) question: String,
    pub(crate) deck: Deck,
    pub(crate) spread: Spread,
    pub(crate) shuffle_passes: u32,
    pub(crate) interpretation_requested: bool,
    pub(crate) interpretation: Option<String>,
}

impl Session {
    pub(crate) fn new(generation: u64, question: String, deck: Deck) -> Self {
        Self {
            id: Uuid::new_v4(),
            generation,
            started_at: Utc::now(),
            question,
            deck,
            spread: Spread::new(),
            shuffle_passes: 0,
            interpretation_requested: false,
            interpretation: None,
        }
    }

    /// Unique id of this reading.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Generation counter used to discard stale timer and gateway events.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// When the question was submitted.
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// The seeker's question, as submitted.
    pub fn question(&self) -> &str {
        &self.question
    }

    /// Cards not yet drawn.
    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    /// Cards drawn so far.
    pub fn spread(&self) -> &Spread {
        &self.spread
    }

    /// The narrative, once it arrived.
    pub fn interpretation(&self) -> Option<&str> {
        self.interpretation.as_deref()
    }

    /// Whether the gateway has been asked for a narrative.
    pub fn interpretation_requested(&self) -> bool {
        self.interpretation_requested
    }
}
