use thiserror::Error;

use crate::artwork::ImageTier;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised by the catalog and the draw engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A draw was attempted with a full spread or an empty deck.
    #[error("deck exhausted: no further draws are allowed in this spread")]
    DeckExhausted,

    /// No card in the catalog matches the given id or name.
    #[error("unknown card: {0}")]
    UnknownCard(String),
}

/// A single artwork source failed to load.
///
/// Recovered locally by moving to the next tier; never surfaced to the
/// seeker as a hard error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{tier} artwork failed to load: {reason}")]
pub struct ArtworkLoadFailure {
    /// Which source tier failed.
    pub tier: ImageTier,
    /// Human-readable cause, for diagnostics only.
    pub reason: String,
}

impl ArtworkLoadFailure {
    /// Create a failure for the given tier.
    pub fn new(tier: ImageTier, reason: impl Into<String>) -> Self {
        Self {
            tier,
            reason: reason.into(),
        }
    }
}
