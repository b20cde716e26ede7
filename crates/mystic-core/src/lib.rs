//! Core types for Mystic Oracle: the card catalog, per-card artwork
//! fallback, and the draw engine.
//!
//! Nothing in this crate knows about sessions or timing. The session crate
//! drives these pieces; you can also use them directly to build a deck and
//! draw a spread programmatically.

/// Two-tier artwork resolution with a textual fallback face.
pub mod artwork;
/// Card definitions, suits, ranks, and spread positions.
pub mod card;
/// The static 78-card catalog and artwork locator derivation.
pub mod catalog;
/// Remaining-deck pool, the spread, and randomized draws.
pub mod draw;
/// Error types used throughout the crate.
pub mod error;

/// Re-export artwork types.
pub use artwork::{
    ArtworkProbe, ArtworkResolver, ArtworkState, ImageTier, TextFace, resolve_artwork,
};
/// Re-export card types.
pub use card::{
    ArtworkRefs, CardDefinition, CardId, CardRank, Orientation, Rank, SpreadPosition, Suit,
};
/// Re-export catalog types.
pub use catalog::{ArtworkSources, Catalog, DECK_SIZE, build_catalog};
/// Re-export draw engine types.
pub use draw::{Deck, DrawnCard, REVERSAL_PROBABILITY, SPREAD_SIZE, Spread, draw};
/// Re-export error types.
pub use error::{ArtworkLoadFailure, CoreError, CoreResult};
