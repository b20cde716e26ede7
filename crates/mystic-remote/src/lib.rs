//! Network collaborators for Mystic Oracle.
//!
//! Narrative backends implementing
//! [`NarrativeService`](mystic_session::NarrativeService) and an HTTP
//! implementation of [`ArtworkProbe`](mystic_core::ArtworkProbe).

/// OpenAI-compatible chat-completions narrator.
pub mod chat;
/// Narrator settings read from the environment.
pub mod config;
/// Errors raised while setting up remote clients.
pub mod error;
/// Local narrator that needs no network.
pub mod offline;
/// Artwork reachability over HTTP.
pub mod probe;

#[cfg(test)]
mod test_support;

pub use chat::ChatCompletionsNarrator;
pub use config::{DEFAULT_API_BASE, DEFAULT_MODEL, DEFAULT_TEMPERATURE, NarratorConfig};
pub use error::{RemoteError, RemoteResult};
pub use offline::OfflineNarrator;
pub use probe::HttpArtworkProbe;
