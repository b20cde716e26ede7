//! Error types for the session engine.

use thiserror::Error;

use crate::state::SessionState;

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Reasons an event was not applied.
///
/// None of these leave the machine in a changed state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The seeker submitted a blank question.
    #[error("the question must not be empty")]
    EmptyQuestion,

    /// The event makes no sense in the current state.
    #[error("cannot {action} while {state}")]
    InvalidAction {
        /// State the machine was in.
        state: SessionState,
        /// Short name of the rejected event.
        action: &'static str,
    },

    /// A timer or interpretation result arrived for a discarded session.
    #[error("stale event for session generation {event}, current is {current}")]
    Stale {
        /// Generation the event was scheduled for.
        event: u64,
        /// Generation of the live session.
        current: u64,
    },

    /// The state requires a session but none exists.
    #[error("no active session")]
    NoActiveSession,
}
