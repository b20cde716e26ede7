//! States, events, and commands of the session machine.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use mystic_core::Spread;

/// Lifecycle state of a reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionState {
    /// Waiting for a question.
    Intro,
    /// Cosmetic shuffle running.
    Shuffling,
    /// Accepting draws until the spread is full.
    Drawing,
    /// Turning the three cards face up.
    Revealing,
    /// Interpretation requested or shown. Terminal until reset.
    Reading,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Intro => write!(f, "intro"),
            Self::Shuffling => write!(f, "shuffling"),
            Self::Drawing => write!(f, "drawing"),
            Self::Revealing => write!(f, "revealing"),
            Self::Reading => write!(f, "reading"),
        }
    }
}

/// Timers the machine schedules for itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Timer {
    /// One visual shuffle pass.
    ShufflePass,
    /// Turn the next card face up.
    RevealNext,
    /// Reveal sequence finished; start the reading.
    RevealSettled,
}

/// Input to [`SessionMachine::transition`](crate::SessionMachine::transition).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The seeker asks a question (intro only).
    SubmitQuestion(String),
    /// The seeker draws a card (drawing only).
    Draw,
    /// A scheduled timer fired.
    Tick {
        /// Session generation the timer was scheduled for.
        generation: u64,
        /// Which timer.
        timer: Timer,
    },
    /// The interpretation gateway finished.
    InterpretationReady {
        /// Session generation the request was made for.
        generation: u64,
        /// Narrative or fallback text.
        text: String,
    },
    /// Re-run the entry logic of the current state.
    Refresh,
    /// Discard the session and go back to the intro.
    Reset,
}

impl SessionEvent {
    /// Short name used in logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            Self::SubmitQuestion(_) => "submit a question",
            Self::Draw => "draw",
            Self::Tick {
                timer: Timer::ShufflePass,
                ..
            } => "shuffle",
            Self::Tick {
                timer: Timer::RevealNext,
                ..
            } => "reveal",
            Self::Tick {
                timer: Timer::RevealSettled,
                ..
            } => "settle the reveal",
            Self::InterpretationReady { .. } => "accept an interpretation",
            Self::Refresh => "refresh",
            Self::Reset => "reset",
        }
    }

    /// Generation carried by scheduled events.
    pub fn generation(&self) -> Option<u64> {
        match self {
            Self::Tick { generation, .. } | Self::InterpretationReady { generation, .. } => {
                Some(*generation)
            }
            _ => None,
        }
    }
}

/// Side effects requested by the machine, executed by the driver.
#[derive(Debug, Clone)]
pub enum Command {
    /// Feed `then` back into the machine after `delay`.
    Wait {
        /// How long to wait.
        delay: Duration,
        /// Event to deliver afterwards.
        then: SessionEvent,
    },
    /// Ask the interpretation gateway for a narrative.
    RequestInterpretation {
        /// Generation to tag the answer with.
        generation: u64,
        /// The seeker's question.
        question: String,
        /// Snapshot of the revealed spread.
        spread: Spread,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_display() {
        assert_eq!(SessionState::Intro.to_string(), "intro");
        assert_eq!(SessionState::Reading.to_string(), "reading");
    }

    #[test]
    fn event_generation() {
        let tick = SessionEvent::Tick {
            generation: 3,
            timer: Timer::RevealNext,
        };
        assert_eq!(tick.generation(), Some(3));
        assert_eq!(SessionEvent::Draw.generation(), None);
    }

    #[test]
    fn state_serde_roundtrip() {
        let json = serde_json::to_string(&SessionState::Revealing).unwrap();
        let s: SessionState = serde_json::from_str(&json).unwrap();
        assert_eq!(s, SessionState::Revealing);
    }
}
