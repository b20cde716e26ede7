//! Reading sessions for Mystic Oracle.
//!
//! A [`SessionMachine`] owns the lifecycle of one three-card reading
//! (intro, shuffling, drawing, revealing, reading) behind a single
//! `transition` entry point. It never sleeps: timed steps come back out as
//! [`Command::Wait`] values, and the async [`SessionDriver`] turns them into
//! real delays and calls the [`InterpretationGateway`] when the reading
//! begins.

pub mod config;
pub mod driver;
pub mod error;
pub mod gateway;
pub mod machine;
pub mod record;
pub mod session;
pub mod state;

pub use config::{RevealTiming, SessionConfig};
pub use driver::{NoopObserver, SessionDriver, SessionObserver};
pub use error::{SessionError, SessionResult};
pub use gateway::{
    CardSummary, FALLBACK_NARRATIVE, InterpretationGateway, NarrativeError, NarrativeRequest,
    NarrativeService, PERSONA, SILENT_NARRATIVE,
};
pub use machine::SessionMachine;
pub use record::{CardEntry, ReadingRecord};
pub use session::Session;
pub use state::{Command, SessionEvent, SessionState, Timer};
