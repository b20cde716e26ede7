//! Async driver that runs the machine's commands.
//!
//! Waits become `tokio::time::sleep`, interpretation requests go through
//! the gateway, and every follow-up event is fed back into the machine.
//! An observer hears about each visible change.

use std::collections::VecDeque;
use std::sync::Arc;

use mystic_core::{Catalog, DrawnCard};

use crate::config::SessionConfig;
use crate::error::SessionResult;
use crate::gateway::{InterpretationGateway, NarrativeService};
use crate::machine::SessionMachine;
use crate::record::ReadingRecord;
use crate::state::{Command, SessionEvent, SessionState};

/// Receives notifications as a session progresses. All methods default
/// to doing nothing.
pub trait SessionObserver {
    /// The machine moved between states.
    fn state_changed(&mut self, _from: SessionState, _to: SessionState) {}

    /// A card was added to the spread.
    fn card_drawn(&mut self, _index: usize, _card: &DrawnCard) {}

    /// A card was turned face up.
    fn card_revealed(&mut self, _index: usize, _card: &DrawnCard) {}

    /// The gateway is about to be called.
    fn interpreting(&mut self) {}

    /// The interpretation was stored.
    fn interpretation_ready(&mut self, _text: &str) {}
}

/// Observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl SessionObserver for NoopObserver {}

struct Snapshot {
    state: SessionState,
    drawn: usize,
    revealed: usize,
    interpreted: bool,
}

/// Owns a machine and a gateway and runs sessions to completion.
pub struct SessionDriver<O = NoopObserver> {
    machine: SessionMachine,
    gateway: InterpretationGateway,
    observer: O,
}

impl<O: SessionObserver> SessionDriver<O> {
    /// Build a driver from a catalog, config, and narrative service.
    pub fn new(
        catalog: Catalog,
        config: &SessionConfig,
        service: Arc<dyn NarrativeService>,
        observer: O,
    ) -> Self {
        let gateway =
            InterpretationGateway::new(service).with_timeout(config.interpretation_timeout);
        Self {
            machine: SessionMachine::new(catalog, config),
            gateway,
            observer,
        }
    }

    /// The underlying machine.
    pub fn machine(&self) -> &SessionMachine {
        &self.machine
    }

    /// The observer.
    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        self.machine.state()
    }

    /// Summary of the session once interpreted.
    pub fn record(&self) -> Option<ReadingRecord> {
        self.machine.record()
    }

    /// Apply a seeker event and run every command it leads to.
    ///
    /// Returns once the machine is waiting on the seeker again (or the
    /// reading is done). Only a rejection of `event` itself is reported;
    /// follow-up events that turn out stale are dropped.
    pub async fn dispatch(&mut self, event: SessionEvent) -> SessionResult<()> {
        let mut queue: VecDeque<Command> = self.apply(event)?.into();

        while let Some(command) = queue.pop_front() {
            let follow_up = match command {
                Command::Wait { delay, then } => {
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    then
                }
                Command::RequestInterpretation {
                    generation,
                    question,
                    spread,
                } => {
                    self.observer.interpreting();
                    let text = self.gateway.interpret(&question, &spread).await;
                    SessionEvent::InterpretationReady { generation, text }
                }
            };

            match self.apply(follow_up) {
                Ok(commands) => queue.extend(commands),
                Err(error) => tracing::debug!(%error, "follow-up event dropped"),
            }
        }
        Ok(())
    }

    /// Submit a question and draw all three cards.
    pub async fn run_reading(&mut self, question: &str) -> SessionResult<()> {
        self.dispatch(SessionEvent::SubmitQuestion(question.to_string()))
            .await?;
        while self.machine.state() == SessionState::Drawing {
            self.dispatch(SessionEvent::Draw).await?;
        }
        Ok(())
    }

    fn snapshot(&self) -> Snapshot {
        let session = self.machine.session();
        Snapshot {
            state: self.machine.state(),
            drawn: session.map_or(0, |s| s.spread().len()),
            revealed: session.map_or(0, |s| s.spread().revealed_count()),
            interpreted: session.is_some_and(|s| s.interpretation().is_some()),
        }
    }

    fn apply(&mut self, event: SessionEvent) -> SessionResult<Vec<Command>> {
        let before = self.snapshot();
        let commands = self.machine.try_transition(event)?;
        let after = self.snapshot();
        self.notify(&before, &after);
        Ok(commands)
    }

    fn notify(&mut self, before: &Snapshot, after: &Snapshot) {
        if let Some(session) = self.machine.session() {
            let spread = session.spread();
            for index in before.drawn..after.drawn {
                if let Some(card) = spread.get(index) {
                    self.observer.card_drawn(index, card);
                }
            }
            for index in before.revealed..after.revealed {
                if let Some(card) = spread.get(index) {
                    self.observer.card_revealed(index, card);
                }
            }
        }

        if before.state != after.state {
            self.observer.state_changed(before.state, after.state);
        }

        let fresh = self
            .machine
            .session()
            .and_then(|s| s.interpretation())
            .filter(|_| !before.interpreted && after.interpreted);
        if let Some(text) = fresh {
            self.observer.interpretation_ready(text);
        }
    }
}
