//! The session state machine.
//!
//! `intro → shuffling → drawing → revealing → reading`, with `reset`
//! returning to `intro` from anywhere. All timing leaves the machine as
//! [`Command::Wait`], so tests can drive it event by event.

use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;

use mystic_core::{Catalog, Deck, SPREAD_SIZE, draw};

use crate::config::{RevealTiming, SessionConfig};
use crate::error::{SessionError, SessionResult};
use crate::gateway::SILENT_NARRATIVE;
use crate::record::ReadingRecord;
use crate::session::Session;
use crate::state::{Command, SessionEvent, SessionState, Timer};

/// Drives one reading at a time.
pub struct SessionMachine {
    catalog: Catalog,
    timing: RevealTiming,
    rng: StdRng,
    state: SessionState,
    session: Option<Session>,
    generation: u64,
}

impl SessionMachine {
    /// A machine in the intro state.
    pub fn new(catalog: Catalog, config: &SessionConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Self {
            catalog,
            timing: config.timing.clone(),
            rng,
            state: SessionState::Intro,
            session: None,
            generation: 0,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The live session, if a question has been submitted.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Generation of the live (or most recently discarded) session.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The card catalog new decks are built from.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Shuffle and reveal pacing.
    pub fn timing(&self) -> &RevealTiming {
        &self.timing
    }

    /// Summary of the live session, once it holds an interpretation.
    pub fn record(&self) -> Option<ReadingRecord> {
        self.session
            .as_ref()
            .filter(|s| s.interpretation.is_some())
            .map(ReadingRecord::from_session)
    }

    /// Apply an event, treating rejected events as no-ops.
    pub fn transition(&mut self, event: SessionEvent) -> Vec<Command> {
        let name = event.name();
        self.try_transition(event).unwrap_or_else(|error| {
            tracing::debug!(state = %self.state, event = name, %error, "event ignored");
            Vec::new()
        })
    }

    /// Apply an event, reporting why it was rejected.
    ///
    /// A rejected event leaves state and session untouched.
    pub fn try_transition(&mut self, event: SessionEvent) -> SessionResult<Vec<Command>> {
        if let Some(stale) = event.generation().filter(|g| *g != self.generation) {
            return Err(SessionError::Stale {
                event: stale,
                current: self.generation,
            });
        }

        match (self.state, event) {
            (_, SessionEvent::Reset) => Ok(self.reset()),
            (SessionState::Intro, SessionEvent::SubmitQuestion(question)) => self.begin(question),
            (
                SessionState::Shuffling,
                SessionEvent::Tick {
                    timer: Timer::ShufflePass,
                    ..
                },
            ) => self.shuffle_pass(),
            (SessionState::Drawing, SessionEvent::Draw) => self.draw_card(),
            (
                SessionState::Revealing,
                SessionEvent::Tick {
                    timer: Timer::RevealNext,
                    ..
                },
            ) => self.reveal_next(),
            (
                SessionState::Revealing,
                SessionEvent::Tick {
                    timer: Timer::RevealSettled,
                    ..
                },
            ) => self.settle(),
            (SessionState::Reading, SessionEvent::Refresh) => self.enter_reading(),
            (SessionState::Reading, SessionEvent::InterpretationReady { text, .. }) => {
                self.accept_interpretation(text)
            }
            (state, event) => Err(SessionError::InvalidAction {
                state,
                action: event.name(),
            }),
        }
    }

    fn live(&mut self) -> SessionResult<&mut Session> {
        self.session.as_mut().ok_or(SessionError::NoActiveSession)
    }

    fn enter(&mut self, next: SessionState) {
        tracing::debug!(from = %self.state, to = %next, generation = self.generation, "state change");
        self.state = next;
    }

    fn wait(&self, delay: Duration, timer: Timer) -> Command {
        Command::Wait {
            delay,
            then: SessionEvent::Tick {
                generation: self.generation,
                timer,
            },
        }
    }

    fn begin(&mut self, question: String) -> SessionResult<Vec<Command>> {
        if question.trim().is_empty() {
            return Err(SessionError::EmptyQuestion);
        }

        self.generation += 1;
        self.session = Some(Session::new(
            self.generation,
            question,
            Deck::full(&self.catalog),
        ));
        self.enter(SessionState::Shuffling);

        Ok(vec![
            self.wait(self.timing.shuffle_interval, Timer::ShufflePass),
        ])
    }

    fn shuffle_pass(&mut self) -> SessionResult<Vec<Command>> {
        let passes = self.timing.shuffle_passes;
        let session = self.session.as_mut().ok_or(SessionError::NoActiveSession)?;
        session.deck.shuffle(&mut self.rng);
        session.shuffle_passes += 1;

        if session.shuffle_passes >= passes {
            self.enter(SessionState::Drawing);
            Ok(Vec::new())
        } else {
            Ok(vec![
                self.wait(self.timing.shuffle_interval, Timer::ShufflePass),
            ])
        }
    }

    fn draw_card(&mut self) -> SessionResult<Vec<Command>> {
        let session = self.session.as_mut().ok_or(SessionError::NoActiveSession)?;
        if let Err(error) = draw(&mut session.deck, &mut session.spread, &mut self.rng) {
            tracing::debug!(%error, "draw ignored");
            return Ok(Vec::new());
        }

        if session.spread.len() < SPREAD_SIZE {
            return Ok(Vec::new());
        }

        self.enter(SessionState::Revealing);
        Ok(vec![self.wait(
            self.timing.lead_in + self.timing.step,
            Timer::RevealNext,
        )])
    }

    fn reveal_next(&mut self) -> SessionResult<Vec<Command>> {
        let session = self.live()?;
        if let Some(index) = session.spread.reveal_next() {
            tracing::debug!(index, "card revealed");
        }
        let remaining = session.spread.len() - session.spread.revealed_count();

        if remaining > 0 {
            Ok(vec![self.wait(self.timing.step, Timer::RevealNext)])
        } else {
            Ok(vec![self.wait(self.timing.settle, Timer::RevealSettled)])
        }
    }

    fn settle(&mut self) -> SessionResult<Vec<Command>> {
        let session = self.live()?;
        // The sequence always runs to completion before the reading.
        while session.spread.reveal_next().is_some() {}

        self.enter(SessionState::Reading);
        self.enter_reading()
    }

    fn enter_reading(&mut self) -> SessionResult<Vec<Command>> {
        let session = self.live()?;
        if session.interpretation.is_some() || session.interpretation_requested {
            tracing::debug!("interpretation already requested");
            return Ok(Vec::new());
        }
        session.interpretation_requested = true;

        Ok(vec![Command::RequestInterpretation {
            generation: session.generation,
            question: session.question.clone(),
            spread: session.spread.clone(),
        }])
    }

    fn accept_interpretation(&mut self, text: String) -> SessionResult<Vec<Command>> {
        let session = self.live()?;
        if session.interpretation.is_some() {
            tracing::debug!("interpretation already set, ignoring");
            return Ok(Vec::new());
        }
        session.interpretation = Some(if text.trim().is_empty() {
            SILENT_NARRATIVE.to_string()
        } else {
            text
        });
        Ok(Vec::new())
    }

    fn reset(&mut self) -> Vec<Command> {
        self.session = None;
        self.generation += 1;
        self.enter(SessionState::Intro);
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use mystic_core::{DECK_SIZE, SpreadPosition, build_catalog};

    use super::*;

    fn machine() -> SessionMachine {
        let config = SessionConfig::default()
            .with_seed(42)
            .with_timing(RevealTiming::default());
        SessionMachine::new(build_catalog(), &config)
    }

    /// Deliver every `Wait` immediately until none are left, returning
    /// any interpretation requests.
    fn run_waits(m: &mut SessionMachine, mut commands: Vec<Command>) -> Vec<Command> {
        let mut requests = Vec::new();
        while let Some(command) = commands.pop() {
            match command {
                Command::Wait { then, .. } => commands.extend(m.transition(then)),
                other => requests.push(other),
            }
        }
        requests
    }

    fn to_drawing(m: &mut SessionMachine) {
        let cmds = m.transition(SessionEvent::SubmitQuestion("Will I find clarity?".into()));
        run_waits(m, cmds);
        assert_eq!(m.state(), SessionState::Drawing);
    }

    fn deck_plus_spread(m: &SessionMachine) -> usize {
        let s = m.session().unwrap();
        s.deck().len() + s.spread().len()
    }

    #[test]
    fn starts_in_intro() {
        let m = machine();
        assert_eq!(m.state(), SessionState::Intro);
        assert!(m.session().is_none());
    }

    #[test]
    fn empty_question_is_rejected() {
        let mut m = machine();
        let err = m
            .try_transition(SessionEvent::SubmitQuestion("   ".into()))
            .unwrap_err();
        assert_eq!(err, SessionError::EmptyQuestion);
        assert_eq!(m.state(), SessionState::Intro);
        assert!(m.session().is_none());
    }

    #[test]
    fn question_starts_shuffle() {
        let mut m = machine();
        let cmds = m.transition(SessionEvent::SubmitQuestion("Will I find clarity?".into()));
        assert_eq!(m.state(), SessionState::Shuffling);
        assert_eq!(m.session().unwrap().question(), "Will I find clarity?");
        assert_eq!(deck_plus_spread(&m), DECK_SIZE);
        assert!(matches!(
            cmds.as_slice(),
            [Command::Wait {
                then: SessionEvent::Tick {
                    timer: Timer::ShufflePass,
                    ..
                },
                ..
            }]
        ));
    }

    #[test]
    fn shuffle_runs_configured_passes() {
        let mut m = machine();
        let mut cmds = m.transition(SessionEvent::SubmitQuestion("q".into()));
        let mut passes = 0;
        while let Some(Command::Wait { then, delay }) = cmds.pop() {
            assert_eq!(delay, Duration::from_millis(80));
            passes += 1;
            cmds = m.transition(then);
        }
        assert_eq!(passes, 15);
        assert_eq!(m.state(), SessionState::Drawing);
        assert_eq!(m.session().unwrap().deck().len(), DECK_SIZE);
    }

    #[test]
    fn draw_outside_drawing_is_ignored() {
        let mut m = machine();
        assert!(m.transition(SessionEvent::Draw).is_empty());
        assert_eq!(m.state(), SessionState::Intro);

        m.transition(SessionEvent::SubmitQuestion("q".into()));
        let err = m.try_transition(SessionEvent::Draw).unwrap_err();
        assert_eq!(
            err,
            SessionError::InvalidAction {
                state: SessionState::Shuffling,
                action: "draw"
            }
        );
        assert!(m.session().unwrap().spread().is_empty());
    }

    #[test]
    fn draws_fill_positions_and_move_to_revealing() {
        let mut m = machine();
        to_drawing(&mut m);

        for expected in 1..=3 {
            m.transition(SessionEvent::Draw);
            assert_eq!(m.session().unwrap().spread().len(), expected);
            assert_eq!(deck_plus_spread(&m), DECK_SIZE);
        }
        assert_eq!(m.state(), SessionState::Revealing);

        let positions: Vec<_> = m
            .session()
            .unwrap()
            .spread()
            .cards()
            .iter()
            .map(|c| c.position())
            .collect();
        assert_eq!(positions, SpreadPosition::ALL.to_vec());

        let ids: HashSet<_> = m
            .session()
            .unwrap()
            .spread()
            .cards()
            .iter()
            .map(|c| c.card().id.clone())
            .collect();
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn fourth_draw_changes_nothing() {
        let mut m = machine();
        to_drawing(&mut m);
        for _ in 0..3 {
            m.transition(SessionEvent::Draw);
        }
        let state = m.state();
        let cmds = m.transition(SessionEvent::Draw);
        assert!(cmds.is_empty());
        assert_eq!(m.state(), state);
        assert_eq!(m.session().unwrap().spread().len(), 3);
        assert_eq!(deck_plus_spread(&m), DECK_SIZE);
    }

    #[test]
    fn exhausted_draw_in_drawing_is_a_quiet_no_op() {
        let mut m = machine();
        to_drawing(&mut m);
        for _ in 0..3 {
            m.transition(SessionEvent::Draw);
        }
        // Hold the machine in drawing with a full spread.
        m.state = SessionState::Drawing;

        let cmds = m.try_transition(SessionEvent::Draw).unwrap();
        assert!(cmds.is_empty());
        assert_eq!(m.state(), SessionState::Drawing);
        assert_eq!(m.session().unwrap().spread().len(), 3);
        assert_eq!(deck_plus_spread(&m), DECK_SIZE);
    }

    #[test]
    fn reveal_sequence_is_ordered_and_timed() {
        let mut m = machine();
        to_drawing(&mut m);
        m.transition(SessionEvent::Draw);
        m.transition(SessionEvent::Draw);
        let mut cmds = m.transition(SessionEvent::Draw);

        let timing = RevealTiming::default();
        let mut delays = Vec::new();
        let mut revealed_after_each = Vec::new();

        while let Some(Command::Wait { delay, then }) = cmds.pop() {
            delays.push(delay);
            assert_eq!(m.state(), SessionState::Revealing);
            cmds = m.transition(then);
            let flags: Vec<_> = m
                .session()
                .unwrap()
                .spread()
                .cards()
                .iter()
                .map(|c| c.is_revealed())
                .collect();
            revealed_after_each.push(flags);
            if m.state() == SessionState::Reading {
                break;
            }
        }

        assert_eq!(
            delays,
            vec![
                timing.lead_in + timing.step,
                timing.step,
                timing.step,
                timing.settle
            ]
        );
        assert_eq!(
            revealed_after_each,
            vec![
                vec![true, false, false],
                vec![true, true, false],
                vec![true, true, true],
                vec![true, true, true],
            ]
        );
        assert_eq!(m.state(), SessionState::Reading);
        assert!(matches!(
            cmds.as_slice(),
            [Command::RequestInterpretation { .. }]
        ));
    }

    #[test]
    fn reading_entry_requests_interpretation_once() {
        let mut m = machine();
        to_drawing(&mut m);
        m.transition(SessionEvent::Draw);
        m.transition(SessionEvent::Draw);
        let cmds = m.transition(SessionEvent::Draw);
        let requests = run_waits(&mut m, cmds);
        assert_eq!(requests.len(), 1);

        // Re-running the entry logic does not ask again.
        assert!(m.transition(SessionEvent::Refresh).is_empty());

        let generation = m.generation();
        m.transition(SessionEvent::InterpretationReady {
            generation,
            text: "The tide turns.".into(),
        });
        assert!(m.transition(SessionEvent::Refresh).is_empty());
        assert_eq!(
            m.session().unwrap().interpretation(),
            Some("The tide turns.")
        );
    }

    #[test]
    fn interpretation_is_set_once() {
        let mut m = machine();
        to_drawing(&mut m);
        m.transition(SessionEvent::Draw);
        m.transition(SessionEvent::Draw);
        let cmds = m.transition(SessionEvent::Draw);
        run_waits(&mut m, cmds);

        let generation = m.generation();
        m.transition(SessionEvent::InterpretationReady {
            generation,
            text: "first".into(),
        });
        m.transition(SessionEvent::InterpretationReady {
            generation,
            text: "second".into(),
        });
        assert_eq!(m.session().unwrap().interpretation(), Some("first"));
    }

    #[test]
    fn blank_interpretation_becomes_silent_text() {
        let mut m = machine();
        to_drawing(&mut m);
        m.transition(SessionEvent::Draw);
        m.transition(SessionEvent::Draw);
        let cmds = m.transition(SessionEvent::Draw);
        run_waits(&mut m, cmds);

        let generation = m.generation();
        m.transition(SessionEvent::InterpretationReady {
            generation,
            text: String::new(),
        });
        assert_eq!(
            m.session().unwrap().interpretation(),
            Some(SILENT_NARRATIVE)
        );
    }

    #[test]
    fn stale_interpretation_after_reset_is_discarded() {
        let mut m = machine();
        to_drawing(&mut m);
        m.transition(SessionEvent::Draw);
        m.transition(SessionEvent::Draw);
        let cmds = m.transition(SessionEvent::Draw);
        let requests = run_waits(&mut m, cmds);
        let Command::RequestInterpretation { generation, .. } = requests[0] else {
            panic!("expected an interpretation request");
        };

        m.transition(SessionEvent::Reset);
        to_drawing(&mut m);

        let err = m
            .try_transition(SessionEvent::InterpretationReady {
                generation,
                text: "old answer".into(),
            })
            .unwrap_err();
        assert!(matches!(err, SessionError::Stale { .. }));
        assert_eq!(m.state(), SessionState::Drawing);
        assert!(m.session().unwrap().interpretation().is_none());
    }

    #[test]
    fn stale_timer_after_reset_is_discarded() {
        let mut m = machine();
        to_drawing(&mut m);
        m.transition(SessionEvent::Draw);
        m.transition(SessionEvent::Draw);
        let cmds = m.transition(SessionEvent::Draw);
        let Some(Command::Wait { then, .. }) = cmds.into_iter().next() else {
            panic!("expected a reveal timer");
        };

        m.transition(SessionEvent::Reset);
        assert!(m.transition(then).is_empty());
        assert_eq!(m.state(), SessionState::Intro);
        assert!(m.session().is_none());
    }

    #[test]
    fn reset_starts_over_with_a_full_deck() {
        let mut m = machine();
        to_drawing(&mut m);
        m.transition(SessionEvent::Draw);
        let first = m.session().unwrap().id();

        m.transition(SessionEvent::Reset);
        assert_eq!(m.state(), SessionState::Intro);
        assert!(m.session().is_none());

        to_drawing(&mut m);
        let s = m.session().unwrap();
        assert_ne!(s.id(), first);
        assert_eq!(s.deck().len(), DECK_SIZE);
        assert!(s.spread().is_empty());
    }

    #[test]
    fn question_outside_intro_is_rejected() {
        let mut m = machine();
        to_drawing(&mut m);
        let err = m
            .try_transition(SessionEvent::SubmitQuestion("another".into()))
            .unwrap_err();
        assert!(matches!(err, SessionError::InvalidAction { .. }));
        assert_eq!(m.session().unwrap().question(), "Will I find clarity?");
    }

    #[test]
    fn record_available_after_interpretation() {
        let mut m = machine();
        to_drawing(&mut m);
        m.transition(SessionEvent::Draw);
        m.transition(SessionEvent::Draw);
        let cmds = m.transition(SessionEvent::Draw);
        run_waits(&mut m, cmds);
        assert!(m.record().is_none());

        let generation = m.generation();
        m.transition(SessionEvent::InterpretationReady {
            generation,
            text: "The tide turns.".into(),
        });
        let record = m.record().unwrap();
        assert_eq!(record.question, "Will I find clarity?");
        assert_eq!(record.cards.len(), 3);
    }
}
