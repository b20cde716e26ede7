//! Configuration for a reading session.

use std::time::Duration;

/// Delays of the cosmetic shuffle and the reveal sequence.
///
/// None of these affect correctness; they only pace the presentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealTiming {
    /// Number of visual shuffle passes before drawing opens.
    pub shuffle_passes: u32,
    /// Delay before each shuffle pass.
    pub shuffle_interval: Duration,
    /// Pause after the third draw, before the first reveal step.
    pub lead_in: Duration,
    /// Delay before each card is turned face up.
    pub step: Duration,
    /// Pause after the last reveal, before the reading starts.
    pub settle: Duration,
}

impl Default for RevealTiming {
    fn default() -> Self {
        Self {
            shuffle_passes: 15,
            shuffle_interval: Duration::from_millis(80),
            lead_in: Duration::from_millis(500),
            step: Duration::from_millis(1000),
            settle: Duration::from_millis(1500),
        }
    }
}

impl RevealTiming {
    /// Zero delays, one shuffle pass. For tests and `--fast`.
    pub fn instant() -> Self {
        Self {
            shuffle_passes: 1,
            shuffle_interval: Duration::ZERO,
            lead_in: Duration::ZERO,
            step: Duration::ZERO,
            settle: Duration::ZERO,
        }
    }

    /// Total time spent shuffling.
    pub fn shuffle_duration(&self) -> Duration {
        self.shuffle_interval * self.shuffle_passes.max(1)
    }

    /// Total time from the third draw to the reading.
    pub fn reveal_duration(&self) -> Duration {
        self.lead_in + self.step * 3 + self.settle
    }
}

/// Configuration for a reading session.
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    /// RNG seed for reproducible draws; `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Shuffle and reveal pacing.
    pub timing: RevealTiming,
    /// Upper bound on the narrative call; expiry counts as a failure.
    pub interpretation_timeout: Option<Duration>,
}

impl SessionConfig {
    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the shuffle and reveal pacing.
    pub fn with_timing(mut self, timing: RevealTiming) -> Self {
        self.timing = timing;
        self
    }

    /// Bound the narrative call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.interpretation_timeout = Some(timeout);
        self
    }
}
