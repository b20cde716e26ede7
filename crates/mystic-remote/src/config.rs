use std::env;
use std::time::Duration;

use crate::error::{RemoteError, RemoteResult};

/// Default chat-completions endpoint base.
pub const DEFAULT_API_BASE: &str = "https://api.deepseek.com";

/// Default model name.
pub const DEFAULT_MODEL: &str = "deepseek-chat";

/// Sampling temperature sent with every request.
pub const DEFAULT_TEMPERATURE: f32 = 1.2;

const ENV_API_KEY: &str = "MYSTIC_API_KEY";
const ENV_API_KEY_FALLBACK: &str = "DEEPSEEK_API_KEY";
const ENV_API_BASE: &str = "MYSTIC_API_BASE";
const ENV_MODEL: &str = "MYSTIC_MODEL";
const ENV_TIMEOUT: &str = "MYSTIC_TIMEOUT_SECS";

/// Settings for [`ChatCompletionsNarrator`](crate::ChatCompletionsNarrator).
#[derive(Clone, PartialEq)]
pub struct NarratorConfig {
    /// Bearer token. `None` means the remote narrator cannot be used.
    pub api_key: Option<String>,
    /// Base URL; `/chat/completions` is appended.
    pub api_base: String,
    /// Model name.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Per-request timeout.
    pub timeout: Option<Duration>,
}

impl std::fmt::Debug for NarratorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NarratorConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Default for NarratorConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            timeout: None,
        }
    }
}

impl NarratorConfig {
    /// Read settings from the process environment.
    ///
    /// `MYSTIC_API_KEY` (or `DEEPSEEK_API_KEY`), `MYSTIC_API_BASE`,
    /// `MYSTIC_MODEL`, `MYSTIC_TIMEOUT_SECS`. Unset or empty variables
    /// keep their defaults.
    pub fn from_env() -> RemoteResult<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an arbitrary lookup.
    pub fn from_lookup<F>(lookup: F) -> RemoteResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let timeout = match get(ENV_TIMEOUT) {
            Some(raw) => {
                let secs = raw
                    .trim()
                    .parse::<u64>()
                    .map_err(|_| RemoteError::InvalidEnv {
                        var: ENV_TIMEOUT,
                        value: raw.clone(),
                    })?;
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        Ok(Self {
            api_key: get(ENV_API_KEY).or_else(|| get(ENV_API_KEY_FALLBACK)),
            api_base: get(ENV_API_BASE).unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            model: get(ENV_MODEL).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            temperature: DEFAULT_TEMPERATURE,
            timeout,
        })
    }

    /// Override the API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Override the base URL.
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    /// Override the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Bound each request.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Full chat-completions URL.
    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.api_base.trim_end_matches('/'))
    }

    /// Whether a key is available.
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}
