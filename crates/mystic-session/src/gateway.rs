//! Interpretation gateway.
//!
//! Summarizes the spread into a [`NarrativeRequest`], hands it to a
//! [`NarrativeService`], and turns every failure into
//! [`FALLBACK_NARRATIVE`] so a finished reading always has text.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use mystic_core::{Orientation, SpreadPosition, Spread};

/// Shown in place of a narrative when the service fails.
pub const FALLBACK_NARRATIVE: &str = "The mists have obscured the vision. (Connection failed)";

/// Shown when the service answers successfully but with no text.
pub const SILENT_NARRATIVE: &str = "The stars are silent...";

/// Used in the prompt when the question is blank.
pub const DEFAULT_QUESTION: &str = "General Guidance";

/// Fixed persona directive sent as the system turn.
pub const PERSONA: &str = "\
You are a Grand Oracle Tarot Reader. Your persona is ancient, mystical, poetic, and empathetic.
The Seeker speaks English for the interface, but YOU MUST PROVIDE THE READING IN CHINESE (中文).
The entire response, including headers, must be in Chinese.

Style Guide:
- Use beautiful, mystical Chinese vocabulary (e.g. 羁绊, 微光, 回响, 潮汐, 暗影).
- Format: Use Markdown. Use clear headers.";

/// Failures of a narrative backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NarrativeError {
    /// The request never got a response.
    #[error("narrative service unreachable: {0}")]
    Transport(String),

    /// The service answered with a non-success status.
    #[error("narrative service returned {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Error message from the body, or the raw body.
        message: String,
    },

    /// The response body could not be understood.
    #[error("malformed narrative response: {0}")]
    Malformed(String),

    /// The response held no text. Reported to the seeker as
    /// [`SILENT_NARRATIVE`] rather than the connection fallback.
    #[error("narrative service returned no content")]
    Empty,

    /// The call did not finish in time.
    #[error("narrative service timed out after {0:?}")]
    Timeout(Duration),

    /// No credentials were configured.
    #[error("no API key configured for the narrative service")]
    MissingApiKey,
}

/// One card as presented to the narrative service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardSummary {
    /// Spread slot.
    pub position: SpreadPosition,
    /// Display name.
    pub name: String,
    /// Upright or reversed.
    pub orientation: Orientation,
    /// Card keywords, for backends that compose text locally.
    pub keywords: Vec<String>,
}

/// Everything a narrative backend needs to produce a reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarrativeRequest {
    /// System persona directive.
    pub persona: String,
    /// The seeker's question (never blank here).
    pub question: String,
    /// Cards ordered Past, Present, Future.
    pub cards: Vec<CardSummary>,
}

impl NarrativeRequest {
    /// Summarize a spread. Cards come out in position order whatever
    /// order the spread stores them in.
    pub fn from_spread(question: &str, spread: &Spread) -> Self {
        let question = if question.trim().is_empty() {
            DEFAULT_QUESTION.to_string()
        } else {
            question.to_string()
        };

        let cards = spread
            .in_position_order()
            .into_iter()
            .map(|drawn| CardSummary {
                position: drawn.position(),
                name: drawn.card().name.clone(),
                orientation: drawn.orientation(),
                keywords: drawn.card().keywords.clone(),
            })
            .collect();

        Self {
            persona: PERSONA.to_string(),
            question,
            cards,
        }
    }

    /// Numbered spread lines: `1. **Past**: The Fool (Upright)`.
    pub fn spread_lines(&self) -> String {
        self.cards
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{}. **{}**: {} ({})", i + 1, c.position, c.name, c.orientation))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// The user turn: question, spread, and the requested structure.
    pub fn user_prompt(&self) -> String {
        format!(
            "Seeker's Question: \"{}\"\n\n\
             The Spread (Past, Present, Future):\n{}\n\n\
             Please weave a rich, coherent narrative.\n\
             Structure:\n\
             1. **### 虚空的低语** (Poetic opening)\n\
             2. **### 牌面启示** (Past/Present/Future detailed interpretation)\n\
             3. **### 综合指引** (Synthesis)\n\
             4. **### 命运的箴言** (Final advice)",
            self.question,
            self.spread_lines()
        )
    }
}

/// A text-generation backend.
#[async_trait]
pub trait NarrativeService: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Produce a narrative for the request.
    async fn generate(&self, request: &NarrativeRequest) -> Result<String, NarrativeError>;
}

/// Calls the narrative service once and never fails.
#[derive(Clone)]
pub struct InterpretationGateway {
    service: Arc<dyn NarrativeService>,
    timeout: Option<Duration>,
}

impl InterpretationGateway {
    /// Gateway over the given service, without a timeout.
    pub fn new(service: Arc<dyn NarrativeService>) -> Self {
        Self {
            service,
            timeout: None,
        }
    }

    /// Bound the service call; expiry yields the fallback text.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Name of the underlying service.
    pub fn service_name(&self) -> &str {
        self.service.name()
    }

    /// Produce the narrative for a spread.
    ///
    /// An empty reply yields [`SILENT_NARRATIVE`]; any other failure,
    /// including a timeout, yields [`FALLBACK_NARRATIVE`].
    pub async fn interpret(&self, question: &str, spread: &Spread) -> String {
        let request = NarrativeRequest::from_spread(question, spread);
        tracing::debug!(service = self.service.name(), "requesting interpretation");

        let result = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.service.generate(&request))
                .await
                .unwrap_or(Err(NarrativeError::Timeout(limit))),
            None => self.service.generate(&request).await,
        };

        match result {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) | Err(NarrativeError::Empty) => {
                tracing::warn!(
                    service = self.service.name(),
                    error = %NarrativeError::Empty,
                    "narrative came back empty"
                );
                SILENT_NARRATIVE.to_string()
            }
            Err(error) => {
                tracing::warn!(
                    service = self.service.name(),
                    %error,
                    "interpretation failed, using fallback"
                );
                FALLBACK_NARRATIVE.to_string()
            }
        }
    }
}
