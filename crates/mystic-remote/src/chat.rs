use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use mystic_session::{NarrativeError, NarrativeRequest, NarrativeService};

use crate::config::NarratorConfig;
use crate::error::RemoteResult;

/// Narrative backend speaking the OpenAI chat-completions protocol.
///
/// Sends the persona as the system turn and the question with the spread
/// as the user turn, then returns the first choice's content.
#[derive(Clone)]
pub struct ChatCompletionsNarrator {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
    temperature: f32,
}

impl ChatCompletionsNarrator {
    /// Build a narrator. A missing key is reported on each call, not here.
    pub fn new(config: &NarratorConfig) -> RemoteResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            endpoint: config.endpoint(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }

    /// The URL requests are posted to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn build_request(&self, request: &NarrativeRequest) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: request.persona.clone(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: request.user_prompt(),
                },
            ],
            temperature: self.temperature,
            stream: false,
        }
    }
}

#[async_trait]
impl NarrativeService for ChatCompletionsNarrator {
    fn name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: &NarrativeRequest) -> Result<String, NarrativeError> {
        let api_key = self.api_key.as_ref().ok_or(NarrativeError::MissingApiKey)?;
        let body = self.build_request(request);

        tracing::debug!(endpoint = %self.endpoint, model = %self.model, "posting chat completion");
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| NarrativeError::Transport(err.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|err| NarrativeError::Transport(err.to_string()))?;

        if !status.is_success() {
            return Err(map_http_error(status, &text));
        }
        extract_text(&text)
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

fn extract_text(body: &str) -> Result<String, NarrativeError> {
    let parsed: ChatCompletionResponse =
        serde_json::from_str(body).map_err(|err| NarrativeError::Malformed(err.to_string()))?;

    let choice = parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| NarrativeError::Malformed("response has no choices".to_string()))?;

    choice
        .message
        .content
        .filter(|text| !text.trim().is_empty())
        .ok_or(NarrativeError::Empty)
}

fn map_http_error(status: StatusCode, body: &str) -> NarrativeError {
    let message = serde_json::from_str::<ErrorResponse>(body)
        .map(|wrapper| wrapper.error.message)
        .unwrap_or_else(|_| body.trim().to_string());

    NarrativeError::Status {
        status: status.as_u16(),
        message,
    }
}
