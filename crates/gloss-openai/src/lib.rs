//! OpenAI-compatible chat-completion client
//!
//! Sends one `POST {base_url}/chat/completions` per request and returns the
//! first choice's message text. No retries.

#![warn(missing_docs)]
#![warn(unreachable_pub)]

use async_trait::async_trait;
use gloss_core::{CompletionClient, CompletionError, CompletionRequest, EnricherConfig};
use serde::Deserialize;
use std::time::Duration;

/// Overall request timeout
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(600);

/// Chat-completion client bound to one endpoint and credential
#[derive(Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl OpenAiClient {
    /// Create client from resolved configuration
    pub fn new(config: &EnricherConfig) -> Result<Self, CompletionError> {
        Self::with_base_url(&config.base_url, config.api_key.clone())
    }

    /// Create client for an explicit base URL
    pub fn with_base_url(
        base_url: &str,
        api_key: impl Into<String>,
    ) -> Result<Self, CompletionError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| CompletionError::Client(Box::new(e)))?;

        Ok(Self {
            http,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key: api_key.into(),
        })
    }

    /// Endpoint requests are sent to
    #[inline]
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<Option<String>, CompletionError> {
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| CompletionError::Transport(Box::new(e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let completion: ChatCompletion = response
            .json()
            .await
            .map_err(|e| CompletionError::Decode(Box::new(e)))?;

        tracing::debug!(
            model = %request.model,
            choices = completion.choices.len(),
            "completion received"
        );
        Ok(completion.into_text())
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatCompletion {
    /// First choice's text, trimmed; `None` when absent or blank
    fn into_text(self) -> Option<String> {
        let content = self.choices.into_iter().next()?.message.content?;
        let trimmed = content.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}
