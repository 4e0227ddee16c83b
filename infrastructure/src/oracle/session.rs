//! Chat session over the HTTP oracle.
//!
//! Provides [`HttpSession`] which implements [`LlmSession`]. The session
//! keeps the message history locally and replays it with every request, so
//! follow-up prompts see earlier turns.

use super::error::{OracleError, Result};
use super::protocol::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage};
use async_trait::async_trait;
use ecogroup_application::{GatewayError, LlmSession};
use ecogroup_domain::Model;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Connection details shared by every session of a gateway.
#[derive(Debug)]
pub(crate) struct Endpoint {
    pub client: reqwest::Client,
    pub url: String,
    pub api_key: Option<String>,
    pub temperature: f32,
}

pub struct HttpSession {
    endpoint: Arc<Endpoint>,
    model: Model,
    history: Mutex<Vec<ChatMessage>>,
}

impl HttpSession {
    pub(crate) fn new(endpoint: Arc<Endpoint>, model: Model, system_prompt: Option<&str>) -> Self {
        let history = system_prompt
            .map(|p| vec![ChatMessage::system(p)])
            .unwrap_or_default();
        Self {
            endpoint,
            model,
            history: Mutex::new(history),
        }
    }

    /// Sends a prompt and waits for the complete reply.
    pub async fn ask(&self, content: &str) -> Result<String> {
        let messages = {
            let mut history = self
                .history
                .lock()
                .map_err(|e| OracleError::Transport(e.to_string()))?;
            history.push(ChatMessage::user(content));
            history.clone()
        };

        let request = ChatCompletionRequest {
            model: self.model.api_id(),
            messages: &messages,
            temperature: self.endpoint.temperature,
        };

        debug!(
            "POST {} ({} messages, model {})",
            self.endpoint.url,
            messages.len(),
            self.model.api_id()
        );

        let mut builder = self.endpoint.client.post(&self.endpoint.url).json(&request);
        if let Some(key) = &self.endpoint.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(OracleError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatCompletionResponse =
            serde_json::from_str(&body).map_err(|e| OracleError::ParseError {
                error: e.to_string(),
                raw: body.clone(),
            })?;
        let reply = parsed.into_content().ok_or(OracleError::EmptyResponse)?;

        if let Ok(mut history) = self.history.lock() {
            history.push(ChatMessage::assistant(reply.clone()));
        }
        Ok(reply)
    }
}

#[async_trait]
impl LlmSession for HttpSession {
    fn model(&self) -> &Model {
        &self.model
    }

    async fn send(&self, content: &str) -> std::result::Result<String, GatewayError> {
        self.ask(content).await.map_err(GatewayError::from)
    }
}
