//! Language-model collaborator used by the title workflow.
//!
//! Only the synchronous-style completion call lives here; the streaming
//! retrieval-augmented answering path belongs to an external service. When
//! no provider is configured the title workflow degrades to its localized
//! fallback, so the client is optional.

use crate::config::{LlmProvider, get_config};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

const DEFAULT_OLLAMA_URL: &str = "http://127.0.0.1:11434";

/// Errors surfaced while requesting a completion.
#[derive(Debug, Error)]
pub enum LlmClientError {
    /// Provider was unreachable.
    #[error("Language model provider unavailable: {0}")]
    ProviderUnavailable(String),
    /// Provider returned an error response.
    #[error("Completion failed: {0}")]
    GenerationFailed(String),
    /// Provider response could not be parsed.
    #[error("Malformed provider response: {0}")]
    InvalidResponse(String),
}

/// Interface implemented by completion providers.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Complete a prompt under the given system instruction, returning
    /// plain text.
    async fn complete(
        &self,
        user_prompt: &str,
        system_prompt: &str,
    ) -> Result<String, LlmClientError>;
}

/// Build a completion client based on configuration.
pub fn get_llm_client() -> Option<Box<dyn LlmClient + Send + Sync>> {
    let config = get_config();
    match config.llm_provider {
        LlmProvider::None => None,
        LlmProvider::Ollama => {
            let base_url = config
                .ollama_url
                .clone()
                .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string());
            let model = config.llm_model.clone().unwrap_or_else(|| "llama3".into());
            Some(Box::new(OllamaChatClient::new(base_url, model)))
        }
    }
}

struct OllamaChatClient {
    http: Client,
    base_url: String,
    model: String,
}

impl OllamaChatClient {
    fn new(base_url: String, model: String) -> Self {
        let http = Client::builder()
            .user_agent("docstream/titles")
            .build()
            .expect("Failed to construct reqwest::Client for completions");
        Self {
            http,
            base_url,
            model,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/api/chat", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    message: OllamaChatMessage,
    done: bool,
}

#[derive(Debug, Deserialize)]
struct OllamaChatMessage {
    content: String,
}

#[async_trait]
impl LlmClient for OllamaChatClient {
    async fn complete(
        &self,
        user_prompt: &str,
        system_prompt: &str,
    ) -> Result<String, LlmClientError> {
        let payload = json!({
            "model": self.model,
            "stream": false,
            "messages": [
                { "role": "system", "content": system_prompt },
                { "role": "user", "content": user_prompt }
            ],
            "options": {
                // Low temperature keeps short titles stable.
                "temperature": 0.1,
            }
        });

        let response = self
            .http
            .post(self.endpoint())
            .json(&payload)
            .send()
            .await
            .map_err(|error| {
                LlmClientError::ProviderUnavailable(format!(
                    "failed to reach Ollama at {}: {error}",
                    self.base_url
                ))
            })?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(LlmClientError::ProviderUnavailable(format!(
                "Ollama endpoint {} returned 404",
                self.endpoint()
            )));
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmClientError::GenerationFailed(format!(
                "Ollama returned {status}: {body}"
            )));
        }

        let body: OllamaChatResponse = response.json().await.map_err(|error| {
            LlmClientError::InvalidResponse(format!("failed to decode Ollama response: {error}"))
        })?;

        if !body.done {
            return Err(LlmClientError::InvalidResponse(
                "Ollama response incomplete (streaming not supported)".into(),
            ));
        }

        Ok(body.message.content.trim().to_string())
    }
}
