//! Abstractions over the language-model completion service.
//!
//! The pipeline treats completion as an opaque request/response capability: a system
//! instruction plus user content in, generated text out. Two adapters are provided, one
//! for the hosted OpenAI chat completions API and one for a local Ollama runtime. The
//! client is constructed once at startup from configuration and handed to the pipeline;
//! core logic never reaches into the environment for credentials.

use crate::config::{CompletionProvider, Config};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

const DEFAULT_OPENAI_URL: &str = "https://api.openai.com";
const DEFAULT_OLLAMA_URL: &str = "http://127.0.0.1:11434";

/// Errors surfaced while requesting a completion.
#[derive(Debug, Error)]
pub enum CompletionClientError {
    /// Provider was unreachable or explicitly unavailable.
    #[error("Completion provider unavailable: {0}")]
    ProviderUnavailable(String),
    /// Provider returned an error response.
    #[error("Failed to generate completion: {0}")]
    GenerationFailed(String),
    /// Provider response could not be parsed.
    #[error("Malformed provider response: {0}")]
    InvalidResponse(String),
}

/// Interface implemented by completion providers.
///
/// Implementations must be safely reusable across concurrent calls; the pipeline issues
/// several requests against one handle within a single run.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Generate text for the given system instruction and user content.
    async fn complete(
        &self,
        system_instruction: &str,
        user_content: &str,
    ) -> Result<String, CompletionClientError>;
}

/// Build a completion client for the provider selected in `config`.
pub fn build_completion_client(config: &Config) -> Box<dyn CompletionClient> {
    match config.completion_provider {
        CompletionProvider::OpenAI => {
            let base_url = config
                .openai_base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_OPENAI_URL.to_string());
            let api_key = config
                .openai_api_key
                .clone()
                .expect("OPENAI_API_KEY validated during config load");
            Box::new(OpenAiCompletionClient::new(
                base_url,
                api_key,
                config.completion_model.clone(),
            ))
        }
        CompletionProvider::Ollama => {
            let base_url = config
                .ollama_url
                .clone()
                .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string());
            Box::new(OllamaCompletionClient::new(
                base_url,
                config.completion_model.clone(),
            ))
        }
    }
}

struct OpenAiCompletionClient {
    http: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiCompletionClient {
    fn new(base_url: String, api_key: String, model: String) -> Self {
        let http = Client::builder()
            .user_agent("docsum/completion")
            .build()
            .expect("Failed to construct reqwest::Client for completions");
        Self {
            http,
            base_url,
            api_key,
            model,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1/chat/completions",
            self.base_url.trim_end_matches('/')
        )
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

#[async_trait]
impl CompletionClient for OpenAiCompletionClient {
    async fn complete(
        &self,
        system_instruction: &str,
        user_content: &str,
    ) -> Result<String, CompletionClientError> {
        let payload = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system_instruction },
                { "role": "user", "content": user_content },
            ],
        });

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|error| {
                CompletionClientError::ProviderUnavailable(format!(
                    "failed to reach OpenAI at {}: {error}",
                    self.base_url
                ))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionClientError::GenerationFailed(format!(
                "OpenAI returned {status}: {body}"
            )));
        }

        let body: ChatCompletionResponse = response.json().await.map_err(|error| {
            CompletionClientError::InvalidResponse(format!(
                "failed to decode OpenAI response: {error}"
            ))
        })?;

        body.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| {
                CompletionClientError::InvalidResponse("OpenAI response had no choices".into())
            })
    }
}

struct OllamaCompletionClient {
    http: Client,
    base_url: String,
    model: String,
}

impl OllamaCompletionClient {
    fn new(base_url: String, model: String) -> Self {
        let http = Client::builder()
            .user_agent("docsum/completion")
            .build()
            .expect("Failed to construct reqwest::Client for completions");
        Self {
            http,
            base_url,
            model,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/api/generate", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
    done: bool,
}

#[async_trait]
impl CompletionClient for OllamaCompletionClient {
    async fn complete(
        &self,
        system_instruction: &str,
        user_content: &str,
    ) -> Result<String, CompletionClientError> {
        let payload = json!({
            "model": self.model,
            "system": system_instruction,
            "prompt": user_content,
            "stream": false,
            "options": {
                // Lower temperature for deterministic summaries.
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
                CompletionClientError::ProviderUnavailable(format!(
                    "failed to reach Ollama at {}: {error}",
                    self.base_url
                ))
            })?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(CompletionClientError::ProviderUnavailable(format!(
                "Ollama endpoint {} returned 404",
                self.endpoint()
            )));
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionClientError::GenerationFailed(format!(
                "Ollama returned {status}: {body}"
            )));
        }

        let body: OllamaResponse = response.json().await.map_err(|error| {
            CompletionClientError::InvalidResponse(format!(
                "failed to decode Ollama response: {error}"
            ))
        })?;

        if !body.done {
            return Err(CompletionClientError::InvalidResponse(
                "Ollama response incomplete (streaming not supported)".into(),
            ));
        }

        Ok(body.response.trim().to_string())
    }
}
