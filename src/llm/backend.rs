//! Text-completion backends.
//!
//! A single polymorphic [`TextCompletion`] capability with two
//! implementations: a locally hosted model server (Ollama) and a hosted
//! chat-completion API. Both return a prose string or an explicit failure;
//! the fallback contract lives with the caller, not here.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::error::LlmError;

/// One completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// A text-completion capability: prose string out, or an explicit failure.
#[async_trait]
pub trait TextCompletion: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError>;

    /// Short human-readable backend label, e.g. `ollama (llama3.2)`.
    fn describe(&self) -> String;
}

fn http_client(timeout_secs: u64) -> Result<reqwest::Client, LlmError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(concat!("trendlens/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|_| LlmError::Unavailable)
}

// ---------------------------------------------------------------------------
// Locally hosted model server
// ---------------------------------------------------------------------------

/// Ollama generate request
#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    stream: bool,
    options: OllamaOptions,
}

/// Ollama generation options
#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
}

/// Ollama generate response
#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
}

/// Client for a locally hosted Ollama model server.
pub struct OllamaBackend {
    client: reqwest::Client,
    endpoint: String,
    model: String,
}

impl OllamaBackend {
    pub fn new(endpoint: &str, model: &str, timeout_secs: u64) -> Result<Self, LlmError> {
        Ok(Self {
            client: http_client(timeout_secs)?,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }

    /// Check if the local model server is available
    pub async fn is_available(&self) -> bool {
        let url = format!("{}/api/tags", self.endpoint);
        match self.client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}

#[async_trait]
impl TextCompletion for OllamaBackend {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let url = format!("{}/api/generate", self.endpoint);

        let body = OllamaRequest {
            model: self.model.clone(),
            prompt: request.prompt.clone(),
            stream: false,
            options: OllamaOptions {
                temperature: request.temperature,
                num_predict: request.max_tokens,
            },
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LlmError::RequestFailed(format!("HTTP {status}")));
        }

        let parsed: OllamaResponse = response
            .json()
            .await
            .map_err(|e| LlmError::RequestFailed(e.to_string()))?;

        let text = parsed.response.trim().to_string();
        if text.is_empty() {
            return Err(LlmError::EmptyResponse);
        }
        Ok(text)
    }

    fn describe(&self) -> String {
        format!("ollama ({})", self.model)
    }
}

// ---------------------------------------------------------------------------
// Hosted chat-completion API
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatRequestMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatRequestMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

/// Client for a hosted chat-completion API with bearer-token auth.
pub struct OpenAiBackend {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_token: String,
}

impl OpenAiBackend {
    pub fn new(
        base_url: &str,
        model: &str,
        api_token: &str,
        timeout_secs: u64,
    ) -> Result<Self, LlmError> {
        if api_token.trim().is_empty() {
            return Err(LlmError::Unavailable);
        }
        Ok(Self {
            client: http_client(timeout_secs)?,
            endpoint: format!("{}/v1/chat/completions", base_url.trim_end_matches('/')),
            model: model.to_string(),
            api_token: api_token.to_string(),
        })
    }
}

#[async_trait]
impl TextCompletion for OpenAiBackend {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let body = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatRequestMessage {
                role: "user".to_string(),
                content: request.prompt.clone(),
            }],
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LlmError::RequestFailed(format!("HTTP {status}")));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::RequestFailed(e.to_string()))?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.trim().to_string())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(LlmError::EmptyResponse);
        }
        Ok(text)
    }

    fn describe(&self) -> String {
        format!("openai ({})", self.model)
    }
}
