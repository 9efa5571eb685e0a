//! OpenAI-compatible chat-completions provider.
//!
//! Speaks the `/v1/chat/completions` wire format, which most hosted and
//! self-hosted inference servers accept. The base URL is configurable so
//! tests can point it at a mock server.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::CompletionProvider;
use crate::{HuginnError, Result};

const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Configuration for [`OpenAiProvider`].
///
/// ```rust
/// # use huginn::providers::OpenAiConfig;
/// let config = OpenAiConfig::new("sk-your-key")
///     .model("gpt-4o")
///     .base_url("https://api.openai.com");
/// ```
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    /// Default: `https://api.openai.com`.
    pub base_url: String,
    /// Default: `gpt-4o-mini`.
    pub model: String,
    /// Per-request transport timeout. Default: 60s.
    pub timeout: Duration,
}

impl OpenAiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
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
struct ApiErrorBody {
    error: Option<ApiErrorDetail>,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: Option<String>,
    code: Option<serde_json::Value>,
}

/// Chat-completions client over reqwest.
pub struct OpenAiProvider {
    client: reqwest::Client,
    config: OpenAiConfig,
}

impl OpenAiProvider {
    /// Build a provider from config.
    ///
    /// Fails only when the underlying HTTP client cannot be constructed.
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| HuginnError::Configuration(e.to_string()))?;
        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_secs);
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .ok()
                .and_then(|b| b.error)
                .map(|e| {
                    let code = e
                        .code
                        .map(|c| c.to_string().trim_matches('"').to_string())
                        .unwrap_or_default();
                    let msg = e.message.unwrap_or_default();
                    if code.is_empty() { msg } else { format!("{code}: {msg}") }
                })
                .unwrap_or(body);
            debug!(status = status.as_u16(), %message, "provider returned error");
            let mut err = HuginnError::classify(Some(status.as_u16()), &message);
            if let HuginnError::QuotaExceeded { retry_after: slot } = &mut err {
                *slot = retry_after;
            }
            return Err(err);
        }

        let parsed: ChatResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(HuginnError::EmptyResponse)
    }
}
