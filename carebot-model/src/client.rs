//! OpenAI-compatible completion client.

use async_trait::async_trait;
use carebot_core::{CompletionModel, CompletionRequest, ModelError, Result};
use tracing::{debug, error};

use crate::config::OpenAICompatibleConfig;
use crate::convert::{self, ChatCompletionRequest, ChatCompletionResponse};

/// Completion client for Groq and any other server exposing the OpenAI
/// `/chat/completions` endpoint.
pub struct OpenAICompatibleClient {
    client: reqwest::Client,
    config: OpenAICompatibleConfig,
    provider: String,
}

impl OpenAICompatibleClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Config`] if the config is invalid or the HTTP
    /// client cannot be built.
    pub fn new(mut config: OpenAICompatibleConfig) -> Result<Self> {
        config.validate()?;
        config.base_url = config.base_url.trim_end_matches('/').to_string();

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ModelError::Config(format!("failed to build HTTP client: {e}")))?;

        let provider = provider_name(&config.base_url);
        Ok(Self { client, config, provider })
    }

    /// Create a Groq client from `GROQ_API_KEY` / `GROQ_MODEL_NAME` / `GROQ_BASE_URL`.
    pub fn from_env() -> Result<Self> {
        Self::new(OpenAICompatibleConfig::from_env()?)
    }

    pub fn config(&self) -> &OpenAICompatibleConfig {
        &self.config
    }

    fn request_error(&self, message: String) -> ModelError {
        ModelError::Request { provider: self.provider.clone(), message }
    }
}

/// Short provider label derived from the host, used in errors and logs.
fn provider_name(base_url: &str) -> String {
    let host = base_url
        .split("://")
        .nth(1)
        .unwrap_or(base_url)
        .split(['/', ':'])
        .next()
        .unwrap_or_default();
    if host.contains("groq") {
        "Groq".to_string()
    } else if host.contains("openai") {
        "OpenAI".to_string()
    } else if host.is_empty() {
        "OpenAI-compatible".to_string()
    } else {
        host.to_string()
    }
}

#[async_trait]
impl CompletionModel for OpenAICompatibleClient {
    fn name(&self) -> &str {
        &self.config.model
    }

    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        let body = ChatCompletionRequest {
            model: &self.config.model,
            messages: convert::to_wire_messages(&request),
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };
        debug!(
            provider = %self.provider,
            model = %self.config.model,
            message_count = body.messages.len(),
            "sending chat completion request"
        );

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = %self.provider, error = %e, "request failed");
                self.request_error(format!("request failed: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = convert::error_detail(body);
            error!(provider = %self.provider, %status, "API error");
            return Err(ModelError::Api {
                provider: self.provider.clone(),
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChatCompletionResponse = response.json().await.map_err(|e| {
            error!(provider = %self.provider, error = %e, "failed to parse response");
            self.request_error(format!("failed to parse response: {e}"))
        })?;

        convert::first_content(parsed)
            .ok_or_else(|| ModelError::EmptyResponse { provider: self.provider.clone() })
    }
}
