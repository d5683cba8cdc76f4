//! Configuration for OpenAI-compatible completion endpoints.

use std::time::Duration;

use carebot_core::{ModelError, Result};
use serde::{Deserialize, Serialize};

/// Groq's OpenAI-compatible API base URL.
pub const GROQ_API_BASE: &str = "https://api.groq.com/openai/v1";

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";

/// Settings for an [`OpenAICompatibleClient`](crate::OpenAICompatibleClient).
///
/// Deserializes from the `[model]` table of the application config; the API
/// key is normally supplied through the environment instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAICompatibleConfig {
    /// Bearer token. Never serialized.
    #[serde(skip_serializing)]
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    /// Whole-request timeout in seconds. `None` waits indefinitely.
    pub timeout_secs: Option<u64>,
}

impl Default for OpenAICompatibleConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: GROQ_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: None,
            max_tokens: None,
            timeout_secs: None,
        }
    }
}

impl OpenAICompatibleConfig {
    /// Config for Groq with the given key and model.
    pub fn groq(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self { api_key: api_key.into(), model: model.into(), ..Self::default() }
    }

    /// Config for any OpenAI-compatible server.
    pub fn compatible(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into(),
            model: model.into(),
            ..Self::default()
        }
    }

    /// Read `GROQ_API_KEY`, `GROQ_MODEL_NAME` and `GROQ_BASE_URL` from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Config`] if `GROQ_API_KEY` is unset or empty.
    pub fn from_env() -> Result<Self> {
        Self::default().with_env_overrides()
    }

    /// Overlay environment variables on top of `self`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Config`] if no API key is available afterwards.
    pub fn with_env_overrides(mut self) -> Result<Self> {
        self.apply_overrides(|key| std::env::var(key).ok());
        self.validate()?;
        Ok(self)
    }

    /// Overlay `GROQ_*` values returned by `lookup`; blank values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(key) = non_empty("GROQ_API_KEY") {
            self.api_key = key;
        }
        if let Some(model) = non_empty("GROQ_MODEL_NAME") {
            self.model = model;
        }
        if let Some(base_url) = non_empty("GROQ_BASE_URL") {
            self.base_url = base_url;
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = Some(timeout.as_secs().max(1));
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Check that the config can be used to build a client.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Config`] for an empty key, base URL or model, or a
    /// temperature outside `[0, 2]`.
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(ModelError::Config("GROQ_API_KEY not found".to_string()));
        }
        if self.base_url.trim().is_empty() {
            return Err(ModelError::Config("base_url must not be empty".to_string()));
        }
        if self.model.trim().is_empty() {
            return Err(ModelError::Config("model must not be empty".to_string()));
        }
        if let Some(t) = self.temperature.filter(|t| !(0.0..=2.0).contains(t)) {
            return Err(ModelError::Config(format!("temperature ({t}) must be within [0, 2]")));
        }
        Ok(())
    }
}
