//! Application configuration: TOML file, then environment, then command-line flags.

use std::path::{Path, PathBuf};

use carebot_chat::PromptConfig;
use carebot_model::OpenAICompatibleConfig;
use carebot_rag::{DEFAULT_HASHING_DIMENSIONS, RagConfig};
use carebot_telemetry::{DeployEnv, LoggingConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "carebot.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Which embedding backend to index and query with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingKind {
    /// Offline feature hashing.
    #[default]
    Hashing,
    /// An OpenAI-compatible `/embeddings` server.
    Openai,
}

impl std::str::FromStr for EmbeddingKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hashing" => Ok(EmbeddingKind::Hashing),
            "openai" => Ok(EmbeddingKind::Openai),
            other => Err(ConfigError::Invalid(format!(
                "unknown embedding provider '{other}' (expected 'hashing' or 'openai')"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub provider: EmbeddingKind,
    /// Remote model name; ignored by the hashing provider.
    pub model: Option<String>,
    /// Remote base URL; defaults to the OpenAI API.
    pub base_url: Option<String>,
    /// Vector size. For remote models this must match what the model returns.
    pub dimensions: Option<usize>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self { provider: EmbeddingKind::Hashing, model: None, base_url: None, dimensions: None }
    }
}

impl EmbeddingConfig {
    pub fn hashing_dimensions(&self) -> usize {
        self.dimensions.unwrap_or(DEFAULT_HASHING_DIMENSIONS)
    }
}

/// Everything the `carebot` binary needs to start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory whose `*.pdf` files form the knowledge base.
    pub data_dir: PathBuf,
    pub rag: RagConfig,
    pub prompts: PromptConfig,
    pub logging: LoggingConfig,
    pub embedding: EmbeddingConfig,
    pub model: OpenAICompatibleConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            rag: RagConfig::default(),
            prompts: PromptConfig::default(),
            logging: LoggingConfig::default(),
            embedding: EmbeddingConfig::default(),
            model: OpenAICompatibleConfig::default(),
        }
    }
}

impl AppConfig {
    /// Parse a TOML file. Missing tables and keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Load `path` if given, otherwise [`DEFAULT_CONFIG_FILE`] if it exists,
    /// otherwise defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => {
                let config = Self::from_file(path)?;
                info!(path = %path.display(), "configuration loaded");
                Ok(config)
            }
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.is_file() {
                    let config = Self::from_file(default_path)?;
                    info!(path = %default_path.display(), "configuration loaded");
                    Ok(config)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Apply environment overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`: `DEPLOY_ENV`, `CAREBOT_DATA_DIR`,
    /// `EMBEDDING_PROVIDER`, `EMBEDDING_MODEL_NAME`, `EMBEDDING_BASE_URL` and
    /// the `GROQ_*` model settings. Blank values are ignored.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(env) = non_empty("DEPLOY_ENV") {
            self.logging.deploy_env =
                env.parse::<DeployEnv>().map_err(|e| ConfigError::Invalid(e.to_string()))?;
        }
        if let Some(dir) = non_empty("CAREBOT_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(provider) = non_empty("EMBEDDING_PROVIDER") {
            self.embedding.provider = provider.parse()?;
        }
        if let Some(model) = non_empty("EMBEDDING_MODEL_NAME") {
            self.embedding.model = Some(model);
        }
        if let Some(base_url) = non_empty("EMBEDDING_BASE_URL") {
            self.embedding.base_url = Some(base_url);
        }
        self.model.apply_overrides(&lookup);
        Ok(())
    }

    /// Check every section once, before anything is built.
    ///
    /// The model's API key is not required here; commands that never call the
    /// model (such as `index`) work without it.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |e: &dyn std::fmt::Display| ConfigError::Invalid(e.to_string());
        self.rag.validate().map_err(|e| invalid(&e))?;
        self.prompts.validate().map_err(|e| invalid(&e))?;
        self.logging.validate().map_err(|e| invalid(&e))?;
        if self.embedding.dimensions == Some(0) {
            return Err(ConfigError::Invalid("embedding.dimensions must be greater than 0".into()));
        }
        Ok(())
    }
}
