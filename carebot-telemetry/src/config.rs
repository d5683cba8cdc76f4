use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::Level;

use crate::error::TelemetryError;

/// Deployment environment. Only affects log verbosity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeployEnv {
    #[default]
    Dev,
    Prod,
}

impl DeployEnv {
    /// DEBUG in development, INFO in production.
    pub fn default_level(&self) -> Level {
        match self {
            DeployEnv::Dev => Level::DEBUG,
            DeployEnv::Prod => Level::INFO,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DeployEnv::Dev => "dev",
            DeployEnv::Prod => "prod",
        }
    }
}

impl fmt::Display for DeployEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeployEnv {
    type Err = TelemetryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dev" | "development" => Ok(DeployEnv::Dev),
            "prod" | "production" => Ok(DeployEnv::Prod),
            other => Err(TelemetryError::InvalidDeployEnv(other.to_string())),
        }
    }
}

/// Where and how verbosely to log.
///
/// Files are written to `<log_dir>/<folder_name>/<folder_name>.<YYYY-MM-DD>.log`
/// and rotated at midnight UTC.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub log_dir: PathBuf,
    pub folder_name: String,
    pub deploy_env: DeployEnv,
    /// Rotated files to keep; older ones are deleted.
    pub max_log_files: usize,
    /// Also print warnings and errors to stderr.
    pub stderr: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("logs"),
            folder_name: "healthcare_chatbot".to_string(),
            deploy_env: DeployEnv::default(),
            max_log_files: 7,
            stderr: true,
        }
    }
}

impl LoggingConfig {
    pub fn with_deploy_env(mut self, deploy_env: DeployEnv) -> Self {
        self.deploy_env = deploy_env;
        self
    }

    pub fn with_log_dir(mut self, log_dir: impl Into<PathBuf>) -> Self {
        self.log_dir = log_dir.into();
        self
    }

    /// Directory holding this application's log files.
    pub fn directory(&self) -> PathBuf {
        self.log_dir.join(&self.folder_name)
    }

    /// Default filter directive used when `RUST_LOG` is not set.
    pub fn default_directive(&self) -> String {
        let level = self.deploy_env.default_level().to_string().to_ascii_lowercase();
        format!("{level},hyper=info,hyper_util=info,reqwest=info,rustyline=warn")
    }

    /// # Errors
    ///
    /// Returns [`TelemetryError::Config`] for an empty folder name or a zero
    /// file limit.
    pub fn validate(&self) -> Result<(), TelemetryError> {
        if self.folder_name.trim().is_empty() {
            return Err(TelemetryError::Config("folder_name must not be empty".into()));
        }
        if self.max_log_files == 0 {
            return Err(TelemetryError::Config("max_log_files must be greater than 0".into()));
        }
        Ok(())
    }
}
