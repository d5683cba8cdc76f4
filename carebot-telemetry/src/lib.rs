//! # carebot-telemetry
//!
//! Logging bootstrap for Carebot.
//!
//! [`init_logging`] installs a `tracing` subscriber that writes to a daily
//! rotating file under `<log_dir>/<folder_name>/`, at DEBUG in `dev` and INFO
//! in `prod` unless `RUST_LOG` says otherwise.
//!
//! ```rust,ignore
//! use carebot_telemetry::{DeployEnv, LoggingConfig, init_logging};
//!
//! let _guard = init_logging(&LoggingConfig::default().with_deploy_env(DeployEnv::Prod))?;
//! tracing::info!("Starting the main application.");
//! ```

mod config;
mod error;
mod logging;

pub use config::{DeployEnv, LoggingConfig};
pub use error::TelemetryError;
pub use logging::{LoggingGuard, file_appender, init_logging};
