use std::path::{Path, PathBuf};

use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

use crate::config::LoggingConfig;
use crate::error::TelemetryError;

/// Keeps the background log writer alive. Dropping it flushes pending lines.
#[must_use = "dropping the guard stops file logging"]
pub struct LoggingGuard {
    _worker: WorkerGuard,
    directory: PathBuf,
}

impl LoggingGuard {
    /// Directory the log files are written to.
    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

impl std::fmt::Debug for LoggingGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoggingGuard").field("directory", &self.directory).finish()
    }
}

/// Create the log directory and a daily rotating appender inside it.
///
/// # Errors
///
/// Returns [`TelemetryError`] if the config is invalid, the directory cannot
/// be created, or the first log file cannot be opened.
pub fn file_appender(config: &LoggingConfig) -> Result<RollingFileAppender, TelemetryError> {
    config.validate()?;
    let directory = config.directory();
    std::fs::create_dir_all(&directory).map_err(|source| TelemetryError::LogDirectory {
        path: directory.display().to_string(),
        source,
    })?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(config.folder_name.as_str())
        .filename_suffix("log")
        .max_log_files(config.max_log_files)
        .build(&directory)?;
    Ok(appender)
}

/// Install the global `tracing` subscriber.
///
/// Events go to the rotating log file at the environment's level (or
/// whatever `RUST_LOG` says) and, if enabled, warnings and errors also go to
/// stderr. Call once at startup and keep the returned guard until exit.
///
/// # Errors
///
/// Fails if the appender cannot be created or a global subscriber is
/// already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<LoggingGuard, TelemetryError> {
    let appender = file_appender(config)?;
    let (writer, worker) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_directive()));

    let file_layer = fmt::layer().with_writer(writer).with_ansi(false).with_target(true);
    let stderr_layer = config.stderr.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .compact()
            .with_target(false)
            .with_filter(LevelFilter::WARN)
    });

    tracing_subscriber::registry().with(filter).with(file_layer).with(stderr_layer).try_init()?;

    let directory = config.directory();
    info!(
        deploy_env = %config.deploy_env,
        directory = %directory.display(),
        "logging initialised"
    );
    Ok(LoggingGuard { _worker: worker, directory })
}
