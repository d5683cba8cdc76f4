use thiserror::Error;

/// Errors raised while setting up logging.
#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("unknown deploy environment '{0}' (expected 'dev' or 'prod')")]
    InvalidDeployEnv(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("failed to create log directory {path}: {source}")]
    LogDirectory {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to open log file: {0}")]
    Appender(#[from] tracing_appender::rolling::InitError),

    #[error("failed to install global subscriber: {0}")]
    Subscriber(#[from] tracing_subscriber::util::TryInitError),
}
