//! Error types for completion services.

use thiserror::Error;

/// Errors reported by a [`CompletionModel`](crate::CompletionModel).
#[derive(Debug, Error)]
pub enum ModelError {
    /// The request could not be sent or the response could not be read.
    #[error("Request error ({provider}): {message}")]
    Request {
        /// The completion provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The service answered with a non-success status.
    #[error("API error ({provider}, status {status}): {message}")]
    Api {
        /// The completion provider that produced the error.
        provider: String,
        /// HTTP status code returned by the service.
        status: u16,
        /// The provider's error message, or the raw body.
        message: String,
    },

    /// The service answered successfully but produced no text.
    #[error("Empty response from {provider}")]
    EmptyResponse {
        /// The completion provider that produced the error.
        provider: String,
    },

    /// The client is misconfigured (missing key, bad URL, ...).
    #[error("Configuration error: {0}")]
    Config(String),
}

/// A convenience result type for completion operations.
pub type Result<T> = std::result::Result<T, ModelError>;
