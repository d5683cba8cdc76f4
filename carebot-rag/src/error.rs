//! Error types for the `carebot-rag` crate.

use thiserror::Error;

/// Errors that can occur while building or querying the knowledge base.
#[derive(Debug, Error)]
pub enum RagError {
    /// The document source is missing, unreadable, or yields nothing to index.
    #[error("Ingestion error: {0}")]
    IngestionError(String),

    /// The vector index could not be built or searched.
    #[error("Index error: {0}")]
    IndexError(String),

    /// An error occurred during embedding generation.
    #[error("Embedding error ({provider}): {message}")]
    EmbeddingError {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// A convenience result type for RAG operations.
pub type Result<T> = std::result::Result<T, RagError>;
