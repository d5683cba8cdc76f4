//! Turn stages and per-turn errors.

use std::fmt;

use carebot_rag::RagError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The stages a turn moves through, in order.
///
/// `Failed` is reachable from every stage before `Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnStage {
    Received,
    Rewriting,
    Retrieving,
    Generating,
    Completed,
    Failed,
}

impl TurnStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnStage::Received => "received",
            TurnStage::Rewriting => "rewriting",
            TurnStage::Retrieving => "retrieving",
            TurnStage::Generating => "generating",
            TurnStage::Completed => "completed",
            TurnStage::Failed => "failed",
        }
    }

    /// Whether no further transition is possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TurnStage::Completed | TurnStage::Failed)
    }
}

impl fmt::Display for TurnStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a turn failed. None of these leave a trace in the session history.
#[derive(Debug, Error)]
pub enum ChatError {
    /// The utterance was empty or whitespace.
    #[error("utterance must not be empty")]
    EmptyUtterance,

    /// The history-aware query could not be produced.
    #[error("Rewrite error: {0}")]
    Rewrite(String),

    /// The standalone query could not be embedded or searched.
    #[error("Retrieval error: {0}")]
    Retrieval(#[from] RagError),

    /// The answer could not be produced.
    #[error("Generation error: {0}")]
    Generation(String),

    /// Prompts or other chat settings are unusable.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ChatError {
    /// The stage the turn was in when this error occurred.
    pub fn stage(&self) -> TurnStage {
        match self {
            ChatError::EmptyUtterance | ChatError::Config(_) => TurnStage::Received,
            ChatError::Rewrite(_) => TurnStage::Rewriting,
            ChatError::Retrieval(_) => TurnStage::Retrieving,
            ChatError::Generation(_) => TurnStage::Generating,
        }
    }
}

/// A convenience result type for chat operations.
pub type Result<T> = std::result::Result<T, ChatError>;
