//! Ordered record of one conversation's turns.

use carebot_core::ChatMessage;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One completed exchange: what the user said and what the assistant answered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub utterance: String,
    pub answer: String,
    pub at: DateTime<Utc>,
}

impl Turn {
    /// Create a turn stamped with the current time.
    pub fn new(utterance: impl Into<String>, answer: impl Into<String>) -> Self {
        Self { utterance: utterance.into(), answer: answer.into(), at: Utc::now() }
    }

    /// The turn as a user message followed by an assistant message.
    pub fn messages(&self) -> [ChatMessage; 2] {
        [ChatMessage::user(self.utterance.clone()), ChatMessage::assistant(self.answer.clone())]
    }
}

/// Ordered, append-only turns of a single session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationHistory {
    turns: Vec<Turn>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a completed turn.
    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Number of turns.
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// Flatten the history into alternating user / assistant messages, oldest first.
    pub fn messages(&self) -> Vec<ChatMessage> {
        self.turns.iter().flat_map(Turn::messages).collect()
    }
}
