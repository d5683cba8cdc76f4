//! Completion model trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::message::ChatMessage;

/// One request to a completion service.
///
/// The service sees the messages in this order: `system`, every entry of
/// `history`, then `input` as the final user message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// System instructions for this request.
    pub system: String,
    /// Prior conversation, oldest first.
    pub history: Vec<ChatMessage>,
    /// The latest user input.
    pub input: String,
}

impl CompletionRequest {
    pub fn new(system: impl Into<String>, history: Vec<ChatMessage>, input: impl Into<String>) -> Self {
        Self { system: system.into(), history, input: input.into() }
    }

    /// Flatten the request into the ordered message list sent to the service.
    pub fn messages(&self) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(self.history.len() + 2);
        messages.push(ChatMessage::system(self.system.clone()));
        messages.extend(self.history.iter().cloned());
        messages.push(ChatMessage::user(self.input.clone()));
        messages
    }
}

/// A text-completion service (Groq, OpenAI, a local server, ...).
///
/// Calls are treated as blocking from the caller's point of view: one
/// request, one complete answer. Implementations enforce their own timeouts.
#[async_trait]
pub trait CompletionModel: Send + Sync {
    /// Identifier of the underlying model, used in logs.
    fn name(&self) -> &str;

    /// Produce the assistant reply for `request`.
    async fn complete(&self, request: CompletionRequest) -> Result<String>;
}
