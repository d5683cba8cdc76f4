//! System prompts for query rewriting and grounded answering.

use serde::{Deserialize, Serialize};

use crate::error::{ChatError, Result};

/// Placeholder in the QA prompt replaced by the retrieved context.
pub const CONTEXT_PLACEHOLDER: &str = "{context}";

/// Instruction for turning a follow-up into a standalone question.
pub const DEFAULT_CONTEXTUALIZE_PROMPT: &str = "Given a chat history and the latest user question \
which might reference context in the chat history, formulate a standalone question \
which can be understood without the chat history. Do NOT answer the question, \
just reformulate it if needed and otherwise return it as is.";

/// Instruction for answering from retrieved context only.
pub const DEFAULT_QA_PROMPT: &str = "You are an assistant for question-answering tasks. \
Use the following pieces of retrieved context to answer the question. \
If you don't know the answer, just say that you don't know.\n\n{context}";

/// The two system prompts used per turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    pub contextualize: String,
    /// Must contain [`CONTEXT_PLACEHOLDER`].
    pub qa: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            contextualize: DEFAULT_CONTEXTUALIZE_PROMPT.to_string(),
            qa: DEFAULT_QA_PROMPT.to_string(),
        }
    }
}

impl PromptConfig {
    /// # Errors
    ///
    /// Returns [`ChatError::Config`] if a prompt is blank or the QA prompt has
    /// no `{context}` slot.
    pub fn validate(&self) -> Result<()> {
        if self.contextualize.trim().is_empty() {
            return Err(ChatError::Config("contextualize prompt must not be empty".into()));
        }
        if self.qa.trim().is_empty() {
            return Err(ChatError::Config("qa prompt must not be empty".into()));
        }
        if !self.qa.contains(CONTEXT_PLACEHOLDER) {
            return Err(ChatError::Config(format!(
                "qa prompt must contain the {CONTEXT_PLACEHOLDER} placeholder"
            )));
        }
        Ok(())
    }

    /// The QA system prompt with `context` substituted.
    pub fn render_qa(&self, context: &str) -> String {
        self.qa.replace(CONTEXT_PLACEHOLDER, context)
    }
}
