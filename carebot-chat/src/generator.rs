//! Answer generation grounded in retrieved context.

use std::sync::Arc;

use carebot_core::{ChatMessage, CompletionModel, CompletionRequest};
use carebot_rag::Chunk;
use tracing::{debug, error};

use crate::error::{ChatError, Result};
use crate::prompt::PromptConfig;

/// Separator placed between chunk texts in the context block.
const CONTEXT_SEPARATOR: &str = "\n\n";

/// Answers a standalone query from retrieved chunks and prior conversation.
#[derive(Clone)]
pub struct AnswerGenerator {
    model: Arc<dyn CompletionModel>,
    prompts: PromptConfig,
}

impl AnswerGenerator {
    pub fn new(model: Arc<dyn CompletionModel>, prompts: PromptConfig) -> Self {
        Self { model, prompts }
    }

    /// Join chunk texts in retrieved order, separated by blank lines.
    pub fn build_context(chunks: &[Chunk]) -> String {
        chunks.iter().map(|c| c.text.trim()).collect::<Vec<_>>().join(CONTEXT_SEPARATOR)
    }

    /// Ask the model to answer `query` using only `chunks` as context.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Generation`] if the model fails or returns a
    /// blank answer. The call is never retried.
    pub async fn answer(
        &self,
        query: &str,
        chunks: &[Chunk],
        history: &[ChatMessage],
    ) -> Result<String> {
        let context = Self::build_context(chunks);
        let system = self.prompts.render_qa(&context);
        debug!(chunk_count = chunks.len(), context_chars = context.chars().count(), "generating answer");

        let request = CompletionRequest::new(system, history.to_vec(), query);
        let answer = self.model.complete(request).await.map_err(|e| {
            error!(model = self.model.name(), error = %e, "answer generation failed");
            ChatError::Generation(e.to_string())
        })?;

        let answer = answer.trim();
        if answer.is_empty() {
            return Err(ChatError::Generation("model returned an empty answer".into()));
        }
        Ok(answer.to_string())
    }
}

impl std::fmt::Debug for AnswerGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnswerGenerator").field("model", &self.model.name()).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn chunk(text: &str) -> Chunk {
        Chunk {
            id: text.into(),
            text: text.into(),
            metadata: HashMap::new(),
            document_id: "doc".into(),
            start_offset: 0,
        }
    }

    #[test]
    fn context_keeps_retrieved_order() {
        let context = AnswerGenerator::build_context(&[chunk("second best"), chunk(" best \n")]);
        assert_eq!(context, "second best\n\nbest");
    }

    #[test]
    fn empty_retrieval_gives_empty_context() {
        assert_eq!(AnswerGenerator::build_context(&[]), "");
    }
}
