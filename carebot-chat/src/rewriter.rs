//! History-aware query rewriting.

use std::sync::Arc;

use carebot_core::{ChatMessage, CompletionModel, CompletionRequest};
use tracing::{debug, error};

use crate::error::{ChatError, Result};

const LABELS: [&str; 3] = ["standalone question:", "standalone query:", "question:"];

/// Turns a follow-up utterance into a question that stands on its own.
#[derive(Clone)]
pub struct QueryRewriter {
    model: Arc<dyn CompletionModel>,
    prompt: String,
}

impl QueryRewriter {
    pub fn new(model: Arc<dyn CompletionModel>, prompt: impl Into<String>) -> Self {
        Self { model, prompt: prompt.into() }
    }

    /// Rewrite `utterance` in light of `history`.
    ///
    /// With no history the utterance is already standalone and is returned
    /// unchanged without consulting the model.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Rewrite`] if the model fails or answers with
    /// nothing usable.
    pub async fn rewrite(&self, history: &[ChatMessage], utterance: &str) -> Result<String> {
        if history.is_empty() {
            return Ok(utterance.to_string());
        }

        let request = CompletionRequest::new(self.prompt.clone(), history.to_vec(), utterance);
        let raw = self.model.complete(request).await.map_err(|e| {
            error!(model = self.model.name(), error = %e, "query rewrite failed");
            ChatError::Rewrite(e.to_string())
        })?;

        let query = clean_rewrite(&raw);
        if query.is_empty() {
            return Err(ChatError::Rewrite("model returned an empty standalone query".into()));
        }
        debug!(history_len = history.len(), standalone_query = %query, "query rewritten");
        Ok(query)
    }
}

impl std::fmt::Debug for QueryRewriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryRewriter").field("model", &self.model.name()).finish()
    }
}

/// Strip whitespace, a leading label and wrapping quotes from a model rewrite.
fn clean_rewrite(raw: &str) -> String {
    let mut text = raw.trim();
    for label in LABELS {
        if text.len() >= label.len()
            && text.is_char_boundary(label.len())
            && text[..label.len()].eq_ignore_ascii_case(label)
        {
            text = text[label.len()..].trim_start();
            break;
        }
    }
    for (open, close) in [('"', '"'), ('\'', '\''), ('“', '”'), ('`', '`')] {
        if text.len() > 1 && text.starts_with(open) && text.ends_with(close) {
            text = text[open.len_utf8()..text.len() - close.len_utf8()].trim();
            break;
        }
    }
    text.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_strips_label_and_quotes() {
        assert_eq!(
            clean_rewrite("  Standalone question: \"How is hypertension treated?\"\n"),
            "How is hypertension treated?"
        );
        assert_eq!(clean_rewrite("“What causes anxiety?”"), "What causes anxiety?");
        assert_eq!(clean_rewrite("How is diabetes treated?"), "How is diabetes treated?");
    }

    #[test]
    fn clean_keeps_inner_quotes() {
        assert_eq!(clean_rewrite("What does \"remission\" mean?"), "What does \"remission\" mean?");
    }

    #[test]
    fn clean_of_blank_is_empty() {
        assert_eq!(clean_rewrite("  \"\"  "), "");
        assert_eq!(clean_rewrite("Standalone question:"), "");
    }
}
