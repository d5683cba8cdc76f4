//! Property tests for the query rewriter.

use std::sync::Arc;

use carebot_chat::{ChatError, DEFAULT_CONTEXTUALIZE_PROMPT, QueryRewriter};
use carebot_core::ChatMessage;
use carebot_model::MockCompletionModel;
use proptest::prelude::*;

/// *For any* utterance, rewriting with an empty history returns it unchanged
/// and never calls the model.
mod prop_rewrite_without_history {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn empty_history_passes_utterance_through(utterance in "\\PC{0,80}") {
            let rt = tokio::runtime::Runtime::new().unwrap();
            let (rewritten, calls) = rt.block_on(async {
                let model = Arc::new(MockCompletionModel::new("unused"));
                let rewriter = QueryRewriter::new(model.clone(), "contextualize");
                let rewritten = rewriter.rewrite(&[], &utterance).await.unwrap();
                (rewritten, model.call_count().await)
            });

            prop_assert_eq!(rewritten, utterance);
            prop_assert_eq!(calls, 0);
        }
    }
}

#[tokio::test]
async fn history_is_forwarded_after_the_system_prompt() {
    let model = Arc::new(MockCompletionModel::new("m").with_reply("How is hypertension treated?"));
    let rewriter = QueryRewriter::new(model.clone(), "contextualize");
    let history = vec![
        ChatMessage::user("What is hypertension?"),
        ChatMessage::assistant("High blood pressure."),
    ];

    let query = rewriter.rewrite(&history, "How is it treated?").await.unwrap();
    assert_eq!(query, "How is hypertension treated?");

    let request = &model.requests().await[0];
    assert_eq!(request.system, "contextualize");
    assert_eq!(request.history, history);
    assert_eq!(request.input, "How is it treated?");
}

#[tokio::test]
async fn model_failure_is_a_rewrite_error() {
    let model = Arc::new(MockCompletionModel::new("m"));
    let rewriter = QueryRewriter::new(model, "contextualize");
    let history = vec![ChatMessage::user("hi"), ChatMessage::assistant("hello")];

    let err = rewriter.rewrite(&history, "and then?").await.unwrap_err();
    assert!(matches!(err, ChatError::Rewrite(_)));
}

#[tokio::test]
async fn default_rewrite_request_tells_the_model_not_to_answer() {
    let model = Arc::new(MockCompletionModel::new("m").with_reply("How is hypertension treated?"));
    let rewriter = QueryRewriter::new(model.clone(), DEFAULT_CONTEXTUALIZE_PROMPT);
    let history = vec![
        ChatMessage::user("What is hypertension?"),
        ChatMessage::assistant("High blood pressure."),
    ];

    rewriter.rewrite(&history, "How is it treated?").await.unwrap();

    let request = &model.requests().await[0];
    assert!(request.system.contains("Do NOT answer the question"), "system: {}", request.system);
    assert!(request.system.contains("reformulate"));
}
