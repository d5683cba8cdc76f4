//! # carebot-chat
//!
//! The conversational retrieval pipeline.
//!
//! Each turn runs `RECEIVED → REWRITING → RETRIEVING → GENERATING → COMPLETED`
//! (or `FAILED`):
//!
//! 1. [`QueryRewriter`] turns the utterance into a standalone query using the
//!    session history.
//! 2. A [`carebot_rag::Retriever`] fetches the most relevant chunks.
//! 3. [`AnswerGenerator`] answers from those chunks only.
//! 4. [`ConversationOrchestrator`] records the turn in the
//!    [`carebot_session::SessionStore`] once an answer exists.

pub mod error;
pub mod generator;
pub mod orchestrator;
pub mod prompt;
pub mod rewriter;

pub use error::{ChatError, Result, TurnStage};
pub use generator::AnswerGenerator;
pub use orchestrator::{ConversationOrchestrator, TurnResponse};
pub use prompt::{
    CONTEXT_PLACEHOLDER, DEFAULT_CONTEXTUALIZE_PROMPT, DEFAULT_QA_PROMPT, PromptConfig,
};
pub use rewriter::QueryRewriter;
