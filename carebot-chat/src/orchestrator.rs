//! Turn processing: rewrite, retrieve, generate, record.

use std::sync::Arc;

use carebot_core::CompletionModel;
use carebot_rag::{Chunk, Retriever};
use carebot_session::{SessionStore, Turn};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::error::{ChatError, Result, TurnStage};
use crate::generator::AnswerGenerator;
use crate::prompt::PromptConfig;
use crate::rewriter::QueryRewriter;

/// Result of one successful turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnResponse {
    pub session_id: String,
    pub answer: String,
    /// The query actually used for retrieval and answering.
    pub standalone_query: String,
    /// Chunks the answer was grounded on, most relevant first.
    pub sources: Vec<Chunk>,
}

/// Runs conversation turns against a shared [`SessionStore`].
///
/// The orchestrator holds no conversation state of its own. Each turn holds
/// the session's guard from start to finish, so turns of one session run one
/// at a time, and the turn is appended to the history only once an answer
/// exists.
#[derive(Debug, Clone)]
pub struct ConversationOrchestrator {
    rewriter: QueryRewriter,
    retriever: Retriever,
    generator: AnswerGenerator,
}

impl ConversationOrchestrator {
    /// Build an orchestrator that uses `model` for both rewriting and answering.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Config`] if `prompts` is invalid.
    pub fn new(
        model: Arc<dyn CompletionModel>,
        retriever: Retriever,
        prompts: PromptConfig,
    ) -> Result<Self> {
        prompts.validate()?;
        let rewriter = QueryRewriter::new(Arc::clone(&model), prompts.contextualize.clone());
        let generator = AnswerGenerator::new(model, prompts);
        info!("conversational chain created");
        Ok(Self { rewriter, retriever, generator })
    }

    /// Assemble an orchestrator from already-built stages.
    pub fn from_parts(
        rewriter: QueryRewriter,
        retriever: Retriever,
        generator: AnswerGenerator,
    ) -> Self {
        Self { rewriter, retriever, generator }
    }

    pub fn retriever(&self) -> &Retriever {
        &self.retriever
    }

    /// Process one user utterance for `session_id`.
    ///
    /// # Errors
    ///
    /// Returns the [`ChatError`] of the first failing stage; in that case the
    /// session history is left exactly as it was.
    #[instrument(skip_all, fields(session.id = %session_id))]
    pub async fn handle_turn(
        &self,
        sessions: &SessionStore,
        session_id: &str,
        utterance: &str,
    ) -> Result<TurnResponse> {
        let mut stage = TurnStage::Received;
        let result = self.run_turn(sessions, session_id, utterance, &mut stage).await;
        match &result {
            Ok(response) => {
                info!(source_count = response.sources.len(), "user query processed");
            }
            Err(e) => {
                warn!(failed_stage = %stage, error = %e, "turn failed");
                advance(&mut stage, TurnStage::Failed);
            }
        }
        result
    }

    async fn run_turn(
        &self,
        sessions: &SessionStore,
        session_id: &str,
        utterance: &str,
        stage: &mut TurnStage,
    ) -> Result<TurnResponse> {
        let utterance = utterance.trim();
        if utterance.is_empty() {
            return Err(ChatError::EmptyUtterance);
        }
        debug!(utterance, "processing user query");

        let mut guard = sessions.lock(session_id).await;
        let history = guard.history().messages();

        advance(stage, TurnStage::Rewriting);
        let standalone_query = self.rewriter.rewrite(&history, utterance).await?;

        advance(stage, TurnStage::Retrieving);
        let sources = self.retriever.retrieve(&standalone_query).await?;

        advance(stage, TurnStage::Generating);
        let answer = self.generator.answer(&standalone_query, &sources, &history).await?;

        guard.append(Turn::new(utterance, answer.clone()));
        advance(stage, TurnStage::Completed);

        Ok(TurnResponse { session_id: session_id.to_string(), answer, standalone_query, sources })
    }
}

fn advance(stage: &mut TurnStage, next: TurnStage) {
    debug!(from = %stage, to = %next, "turn stage");
    *stage = next;
}
