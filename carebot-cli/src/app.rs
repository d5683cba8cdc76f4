//! Startup: documents → index → conversational chain.

use std::sync::Arc;

use anyhow::{Context, Result};
use carebot_chat::ConversationOrchestrator;
use carebot_core::CompletionModel;
use carebot_model::OpenAICompatibleClient;
use carebot_rag::{
    EmbeddingProvider, HashingEmbeddingProvider, OpenAIEmbeddingProvider, RagPipeline, Retriever,
    VectorIndex, load_pdf_directory,
};
use tracing::{error, info};

use crate::config::{AppConfig, EmbeddingConfig, EmbeddingKind};

/// The searchable corpus, ready to answer queries.
pub struct KnowledgeBase {
    pub pipeline: RagPipeline,
    pub index: Arc<VectorIndex>,
    pub document_count: usize,
}

impl KnowledgeBase {
    pub fn retriever(&self) -> Result<Retriever> {
        Ok(self.pipeline.retriever(Arc::clone(&self.index))?)
    }
}

/// Build the embedding provider selected by `config`.
pub fn build_embedding_provider(config: &EmbeddingConfig) -> Result<Arc<dyn EmbeddingProvider>> {
    let provider: Arc<dyn EmbeddingProvider> = match config.provider {
        EmbeddingKind::Hashing => {
            info!(dimensions = config.hashing_dimensions(), "initialising hashing embedding model");
            Arc::new(HashingEmbeddingProvider::new(config.hashing_dimensions())?)
        }
        EmbeddingKind::Openai => {
            let mut provider = OpenAIEmbeddingProvider::from_env()?;
            if let Some(model) = &config.model {
                provider = provider.with_model(model.clone());
            }
            if let Some(base_url) = &config.base_url {
                provider = provider.with_base_url(base_url.clone());
            }
            if let Some(dimensions) = config.dimensions {
                provider = provider.with_native_dimensions(dimensions);
            }
            info!(model = ?config.model, "initialising embedding model");
            Arc::new(provider)
        }
    };
    Ok(provider)
}

/// Load every PDF of the data directory, split it and build the index.
///
/// Any failure here is fatal: there is no partially indexed knowledge base.
pub async fn build_knowledge_base(config: &AppConfig) -> Result<KnowledgeBase> {
    let documents = load_pdf_directory(&config.data_dir)
        .with_context(|| format!("failed to load documents from {}", config.data_dir.display()))?;

    let embedding_provider = build_embedding_provider(&config.embedding)?;
    let pipeline = RagPipeline::builder()
        .config(config.rag.clone())
        .embedding_provider(embedding_provider)
        .build()?;

    let index = pipeline.build_index(&documents).await.map_err(|e| {
        error!(error = %e, "failed to load and split documents");
        e
    })?;
    info!(document_count = documents.len(), chunk_count = index.len(), "vector retriever initialised");

    Ok(KnowledgeBase { pipeline, index, document_count: documents.len() })
}

/// Build the completion client from the `[model]` section and environment.
pub fn build_language_model(config: &AppConfig) -> Result<Arc<dyn CompletionModel>> {
    info!(model = %config.model.model, base_url = %config.model.base_url, "initialising language model");
    let client = OpenAICompatibleClient::new(config.model.clone()).map_err(|e| {
        error!(error = %e, "failed to initialise language model");
        e
    })?;
    Ok(Arc::new(client))
}

/// Full startup sequence for the conversational commands.
pub async fn bootstrap(config: &AppConfig) -> Result<ConversationOrchestrator> {
    let knowledge = build_knowledge_base(config).await?;
    let language_model = build_language_model(config)?;
    let orchestrator =
        ConversationOrchestrator::new(language_model, knowledge.retriever()?, config.prompts.clone())?;
    Ok(orchestrator)
}
