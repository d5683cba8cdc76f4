//! Ingestion pipeline.
//!
//! The [`RagPipeline`] turns a corpus into a searchable [`VectorIndex`]
//! (split → embed → index) and hands out [`Retriever`]s over it, so build
//! time and query time are guaranteed to share one embedding provider.
//!
//! # Example
//!
//! ```rust,ignore
//! use carebot_rag::{HashingEmbeddingProvider, RagConfig, RagPipeline, load_pdf_directory};
//!
//! let pipeline = RagPipeline::builder()
//!     .config(RagConfig::default())
//!     .embedding_provider(Arc::new(HashingEmbeddingProvider::default()))
//!     .build()?;
//!
//! let documents = load_pdf_directory("data")?;
//! let index = pipeline.build_index(&documents).await?;
//! let retriever = pipeline.retriever(index)?;
//! ```

use std::sync::Arc;

use tracing::info;

use crate::chunking::{Chunker, RecursiveChunker, split_documents};
use crate::config::RagConfig;
use crate::document::Document;
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::index::VectorIndex;
use crate::retriever::Retriever;

/// Coordinates chunking, embedding and indexing. Construct one via
/// [`RagPipeline::builder()`].
pub struct RagPipeline {
    config: RagConfig,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    chunker: Arc<dyn Chunker>,
}

impl RagPipeline {
    /// Create a new [`RagPipelineBuilder`].
    pub fn builder() -> RagPipelineBuilder {
        RagPipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Return a reference to the embedding provider.
    pub fn embedding_provider(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.embedding_provider
    }

    /// Split `documents` and embed every chunk into a new index.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::IngestionError`] for an empty or blank corpus and
    /// [`RagError::IndexError`] if embedding fails or dimensions disagree.
    pub async fn build_index(&self, documents: &[Document]) -> Result<Arc<VectorIndex>> {
        info!(
            chunk_size = self.config.chunk_size,
            chunk_overlap = self.config.chunk_overlap,
            "splitting documents into chunks"
        );
        let chunks = split_documents(self.chunker.as_ref(), documents)?;

        info!(chunk_count = chunks.len(), "creating vector index from document chunks");
        let index = VectorIndex::build(
            chunks,
            self.embedding_provider.as_ref(),
            self.config.embed_batch_size,
        )
        .await?;

        Ok(Arc::new(index))
    }

    /// Create a [`Retriever`] over `index` with this pipeline's provider and
    /// retrieval settings.
    pub fn retriever(&self, index: Arc<VectorIndex>) -> Result<Retriever> {
        Retriever::new(index, Arc::clone(&self.embedding_provider), &self.config)
    }
}

/// Builder for constructing a [`RagPipeline`].
///
/// `config` and `embedding_provider` are required. Without an explicit
/// chunker, a [`RecursiveChunker`] sized from the config is used.
#[derive(Default)]
pub struct RagPipelineBuilder {
    config: Option<RagConfig>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    chunker: Option<Arc<dyn Chunker>>,
}

impl RagPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Set the document chunker.
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Build the [`RagPipeline`], validating the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if a required field is missing or the
    /// configuration is inconsistent.
    pub fn build(self) -> Result<RagPipeline> {
        let config =
            self.config.ok_or_else(|| RagError::ConfigError("config is required".to_string()))?;
        config.validate()?;
        let embedding_provider = self
            .embedding_provider
            .ok_or_else(|| RagError::ConfigError("embedding_provider is required".to_string()))?;
        let chunker = match self.chunker {
            Some(chunker) => chunker,
            None => Arc::new(RecursiveChunker::new(config.chunk_size, config.chunk_overlap)?),
        };

        Ok(RagPipeline { config, embedding_provider, chunker })
    }
}
