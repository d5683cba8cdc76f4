//! Query-time retrieval over a built [`VectorIndex`].

use std::sync::Arc;

use tracing::{debug, error};

use crate::config::RagConfig;
use crate::document::{Chunk, SearchResult};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::index::VectorIndex;

/// Turns a standalone query into the most relevant chunks of the corpus.
///
/// The retriever must embed queries with the same provider that built the
/// index; [`Retriever::new`] refuses a provider whose dimension differs from
/// the index's.
#[derive(Clone)]
pub struct Retriever {
    index: Arc<VectorIndex>,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    top_k: usize,
    similarity_threshold: Option<f32>,
}

impl std::fmt::Debug for Retriever {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Retriever")
            .field("provider", &self.embedding_provider.name())
            .field("index_len", &self.index.len())
            .field("top_k", &self.top_k)
            .field("similarity_threshold", &self.similarity_threshold)
            .finish()
    }
}

impl Retriever {
    /// Create a retriever over `index` using `config.top_k` and, when set,
    /// `config.similarity_threshold`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::IndexError`] if the provider's dimension does not
    /// match the index.
    pub fn new(
        index: Arc<VectorIndex>,
        embedding_provider: Arc<dyn EmbeddingProvider>,
        config: &RagConfig,
    ) -> Result<Self> {
        if embedding_provider.dimensions() != index.dimensions() {
            return Err(RagError::IndexError(format!(
                "provider '{}' produces {}-dimensional vectors but the index holds {}",
                embedding_provider.name(),
                embedding_provider.dimensions(),
                index.dimensions()
            )));
        }
        Ok(Self {
            index,
            embedding_provider,
            top_k: config.top_k,
            similarity_threshold: config.similarity_threshold,
        })
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub fn index(&self) -> &Arc<VectorIndex> {
        &self.index
    }

    /// Return the most relevant chunks for `query`, most-similar-first.
    ///
    /// An empty result is a valid outcome, not an error.
    pub async fn retrieve(&self, query: &str) -> Result<Vec<Chunk>> {
        let results = self.retrieve_scored(query).await?;
        Ok(results.into_iter().map(|r| r.chunk).collect())
    }

    /// Like [`retrieve`](Self::retrieve) but keeps the similarity scores.
    ///
    /// # Errors
    ///
    /// Returns the embedding provider's error if the query cannot be embedded,
    /// or [`RagError::IndexError`] if the query vector is malformed.
    pub async fn retrieve_scored(&self, query: &str) -> Result<Vec<SearchResult>> {
        let query_embedding = self.embedding_provider.embed(query).await.map_err(|e| {
            error!(provider = self.embedding_provider.name(), error = %e, "query embedding failed");
            e
        })?;

        let mut results = self.index.search(&query_embedding, self.top_k)?;
        if let Some(threshold) = self.similarity_threshold {
            results.retain(|r| r.score >= threshold);
        }

        debug!(result_count = results.len(), top_k = self.top_k, "retrieval completed");
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::hashing::HashingEmbeddingProvider;

    async fn retriever_over(texts: &[&str], config: &RagConfig) -> Retriever {
        let provider: Arc<dyn EmbeddingProvider> = Arc::new(HashingEmbeddingProvider::default());
        let chunks = texts
            .iter()
            .enumerate()
            .map(|(i, text)| {
                let doc = Document::new(format!("doc{i}"), *text);
                Chunk {
                    id: format!("doc{i}_0"),
                    text: doc.text.clone(),
                    metadata: doc.metadata.clone(),
                    document_id: doc.id.clone(),
                    start_offset: 0,
                }
            })
            .collect();
        let index = VectorIndex::build(chunks, provider.as_ref(), 8).await.unwrap();
        Retriever::new(Arc::new(index), provider, config).unwrap()
    }

    #[tokio::test]
    async fn retrieves_most_similar_first() {
        let config = RagConfig::default();
        let retriever = retriever_over(
            &[
                "Anxiety can be eased with breathing exercises.",
                "Diabetes is managed with insulin.",
                "Sleep hygiene improves mood.",
            ],
            &config,
        )
        .await;

        let chunks = retriever.retrieve("How is diabetes treated?").await.unwrap();
        assert_eq!(chunks[0].text, "Diabetes is managed with insulin.");
        assert!(chunks.len() <= config.top_k);
    }

    #[tokio::test]
    async fn nothing_above_threshold_is_empty_not_error() {
        let config = RagConfig::builder().similarity_threshold(0.99).build().unwrap();
        let retriever = retriever_over(&["Sleep hygiene improves mood."], &config).await;
        let chunks = retriever.retrieve("insulin dosage").await.unwrap();
        assert!(chunks.is_empty());
    }

    struct AxisProvider;

    #[async_trait::async_trait]
    impl EmbeddingProvider for AxisProvider {
        fn name(&self) -> &str {
            "axis"
        }

        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            Ok(if text == "query" { vec![-1.0, 0.2] } else { vec![1.0, 0.0] })
        }

        fn dimensions(&self) -> usize {
            2
        }
    }

    fn chunk(id: &str, text: &str) -> Chunk {
        Chunk {
            id: id.into(),
            text: text.into(),
            metadata: Default::default(),
            document_id: id.into(),
            start_offset: 0,
        }
    }

    #[tokio::test]
    async fn default_config_keeps_negative_scores() {
        let index = VectorIndex::from_embedded(vec![(chunk("a", "insulin"), vec![1.0, 0.0])]).unwrap();
        let retriever =
            Retriever::new(Arc::new(index), Arc::new(AxisProvider), &RagConfig::default()).unwrap();

        let scored = retriever.retrieve_scored("query").await.unwrap();
        assert_eq!(scored.len(), 1);
        assert!(scored[0].score < 0.0);
        assert_eq!(retriever.retrieve("query").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn default_retrieve_returns_min_of_top_k_and_index_len() {
        let config = RagConfig::default();
        let texts = [
            "Anxiety can be eased with breathing exercises.",
            "Diabetes is managed with insulin.",
            "Sleep hygiene improves mood.",
            "Hypertension is high blood pressure.",
            "Vaccines train the immune system.",
            "Hydration supports kidney function.",
        ];
        for n in [1, 3, 6] {
            let retriever = retriever_over(&texts[..n], &config).await;
            let chunks = retriever.retrieve("zebra quantum orchestra").await.unwrap();
            assert_eq!(chunks.len(), n.min(config.top_k), "corpus of {n}");
        }
    }

    #[tokio::test]
    async fn mismatched_provider_is_rejected() {
        let provider = HashingEmbeddingProvider::new(16).unwrap();
        let chunk = Chunk {
            id: "a".into(),
            text: "insulin".into(),
            metadata: Default::default(),
            document_id: "d".into(),
            start_offset: 0,
        };
        let index = VectorIndex::build(vec![chunk], &provider, 4).await.unwrap();
        let other: Arc<dyn EmbeddingProvider> = Arc::new(HashingEmbeddingProvider::new(32).unwrap());
        let err = Retriever::new(Arc::new(index), other, &RagConfig::default()).unwrap_err();
        assert!(matches!(err, RagError::IndexError(_)));
    }
}
