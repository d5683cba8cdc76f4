//! In-memory vector index using cosine similarity.
//!
//! A [`VectorIndex`] is built once from every chunk of the corpus and is
//! read-only afterwards, so it can be shared behind an `Arc` and searched
//! concurrently without locking.

use tracing::{error, info};

use crate::document::{Chunk, SearchResult};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};

#[derive(Debug, Clone)]
struct IndexEntry {
    chunk: Chunk,
    embedding: Vec<f32>,
}

/// An immutable collection of (chunk, embedding) pairs.
///
/// Entries keep the order in which chunks were supplied; search results with
/// equal scores come back in that order, so identical queries always return
/// identical rankings.
#[derive(Debug, Clone)]
pub struct VectorIndex {
    entries: Vec<IndexEntry>,
    dimensions: usize,
}

impl VectorIndex {
    /// Embed every chunk with `provider` and build the index.
    ///
    /// Chunks are embedded `batch_size` at a time, each exactly once.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::IndexError`] if there are no chunks, if the
    /// provider fails, or if any vector's dimension differs from the
    /// provider's declared dimension. No partial index is returned.
    pub async fn build(
        chunks: Vec<Chunk>,
        provider: &dyn EmbeddingProvider,
        batch_size: usize,
    ) -> Result<Self> {
        if chunks.is_empty() {
            return Err(RagError::IndexError("cannot build an index from zero chunks".into()));
        }
        let batch_size = batch_size.max(1);

        let mut embeddings = Vec::with_capacity(chunks.len());
        for batch in chunks.chunks(batch_size) {
            let texts: Vec<&str> = batch.iter().map(|c| c.text.as_str()).collect();
            let vectors = provider.embed_batch(&texts).await.map_err(|e| {
                error!(provider = provider.name(), error = %e, "embedding failed during index build");
                RagError::IndexError(format!("embedding failed: {e}"))
            })?;
            if vectors.len() != batch.len() {
                return Err(RagError::IndexError(format!(
                    "provider '{}' returned {} vectors for {} chunks",
                    provider.name(),
                    vectors.len(),
                    batch.len()
                )));
            }
            embeddings.extend(vectors);
        }

        let expected = provider.dimensions();
        if let Some((chunk, vector)) =
            chunks.iter().zip(&embeddings).find(|(_, v)| v.len() != expected)
        {
            return Err(RagError::IndexError(format!(
                "chunk '{}' has embedding dimension {} but provider '{}' declares {expected}",
                chunk.id,
                vector.len(),
                provider.name()
            )));
        }

        let index = Self::from_embedded(chunks.into_iter().zip(embeddings).collect())?;
        info!(
            provider = provider.name(),
            chunk_count = index.len(),
            dimensions = index.dimensions,
            "vector index built"
        );
        Ok(index)
    }

    /// Build an index from chunks that already carry embeddings.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::IndexError`] if `pairs` is empty, a vector is
    /// empty, or the vectors do not all share one dimension.
    pub fn from_embedded(pairs: Vec<(Chunk, Vec<f32>)>) -> Result<Self> {
        let dimensions = match pairs.first() {
            Some((_, embedding)) => embedding.len(),
            None => {
                return Err(RagError::IndexError("cannot build an index from zero chunks".into()));
            }
        };
        if dimensions == 0 {
            return Err(RagError::IndexError("embeddings must not be empty".into()));
        }

        let mut entries = Vec::with_capacity(pairs.len());
        for (chunk, embedding) in pairs {
            if embedding.len() != dimensions {
                return Err(RagError::IndexError(format!(
                    "inconsistent embedding dimensions: chunk '{}' has {} but index uses {dimensions}",
                    chunk.id,
                    embedding.len()
                )));
            }
            entries.push(IndexEntry { chunk, embedding });
        }

        Ok(Self { entries, dimensions })
    }

    /// Return the `k` chunks most similar to `query`, highest score first.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::IndexError`] if `query` does not have the index's
    /// dimension.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchResult>> {
        if query.len() != self.dimensions {
            return Err(RagError::IndexError(format!(
                "query dimension {} does not match index dimension {}",
                query.len(),
                self.dimensions
            )));
        }

        let mut scored: Vec<SearchResult> = self
            .entries
            .iter()
            .map(|entry| SearchResult {
                chunk: entry.chunk.clone(),
                score: cosine_similarity(&entry.embedding, query),
            })
            .collect();

        // Stable sort: ties keep insertion order.
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        Ok(scored)
    }

    /// Number of indexed chunks.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Dimension shared by every vector in the index.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Iterate over the indexed chunks in insertion order.
    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.entries.iter().map(|entry| &entry.chunk)
    }
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
