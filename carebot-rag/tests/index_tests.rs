//! Property tests for vector index search ordering.

use std::collections::HashMap;
use std::sync::Arc;

use carebot_rag::config::RagConfig;
use carebot_rag::document::Chunk;
use carebot_rag::embedding::EmbeddingProvider;
use carebot_rag::hashing::HashingEmbeddingProvider;
use carebot_rag::index::VectorIndex;
use carebot_rag::retriever::Retriever;
use proptest::prelude::*;

/// Generate a non-zero L2-normalized embedding of the given dimension.
fn arb_normalized_embedding(dim: usize) -> impl Strategy<Value = Vec<f32>> {
    proptest::collection::vec(-1.0f32..1.0f32, dim).prop_filter_map("non-zero embedding", |mut v| {
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm < 1e-8 {
            return None;
        }
        for val in &mut v {
            *val /= norm;
        }
        Some(v)
    })
}

fn chunk(i: usize, text: String) -> Chunk {
    Chunk {
        id: format!("doc_{i}"),
        text,
        metadata: HashMap::new(),
        document_id: "doc".to_string(),
        start_offset: 0,
    }
}

/// *For any* populated index, search returns at most `k` results ordered by
/// non-increasing cosine score, and repeating the query gives the same ranking.
mod prop_index_search_ordering {
    use super::*;

    const DIM: usize = 16;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn results_ordered_descending_and_bounded_by_k(
            embeddings in proptest::collection::vec(arb_normalized_embedding(DIM), 1..20),
            query in arb_normalized_embedding(DIM),
            k in 1usize..25,
        ) {
            let count = embeddings.len();
            let pairs = embeddings
                .into_iter()
                .enumerate()
                .map(|(i, e)| (chunk(i, format!("chunk {i}")), e))
                .collect();
            let index = VectorIndex::from_embedded(pairs).unwrap();

            let results = index.search(&query, k).unwrap();
            prop_assert_eq!(results.len(), k.min(count));
            for pair in results.windows(2) {
                prop_assert!(
                    pair[0].score >= pair[1].score,
                    "results not in descending order: {} < {}",
                    pair[0].score,
                    pair[1].score
                );
            }

            let again = index.search(&query, k).unwrap();
            let ids: Vec<&str> = results.iter().map(|r| r.chunk.id.as_str()).collect();
            let again_ids: Vec<&str> = again.iter().map(|r| r.chunk.id.as_str()).collect();
            prop_assert_eq!(ids, again_ids);
        }
    }
}

/// *For any* corpus of words, the retriever never returns more than `top_k`
/// chunks and every returned chunk is part of the index.
mod prop_retriever_bounds {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        #[test]
        fn retrieval_is_bounded_and_drawn_from_the_index(
            texts in proptest::collection::vec("[a-z]{3,8}( [a-z]{3,8}){0,6}", 1..12),
            query in "[a-z]{3,8}( [a-z]{3,8}){0,3}",
            top_k in 1usize..6,
        ) {
            let rt = tokio::runtime::Runtime::new().unwrap();
            let (retrieved, indexed) = rt.block_on(async {
                let provider: Arc<dyn EmbeddingProvider> =
                    Arc::new(HashingEmbeddingProvider::default());
                let chunks: Vec<Chunk> =
                    texts.iter().enumerate().map(|(i, t)| chunk(i, t.clone())).collect();
                let index = VectorIndex::build(chunks, provider.as_ref(), 4).await.unwrap();
                let indexed: Vec<String> = index.chunks().map(|c| c.id.clone()).collect();

                let config = RagConfig::builder().top_k(top_k).build().unwrap();
                let retriever = Retriever::new(Arc::new(index), provider, &config).unwrap();
                (retriever.retrieve(&query).await.unwrap(), indexed)
            });

            prop_assert!(retrieved.len() <= top_k);
            for chunk in &retrieved {
                prop_assert!(indexed.contains(&chunk.id));
            }
        }
    }
}
