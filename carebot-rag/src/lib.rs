//! # carebot-rag
//!
//! Knowledge-base construction and retrieval for Carebot.
//!
//! ## Overview
//!
//! - [`load_pdf_directory`] - read every PDF of a directory into per-page [`Document`]s
//! - [`RecursiveChunker`] / [`split_documents`] - overlapping, size-bounded chunks
//! - [`EmbeddingProvider`] - text to vector; [`HashingEmbeddingProvider`] works offline
//! - [`VectorIndex`] - immutable in-memory cosine index
//! - [`Retriever`] - top-k chunks for a standalone query
//! - [`RagPipeline`] - wires the above together from a [`RagConfig`]
//!
//! ## Features
//!
//! - `openai` - [`openai::OpenAIEmbeddingProvider`] for OpenAI-compatible `/embeddings` servers

pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod hashing;
pub mod index;
pub mod loader;
#[cfg(feature = "openai")]
pub mod openai;
pub mod pipeline;
pub mod retriever;

pub use chunking::{Chunker, RecursiveChunker, split_documents};
pub use config::{RagConfig, RagConfigBuilder};
pub use document::{CHUNK_INDEX_KEY, Chunk, Document, PAGE_KEY, SOURCE_KEY, SearchResult};
pub use embedding::EmbeddingProvider;
pub use error::{RagError, Result};
pub use hashing::{DEFAULT_HASHING_DIMENSIONS, HashingEmbeddingProvider};
pub use index::VectorIndex;
pub use loader::{discover_pdf_files, load_pdf_directory, load_pdf_file};
#[cfg(feature = "openai")]
pub use openai::OpenAIEmbeddingProvider;
pub use pipeline::{RagPipeline, RagPipelineBuilder};
pub use retriever::Retriever;
