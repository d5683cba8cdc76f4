//! Document chunking.
//!
//! This module provides the [`Chunker`] trait, the [`RecursiveChunker`]
//! implementation, and [`split_documents`], the entry point used at ingestion.
//!
//! Chunks are contiguous character ranges of their document. Lengths and
//! offsets are counted in `char`s so multi-byte text never splits inside a
//! code point.

use tracing::{debug, info};

use crate::document::{CHUNK_INDEX_KEY, Chunk, Document};
use crate::error::{RagError, Result};

/// Separator levels tried in priority order: paragraph, line, sentence, word.
/// Separators sharing a level compete on position alone.
const SEPARATOR_LEVELS: [&[&str]; 4] = [&["\n\n"], &["\n"], &[". ", "! ", "? "], &[" "]];

/// A strategy for splitting documents into chunks.
pub trait Chunker: Send + Sync {
    /// Split a document into chunks.
    ///
    /// Returns an empty `Vec` if the document has blank text.
    fn chunk(&self, document: &Document) -> Vec<Chunk>;
}

/// Splits text on the largest separator that keeps a chunk within
/// `chunk_size`, falling back to a hard character cut.
///
/// Consecutive chunks of one document share at least `chunk_overlap`
/// characters. When the overlap window contains whitespace, the next chunk
/// is moved back to the nearest word start so it does not begin mid-word.
///
/// Chunk IDs are generated as `{document_id}_{chunk_index}`. Each chunk inherits
/// the parent document's metadata plus a `chunk_index` field.
///
/// # Example
///
/// ```rust,ignore
/// use carebot_rag::RecursiveChunker;
///
/// let chunker = RecursiveChunker::new(500, 50)?;
/// let chunks = chunker.chunk(&document);
/// ```
#[derive(Debug, Clone)]
pub struct RecursiveChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl RecursiveChunker {
    /// Create a new `RecursiveChunker`.
    ///
    /// # Arguments
    ///
    /// * `chunk_size` - maximum number of characters per chunk
    /// * `chunk_overlap` - minimum number of characters shared by consecutive chunks
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] unless `chunk_overlap < chunk_size`.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_overlap >= chunk_size {
            return Err(RagError::ConfigError(format!(
                "chunk_overlap ({chunk_overlap}) must be less than chunk_size ({chunk_size})"
            )));
        }
        Ok(Self { chunk_size, chunk_overlap })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }
}

/// Compute the `[start, end)` character ranges of every chunk of `chars`.
fn chunk_ranges(chars: &[char], chunk_size: usize, chunk_overlap: usize) -> Vec<(usize, usize)> {
    let len = chars.len();
    let mut ranges = Vec::new();
    if len == 0 {
        return ranges;
    }

    let mut start = 0;
    loop {
        if len - start <= chunk_size {
            ranges.push((start, len));
            break;
        }
        let end = find_cut(chars, start, chunk_size, chunk_overlap);
        ranges.push((start, end));
        start = next_start(chars, start, end, chunk_overlap);
    }
    ranges
}

/// Choose where the chunk beginning at `start` ends.
///
/// The cut must leave room for progress after the overlap
/// (`cut > start + chunk_overlap`) and keep the chunk within `chunk_size`.
fn find_cut(chars: &[char], start: usize, chunk_size: usize, chunk_overlap: usize) -> usize {
    let lo = start + chunk_overlap + 1;
    let hi = start + chunk_size;

    for level in SEPARATOR_LEVELS {
        let best = level
            .iter()
            .filter_map(|separator| {
                let separator: Vec<char> = separator.chars().collect();
                last_cut_after(chars, &separator, lo, hi)
            })
            .max();
        if let Some(cut) = best {
            return cut;
        }
    }
    hi
}

/// Largest `cut` in `[lo, hi]` such that `separator` ends exactly at `cut`.
///
/// The separator stays attached to the preceding chunk.
fn last_cut_after(chars: &[char], separator: &[char], lo: usize, hi: usize) -> Option<usize> {
    let floor = lo.max(separator.len());
    let mut cut = hi;
    while cut >= floor {
        if chars[cut - separator.len()..cut] == *separator {
            return Some(cut);
        }
        cut -= 1;
    }
    None
}

/// Start of the chunk that follows `[start, end)`.
///
/// Never later than `end - chunk_overlap`; moved back to a word start when
/// one exists inside the overlap window.
fn next_start(chars: &[char], start: usize, end: usize, chunk_overlap: usize) -> usize {
    let target = end - chunk_overlap;
    if chunk_overlap == 0 {
        return target;
    }
    let floor = (start + 1).max(target.saturating_sub(chunk_overlap));
    (floor..=target).rev().find(|&p| chars[p - 1].is_whitespace()).unwrap_or(target)
}

impl Chunker for RecursiveChunker {
    fn chunk(&self, document: &Document) -> Vec<Chunk> {
        if document.text.trim().is_empty() {
            return Vec::new();
        }

        let chars: Vec<char> = document.text.chars().collect();
        let ranges = chunk_ranges(&chars, self.chunk_size, self.chunk_overlap);

        ranges
            .into_iter()
            .filter_map(|(start, end)| {
                let text: String = chars[start..end].iter().collect();
                if text.trim().is_empty() { None } else { Some((start, text)) }
            })
            .enumerate()
            .map(|(i, (start, text))| {
                let mut metadata = document.metadata.clone();
                metadata.insert(CHUNK_INDEX_KEY.to_string(), i.to_string());
                Chunk {
                    id: format!("{}_{i}", document.id),
                    text,
                    metadata,
                    document_id: document.id.clone(),
                    start_offset: start,
                }
            })
            .collect()
    }
}

/// Split every document of the corpus into chunks.
///
/// # Errors
///
/// Returns [`RagError::IngestionError`] if `documents` is empty or no document
/// produced a chunk (every document was blank).
pub fn split_documents(chunker: &dyn Chunker, documents: &[Document]) -> Result<Vec<Chunk>> {
    if documents.is_empty() {
        return Err(RagError::IngestionError("no documents to split".to_string()));
    }

    let mut chunks = Vec::new();
    for document in documents {
        let document_chunks = chunker.chunk(document);
        debug!(document.id = %document.id, chunk_count = document_chunks.len(), "split document");
        chunks.extend(document_chunks);
    }

    if chunks.is_empty() {
        return Err(RagError::IngestionError(format!(
            "{} document(s) contained no text",
            documents.len()
        )));
    }

    info!(document_count = documents.len(), chunk_count = chunks.len(), "document chunks created");
    Ok(chunks)
}
