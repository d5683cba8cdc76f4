//! Loading the PDF corpus from disk.
//!
//! [`load_pdf_directory`] reads every `*.pdf` file found directly inside a
//! directory and produces one [`Document`] per non-blank page, carrying the
//! file path and 1-based page number as metadata.

use std::path::{Path, PathBuf};

use lopdf::Document as PdfDocument;
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

use crate::document::{Document, PAGE_KEY, SOURCE_KEY};
use crate::error::{RagError, Result};

/// List the PDF files directly inside `dir`, sorted by path.
///
/// The extension match is case-insensitive; sub-directories are not searched.
///
/// # Errors
///
/// Returns [`RagError::IngestionError`] if `dir` does not exist or is not a
/// directory.
pub fn discover_pdf_files(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        error!(path = %dir.display(), "document directory does not exist");
        return Err(RagError::IngestionError(format!(
            "directory path not found: {}",
            dir.display()
        )));
    }

    let mut files = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry.path().extension().is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
        })
        .map(|entry| entry.into_path())
        .collect::<Vec<_>>();

    files.sort();
    Ok(files)
}

/// Read one PDF file into per-page documents.
///
/// # Errors
///
/// Returns [`RagError::IngestionError`] if the file cannot be parsed or a
/// page's text cannot be extracted.
pub fn load_pdf_file(path: impl AsRef<Path>) -> Result<Vec<Document>> {
    let path = path.as_ref();
    let pdf = PdfDocument::load(path).map_err(|e| {
        error!(path = %path.display(), error = %e, "failed to read PDF");
        RagError::IngestionError(format!("failed to read '{}': {e}", path.display()))
    })?;

    let stem = path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
    let source = path.display().to_string();

    let mut documents = Vec::new();
    for page_number in pdf.get_pages().into_keys() {
        let text = pdf.extract_text(&[page_number]).map_err(|e| {
            error!(path = %path.display(), page = page_number, error = %e, "failed to extract page text");
            RagError::IngestionError(format!(
                "failed to extract page {page_number} of '{}': {e}",
                path.display()
            ))
        })?;

        if text.trim().is_empty() {
            debug!(path = %path.display(), page = page_number, "skipping blank page");
            continue;
        }

        documents.push(
            Document::new(format!("{stem}_p{page_number}"), text)
                .with_metadata(SOURCE_KEY, source.clone())
                .with_metadata(PAGE_KEY, page_number.to_string())
                .with_source_uri(source.clone()),
        );
    }

    if documents.is_empty() {
        warn!(path = %path.display(), "PDF contains no extractable text");
    }
    Ok(documents)
}

/// Load every PDF directly inside `dir`.
///
/// A directory without PDF files yields an empty `Vec`; splitting that empty
/// corpus is what fails (see [`split_documents`](crate::split_documents)).
///
/// # Errors
///
/// Returns [`RagError::IngestionError`] if the directory is missing or any
/// PDF is unreadable.
pub fn load_pdf_directory(dir: impl AsRef<Path>) -> Result<Vec<Document>> {
    let dir = dir.as_ref();
    info!(path = %dir.display(), "loading PDF documents from directory");

    let files = discover_pdf_files(dir)?;
    let mut documents = Vec::new();
    for file in &files {
        documents.extend(load_pdf_file(file)?);
    }

    info!(file_count = files.len(), page_count = documents.len(), "PDF documents loaded");
    Ok(documents)
}
