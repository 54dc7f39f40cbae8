//! PDF text extraction using the `pdf-extract` crate.
//!
//! `pdf-extract` returns the whole document as a single string, so pages
//! are recovered from the form-feed characters (`\x0C`) it inserts between
//! them, with a blank-line heuristic as fallback for extractors that omit
//! the form feeds.

use std::path::Path;

use crate::error::{CorpusError, CorpusResult};

/// Extract per-page text from a PDF file.
///
/// Returns one string per non-empty page, with PDF line-wrapping collapsed
/// into paragraph-shaped text.
pub fn extract_pages(path: &Path) -> CorpusResult<Vec<String>> {
    let data = std::fs::read(path).map_err(|e| CorpusError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    let text = pdf_extract::extract_text_from_mem(&data).map_err(|e| CorpusError::Pdf {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let pages: Vec<&str> = if text.contains('\x0C') {
        text.split('\x0C').collect()
    } else {
        text.split("\n\n\n").collect()
    };

    Ok(pages
        .into_iter()
        .map(normalize_page)
        .filter(|page| !page.is_empty())
        .collect())
}

/// Collapse the erratic line breaks PDF extraction produces: lines within a
/// paragraph are joined with spaces, paragraphs stay separated by one blank
/// line.
fn normalize_page(page: &str) -> String {
    page.split("\n\n")
        .map(|para| {
            para.lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|para| !para.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}
