//! Corpus model and loading.
//!
//! A `Document` is a unit of source text annotated with provenance
//! metadata. The loader produces them from the CV and skills directories;
//! the chunker consumes them and produces new, smaller `Document`s with the
//! same metadata (plus header-path fields for Markdown).

pub mod loader;
pub mod pdf;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// String-keyed provenance metadata attached to every document and chunk.
pub type Metadata = HashMap<String, String>;

/// Well-known metadata keys.
pub const KEY_SOURCE: &str = "source";
pub const KEY_CATEGORY: &str = "category";
pub const KEY_FILE_TYPE: &str = "file_type";
pub const KEY_PAGE: &str = "page";

/// Source file formats the loader understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileType {
    Pdf,
    Markdown,
}

impl FileType {
    /// The value stored under [`KEY_FILE_TYPE`].
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Markdown => "markdown",
        }
    }
}

impl std::fmt::Display for FileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A unit of source text with provenance metadata.
///
/// Immutable once created: the loader creates them, the chunker replaces
/// them with derived chunks carrying a copy of the metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// The text payload.
    pub content: String,
    /// Provenance: at least `source`, `category`, and `file_type`.
    pub metadata: Metadata,
}

impl Document {
    /// Create a document with the three mandatory metadata fields.
    pub fn new(
        content: impl Into<String>,
        source: impl Into<String>,
        category: impl Into<String>,
        file_type: FileType,
    ) -> Self {
        let mut metadata = Metadata::new();
        metadata.insert(KEY_SOURCE.into(), source.into());
        metadata.insert(KEY_CATEGORY.into(), category.into());
        metadata.insert(KEY_FILE_TYPE.into(), file_type.as_str().into());
        Self {
            content: content.into(),
            metadata,
        }
    }

    /// The `source` metadata value, if present.
    pub fn source(&self) -> Option<&str> {
        self.metadata.get(KEY_SOURCE).map(String::as_str)
    }

    /// The `category` metadata value, if present.
    pub fn category(&self) -> Option<&str> {
        self.metadata.get(KEY_CATEGORY).map(String::as_str)
    }

    /// Whether this document came from a Markdown source.
    pub fn is_markdown(&self) -> bool {
        self.metadata.get(KEY_FILE_TYPE).map(String::as_str) == Some(FileType::Markdown.as_str())
    }
}
