//! Rich diagnostic error types for the vitae pipeline.
//!
//! Each subsystem defines its own error enum with miette `#[diagnostic]`
//! derives, providing error codes and help text so operators know exactly
//! what went wrong and how to fix it. `VitaeError` aggregates them
//! transparently, preserving the full diagnostic chain.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for the vitae pipeline.
#[derive(Debug, Error, Diagnostic)]
pub enum VitaeError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Corpus(#[from] CorpusError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Index(#[from] IndexError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Remote(#[from] RemoteError),
}

/// Convenience alias for functions returning vitae results.
pub type VitaeResult<T> = std::result::Result<T, VitaeError>;

// ---------------------------------------------------------------------------
// Corpus errors
// ---------------------------------------------------------------------------

/// Errors from corpus loading and CV parsing.
#[derive(Debug, Error, Diagnostic)]
pub enum CorpusError {
    #[error("CV file not found in {dir}")]
    #[diagnostic(
        code(vitae::corpus::cv_not_found),
        help(
            "Direct CV lookups need the CV's Markdown source. Place a `.md` \
             file in the CV corpus directory (default `data/cv/`)."
        )
    )]
    CvNotFound { dir: PathBuf },

    #[error("failed to read {path}")]
    #[diagnostic(
        code(vitae::corpus::io),
        help("Check that the file exists and is readable.")
    )]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to extract text from PDF {path}: {message}")]
    #[diagnostic(
        code(vitae::corpus::pdf),
        help("The file may be corrupted, encrypted, or not a PDF at all.")
    )]
    Pdf { path: PathBuf, message: String },
}

/// Convenience alias for corpus operation results.
pub type CorpusResult<T> = std::result::Result<T, CorpusError>;

// ---------------------------------------------------------------------------
// Index errors
// ---------------------------------------------------------------------------

/// Errors from the persistent vector index.
#[derive(Debug, Error, Diagnostic)]
pub enum IndexError {
    #[error("vector index not found at {path}")]
    #[diagnostic(
        code(vitae::index::not_found),
        help(
            "The serving pipeline needs a built index. Run `vitae ingest` \
             first to embed the corpus and persist the index."
        )
    )]
    NotFound { path: PathBuf },

    #[error("refusing to build an index from zero chunks")]
    #[diagnostic(
        code(vitae::index::empty_build),
        help(
            "The corpus produced no chunks. Check that the CV and skills \
             directories contain `.pdf` or `.md` files with actual text."
        )
    )]
    EmptyBuild,

    #[error("index I/O error at {path}")]
    #[diagnostic(
        code(vitae::index::io),
        help("Check directory permissions and available disk space.")
    )]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("index snapshot is corrupt: {message}")]
    #[diagnostic(
        code(vitae::index::corrupt),
        help(
            "The on-disk snapshot could not be decoded, usually because it \
             was written by an incompatible version. Re-run `vitae ingest` \
             to rebuild it from the source documents."
        )
    )]
    Corrupt { message: String },

    #[error("query dimension mismatch: index has {expected}, query has {actual}")]
    #[diagnostic(
        code(vitae::index::dim_mismatch),
        help(
            "The index must be queried with the same embedding model it was \
             built with. Re-run `vitae ingest` after changing the model."
        )
    )]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("nearest-neighbor search error: {message}")]
    #[diagnostic(
        code(vitae::index::search),
        help("The HNSW index encountered an internal error.")
    )]
    Search { message: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Remote(#[from] RemoteError),
}

/// Convenience alias for index operation results.
pub type IndexResult<T> = std::result::Result<T, IndexError>;

// ---------------------------------------------------------------------------
// Remote-service errors
// ---------------------------------------------------------------------------

/// Errors from the remote embedding and generation services.
#[derive(Debug, Error, Diagnostic)]
pub enum RemoteError {
    #[error("embedding request failed: {message}")]
    #[diagnostic(
        code(vitae::remote::embedding_failed),
        help("Check that the embedding server is running and the model is pulled.")
    )]
    EmbeddingFailed { message: String },

    #[error("embedding server rejected the input: {message}")]
    #[diagnostic(
        code(vitae::remote::invalid_embedding_input),
        help(
            "The embedding model could not process the submitted text. This \
             usually indicates malformed input that survived sanitization."
        )
    )]
    InvalidEmbeddingInput { message: String },

    #[error("generation request failed: {message}")]
    #[diagnostic(
        code(vitae::remote::generation_failed),
        help("Check that the language-model server is running and the model is pulled.")
    )]
    GenerationFailed { message: String },

    #[error("failed to parse remote response: {message}")]
    #[diagnostic(
        code(vitae::remote::parse),
        help("The server returned an unexpected response format.")
    )]
    ResponseParse { message: String },
}

impl RemoteError {
    /// Whether this is the distinguished embedding-input validation failure.
    ///
    /// The orchestrator selects a more specific user-facing message for
    /// this condition.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidEmbeddingInput { .. })
    }
}

/// Convenience alias for remote-client results.
pub type RemoteResult<T> = std::result::Result<T, RemoteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corpus_error_converts_to_vitae_error() {
        let err = CorpusError::CvNotFound {
            dir: PathBuf::from("/data/cv"),
        };
        let top: VitaeError = err.into();
        assert!(matches!(top, VitaeError::Corpus(CorpusError::CvNotFound { .. })));
    }

    #[test]
    fn index_error_wraps_remote_error() {
        let remote = RemoteError::EmbeddingFailed {
            message: "connection refused".into(),
        };
        let index: IndexError = remote.into();
        assert!(matches!(index, IndexError::Remote(RemoteError::EmbeddingFailed { .. })));
    }

    #[test]
    fn invalid_input_is_distinguished() {
        let err = RemoteError::InvalidEmbeddingInput {
            message: "bad payload".into(),
        };
        assert!(err.is_invalid_input());

        let err = RemoteError::GenerationFailed {
            message: "500".into(),
        };
        assert!(!err.is_invalid_input());
    }

    #[test]
    fn error_display_messages_are_descriptive() {
        let err = IndexError::DimensionMismatch {
            expected: 4096,
            actual: 1024,
        };
        let msg = format!("{err}");
        assert!(msg.contains("4096"));
        assert!(msg.contains("1024"));
    }
}
