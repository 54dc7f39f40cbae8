//! The question-answering pipeline: intent routing, direct CV lookup,
//! retrieval, generation, and the single error-normalization boundary.
//!
//! Per request the flow is
//! `received → routed → {direct-answered | retrieved → generated} → returned`,
//! with no state kept between requests. All collaborators are injected at
//! construction; nothing is built lazily behind a global. Failures never
//! escape [`Pipeline::answer_question`]: they are converted exactly once
//! into a user-safe [`QueryResult`] with the raw chain preserved in
//! `error_details` for diagnostics.

use serde::Serialize;
use tracing::{info, warn};

use crate::chunker::TextSplitter;
use crate::config::PipelineConfig;
use crate::corpus::loader::load_corpus;
use crate::cv::CvSource;
use crate::error::{VitaeError, VitaeResult};
use crate::index::VectorIndex;
use crate::intent::{QueryIntent, classify};
use crate::paths::CorpusPaths;
use crate::prompt::assemble_prompt;
use crate::remote::{OllamaEmbeddings, OllamaGenerator, TextEmbedder, TextGenerator};

/// Generic user-safe message for a failed question.
const GENERIC_FAILURE: &str = "I ran into a problem while processing your question. This is \
     usually a temporary issue with the language model or the retrieval system — please try \
     again in a moment.";

/// User-safe message when the embedding service rejected the input.
const EMBEDDING_FAILURE: &str = "There was an issue passing your question to the underlying \
     embeddings model. Please try rephrasing it.";

/// The contract returned to every caller of [`Pipeline::answer_question`].
#[derive(Debug, Clone, Serialize)]
pub struct QueryResult {
    pub question: String,
    pub answer: String,
    pub success: bool,
    /// Raw failure chain for diagnostics. Never shown as the answer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_details: Option<String>,
}

impl QueryResult {
    fn answered(question: &str, answer: String) -> Self {
        Self {
            question: question.to_string(),
            answer,
            success: true,
            error_details: None,
        }
    }

    fn failed(question: &str, err: &VitaeError) -> Self {
        let answer = match err {
            VitaeError::Remote(remote) if remote.is_invalid_input() => EMBEDDING_FAILURE,
            _ => GENERIC_FAILURE,
        };
        Self {
            question: question.to_string(),
            answer: answer.to_string(),
            success: false,
            error_details: Some(error_chain(err)),
        }
    }
}

/// Summary of one ingestion run.
#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub documents: usize,
    pub chunks: usize,
    pub dim: usize,
}

/// The serving pipeline. Construct once at startup, share read-only.
pub struct Pipeline {
    index: VectorIndex,
    cv: CvSource,
    embedder: Box<dyn TextEmbedder>,
    generator: Box<dyn TextGenerator>,
    top_k: usize,
}

impl Pipeline {
    /// Assemble a pipeline from explicit parts. The seam used by tests and
    /// by any host that brings its own clients.
    pub fn new(
        index: VectorIndex,
        cv: CvSource,
        embedder: Box<dyn TextEmbedder>,
        generator: Box<dyn TextGenerator>,
        top_k: usize,
    ) -> Self {
        Self {
            index,
            cv,
            embedder,
            generator,
            top_k,
        }
    }

    /// Open the pipeline for serving: load the persisted index, locate the
    /// CV source, and connect the remote clients.
    ///
    /// A missing index is a setup error (run ingestion first) and is
    /// returned as such — it must not be mistaken for a bad question.
    pub fn open(config: &PipelineConfig, paths: &CorpusPaths) -> VitaeResult<Self> {
        let index = VectorIndex::load(&paths.index_dir)?;
        let cv = CvSource::locate(&paths.cv_dir)?;
        let embedder = Box::new(OllamaEmbeddings::new(&config.embedding));
        let generator = Box::new(OllamaGenerator::new(&config.generation, config.temperature));
        info!(entries = index.len(), dim = index.dim(), "pipeline ready");
        Ok(Self::new(index, cv, embedder, generator, config.top_k))
    }

    /// Answer one question. Never fails: every error is normalized here.
    pub fn answer_question(&self, question: &str) -> QueryResult {
        let outcome = match classify(question) {
            QueryIntent::FullCv => Ok(self.cv.full_text().to_string()),
            QueryIntent::AllExperience => Ok(self.all_experience()),
            QueryIntent::Section(name) => Ok(self.section(name)),
            QueryIntent::Retrieval => self.retrieve_and_generate(question),
        };

        match outcome {
            Ok(answer) => QueryResult::answered(question, answer),
            Err(err) => {
                warn!(error = %error_chain(&err), "question failed");
                QueryResult::failed(question, &err)
            }
        }
    }

    /// Number of chunks in the loaded index.
    pub fn index_len(&self) -> usize {
        self.index.len()
    }

    /// Embedding dimensionality of the loaded index.
    pub fn index_dim(&self) -> usize {
        self.index.dim()
    }

    fn section(&self, name: &str) -> String {
        self.cv
            .extract_section(name)
            .unwrap_or_else(|| format!("No section '{name}' found in the CV."))
    }

    fn all_experience(&self) -> String {
        match self.cv.experience_entries() {
            Some(entries) => entries.join("\n\n"),
            None => format!(
                "No section '{}' found in the CV.",
                crate::cv::EXPERIENCE_SECTION
            ),
        }
    }

    fn retrieve_and_generate(&self, question: &str) -> VitaeResult<String> {
        let query_vec = self.embedder.embed_query(question)?;
        let hits = self.index.search(&query_vec, self.top_k)?;
        info!(hits = hits.len(), "retrieved context chunks");

        let prompt = assemble_prompt(&hits, question);
        let answer = self.generator.generate(&prompt)?;
        Ok(answer)
    }
}

/// Run the offline ingestion job: load → chunk → embed → persist.
///
/// Idempotent; a re-run fully overwrites the previous index.
pub fn ingest(
    config: &PipelineConfig,
    paths: &CorpusPaths,
    embedder: &dyn TextEmbedder,
) -> VitaeResult<IngestReport> {
    info!(root = %paths.root.display(), "starting ingestion");

    let documents = load_corpus(paths);
    info!(documents = documents.len(), "loaded documents");

    let splitter = TextSplitter::new(config.chunking.clone());
    let chunks = splitter.split_documents(&documents);
    info!(chunks = chunks.len(), "split documents into chunks");

    let document_count = documents.len();
    let index = VectorIndex::build(chunks, embedder)?;
    index.save(&paths.index_dir)?;

    info!("ingestion complete");
    Ok(IngestReport {
        documents: document_count,
        chunks: index.len(),
        dim: index.dim(),
    })
}

/// Render an error with its full source chain, for `error_details`.
fn error_chain(err: &VitaeError) -> String {
    let mut rendered = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(inner) = source {
        rendered.push_str(": ");
        rendered.push_str(&inner.to_string());
        source = inner.source();
    }
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{IndexError, RemoteError};

    #[test]
    fn failure_messages_are_non_technical() {
        let err = VitaeError::Remote(RemoteError::GenerationFailed {
            message: "status 500: internal".into(),
        });
        let result = QueryResult::failed("q", &err);
        assert!(!result.success);
        assert_eq!(result.answer, GENERIC_FAILURE);
        assert_ne!(result.error_details.as_deref(), Some(result.answer.as_str()));
        assert!(result.error_details.unwrap().contains("status 500"));
    }

    #[test]
    fn invalid_embedding_input_selects_the_specific_message() {
        let err = VitaeError::Remote(RemoteError::InvalidEmbeddingInput {
            message: "status 400: bad input".into(),
        });
        let result = QueryResult::failed("q", &err);
        assert_eq!(result.answer, EMBEDDING_FAILURE);
    }

    #[test]
    fn other_errors_use_the_generic_message() {
        let err = VitaeError::Index(IndexError::Search {
            message: "poisoned".into(),
        });
        let result = QueryResult::failed("q", &err);
        assert_eq!(result.answer, GENERIC_FAILURE);
    }
}
