//! # vitae
//!
//! Retrieval-augmented question answering over a personal CV and skills
//! corpus: visitors ask natural-language questions, the pipeline retrieves
//! grounding passages from the corpus and has a language model answer from
//! them — or short-circuits to direct CV lookup when the question asks for
//! the CV itself.
//!
//! ## Architecture
//!
//! - **Corpus** (`corpus`): PDF/Markdown loading with provenance metadata
//! - **Chunker** (`chunker`): header-aware, bounded, overlapping splitting
//! - **Remote clients** (`remote`): sync Ollama embedding + generation
//! - **Vector index** (`index`): persistent HNSW over chunk embeddings
//! - **Intent routing** (`intent`): direct lookup vs. semantic retrieval
//! - **CV extraction** (`cv`): on-demand section and entry lookup
//! - **Pipeline** (`pipeline`): `ingest()` offline, `answer_question()` online
//!
//! ## Library usage
//!
//! ```no_run
//! use vitae::config::PipelineConfig;
//! use vitae::paths::CorpusPaths;
//! use vitae::pipeline::Pipeline;
//!
//! let config = PipelineConfig::default();
//! let paths = CorpusPaths::resolve(None);
//! let pipeline = Pipeline::open(&config, &paths).unwrap();
//! let result = pipeline.answer_question("What cloud platforms have you used?");
//! println!("{}", result.answer);
//! ```

pub mod chunker;
pub mod config;
pub mod corpus;
pub mod cv;
pub mod error;
pub mod index;
pub mod intent;
pub mod paths;
pub mod pipeline;
pub mod prompt;
pub mod remote;
