//! Synchronous clients for the remote embedding and generation models.
//!
//! Both wrap the Ollama REST API over blocking `ureq` calls, bounded by a
//! configured timeout. The traits `TextEmbedder` and `TextGenerator` are
//! the seams the orchestrator is built against, so tests (and any future
//! backend) can substitute deterministic implementations.

pub mod embed;
pub mod generate;

pub use embed::{OllamaEmbeddings, TextEmbedder, sanitize_input};
pub use generate::{OllamaGenerator, TextGenerator};
