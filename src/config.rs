//! Pipeline configuration.
//!
//! Defaults mirror the constants the service has always run with: 500/50
//! character chunking, top-7 retrieval, `llama3` on a local Ollama server.
//! An optional `vitae.toml` overrides the defaults field by field, and
//! `OLLAMA_BASE_URL` overrides the endpoint of both remote clients.

use std::path::Path;

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::chunker::SplitConfig;
use crate::index::DEFAULT_TOP_K;

/// Default Ollama endpoint when `OLLAMA_BASE_URL` is not set.
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Errors from configuration loading.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    #[diagnostic(
        code(vitae::config::io),
        help("Check that the file exists and is readable.")
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {message}")]
    #[diagnostic(
        code(vitae::config::parse),
        help("The file must be valid TOML matching the PipelineConfig shape.")
    )]
    Parse { path: String, message: String },
}

/// A remote model endpoint (embedding or generation).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteEndpoint {
    /// Base URL of the Ollama API.
    pub base_url: String,
    /// Model name to use.
    pub model: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for RemoteEndpoint {
    fn default() -> Self {
        Self {
            base_url: base_url_from_env(),
            model: "llama3".into(),
            timeout_secs: 120,
        }
    }
}

/// Full configuration for ingestion and serving.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Embedding model endpoint.
    pub embedding: RemoteEndpoint,
    /// Generation model endpoint.
    pub generation: RemoteEndpoint,
    /// Sampling temperature for generation. Near zero for factual answers.
    pub temperature: f32,
    /// Chunking bounds for the splitter.
    pub chunking: SplitConfig,
    /// How many chunks to retrieve per question.
    pub top_k: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            embedding: RemoteEndpoint {
                timeout_secs: 60,
                ..Default::default()
            },
            generation: RemoteEndpoint::default(),
            temperature: 0.1,
            chunking: SplitConfig::default(),
            top_k: DEFAULT_TOP_K,
        }
    }
}

impl PipelineConfig {
    /// Load configuration: defaults, overridden by `path` if it exists.
    ///
    /// A missing file is not an error; it just means defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.is_file() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        toml::from_str(&raw).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }
}

fn base_url_from_env() -> String {
    std::env::var("OLLAMA_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string())
}
