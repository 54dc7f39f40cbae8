//! Embedding client for the Ollama `/api/embed` endpoint.
//!
//! Used both at index-build time (batched) and at query time (single
//! input). Every outbound text passes through [`sanitize_input`] first: the
//! embedding API rejects payloads containing stray control bytes or empty
//! strings outright, and a rejected batch fails the whole ingestion run.

use serde_json::json;
use tracing::debug;

use crate::config::RemoteEndpoint;
use crate::error::{RemoteError, RemoteResult};

/// The embedding seam the pipeline is built against.
pub trait TextEmbedder: Send + Sync {
    /// Embed a batch of document texts, one vector per input, in order.
    fn embed_documents(&self, texts: &[String]) -> RemoteResult<Vec<Vec<f32>>>;

    /// Embed a single query string.
    fn embed_query(&self, text: &str) -> RemoteResult<Vec<f32>>;
}

/// Coerce arbitrary text into a form the embedding API accepts: control
/// characters (except line and tab whitespace) are stripped, and an
/// effectively empty input becomes a single space rather than an empty
/// string the server would reject.
pub fn sanitize_input(text: &str) -> String {
    let cleaned: String = text
        .chars()
        .filter(|c| !c.is_control() || matches!(c, '\n' | '\r' | '\t'))
        .collect();
    if cleaned.trim().is_empty() {
        " ".to_string()
    } else {
        cleaned
    }
}

/// Client for the Ollama embeddings API.
pub struct OllamaEmbeddings {
    base_url: String,
    model: String,
    agent: ureq::Agent,
}

impl OllamaEmbeddings {
    pub fn new(endpoint: &RemoteEndpoint) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(std::time::Duration::from_secs(endpoint.timeout_secs))
            .build();
        Self {
            base_url: endpoint.base_url.trim_end_matches('/').to_string(),
            model: endpoint.model.clone(),
            agent,
        }
    }

    fn request(&self, inputs: &[String]) -> RemoteResult<Vec<Vec<f32>>> {
        let url = format!("{}/api/embed", self.base_url);
        let body = json!({
            "model": self.model,
            "input": inputs,
        });
        let body_str = serde_json::to_string(&body).map_err(|e| RemoteError::EmbeddingFailed {
            message: format!("JSON serialize error: {e}"),
        })?;

        debug!(url = %url, batch = inputs.len(), "requesting embeddings");

        let resp = match self
            .agent
            .post(&url)
            .set("Content-Type", "application/json")
            .send_string(&body_str)
        {
            Ok(resp) => resp,
            Err(ureq::Error::Status(code, resp)) => {
                let detail = resp.into_string().unwrap_or_default();
                // 4xx from the embedding endpoint means the server rejected
                // the payload itself, which the orchestrator reports
                // differently from an outage.
                return Err(if (400..500).contains(&code) {
                    RemoteError::InvalidEmbeddingInput {
                        message: format!("status {code}: {detail}"),
                    }
                } else {
                    RemoteError::EmbeddingFailed {
                        message: format!("status {code}: {detail}"),
                    }
                });
            }
            Err(e) => {
                return Err(RemoteError::EmbeddingFailed {
                    message: e.to_string(),
                });
            }
        };

        let resp_str = resp.into_string().map_err(|e| RemoteError::ResponseParse {
            message: e.to_string(),
        })?;
        let parsed: serde_json::Value =
            serde_json::from_str(&resp_str).map_err(|e| RemoteError::ResponseParse {
                message: e.to_string(),
            })?;

        let vectors = parsed["embeddings"]
            .as_array()
            .ok_or_else(|| RemoteError::ResponseParse {
                message: "missing 'embeddings' field".into(),
            })?
            .iter()
            .map(|row| {
                row.as_array()
                    .map(|vals| {
                        vals.iter()
                            .map(|v| v.as_f64().unwrap_or(0.0) as f32)
                            .collect::<Vec<f32>>()
                    })
                    .ok_or_else(|| RemoteError::ResponseParse {
                        message: "embedding row is not an array".into(),
                    })
            })
            .collect::<RemoteResult<Vec<Vec<f32>>>>()?;

        if vectors.len() != inputs.len() {
            return Err(RemoteError::ResponseParse {
                message: format!("expected {} vectors, got {}", inputs.len(), vectors.len()),
            });
        }
        Ok(vectors)
    }
}

impl TextEmbedder for OllamaEmbeddings {
    fn embed_documents(&self, texts: &[String]) -> RemoteResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let inputs: Vec<String> = texts.iter().map(|t| sanitize_input(t)).collect();
        self.request(&inputs)
    }

    fn embed_query(&self, text: &str) -> RemoteResult<Vec<f32>> {
        let inputs = vec![sanitize_input(text)];
        let mut vectors = self.request(&inputs)?;
        vectors.pop().ok_or_else(|| RemoteError::ResponseParse {
            message: "empty embeddings response".into(),
        })
    }
}
