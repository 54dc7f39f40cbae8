//! Generation client for the Ollama `/api/generate` endpoint.
//!
//! One blocking call per question, no retries. Sampling temperature is
//! pinned near zero so answers stay anchored to the supplied context.

use serde_json::json;
use tracing::debug;

use crate::config::RemoteEndpoint;
use crate::error::{RemoteError, RemoteResult};

/// The generation seam the pipeline is built against.
pub trait TextGenerator: Send + Sync {
    /// Generate a completion for a fully assembled prompt.
    fn generate(&self, prompt: &str) -> RemoteResult<String>;
}

/// Client for the Ollama completion API.
pub struct OllamaGenerator {
    base_url: String,
    model: String,
    temperature: f32,
    agent: ureq::Agent,
}

impl OllamaGenerator {
    pub fn new(endpoint: &RemoteEndpoint, temperature: f32) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(std::time::Duration::from_secs(endpoint.timeout_secs))
            .build();
        Self {
            base_url: endpoint.base_url.trim_end_matches('/').to_string(),
            model: endpoint.model.clone(),
            temperature,
            agent,
        }
    }
}

impl TextGenerator for OllamaGenerator {
    fn generate(&self, prompt: &str) -> RemoteResult<String> {
        let url = format!("{}/api/generate", self.base_url);
        let body = json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false,
            "options": { "temperature": self.temperature },
        });
        let body_str = serde_json::to_string(&body).map_err(|e| RemoteError::GenerationFailed {
            message: format!("JSON serialize error: {e}"),
        })?;

        debug!(url = %url, prompt_chars = prompt.len(), "requesting completion");

        let resp = match self
            .agent
            .post(&url)
            .set("Content-Type", "application/json")
            .send_string(&body_str)
        {
            Ok(resp) => resp,
            Err(ureq::Error::Status(code, resp)) => {
                let detail = resp.into_string().unwrap_or_default();
                return Err(RemoteError::GenerationFailed {
                    message: format!("status {code}: {detail}"),
                });
            }
            Err(e) => {
                return Err(RemoteError::GenerationFailed {
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

        parsed["response"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| RemoteError::ResponseParse {
                message: "missing 'response' field".into(),
            })
    }
}
