//! LLM capability
//!
//! The evaluation core only needs "rendered prompt in, completion text out".
//! [`LlmProvider`] is the seam to the remote model; [`LlmGateway`] binds a
//! provider to a model id and bounds every call with a timeout.

pub mod openai;
pub mod traits;

pub use openai::OpenAIClient;
pub use traits::{CompletionRequest, CompletionResponse, LlmProvider};

use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors from calling the LLM. All of them are fatal for the request.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("LLM timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("LLM returned no completion")]
    EmptyCompletion,

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type LlmResult<T> = Result<T, LlmError>;

/// Provider bound to a model, with a per-call timeout
#[derive(Clone)]
pub struct LlmGateway {
    provider: Arc<dyn LlmProvider>,
    model: String,
    timeout: Duration,
    temperature: Option<f32>,
}

impl LlmGateway {
    /// Gateway using the provider's default model
    pub fn new(provider: Arc<dyn LlmProvider>, timeout: Duration) -> Self {
        let model = provider.default_model().to_string();
        Self {
            provider,
            model,
            timeout,
            temperature: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Send one rendered prompt and return the completion text
    ///
    /// No retries. Exceeding the timeout yields [`LlmError::Timeout`].
    pub async fn invoke(&self, prompt: String) -> LlmResult<String> {
        let mut request = CompletionRequest::new(prompt).with_model(self.model.clone());
        if let Some(temperature) = self.temperature {
            request = request.with_temperature(temperature);
        }

        let start = Instant::now();
        match tokio::time::timeout(self.timeout, self.provider.complete(&request)).await {
            Ok(Ok(response)) => {
                debug!(
                    provider = self.provider.name(),
                    model = %response.model,
                    latency_ms = start.elapsed().as_millis() as u64,
                    completion_chars = response.content.chars().count(),
                    input_tokens = ?response.input_tokens,
                    output_tokens = ?response.output_tokens,
                    "LLM completion received"
                );
                Ok(response.content)
            }
            Ok(Err(e)) => Err(e),
            Err(_) => {
                let timeout_ms = self.timeout.as_millis() as u64;
                warn!(
                    provider = self.provider.name(),
                    model = %self.model,
                    timeout_ms,
                    "LLM call timed out"
                );
                Err(LlmError::Timeout { timeout_ms })
            }
        }
    }
}
