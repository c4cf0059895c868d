//! Transport to the remote text-generation endpoint.
//!
//! The endpoint follows the Hugging Face inference API shape:
//! - request: `{"inputs": "...", "parameters": {"max_new_tokens": n, "return_full_text": false}}`
//! - response: `[{"generated_text": "..."}]`
//!
//! The backend returns the raw JSON body; interpreting it is left to the caller.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use crate::llm::error::{GenerationError, GenerationResult};
use crate::session::core::config::GenerationConfig;
use crate::session::core::errors::SessionResult;

/// Boxed future type for backend calls.
pub type BackendFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Output-length parameters of a generation request.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct InferenceParameters {
    /// Upper bound on generated tokens.
    pub max_new_tokens: u32,
    /// `false` asks the endpoint not to echo the prompt.
    pub return_full_text: bool,
}

/// One generation request.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct InferenceRequest {
    /// Full prompt text.
    pub inputs: String,
    /// Output parameters.
    pub parameters: InferenceParameters,
}

impl InferenceRequest {
    /// Build a request that only returns newly generated text.
    #[must_use]
    pub fn new(inputs: impl Into<String>, max_new_tokens: u32) -> Self {
        Self {
            inputs: inputs.into(),
            parameters: InferenceParameters {
                max_new_tokens,
                return_full_text: false,
            },
        }
    }
}

/// Request/response transport to a generation service.
pub trait InferenceBackend: Send + Sync {
    /// Send one request and return the decoded JSON body.
    ///
    /// # Errors
    /// Returns an error on transport failure or a non-success status.
    fn infer(&self, request: InferenceRequest)
    -> BackendFuture<'_, GenerationResult<serde_json::Value>>;
}

/// HTTP backend for a Hugging Face style inference endpoint.
pub struct HuggingFaceBackend {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HuggingFaceBackend {
    /// Build the backend from configuration.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &GenerationConfig) -> SessionResult<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

impl InferenceBackend for HuggingFaceBackend {
    fn infer(
        &self,
        request: InferenceRequest,
    ) -> BackendFuture<'_, GenerationResult<serde_json::Value>> {
        Box::pin(async move {
            let mut builder = self.client.post(&self.endpoint).json(&request);
            if let Some(key) = &self.api_key {
                builder = builder.bearer_auth(key);
            }

            let response = builder.send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(GenerationError::HttpStatus(status.as_u16()));
            }

            let bytes = response.bytes().await?;
            let body = serde_json::from_slice::<serde_json::Value>(&bytes).map_err(|err| {
                GenerationError::MalformedResponse(format!("response body is not JSON: {err}"))
            })?;
            debug!(endpoint = %self.endpoint, "Generation endpoint answered");
            Ok(body)
        })
    }
}
