//! Reply generation for the study assistant.
//!
//! Every call is independent: the prompt is rebuilt from the configured
//! system instruction and the immediate input only. No conversation history
//! is sent upstream.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error, warn};

use crate::llm::error::{GenerationError, GenerationResult};
use crate::llm::inference_backend::{HuggingFaceBackend, InferenceBackend, InferenceRequest};
use crate::llm::video_responder::VideoResponder;
use crate::session::core::config::{AssistantConfig, GenerationConfig, ResponderConfig};
use crate::session::core::errors::SessionResult;

/// Reply used when the endpoint answers with an unexpected shape.
pub const MALFORMED_REPLY: &str = "Sorry, I couldn't understand that.";

/// Reply used when the endpoint cannot be reached.
pub const TRANSPORT_FAILURE_REPLY: &str =
    "Error communicating with the study assistant. Please try again.";

/// Stateless request/response wrapper around the generation endpoint.
pub struct GenerationClient {
    backend: Arc<dyn InferenceBackend>,
    responder: VideoResponder,
    system_prompt: String,
    max_new_tokens: u32,
}

impl GenerationClient {
    /// Build a client over an arbitrary backend.
    ///
    /// # Errors
    /// Returns an error if the trigger phrases cannot be compiled.
    pub fn new(
        llm: &GenerationConfig,
        responder: &ResponderConfig,
        backend: Arc<dyn InferenceBackend>,
    ) -> SessionResult<Self> {
        Ok(Self {
            backend,
            responder: VideoResponder::new(&responder.video_triggers)?,
            system_prompt: llm.system_prompt.clone(),
            max_new_tokens: llm.max_new_tokens,
        })
    }

    /// Build a client talking HTTP to the configured endpoint.
    ///
    /// # Errors
    /// Returns an error if the HTTP client or trigger set cannot be built.
    pub fn from_config(config: &AssistantConfig) -> SessionResult<Self> {
        let backend = Arc::new(HuggingFaceBackend::new(&config.llm)?);
        Self::new(&config.llm, &config.responder, backend)
    }

    /// Prompt sent upstream for `input`.
    #[must_use]
    pub fn compose_prompt(&self, input: &str) -> String {
        format!("{}\n\nUser: {input}", self.system_prompt)
    }

    /// Produce a reply for `input`. Never fails.
    pub async fn reply(&self, input: &str) -> String {
        if let Some(canned) = self.responder.respond(input) {
            debug!("Answered video request locally");
            return canned.to_string();
        }

        match self.generate(input).await {
            Ok(text) => text,
            Err(err) if err.is_transport() => {
                error!(%err, "Error communicating with the generation endpoint");
                TRANSPORT_FAILURE_REPLY.to_string()
            }
            Err(err) => {
                warn!(%err, "Generation endpoint returned an unusable response");
                MALFORMED_REPLY.to_string()
            }
        }
    }

    async fn generate(&self, input: &str) -> GenerationResult<String> {
        let prompt = self.compose_prompt(input);
        let body = self
            .backend
            .infer(InferenceRequest::new(prompt.clone(), self.max_new_tokens))
            .await?;

        let generated = extract_generated_text(&body)?;
        let reply = strip_echo(generated, &prompt, input);
        if reply.is_empty() {
            return Err(GenerationError::MalformedResponse(
                "generated text is empty".to_string(),
            ));
        }
        Ok(reply)
    }
}

/// Pull `generated_text` out of the first record of an array response.
///
/// # Errors
/// Returns `MalformedResponse` for a non-array body, an empty array, or a
/// missing, non-string or blank `generated_text` field.
pub fn extract_generated_text(body: &Value) -> GenerationResult<&str> {
    let records = body
        .as_array()
        .ok_or_else(|| GenerationError::MalformedResponse("payload is not an array".to_string()))?;
    let first = records
        .first()
        .ok_or_else(|| GenerationError::MalformedResponse("payload is empty".to_string()))?;
    let text = first
        .get("generated_text")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            GenerationError::MalformedResponse("missing generated_text field".to_string())
        })?;
    if text.trim().is_empty() {
        return Err(GenerationError::MalformedResponse(
            "generated text is empty".to_string(),
        ));
    }
    Ok(text)
}

/// Remove an echoed prompt or input from generated text, then trim.
fn strip_echo(generated: &str, prompt: &str, input: &str) -> String {
    let text = generated.trim();
    let text = text.replacen(prompt, "", 1);
    let text = if input.trim().is_empty() {
        text
    } else {
        text.replacen(input, "", 1)
    };
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;

    use crate::llm::inference_backend::BackendFuture;

    enum Script {
        Body(Value),
        Status(u16),
    }

    struct ScriptedBackend {
        script: Script,
        calls: AtomicUsize,
        last_request: Mutex<Option<InferenceRequest>>,
    }

    impl ScriptedBackend {
        fn new(script: Script) -> Arc<Self> {
            Arc::new(Self {
                script,
                calls: AtomicUsize::new(0),
                last_request: Mutex::new(None),
            })
        }
    }

    impl InferenceBackend for ScriptedBackend {
        fn infer(&self, request: InferenceRequest) -> BackendFuture<'_, GenerationResult<Value>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_request.lock().unwrap() = Some(request);
            let result = match &self.script {
                Script::Body(body) => Ok(body.clone()),
                Script::Status(code) => Err(GenerationError::HttpStatus(*code)),
            };
            Box::pin(async move { result })
        }
    }

    fn client_with(backend: Arc<ScriptedBackend>) -> GenerationClient {
        let llm = GenerationConfig {
            system_prompt: "You are a tutor.".to_string(),
            max_new_tokens: 99,
            ..GenerationConfig::default()
        };
        GenerationClient::new(&llm, &ResponderConfig::default(), backend).unwrap()
    }

    #[tokio::test]
    async fn video_request_is_answered_without_network() {
        let backend = ScriptedBackend::new(Script::Status(500));
        let client = client_with(backend.clone());

        let reply = client.reply("can you suggest a video").await;

        assert_eq!(reply, crate::llm::video_responder::VIDEO_RECOMMENDATIONS);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn prompt_is_rebuilt_from_instruction_and_input() {
        let backend = ScriptedBackend::new(Script::Body(json!([{ "generated_text": "Mitosis splits cells." }])));
        let client = client_with(backend.clone());

        let reply = client.reply("what is mitosis").await;

        assert_eq!(reply, "Mitosis splits cells.");
        let request = backend.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(request.inputs, "You are a tutor.\n\nUser: what is mitosis");
        assert_eq!(request.parameters.max_new_tokens, 99);
        assert!(!request.parameters.return_full_text);
    }

    #[tokio::test]
    async fn echoed_prompt_is_removed() {
        let echoed = "You are a tutor.\n\nUser: define entropy\n  Entropy measures disorder.  ";
        let backend = ScriptedBackend::new(Script::Body(json!([{ "generated_text": echoed }])));
        let client = client_with(backend);

        assert_eq!(client.reply("define entropy").await, "Entropy measures disorder.");
    }

    #[tokio::test]
    async fn malformed_shapes_yield_fixed_reply() {
        for body in [
            json!({ "generated_text": "not in an array" }),
            json!([]),
            json!([{ "text": "wrong field" }]),
            json!([{ "generated_text": 7 }]),
            json!([{ "generated_text": "   " }]),
            json!([{ "generated_text": "You are a tutor.\n\nUser: hi" }]),
        ] {
            let client = client_with(ScriptedBackend::new(Script::Body(body)));
            assert_eq!(client.reply("hi").await, MALFORMED_REPLY);
        }
    }

    #[tokio::test]
    async fn transport_failure_yields_retry_reply() {
        let client = client_with(ScriptedBackend::new(Script::Status(503)));
        assert_eq!(client.reply("help me study").await, TRANSPORT_FAILURE_REPLY);
    }

    #[test]
    fn extract_reads_first_record() {
        let body = json!([{ "generated_text": "first" }, { "generated_text": "second" }]);
        assert_eq!(extract_generated_text(&body).unwrap(), "first");
    }
}
