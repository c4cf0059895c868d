//! Generation client: remote text generation plus local canned answers.

pub mod error;
pub mod generation_client;
pub mod inference_backend;
pub mod video_responder;

pub use error::{GenerationError, GenerationResult};
pub use generation_client::{
    GenerationClient, MALFORMED_REPLY, TRANSPORT_FAILURE_REPLY, extract_generated_text,
};
pub use inference_backend::{
    BackendFuture, HuggingFaceBackend, InferenceBackend, InferenceParameters, InferenceRequest,
};
pub use video_responder::{VIDEO_RECOMMENDATIONS, VideoResponder};
