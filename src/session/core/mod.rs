//! Core session types, identifiers, configuration and errors.

pub mod config;
pub mod errors;
pub mod ids;
pub mod message;

pub use config::{
    AssistantConfig, GenerationConfig, ResponderConfig, ServerConfig, StorageConfig, TimerConfig,
    TimerMode,
};
pub use errors::{SessionError, SessionResult};
pub use ids::{CallId, SessionId};
pub use message::{Message, Role, Session};
