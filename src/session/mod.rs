//! Study-assistant conversation sessions.
//!
//! - `core`: configuration, errors, identifiers and message types
//! - `storage`: durable key/value store and the write-through worker
//! - `timer`: study timer state machine and tick scheduling
//! - `goal`: study goal announcements
//! - `engine`: orchestration of all of the above

pub mod core;
pub mod engine;
pub mod goal;
pub mod storage;
pub mod timer;

pub use self::core::{
    AssistantConfig, CallId, GenerationConfig, Message, ResponderConfig, Role, ServerConfig,
    Session, SessionError, SessionId, SessionResult, StorageConfig, TimerConfig, TimerMode,
};
pub use engine::{EngineSnapshot, SendOutcome, SessionEngine};
pub use goal::{announce_goal, goal_set_text};
pub use storage::{DurableStore, InMemoryStore, PersistWorker, SqliteKvStore, StoreFuture};
pub use timer::{StudyTimer, TimerPhase, TimerState, TimerTransition};
