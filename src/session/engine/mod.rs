//! Session engine orchestration.

pub mod core;
pub mod snapshot;

pub use self::core::SessionEngine;
pub use snapshot::{EngineSnapshot, SendOutcome};
