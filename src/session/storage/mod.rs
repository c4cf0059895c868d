//! Durable persistence for the active session and the history archive.

pub mod durable_store;
pub mod memory_store;
pub mod persist_worker;
pub mod sqlite_store;

pub use durable_store::{DurableStore, StoreFuture, load_or_default};
pub use memory_store::InMemoryStore;
pub use persist_worker::PersistWorker;
pub use sqlite_store::SqliteKvStore;
