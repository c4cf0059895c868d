//! Key-value persistence contract and the fail-open typed reader.

use std::future::Future;
use std::pin::Pin;

use serde::de::DeserializeOwned;
use tracing::warn;

use crate::session::core::errors::SessionResult;

/// Boxed future type for durable store operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Durable key-value store surviving process restarts.
pub trait DurableStore: Send + Sync {
    /// Persist `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    /// Returns an error if storage access fails.
    fn save<'a>(&'a self, key: &'a str, value: String) -> StoreFuture<'a, SessionResult<()>>;

    /// Read the raw value stored under `key`.
    ///
    /// # Errors
    /// Returns an error if storage access fails.
    fn load<'a>(&'a self, key: &'a str) -> StoreFuture<'a, SessionResult<Option<String>>>;
}

/// Load and decode `key`, falling back to `T::default()`.
///
/// A missing key, a storage failure and an undecodable payload all yield
/// the default. Corruption is logged and otherwise treated as "no prior data".
pub async fn load_or_default<T>(store: &dyn DurableStore, key: &str) -> T
where
    T: DeserializeOwned + Default,
{
    let raw = match store.load(key).await {
        Ok(Some(raw)) => raw,
        Ok(None) => return T::default(),
        Err(err) => {
            warn!(key, %err, "Failed to read persisted state, starting empty");
            return T::default();
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(err) => {
            warn!(key, %err, "Persisted state is corrupt, starting empty");
            T::default()
        }
    }
}
