//! Process-local store, used by tests and ephemeral deployments.

use dashmap::DashMap;

use crate::session::core::errors::SessionResult;
use crate::session::storage::durable_store::{DurableStore, StoreFuture};

/// Thread-safe in-memory implementation of [`DurableStore`].
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: DashMap<String, String>,
}

impl InMemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw value currently stored under `key`.
    #[must_use]
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }
}

impl DurableStore for InMemoryStore {
    fn save<'a>(&'a self, key: &'a str, value: String) -> StoreFuture<'a, SessionResult<()>> {
        Box::pin(async move {
            self.entries.insert(key.to_string(), value);
            Ok(())
        })
    }

    fn load<'a>(&'a self, key: &'a str) -> StoreFuture<'a, SessionResult<Option<String>>> {
        Box::pin(async move { Ok(self.raw(key)) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_replaces_previous_value() {
        let store = InMemoryStore::new();
        store.save("k", "1".to_string()).await.unwrap();
        store.save("k", "2".to_string()).await.unwrap();

        assert_eq!(store.entries.len(), 1);
        assert_eq!(store.load("k").await.unwrap().as_deref(), Some("2"));
        assert_eq!(store.load("other").await.unwrap(), None);
    }
}
