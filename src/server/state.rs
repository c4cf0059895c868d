//! Application state shared across all request handlers.

use std::sync::Arc;

use crate::session::SessionEngine;

/// Shared application state.
pub struct AppState {
    /// Session engine driving every route.
    pub engine: SessionEngine,
}

impl AppState {
    /// Wrap an opened engine.
    #[must_use]
    pub fn new(engine: SessionEngine) -> Arc<Self> {
        Arc::new(Self { engine })
    }
}
