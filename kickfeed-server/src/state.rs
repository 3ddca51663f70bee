//! Application state shared across all request handlers.

use kickfeed_core::registry::MatchRegistry;
use std::sync::Arc;

/// Application state that is shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Registry of the matches being polled.
    pub registry: Arc<dyn MatchRegistry>,
}

impl AppState {
    pub fn new(registry: Arc<dyn MatchRegistry>) -> Self {
        Self { registry }
    }
}
