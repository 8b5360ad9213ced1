//! Application state for the web layer.

use crate::realtime::RealtimeClient;
use crate::service::TimingService;

/// Shared application state.
///
/// Generic over the visit source so handlers can run against an in-memory
/// feed in tests.
pub struct AppState<S = RealtimeClient> {
    /// Timing pipeline (resolvers, caches, fetcher, matcher)
    pub service: TimingService<S>,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
        }
    }
}

impl<S> AppState<S> {
    pub fn new(service: TimingService<S>) -> Self {
        Self { service }
    }
}
