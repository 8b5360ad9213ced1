//! Concurrent fan-out over candidate stops.
//!
//! Each stop is queried on its own task; results flow back through a
//! channel and are merged in arrival order. A stop that fails or times out
//! is logged and skipped so one slow quay never hides the others.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::domain::StopId;

use super::client::DEFAULT_REALTIME_TIMEOUT;
use super::error::RealtimeError;
use super::visit::RealtimeVisit;

/// Source of real-time visits for a single stop.
///
/// Implemented by [`RealtimeClient`](super::RealtimeClient); tests provide
/// in-memory sources.
pub trait VisitSource: Send + Sync + 'static {
    fn stop_visits(
        &self,
        stop: &StopId,
    ) -> impl Future<Output = Result<Vec<RealtimeVisit>, RealtimeError>> + Send;
}

/// Queries several stops concurrently and merges their visits.
pub struct RealtimeFetcher<S> {
    source: Arc<S>,
    call_timeout: Duration,
}

impl<S> Clone for RealtimeFetcher<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            call_timeout: self.call_timeout,
        }
    }
}

impl<S: VisitSource> RealtimeFetcher<S> {
    pub fn new(source: Arc<S>) -> Self {
        Self {
            source,
            call_timeout: DEFAULT_REALTIME_TIMEOUT,
        }
    }

    /// Bound each per-stop call independently of the source's own timeout.
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Fetch visits for every stop.
    ///
    /// Visits arrive in completion order, not input order. Fails only when
    /// every stop failed; an empty stop list yields no visits.
    pub async fn fetch_timings(
        &self,
        stops: &[StopId],
    ) -> Result<Vec<RealtimeVisit>, RealtimeError> {
        if stops.is_empty() {
            return Ok(Vec::new());
        }

        let (tx, mut rx) = mpsc::unbounded_channel();

        for stop in stops {
            let tx = tx.clone();
            let source = Arc::clone(&self.source);
            let stop = stop.clone();
            let call_timeout = self.call_timeout;

            tokio::spawn(async move {
                let outcome = match tokio::time::timeout(call_timeout, source.stop_visits(&stop))
                    .await
                {
                    Ok(result) => result,
                    Err(_) => Err(RealtimeError::Timeout),
                };
                // Receiver only goes away if the caller was cancelled
                let _ = tx.send((stop, outcome));
            });
        }

        // Channel closes once every task has sent or died
        drop(tx);

        let mut visits = Vec::new();
        let mut succeeded = 0usize;
        let mut failures = Vec::new();

        while let Some((stop, outcome)) = rx.recv().await {
            match outcome {
                Ok(found) => {
                    debug!(%stop, count = found.len(), "stop visits fetched");
                    succeeded += 1;
                    visits.extend(found);
                }
                Err(e) => {
                    warn!(%stop, error = %e, "stop visits fetch failed");
                    failures.push(format!("{stop}: {e}"));
                }
            }
        }

        if succeeded == 0 {
            return Err(RealtimeError::AllStopsFailed { failures });
        }

        Ok(visits)
    }
}
