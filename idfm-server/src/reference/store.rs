//! Reference snapshot store.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use super::client::ReferenceClient;
use super::error::ReferenceError;
use super::table::{LineReference, StopReference};

/// How often to refresh the reference tables (3 hours).
pub const REFERENCE_REFRESH_INTERVAL: Duration = Duration::from_secs(3 * 60 * 60);

/// An immutable, fully built copy of both reference tables.
#[derive(Debug, Default)]
pub struct ReferenceSnapshot {
    pub lines: Vec<LineReference>,
    pub stops: Vec<StopReference>,
    /// When the tables were fetched; `None` for the initial empty snapshot.
    pub updated_at: Option<DateTime<Utc>>,
}

impl ReferenceSnapshot {
    pub fn new(lines: Vec<LineReference>, stops: Vec<StopReference>) -> Self {
        Self {
            lines,
            stops,
            updated_at: Some(Utc::now()),
        }
    }
}

/// Row counts of the current snapshot (for monitoring).
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotStats {
    pub lines: usize,
    pub stops: usize,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Thread-safe holder of the current reference snapshot.
///
/// Readers grab the current `Arc<ReferenceSnapshot>` and scan it without
/// holding the lock; a refresh builds a complete new snapshot and swaps the
/// pointer, so a reader sees either the old or the new tables, never a mix.
#[derive(Clone)]
pub struct ReferenceStore {
    current: Arc<RwLock<Arc<ReferenceSnapshot>>>,
    client: ReferenceClient,
    scans: Arc<AtomicU64>,
}

impl ReferenceStore {
    /// Create an empty store. Call [`ReferenceStore::load`] to populate it.
    pub fn new(client: ReferenceClient) -> Self {
        Self::from_snapshot(client, ReferenceSnapshot::default())
    }

    /// Create a store serving the given snapshot.
    pub fn from_snapshot(client: ReferenceClient, snapshot: ReferenceSnapshot) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(snapshot))),
            client,
            scans: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Fetch both tables and replace the snapshot.
    ///
    /// On failure the previous snapshot keeps being served and the error is
    /// returned to the caller.
    pub async fn load(&self) -> Result<SnapshotStats, ReferenceError> {
        let started = std::time::Instant::now();
        let (lines, stops) =
            futures::try_join!(self.client.fetch_lines(), self.client.fetch_stops())?;

        self.replace(ReferenceSnapshot::new(lines, stops)).await;

        let stats = self.stats().await;
        info!(
            lines = stats.lines,
            stops = stats.stops,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "reference tables loaded"
        );
        Ok(stats)
    }

    /// Swap in a fully built snapshot.
    pub async fn replace(&self, snapshot: ReferenceSnapshot) {
        let snapshot = Arc::new(snapshot);
        let mut guard = self.current.write().await;
        *guard = snapshot;
    }

    /// The snapshot currently being served.
    pub async fn snapshot(&self) -> Arc<ReferenceSnapshot> {
        let guard = self.current.read().await;
        Arc::clone(&*guard)
    }

    /// All line rows matching `predicate`.
    pub async fn find_lines<F>(&self, predicate: F) -> Vec<LineReference>
    where
        F: Fn(&LineReference) -> bool,
    {
        let snapshot = self.snapshot().await;
        self.scans.fetch_add(1, Ordering::Relaxed);
        snapshot
            .lines
            .iter()
            .filter(|row| predicate(row))
            .cloned()
            .collect()
    }

    /// All stop rows matching `predicate`.
    pub async fn find_stops<F>(&self, predicate: F) -> Vec<StopReference>
    where
        F: Fn(&StopReference) -> bool,
    {
        let snapshot = self.snapshot().await;
        self.scans.fetch_add(1, Ordering::Relaxed);
        snapshot
            .stops
            .iter()
            .filter(|row| predicate(row))
            .cloned()
            .collect()
    }

    /// Number of table scans served since creation.
    pub fn scan_count(&self) -> u64 {
        self.scans.load(Ordering::Relaxed)
    }

    pub async fn stats(&self) -> SnapshotStats {
        let snapshot = self.snapshot().await;
        SnapshotStats {
            lines: snapshot.lines.len(),
            stops: snapshot.stops.len(),
            updated_at: snapshot.updated_at,
        }
    }

    /// Spawn the periodic refresh task.
    ///
    /// The next tick is only awaited once the previous refresh has finished,
    /// so refreshes never overlap. Failures are logged and the stale
    /// snapshot is kept until the next tick.
    pub fn spawn_refresh(&self, period: Duration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval.tick().await; // First tick is immediate, skip it
            loop {
                interval.tick().await;
                info!("starting periodic reference refresh");
                if let Err(e) = store.load().await {
                    warn!(error = %e, "reference refresh failed, keeping previous snapshot");
                }
            }
        })
    }
}
