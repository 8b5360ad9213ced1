//! Stop resolution: (line, stop name, direction, platform) → typed stop ids.

use tracing::debug;

use crate::domain::{Direction, LineId, StopId};
use crate::reference::ReferenceStore;

use super::cache::{StopCache, StopCacheKey};
use super::error::{ResolveError, suggestions};

/// Resolves stop names on a line against the stop reference table.
///
/// The stop cache is only read here; it is filled by the result matcher once
/// a directional query has been confirmed against real-time data.
#[derive(Clone)]
pub struct StopResolver {
    store: ReferenceStore,
    cache: StopCache,
}

impl StopResolver {
    pub fn new(store: ReferenceStore, cache: StopCache) -> Self {
        Self { store, cache }
    }

    /// The stop id that previously served this exact directional query.
    pub async fn lookup_cached_directional_stop(
        &self,
        line: &LineId,
        stop_name: &str,
        direction: Option<Direction>,
        platform: Option<&str>,
    ) -> Option<StopId> {
        let key = StopCacheKey {
            line: line.clone(),
            stop_name: stop_name.to_string(),
            direction,
            platform: platform.map(str::to_string),
        };
        self.cache.get(&key).await
    }

    /// Resolve every stop id named `stop_name` on `line`.
    ///
    /// A name usually maps to one stop per direction of travel, so several
    /// ids may come back. A cached directional stop short-circuits the scan.
    pub async fn resolve_stops(
        &self,
        line: &LineId,
        stop_name: &str,
        direction: Option<Direction>,
        platform: Option<&str>,
    ) -> Result<Vec<StopId>, ResolveError> {
        if let Some(cached) = self
            .lookup_cached_directional_stop(line, stop_name, direction, platform)
            .await
        {
            return Ok(vec![cached]);
        }

        let rows = self
            .store
            .find_stops(|row| &row.line_id == line && row.stop_name == stop_name)
            .await;

        let mut ids: Vec<StopId> = Vec::with_capacity(rows.len());
        for row in &rows {
            let id = StopId::from_raw(&row.stop_id);
            if !ids.contains(&id) {
                ids.push(id);
            }
        }

        if ids.is_empty() {
            let on_line = self.store.find_stops(|row| &row.line_id == line).await;
            return Err(ResolveError::StopNotFound {
                line: line.clone(),
                stop_name: stop_name.to_string(),
                available: suggestions(on_line.iter().map(|row| row.stop_name.as_str())),
            });
        }

        debug!(%line, stop_name, count = ids.len(), "stops resolved");
        Ok(ids)
    }

    pub fn cache(&self) -> &StopCache {
        &self.cache
    }
}
