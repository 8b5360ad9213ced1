//! Line resolution: (mode, short name, operator) → canonical line id.

use tracing::debug;

use crate::domain::{LineId, TransportType};
use crate::reference::ReferenceStore;

use super::cache::{LineCache, LineCacheKey};
use super::error::{ResolveError, suggestions};

/// Operators accepted when the caller does not name one.
pub const DEFAULT_OPERATORS: [&str; 2] = ["RATP", "SNCF"];

/// Resolves human line names against the line reference table.
#[derive(Clone)]
pub struct LineResolver {
    store: ReferenceStore,
    cache: LineCache,
}

impl LineResolver {
    pub fn new(store: ReferenceStore, cache: LineCache) -> Self {
        Self { store, cache }
    }

    /// Resolve a line.
    ///
    /// A cache hit never touches the reference store. On a miss, exactly one
    /// row must match the mode, the short name, and the operator (the given
    /// one, or any of [`DEFAULT_OPERATORS`]).
    pub async fn resolve_line(
        &self,
        mode: TransportType,
        short_name: &str,
        operator: Option<&str>,
    ) -> Result<LineId, ResolveError> {
        let key = LineCacheKey {
            mode,
            short_name: short_name.to_string(),
            operator: operator.map(str::to_string),
        };

        if let Some(id) = self.cache.get(&key).await {
            return Ok(id);
        }

        let matches = self
            .store
            .find_lines(|row| {
                row.transport_mode == mode.as_str()
                    && row.short_name == short_name
                    && match operator {
                        Some(op) => row.operator == op,
                        None => DEFAULT_OPERATORS.contains(&row.operator.as_str()),
                    }
            })
            .await;

        match matches.as_slice() {
            [only] => {
                debug!(%mode, short_name, line = %only.id, "line resolved");
                self.cache.insert(key, only.id.clone()).await;
                Ok(only.id.clone())
            }
            [] => {
                let same_mode = self
                    .store
                    .find_lines(|row| row.transport_mode == mode.as_str())
                    .await;
                Err(ResolveError::LineNotFound {
                    mode,
                    short_name: short_name.to_string(),
                    available: suggestions(same_mode.iter().map(|row| row.short_name.as_str())),
                })
            }
            many => Err(ResolveError::LineAmbiguous {
                mode,
                short_name: short_name.to_string(),
                candidates: many.iter().map(|row| row.id.clone()).collect(),
            }),
        }
    }

    pub fn cache(&self) -> &LineCache {
        &self.cache
    }
}
