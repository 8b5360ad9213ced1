//! The timing request pipeline.
//!
//! Chains line resolution, stop resolution, the real-time fan-out and the
//! matcher. Each stage completes before the next starts.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::domain::{ConfigurationError, Direction, LineId, TransportType};
use crate::matcher::{ResultMatcher, TimingResult};
use crate::realtime::{RealtimeError, RealtimeFetcher, VisitSource};
use crate::reference::{ReferenceStore, SnapshotStats};
use crate::resolve::{CacheStats, LineCache, LineResolver, ResolveError, StopCache, StopResolver};

/// Errors from a timing request.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Realtime(#[from] RealtimeError),
}

/// A next-departures query, in caller vocabulary.
///
/// Empty optional strings are treated as absent.
#[derive(Debug, Clone, Default)]
pub struct TimingQuery {
    /// Transport mode token (`metro`, `bus`, `rail`/`rer`, `tram`)
    pub mode: String,
    /// Line short name as shown to riders (`1`, `A`, `T3a`)
    pub line: String,
    /// Exact stop name
    pub stop: String,
    /// `A` or `R`
    pub direction: Option<String>,
    pub platform: Option<String>,
    /// Operator override (replaces the default RATP/SNCF set)
    pub operator: Option<String>,
}

/// Snapshot and cache counters.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub snapshot: SnapshotStats,
    pub line_cache: CacheStats,
    pub stop_cache: CacheStats,
}

/// Answers timing queries against the reference data and live feed.
pub struct TimingService<S> {
    store: ReferenceStore,
    lines: LineResolver,
    stops: StopResolver,
    fetcher: RealtimeFetcher<S>,
    matcher: ResultMatcher,
}

impl<S> Clone for TimingService<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            lines: self.lines.clone(),
            stops: self.stops.clone(),
            fetcher: self.fetcher.clone(),
            matcher: self.matcher.clone(),
        }
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}

impl<S: VisitSource> TimingService<S> {
    /// Build the pipeline. The stop cache is shared between the stop
    /// resolver, which reads it, and the matcher, which fills it.
    pub fn new(
        store: ReferenceStore,
        source: Arc<S>,
        line_cache: LineCache,
        stop_cache: StopCache,
    ) -> Self {
        Self {
            lines: LineResolver::new(store.clone(), line_cache),
            stops: StopResolver::new(store.clone(), stop_cache.clone()),
            fetcher: RealtimeFetcher::new(source),
            matcher: ResultMatcher::new(stop_cache),
            store,
        }
    }

    /// Resolve a line from its mode token and short name.
    pub async fn line(
        &self,
        mode: &str,
        short_name: &str,
        operator: Option<&str>,
    ) -> Result<LineId, ServiceError> {
        let mode = TransportType::parse(mode)?;
        Ok(self
            .lines
            .resolve_line(mode, short_name, non_empty(operator))
            .await?)
    }

    /// Upcoming departures matching `query`.
    pub async fn timings(&self, query: &TimingQuery) -> Result<Vec<TimingResult>, ServiceError> {
        let direction = Direction::parse_optional(query.direction.as_deref())?;
        let platform = non_empty(query.platform.as_deref());

        let line = self
            .line(&query.mode, &query.line, query.operator.as_deref())
            .await?;

        let stop_ids = self
            .stops
            .resolve_stops(&line, &query.stop, direction, platform)
            .await?;

        let visits = self.fetcher.fetch_timings(&stop_ids).await?;

        let results = self
            .matcher
            .match_results(&visits, &line, &stop_ids, &query.stop, direction, platform)
            .await;

        info!(
            %line,
            stop = %query.stop,
            stops = stop_ids.len(),
            visits = visits.len(),
            results = results.len(),
            "timings served"
        );

        Ok(results)
    }

    pub async fn health(&self) -> HealthReport {
        HealthReport {
            snapshot: self.store.stats().await,
            line_cache: self.lines.cache().stats(),
            stop_cache: self.stops.cache().stats(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::domain::{StopId, StopKind};
    use crate::matcher::AT_PLATFORM;
    use crate::realtime::RealtimeVisit;
    use crate::reference::{
        LineReference, ReferenceClient, ReferenceClientConfig, ReferenceSnapshot, StopReference,
    };
    use crate::resolve::{CacheConfig, ResolutionCache};

    /// Visits keyed by numeric stop id; records every call.
    #[derive(Default)]
    struct RecordingSource {
        visits: HashMap<String, Vec<RealtimeVisit>>,
        calls: AtomicUsize,
    }

    impl VisitSource for RecordingSource {
        async fn stop_visits(&self, stop: &StopId) -> Result<Vec<RealtimeVisit>, RealtimeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.visits
                .get(stop.id())
                .cloned()
                .ok_or_else(|| RealtimeError::Api {
                    status: 404,
                    message: "unknown stop".into(),
                })
        }
    }

    fn snapshot() -> ReferenceSnapshot {
        ReferenceSnapshot::new(
            vec![
                LineReference {
                    id: LineId::new("C01371"),
                    transport_mode: "metro".into(),
                    short_name: "1".into(),
                    operator: "RATP".into(),
                },
                LineReference {
                    id: LineId::new("C01742"),
                    transport_mode: "rail".into(),
                    short_name: "A".into(),
                    operator: "RATP".into(),
                },
            ],
            vec![
                StopReference {
                    stop_id: "IDFM:monomodalStopPlace:43238".into(),
                    stop_name: "Bastille".into(),
                    line_id: LineId::new("C01371"),
                },
                StopReference {
                    stop_id: "IDFM:22092".into(),
                    stop_name: "Bastille".into(),
                    line_id: LineId::new("C01371"),
                },
            ],
        )
    }

    fn service(source: RecordingSource) -> (TimingService<RecordingSource>, Arc<RecordingSource>) {
        let client = ReferenceClient::new(ReferenceClientConfig::default()).unwrap();
        let store = ReferenceStore::from_snapshot(client, snapshot());
        let source = Arc::new(source);
        let service = TimingService::new(
            store,
            Arc::clone(&source),
            ResolutionCache::new(&CacheConfig::lines()),
            ResolutionCache::new(&CacheConfig::stops()),
        );
        (service, source)
    }

    fn bastille_visit(monitoring_ref: &str, at_stop: bool) -> RealtimeVisit {
        RealtimeVisit {
            line_ref: "STIF:Line::C01371:".into(),
            direction_ref: "Retour".into(),
            destination_names: vec!["Château de Vincennes".into()],
            monitoring_ref: monitoring_ref.into(),
            vehicle_at_stop: at_stop,
            status: "onTime".into(),
            ..Default::default()
        }
    }

    fn query(direction: Option<&str>) -> TimingQuery {
        TimingQuery {
            mode: "metro".into(),
            line: "1".into(),
            stop: "Bastille".into(),
            direction: direction.map(str::to_string),
            operator: Some("RATP".into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn bastille_end_to_end() {
        let (service, _) = service(RecordingSource::default());

        let line = service.line("metro", "1", Some("RATP")).await.unwrap();
        assert_eq!(line.as_str(), "C01371");

        let stops = service
            .stops
            .resolve_stops(&line, "Bastille", None, None)
            .await
            .unwrap();
        assert_eq!(
            stops,
            vec![
                StopId::new("43238", StopKind::Area),
                StopId::new("22092", StopKind::Point),
            ]
        );

        let mut visits = HashMap::new();
        visits.insert(
            "22092".to_string(),
            vec![bastille_visit("STIF:StopPoint:Q:22092:", true)],
        );
        let (service, source) = service_with(visits);

        let results = service.timings(&query(None)).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].time, AT_PLATFORM);
        assert_eq!(results[0].dest, "Château de Vincennes");
        // Area stop failed, point stop answered
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    fn service_with(
        visits: HashMap<String, Vec<RealtimeVisit>>,
    ) -> (TimingService<RecordingSource>, Arc<RecordingSource>) {
        service(RecordingSource {
            visits,
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn directional_query_reuses_matched_stop() {
        let mut visits = HashMap::new();
        visits.insert(
            "22092".to_string(),
            vec![bastille_visit("STIF:StopPoint:Q:22092:", false)],
        );
        visits.insert("43238".to_string(), Vec::new());
        let (service, source) = service_with(visits);

        let first = service.timings(&query(Some("R"))).await.unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);

        let scans = service.store.scan_count();
        let second = service.timings(&query(Some("R"))).await.unwrap();
        assert_eq!(second, first);
        // Line and stop both came from cache; only the matched stop was queried
        assert_eq!(service.store.scan_count(), scans);
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn unknown_mode_is_configuration_error() {
        let (service, _) = service(RecordingSource::default());
        let err = service.line("boat", "1", None).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Configuration(ConfigurationError::InvalidTransportType(_))
        ));
    }

    #[tokio::test]
    async fn unknown_direction_is_configuration_error() {
        let (service, source) = service(RecordingSource::default());
        let err = service.timings(&query(Some("X"))).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Configuration(ConfigurationError::InvalidDirection(_))
        ));
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn rer_alias_resolves_rail_line() {
        let (service, _) = service(RecordingSource::default());
        let line = service.line("rer", "A", None).await.unwrap();
        assert_eq!(line.as_str(), "C01742");
    }

    #[tokio::test]
    async fn unknown_stop_is_resolve_error() {
        let (service, source) = service(RecordingSource::default());
        let mut q = query(None);
        q.stop = "Nation".into();

        let err = service.timings(&q).await.unwrap_err();
        match err {
            ServiceError::Resolve(ResolveError::StopNotFound { available, .. }) => {
                assert_eq!(available, vec!["Bastille".to_string()]);
            }
            other => panic!("expected StopNotFound, got {other:?}"),
        }
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn every_stop_failing_escalates() {
        let (service, _) = service(RecordingSource::default());
        let err = service.timings(&query(None)).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Realtime(RealtimeError::AllStopsFailed { .. })
        ));
    }

    #[tokio::test]
    async fn health_reports_counters() {
        let (service, _) = service(RecordingSource::default());
        service.line("metro", "1", None).await.unwrap();
        service.line("metro", "1", None).await.unwrap();

        let health = service.health().await;
        assert_eq!(health.snapshot.lines, 2);
        assert_eq!(health.snapshot.stops, 2);
        assert_eq!(health.line_cache.hits, 1);
        assert_eq!(health.line_cache.misses, 1);
    }
}
