//! Matching real-time visits back to a timing query.
//!
//! The feed returns every vehicle calling at the monitored stops, across
//! lines and directions, and sometimes reports them against a different quay
//! than the one asked for. The matcher filters those records down to the
//! caller's query and renders the time remaining before departure.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::domain::{Direction, LineId, StopId, numeric_id};
use crate::realtime::RealtimeVisit;
use crate::resolve::{StopCache, StopCacheKey};

/// Rendered time for a vehicle already at the platform.
pub const AT_PLATFORM: &str = "onStop";

/// One upcoming departure, as returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimingResult {
    pub dest: String,
    /// `"<N> mn"` or [`AT_PLATFORM`].
    pub time: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
}

type DirectionRule = fn(&RealtimeVisit) -> Option<Direction>;

/// Direction derivation, highest priority first.
const DIRECTION_RULES: [DirectionRule; 3] = [
    literal_direction_ref,
    suffixed_direction_ref,
    first_direction_name,
];

fn literal_direction_ref(visit: &RealtimeVisit) -> Option<Direction> {
    Direction::from_label(&visit.direction_ref)
}

fn suffixed_direction_ref(visit: &RealtimeVisit) -> Option<Direction> {
    if visit.direction_ref.ends_with(":A") {
        Some(Direction::Outbound)
    } else if visit.direction_ref.ends_with(":R") {
        Some(Direction::Inbound)
    } else {
        None
    }
}

fn first_direction_name(visit: &RealtimeVisit) -> Option<Direction> {
    visit
        .direction_names
        .first()
        .and_then(|name| Direction::from_label(name))
}

/// Canonical direction of a visit, if any rule can tell.
pub fn normalize_direction(visit: &RealtimeVisit) -> Option<Direction> {
    DIRECTION_RULES.iter().find_map(|rule| rule(visit))
}

/// Time left before departure, in whole minutes clamped at zero.
pub fn remaining_time(visit: &RealtimeVisit, now: DateTime<Utc>) -> String {
    if visit.vehicle_at_stop {
        return AT_PLATFORM.to_string();
    }

    let minutes = visit
        .expected_departure
        .map(|expected| (expected - now).num_seconds().div_euclid(60))
        .unwrap_or(0)
        .max(0);

    format!("{minutes} mn")
}

/// A visit that passed every filter, with the requested stop it matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedVisit {
    pub stop: StopId,
    pub result: TimingResult,
}

/// Filter `visits` against the query and render results.
///
/// Iterates requested stops in order and, for each, the visits in feed
/// order. With a single requested stop the monitoring ref is not compared:
/// the feed sometimes answers a point query with a sibling quay's id.
pub fn match_visits(
    visits: &[RealtimeVisit],
    line: &LineId,
    stop_ids: &[StopId],
    direction: Option<Direction>,
    platform: Option<&str>,
    now: DateTime<Utc>,
) -> Vec<MatchedVisit> {
    let line_ref = line.line_ref();
    let check_stop_id = stop_ids.len() > 1;
    let mut matched = Vec::new();

    for requested in stop_ids {
        for visit in visits {
            if visit.line_ref != line_ref {
                continue;
            }

            if platform.is_some_and(|p| visit.platform.as_deref() != Some(p)) {
                continue;
            }

            // Undeterminable directions never satisfy a direction filter
            if direction.is_some_and(|d| normalize_direction(visit) != Some(d)) {
                continue;
            }

            if check_stop_id && numeric_id(&visit.monitoring_ref) != requested.id() {
                continue;
            }

            matched.push(MatchedVisit {
                stop: requested.clone(),
                result: TimingResult {
                    dest: visit.destination_names.first().cloned().unwrap_or_default(),
                    time: remaining_time(visit, now),
                    status: visit.status.clone(),
                    platform: visit.platform.clone(),
                },
            });
        }
    }

    matched
}

/// Matches visits and remembers which stop served directional queries.
#[derive(Clone)]
pub struct ResultMatcher {
    cache: StopCache,
}

impl ResultMatcher {
    pub fn new(cache: StopCache) -> Self {
        Self { cache }
    }

    pub async fn match_results(
        &self,
        visits: &[RealtimeVisit],
        line: &LineId,
        stop_ids: &[StopId],
        stop_name: &str,
        direction: Option<Direction>,
        platform: Option<&str>,
    ) -> Vec<TimingResult> {
        self.match_results_at(visits, line, stop_ids, stop_name, direction, platform, Utc::now())
            .await
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn match_results_at(
        &self,
        visits: &[RealtimeVisit],
        line: &LineId,
        stop_ids: &[StopId],
        stop_name: &str,
        direction: Option<Direction>,
        platform: Option<&str>,
        now: DateTime<Utc>,
    ) -> Vec<TimingResult> {
        let matched = match_visits(visits, line, stop_ids, direction, platform, now);

        // Later matches overwrite earlier ones, so the last stop wins
        let constrained = direction.is_some() || platform.is_some();
        if let Some(last) = matched.last().filter(|_| constrained) {
            let key = StopCacheKey {
                line: line.clone(),
                stop_name: stop_name.to_string(),
                direction,
                platform: platform.map(str::to_string),
            };
            debug!(%line, stop_name, stop = %last.stop, "directional stop cached");
            self.cache.insert(key, last.stop.clone()).await;
        }

        debug!(%line, stop_name, visits = visits.len(), matched = matched.len(), "visits matched");
        matched.into_iter().map(|m| m.result).collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;
    use crate::domain::StopKind;
    use crate::resolve::{CacheConfig, ResolutionCache};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap()
    }

    fn visit(monitoring_ref: &str) -> RealtimeVisit {
        RealtimeVisit {
            line_ref: "STIF:Line::C01371:".into(),
            destination_names: vec!["La Défense".into()],
            monitoring_ref: monitoring_ref.into(),
            expected_departure: Some(now() + Duration::minutes(5)),
            status: "onTime".into(),
            ..Default::default()
        }
    }

    fn line() -> LineId {
        LineId::new("C01371")
    }

    fn point(id: &str) -> StopId {
        StopId::new(id, StopKind::Point)
    }

    #[test]
    fn remaining_time_floors_minutes() {
        let mut v = visit("STIF:StopPoint:Q:22092:");
        v.expected_departure = Some(now() + Duration::milliseconds(3 * 60_000 + 42_000));
        assert_eq!(remaining_time(&v, now()), "3 mn");
    }

    #[test]
    fn remaining_time_clamps_past() {
        let mut v = visit("STIF:StopPoint:Q:22092:");
        v.expected_departure = Some(now() - Duration::minutes(2));
        assert_eq!(remaining_time(&v, now()), "0 mn");

        v.expected_departure = Some(now() - Duration::seconds(10));
        assert_eq!(remaining_time(&v, now()), "0 mn");
    }

    #[test]
    fn remaining_time_without_timestamp() {
        let mut v = visit("STIF:StopPoint:Q:22092:");
        v.expected_departure = None;
        assert_eq!(remaining_time(&v, now()), "0 mn");
    }

    #[test]
    fn vehicle_at_stop_ignores_timestamp() {
        let mut v = visit("STIF:StopPoint:Q:22092:");
        v.vehicle_at_stop = true;
        v.expected_departure = Some(now() + Duration::minutes(7));
        assert_eq!(remaining_time(&v, now()), AT_PLATFORM);
    }

    #[test]
    fn direction_rules_in_order() {
        let mut v = visit("x");

        v.direction_ref = "Aller".into();
        assert_eq!(normalize_direction(&v), Some(Direction::Outbound));

        v.direction_ref = "RATP:Direction::C01371:R".into();
        assert_eq!(normalize_direction(&v), Some(Direction::Inbound));

        v.direction_ref = String::new();
        v.direction_names = vec!["Retour".into()];
        assert_eq!(normalize_direction(&v), Some(Direction::Inbound));

        // Literal ref wins over the localized name
        v.direction_ref = "Aller".into();
        assert_eq!(normalize_direction(&v), Some(Direction::Outbound));

        v.direction_ref = "unknown".into();
        v.direction_names = vec!["La Défense".into(), "Retour".into()];
        assert_eq!(normalize_direction(&v), None);
    }

    #[test]
    fn filters_other_lines() {
        let mut other = visit("STIF:StopPoint:Q:22092:");
        other.line_ref = "STIF:Line::C01375:".into();

        let matched = match_visits(&[other], &line(), &[point("22092")], None, None, now());
        assert!(matched.is_empty());
    }

    #[test]
    fn platform_filter() {
        let mut one = visit("STIF:StopPoint:Q:22092:");
        one.platform = Some("1".into());
        let mut two = visit("STIF:StopPoint:Q:22092:");
        two.platform = Some("2".into());
        let none = visit("STIF:StopPoint:Q:22092:");
        let visits = [one, two, none];

        let matched = match_visits(&visits, &line(), &[point("22092")], None, Some("2"), now());
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].result.platform.as_deref(), Some("2"));

        let matched = match_visits(&visits, &line(), &[point("22092")], None, None, now());
        assert_eq!(matched.len(), 3);
    }

    #[test]
    fn direction_filter_excludes_undeterminable() {
        let mut aller = visit("STIF:StopPoint:Q:22092:");
        aller.direction_ref = "Aller".into();
        let unknown = visit("STIF:StopPoint:Q:22092:");
        let visits = [aller, unknown];

        let matched = match_visits(
            &visits,
            &line(),
            &[point("22092")],
            Some(Direction::Outbound),
            None,
            now(),
        );
        assert_eq!(matched.len(), 1);

        let matched = match_visits(
            &visits,
            &line(),
            &[point("22092")],
            Some(Direction::Inbound),
            None,
            now(),
        );
        assert!(matched.is_empty());

        let matched = match_visits(&visits, &line(), &[point("22092")], None, None, now());
        assert_eq!(matched.len(), 2);
    }

    #[test]
    fn single_stop_accepts_mismatched_monitoring_ref() {
        let v = visit("STIF:StopPoint:Q:99999:");
        let matched = match_visits(&[v], &line(), &[point("22092")], None, None, now());
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].stop, point("22092"));
    }

    #[test]
    fn multi_stop_requires_matching_monitoring_ref() {
        let stops = [point("22092"), StopId::new("43238", StopKind::Area)];

        let stray = visit("STIF:StopPoint:Q:99999:");
        assert!(match_visits(&[stray], &line(), &stops, None, None, now()).is_empty());

        let area = visit("STIF:StopArea:SP:43238:");
        let matched = match_visits(&[area], &line(), &stops, None, None, now());
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].stop, stops[1]);
    }

    #[test]
    fn result_fields() {
        let mut v = visit("STIF:StopPoint:Q:22092:");
        v.platform = Some("A".into());
        v.status = "delayed".into();

        let matched = match_visits(&[v], &line(), &[point("22092")], None, None, now());
        assert_eq!(
            matched[0].result,
            TimingResult {
                dest: "La Défense".into(),
                time: "5 mn".into(),
                status: "delayed".into(),
                platform: Some("A".into()),
            }
        );
    }

    #[test]
    fn missing_destination_is_empty() {
        let mut v = visit("STIF:StopPoint:Q:22092:");
        v.destination_names.clear();

        let matched = match_visits(&[v], &line(), &[point("22092")], None, None, now());
        assert_eq!(matched[0].result.dest, "");
    }

    #[test]
    fn departure_time_falls_back_through_feed_timestamps() {
        fn call(times: &str) -> String {
            format!(
                r#"{{
                    "MonitoringRef": {{ "value": "STIF:StopPoint:Q:22092:" }},
                    "MonitoredVehicleJourney": {{
                        "LineRef": {{ "value": "STIF:Line::C01371:" }},
                        "MonitoredCall": {{ {times} }}
                    }}
                }}"#
            )
        }

        let body = format!(
            r#"{{ "Siri": {{ "ServiceDelivery": {{ "StopMonitoringDelivery": [
                {{ "MonitoredStopVisit": [{}, {}, {}, {}] }}
            ] }} }} }}"#,
            call(
                r#""ExpectedDepartureTime": "2024-03-15T10:03:10Z",
                   "ExpectedArrivalTime": "2024-03-15T10:02:00Z",
                   "AimedDepartureTime": "2024-03-15T10:01:00Z""#
            ),
            call(
                r#""ExpectedArrivalTime": "2024-03-15T10:05:30Z",
                   "AimedDepartureTime": "2024-03-15T10:04:00Z""#
            ),
            call(r#""AimedDepartureTime": "2024-03-15T10:07:59Z""#),
            call(r#""AimedArrivalTime": "2024-03-15T10:09:00Z""#),
        );

        let visits = crate::realtime::parse_stop_monitoring(&body).unwrap();
        let times: Vec<String> =
            match_visits(&visits, &line(), &[point("22092")], None, None, now())
                .into_iter()
                .map(|m| m.result.time)
                .collect();
        assert_eq!(times, ["3 mn", "5 mn", "7 mn", "0 mn"]);
    }

    #[test]
    fn serializes_without_missing_platform() {
        let result = TimingResult {
            dest: "Nation".into(),
            time: "2 mn".into(),
            status: "onTime".into(),
            platform: None,
        };
        assert_eq!(
            serde_json::to_string(&result).unwrap(),
            r#"{"dest":"Nation","time":"2 mn","status":"onTime"}"#
        );
    }

    #[tokio::test]
    async fn directional_match_backfills_cache() {
        let cache: StopCache = ResolutionCache::new(&CacheConfig::stops());
        let matcher = ResultMatcher::new(cache.clone());

        let mut v = visit("STIF:StopPoint:Q:22092:");
        v.direction_ref = "Retour".into();
        let stops = [point("22092"), StopId::new("43238", StopKind::Area)];

        let results = matcher
            .match_results_at(
                &[v],
                &line(),
                &stops,
                "Bastille",
                Some(Direction::Inbound),
                None,
                now(),
            )
            .await;
        assert_eq!(results.len(), 1);

        let key = StopCacheKey {
            line: line(),
            stop_name: "Bastille".into(),
            direction: Some(Direction::Inbound),
            platform: None,
        };
        assert_eq!(cache.get(&key).await, Some(point("22092")));
    }

    #[tokio::test]
    async fn unconstrained_match_does_not_backfill() {
        let cache: StopCache = ResolutionCache::new(&CacheConfig::stops());
        let matcher = ResultMatcher::new(cache.clone());

        let results = matcher
            .match_results_at(
                &[visit("STIF:StopPoint:Q:22092:")],
                &line(),
                &[point("22092")],
                "Bastille",
                None,
                None,
                now(),
            )
            .await;
        assert_eq!(results.len(), 1);

        cache.run_pending_tasks().await;
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn no_match_does_not_backfill() {
        let cache: StopCache = ResolutionCache::new(&CacheConfig::stops());
        let matcher = ResultMatcher::new(cache.clone());

        let results = matcher
            .match_results_at(
                &[visit("STIF:StopPoint:Q:22092:")],
                &line(),
                &[point("22092")],
                "Bastille",
                None,
                Some("9"),
                now(),
            )
            .await;
        assert!(results.is_empty());

        cache.run_pending_tasks().await;
        assert!(cache.is_empty());
    }
}
