//! Flattened real-time visit records.

use chrono::{DateTime, Utc};

use super::error::RealtimeError;
use super::types::{MonitoredStopVisit, StopMonitoringResponse};

/// One upcoming vehicle at a stop, as reported by the feed.
///
/// Only the fields the matcher looks at are kept; empty upstream strings
/// stay empty rather than becoming `None`, except for the platform.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RealtimeVisit {
    pub line_ref: String,
    pub direction_ref: String,
    /// Localized direction labels, in feed order.
    pub direction_names: Vec<String>,
    pub destination_names: Vec<String>,
    /// Raw id of the stop the visit is reported against.
    pub monitoring_ref: String,
    pub vehicle_at_stop: bool,
    /// Expected departure, falling back to expected arrival then the
    /// scheduled departure.
    pub expected_departure: Option<DateTime<Utc>>,
    pub status: String,
    pub platform: Option<String>,
}

impl From<MonitoredStopVisit> for RealtimeVisit {
    fn from(visit: MonitoredStopVisit) -> Self {
        let journey = visit.monitored_vehicle_journey;
        let call = journey.monitored_call;
        let platform = Some(call.arrival_platform_name.value).filter(|p| !p.is_empty());

        Self {
            line_ref: journey.line_ref.value,
            direction_ref: journey.direction_ref.value,
            direction_names: journey.direction_name.into_iter().map(|v| v.value).collect(),
            destination_names: journey
                .destination_name
                .into_iter()
                .map(|v| v.value)
                .collect(),
            monitoring_ref: visit.monitoring_ref.value,
            vehicle_at_stop: call.vehicle_at_stop,
            expected_departure: call
                .expected_departure_time
                .or(call.expected_arrival_time)
                .or(call.aimed_departure_time),
            status: call.departure_status.unwrap_or_default(),
            platform,
        }
    }
}

/// Parse a stop-monitoring response body into visits.
///
/// Visits of the first delivery are returned. A response without any
/// delivery section is an upstream shape error, not an empty result.
pub fn parse_stop_monitoring(body: &str) -> Result<Vec<RealtimeVisit>, RealtimeError> {
    let response: StopMonitoringResponse =
        serde_json::from_str(body).map_err(|e| RealtimeError::Json {
            message: e.to_string(),
            body: Some(body.chars().take(500).collect()),
        })?;

    let delivery = response
        .siri
        .service_delivery
        .stop_monitoring_delivery
        .into_iter()
        .next()
        .ok_or(RealtimeError::NoDelivery)?;

    Ok(delivery
        .monitored_stop_visit
        .into_iter()
        .map(RealtimeVisit::from)
        .collect())
}
