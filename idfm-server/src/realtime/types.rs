//! SIRI StopMonitoring response DTOs.
//!
//! These types map the JSON flavour of SIRI served by the PRIM
//! stop-monitoring endpoint. Fields are defaulted liberally because the feed
//! omits rather than nulls them.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Top-level response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct StopMonitoringResponse {
    #[serde(rename = "Siri")]
    pub siri: Siri,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Siri {
    pub service_delivery: ServiceDelivery,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ServiceDelivery {
    pub response_timestamp: Option<DateTime<Utc>>,
    pub producer_ref: Option<String>,
    pub stop_monitoring_delivery: Vec<StopMonitoringDelivery>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct StopMonitoringDelivery {
    pub response_timestamp: Option<DateTime<Utc>>,
    pub version: Option<String>,
    pub status: Option<String>,
    pub monitored_stop_visit: Vec<MonitoredStopVisit>,
}

/// One vehicle expected at the monitored stop.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct MonitoredStopVisit {
    pub recorded_at_time: Option<DateTime<Utc>>,
    pub item_identifier: Option<String>,
    /// Stop the visit is reported against (`STIF:StopPoint:Q:22092:`).
    pub monitoring_ref: ValueWrapper,
    pub monitored_vehicle_journey: MonitoredVehicleJourney,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct MonitoredVehicleJourney {
    /// `STIF:Line::C01371:`
    pub line_ref: ValueWrapper,
    /// `Aller`, `Retour`, or a prefixed id ending in `:A`/`:R`; often empty.
    pub direction_ref: ValueWrapper,
    pub direction_name: Vec<ValueWrapper>,
    pub destination_ref: ValueWrapper,
    pub destination_name: Vec<ValueWrapper>,
    pub journey_note: Vec<ValueWrapper>,
    pub monitored_call: MonitoredCall,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct MonitoredCall {
    pub stop_point_name: Vec<ValueWrapper>,
    pub vehicle_at_stop: bool,
    pub destination_display: Vec<ValueWrapper>,
    pub expected_arrival_time: Option<DateTime<Utc>>,
    pub expected_departure_time: Option<DateTime<Utc>>,
    pub aimed_arrival_time: Option<DateTime<Utc>>,
    pub aimed_departure_time: Option<DateTime<Utc>>,
    /// `onTime`, `delayed`, `cancelled`, ...
    pub departure_status: Option<String>,
    pub arrival_status: Option<String>,
    pub arrival_platform_name: ValueWrapper,
}

/// SIRI wraps most scalars as `{ "value": ... }`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ValueWrapper {
    #[serde(default)]
    pub value: String,
}
