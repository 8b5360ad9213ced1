//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::service::{HealthReport, TimingQuery};

/// Query string of the line lookup endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct LineParams {
    /// Operator override (defaults to RATP or SNCF)
    pub operator: Option<String>,
}

/// Query string of the timings endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct TimingParams {
    /// `A` (Aller) or `R` (Retour)
    pub direction: Option<String>,

    /// Arrival platform name
    pub platform: Option<String>,

    /// Operator override
    pub operator: Option<String>,
}

impl TimingParams {
    /// Combine with the path segments into a service query.
    pub fn into_query(self, mode: String, line: String, stop: String) -> TimingQuery {
        TimingQuery {
            mode,
            line,
            stop,
            direction: self.direction,
            platform: self.platform,
            operator: self.operator,
        }
    }
}

/// A resolved line.
#[derive(Debug, Serialize)]
pub struct LineResponse {
    /// Canonical line id (e.g. "C01371")
    pub id: String,
}

/// Health check body.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,

    #[serde(flatten)]
    pub report: HealthReport,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}
