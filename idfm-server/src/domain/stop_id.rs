//! Typed stop identifiers.

use std::fmt;

/// Marker found in raw reference ids of stops that must be queried as a
/// whole stop area rather than as an individual quay.
const AREA_MARKER: &str = "monomodalStopPlace";

/// How a stop is addressed in the real-time feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StopKind {
    /// An individual platform/quay (`STIF:StopPoint:Q:<id>:`).
    Point,
    /// An aggregated station (`STIF:StopArea:SP:<id>:`).
    Area,
}

/// A resolved stop: numeric id plus the way it must be queried.
///
/// The kind is fixed when the id is built from the raw reference identifier.
///
/// # Examples
///
/// ```
/// use idfm_server::domain::{StopId, StopKind};
///
/// let area = StopId::from_raw("IDFM:monomodalStopPlace:43238");
/// assert_eq!(area.id(), "43238");
/// assert_eq!(area.kind(), StopKind::Area);
///
/// let point = StopId::from_raw("IDFM:22092");
/// assert_eq!(point.kind(), StopKind::Point);
/// assert_eq!(point.monitoring_ref(), "STIF:StopPoint:Q:22092:");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StopId {
    id: String,
    kind: StopKind,
}

impl StopId {
    /// Build a stop id from a raw reference identifier such as
    /// `IDFM:monomodalStopPlace:43238` or `IDFM:22092`.
    pub fn from_raw(raw: &str) -> Self {
        let kind = if raw.contains(AREA_MARKER) {
            StopKind::Area
        } else {
            StopKind::Point
        };
        Self {
            id: numeric_id(raw),
            kind,
        }
    }

    /// Build a stop id from its parts.
    pub fn new(id: impl Into<String>, kind: StopKind) -> Self {
        Self {
            id: id.into(),
            kind,
        }
    }

    /// The numeric part of the identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> StopKind {
        self.kind
    }

    /// The `MonitoringRef` to send to the stop-monitoring endpoint.
    pub fn monitoring_ref(&self) -> String {
        match self.kind {
            StopKind::Area => format!("STIF:StopArea:SP:{}:", self.id),
            StopKind::Point => format!("STIF:StopPoint:Q:{}:", self.id),
        }
    }
}

impl fmt::Display for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            StopKind::Area => write!(f, "area {}", self.id),
            StopKind::Point => write!(f, "point {}", self.id),
        }
    }
}

/// Keep only the ASCII digits of a raw identifier.
pub fn numeric_id(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn area_marker_gives_area_kind() {
        let stop = StopId::from_raw("IDFM:monomodalStopPlace:43238");
        assert_eq!(stop.kind(), StopKind::Area);
        assert_eq!(stop.id(), "43238");
    }

    #[test]
    fn no_marker_gives_point_kind() {
        let stop = StopId::from_raw("IDFM:463158");
        assert_eq!(stop.kind(), StopKind::Point);
        assert_eq!(stop.id(), "463158");
    }

    #[test]
    fn monitoring_refs() {
        assert_eq!(
            StopId::new("43238", StopKind::Area).monitoring_ref(),
            "STIF:StopArea:SP:43238:"
        );
        assert_eq!(
            StopId::new("22092", StopKind::Point).monitoring_ref(),
            "STIF:StopPoint:Q:22092:"
        );
    }

    #[test]
    fn numeric_id_strips_everything_but_digits() {
        assert_eq!(numeric_id("STIF:StopPoint:Q:22092:"), "22092");
        assert_eq!(numeric_id("no digits"), "");
        assert_eq!(numeric_id("12ab34"), "1234");
    }

    #[test]
    fn display() {
        assert_eq!(StopId::new("1", StopKind::Area).to_string(), "area 1");
        assert_eq!(StopId::new("2", StopKind::Point).to_string(), "point 2");
    }
}
