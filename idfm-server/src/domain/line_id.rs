//! Canonical line identifier.

use std::fmt;

/// Prefix carried by line ids in the stop reference table (`IDFM:C01371`).
const ROUTE_ID_PREFIX: &str = "IDFM:";

/// A canonical IDFM line id, e.g. `C01371` for metro line 1.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineId(String);

impl LineId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Build a line id from a stop-table `route_id`, dropping the `IDFM:`
    /// prefix when present.
    pub fn from_route_id(route_id: &str) -> Self {
        Self(
            route_id
                .strip_prefix(ROUTE_ID_PREFIX)
                .unwrap_or(route_id)
                .to_string(),
        )
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The `LineRef` value the real-time feed reports for this line.
    pub fn line_ref(&self) -> String {
        format!("STIF:Line::{}:", self.0)
    }
}

impl fmt::Debug for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LineId({})", self.0)
    }
}

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
