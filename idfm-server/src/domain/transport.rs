//! Transport mode type.

use std::fmt;

use super::error::ConfigurationError;

/// All transport mode tokens accepted at the request boundary.
pub const ALLOWED_TRANSPORT_TYPES: [&str; 4] = ["metro", "bus", "rail", "tram"];

/// A transport mode as understood by the IDFM line reference table.
///
/// The string form is the value found in the `TransportMode` column, which
/// is also the token callers use in request paths.
///
/// # Examples
///
/// ```
/// use idfm_server::domain::TransportType;
///
/// let metro = TransportType::parse("metro").unwrap();
/// assert_eq!(metro.as_str(), "metro");
///
/// // "rer" is an alias for the rail network
/// assert_eq!(TransportType::parse("rer").unwrap(), TransportType::Rail);
///
/// assert!(TransportType::parse("ferry").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportType {
    Bus,
    Metro,
    Rail,
    Tram,
}

impl TransportType {
    /// Parse a transport mode token.
    ///
    /// Matching is exact; `rer` is accepted as an alias for `rail`.
    pub fn parse(s: &str) -> Result<Self, ConfigurationError> {
        match s {
            "bus" => Ok(TransportType::Bus),
            "metro" => Ok(TransportType::Metro),
            "rail" | "rer" => Ok(TransportType::Rail),
            "tram" => Ok(TransportType::Tram),
            other => Err(ConfigurationError::InvalidTransportType(other.to_string())),
        }
    }

    /// The token used in the reference table's `TransportMode` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportType::Bus => "bus",
            TransportType::Metro => "metro",
            TransportType::Rail => "rail",
            TransportType::Tram => "tram",
        }
    }
}

impl fmt::Display for TransportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
