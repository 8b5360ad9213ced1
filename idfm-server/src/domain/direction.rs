//! Direction of travel.

use std::fmt;

use super::error::ConfigurationError;

/// Canonical direction of travel on a line.
///
/// IDFM names the two directions of every line "Aller" (outbound) and
/// "Retour" (inbound); callers refer to them by their initials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// `A`, "Aller"
    Outbound,
    /// `R`, "Retour"
    Inbound,
}

impl Direction {
    /// Parse a caller-supplied direction token (`A` or `R`).
    pub fn parse(s: &str) -> Result<Self, ConfigurationError> {
        match s {
            "A" => Ok(Direction::Outbound),
            "R" => Ok(Direction::Inbound),
            other => Err(ConfigurationError::InvalidDirection(other.to_string())),
        }
    }

    /// Parse an optional direction token; empty means unconstrained.
    pub fn parse_optional(s: Option<&str>) -> Result<Option<Self>, ConfigurationError> {
        match s {
            None | Some("") => Ok(None),
            Some(s) => Self::parse(s).map(Some),
        }
    }

    /// Map the localized direction label to a direction.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Aller" => Some(Direction::Outbound),
            "Retour" => Some(Direction::Inbound),
            _ => None,
        }
    }

    /// The caller-facing initial.
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Outbound => "A",
            Direction::Inbound => "R",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_tokens() {
        assert_eq!(Direction::parse("A").unwrap(), Direction::Outbound);
        assert_eq!(Direction::parse("R").unwrap(), Direction::Inbound);
        assert!(Direction::parse("a").is_err());
        assert!(Direction::parse("Aller").is_err());
    }

    #[test]
    fn parse_optional_treats_empty_as_unconstrained() {
        assert_eq!(Direction::parse_optional(None).unwrap(), None);
        assert_eq!(Direction::parse_optional(Some("")).unwrap(), None);
        assert_eq!(
            Direction::parse_optional(Some("R")).unwrap(),
            Some(Direction::Inbound)
        );
        assert!(Direction::parse_optional(Some("X")).is_err());
    }

    #[test]
    fn labels() {
        assert_eq!(Direction::from_label("Aller"), Some(Direction::Outbound));
        assert_eq!(Direction::from_label("Retour"), Some(Direction::Inbound));
        assert_eq!(Direction::from_label("aller"), None);
        assert_eq!(Direction::from_label("La Défense"), None);
    }
}
