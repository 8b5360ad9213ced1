//! Resolution error types.

use crate::domain::{LineId, TransportType};

/// Maximum number of alternatives listed in a resolution error.
pub const MAX_SUGGESTIONS: usize = 100;

/// A line or stop could not be uniquely identified.
///
/// These are caller errors: the request must be repeated with corrected
/// input. The `available` lists guide the caller and hold at most
/// [`MAX_SUGGESTIONS`] entries.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// No line matches (mode, short name, operator)
    #[error("line {mode} {short_name} not found. Available lines: {available:?}")]
    LineNotFound {
        mode: TransportType,
        short_name: String,
        available: Vec<String>,
    },

    /// Several lines match; never pick one silently
    #[error("line {mode} {short_name} is ambiguous: {candidates:?} all match")]
    LineAmbiguous {
        mode: TransportType,
        short_name: String,
        candidates: Vec<LineId>,
    },

    /// No stop with that name on the line
    #[error("stop \"{stop_name}\" not found on line {line}. Available stops: {available:?}")]
    StopNotFound {
        line: LineId,
        stop_name: String,
        available: Vec<String>,
    },
}

/// Distinct values in first-seen order, capped at [`MAX_SUGGESTIONS`].
pub(crate) fn suggestions<'a>(values: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    values
        .into_iter()
        .filter(|v| seen.insert(*v))
        .take(MAX_SUGGESTIONS)
        .map(str::to_string)
        .collect()
}
