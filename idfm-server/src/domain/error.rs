//! Request-construction errors.
//!
//! These are raised while turning caller tokens into domain values, before
//! any lookup happens. They are always the caller's fault.

use super::transport::ALLOWED_TRANSPORT_TYPES;

/// Invalid static input in a request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    /// Transport mode token is not one of the supported modes
    #[error("invalid transport type: {0}. Valid types: {types:?}", types = ALLOWED_TRANSPORT_TYPES)]
    InvalidTransportType(String),

    /// Direction token is neither `A` nor `R`
    #[error("invalid direction: {0}. Valid directions: A, R")]
    InvalidDirection(String),
}
