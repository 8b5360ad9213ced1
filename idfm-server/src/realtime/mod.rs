//! Real-time stop monitoring.
//!
//! Client for the PRIM SIRI stop-monitoring feed, the flattened
//! [`RealtimeVisit`] record, and a fetcher that fans out over several stops.

mod client;
mod error;
mod fetcher;
pub mod types;
mod visit;

pub use client::{DEFAULT_REALTIME_TIMEOUT, RealtimeClient, RealtimeConfig};
pub use error::RealtimeError;
pub use fetcher::{RealtimeFetcher, VisitSource};
pub use visit::{RealtimeVisit, parse_stop_monitoring};
