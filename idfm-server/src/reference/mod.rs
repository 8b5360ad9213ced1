//! Bulk reference tables from the IDFM open-data portal.
//!
//! Two exports are kept in memory: the line reference table (line id,
//! transport mode, short name, operator) and the stop/line association
//! table (stop id, stop name, owning line). They are loaded once at startup
//! and refreshed every few hours in the background.

mod client;
mod error;
mod store;
mod table;

pub use client::{ReferenceClient, ReferenceClientConfig};
pub use error::ReferenceError;
pub use store::{REFERENCE_REFRESH_INTERVAL, ReferenceSnapshot, ReferenceStore, SnapshotStats};
pub use table::{LineReference, StopReference, parse_lines, parse_stops};
