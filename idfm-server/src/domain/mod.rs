//! Domain types for the departure lookup.
//!
//! Request tokens are validated into these types at the boundary, so code
//! that receives them can trust their shape.

mod direction;
mod error;
mod line_id;
mod stop_id;
mod transport;

pub use direction::Direction;
pub use error::ConfigurationError;
pub use line_id::LineId;
pub use stop_id::{StopId, StopKind, numeric_id};
pub use transport::{ALLOWED_TRANSPORT_TYPES, TransportType};
