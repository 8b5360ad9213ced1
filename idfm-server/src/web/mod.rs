//! Web layer for the next-departure server.
//!
//! Provides HTTP endpoints for line lookup and upcoming departures.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
