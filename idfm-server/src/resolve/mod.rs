//! Identifier resolution.
//!
//! Turns the names callers use (transport mode, line short name, stop name)
//! into the opaque ids the real-time feed understands. Both resolvers are
//! cache-first and fall back to scanning the reference snapshot.

pub mod cache;
mod error;
mod line;
mod stop;

pub use cache::{
    CacheConfig, CacheStats, LineCache, LineCacheKey, ResolutionCache, StopCache, StopCacheKey,
};
pub use error::{MAX_SUGGESTIONS, ResolveError};
pub use line::{DEFAULT_OPERATORS, LineResolver};
pub use stop::StopResolver;
