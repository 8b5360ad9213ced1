//! Process configuration from the environment.

use std::net::SocketAddr;

use crate::realtime::RealtimeConfig;
use crate::reference::ReferenceClientConfig;

/// Default listen address.
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Errors reading the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("environment variable {0} must be set")]
    Missing(&'static str),

    #[error("invalid BIND_ADDR {value:?}: {source}")]
    InvalidBindAddr {
        value: String,
        source: std::net::AddrParseError,
    },
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub realtime: RealtimeConfig,
    pub reference: ReferenceClientConfig,
}

impl AppConfig {
    /// Read configuration from process environment variables.
    ///
    /// `IDFM_API_KEY` is required. `BIND_ADDR`, `IDFM_REALTIME_URL`,
    /// `IDFM_LINES_CSV_URL` and `IDFM_STOPS_CSV_URL` override defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_key = var("IDFM_API_KEY").ok_or(ConfigError::Missing("IDFM_API_KEY"))?;

        let bind = var("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind
            .parse()
            .map_err(|source| ConfigError::InvalidBindAddr {
                value: bind.clone(),
                source,
            })?;

        let mut realtime = RealtimeConfig::new(api_key);
        if let Some(url) = var("IDFM_REALTIME_URL") {
            realtime = realtime.with_base_url(url);
        }

        let mut reference = ReferenceClientConfig::default();
        if let Some(url) = var("IDFM_LINES_CSV_URL") {
            reference = reference.with_lines_url(url);
        }
        if let Some(url) = var("IDFM_STOPS_CSV_URL") {
            reference = reference.with_stops_url(url);
        }

        Ok(Self {
            bind_addr,
            realtime,
            reference,
        })
    }
}
