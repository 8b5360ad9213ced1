//! PRIM stop-monitoring HTTP client.
//!
//! Queries the SIRI Lite stop-monitoring endpoint for one stop at a time.
//! Authentication is a static API key sent on every request.

use std::time::Duration;

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};

use crate::domain::StopId;

use super::error::RealtimeError;
use super::fetcher::VisitSource;
use super::visit::{RealtimeVisit, parse_stop_monitoring};

/// Default base URL for the PRIM marketplace.
const DEFAULT_BASE_URL: &str = "https://prim.iledefrance-mobilites.fr/marketplace";

/// Default per-request timeout.
pub const DEFAULT_REALTIME_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration for the real-time client.
#[derive(Debug, Clone)]
pub struct RealtimeConfig {
    /// API key for the PRIM marketplace
    pub api_key: String,
    /// Base URL for the API (defaults to production PRIM)
    pub base_url: String,
    /// Request timeout, applied to connect and to the whole call
    pub timeout: Duration,
}

impl RealtimeConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_REALTIME_TIMEOUT,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Stop-monitoring API client.
#[derive(Debug, Clone)]
pub struct RealtimeClient {
    http: reqwest::Client,
    base_url: String,
}

impl RealtimeClient {
    pub fn new(config: RealtimeConfig) -> Result<Self, RealtimeError> {
        let mut headers = HeaderMap::new();

        // PRIM expects the key in a custom "apiKey" header
        let api_key =
            HeaderValue::from_str(&config.api_key).map_err(|_| RealtimeError::InvalidApiKey)?;
        headers.insert("apiKey", api_key);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch upcoming visits at one stop.
    pub async fn stop_monitoring(&self, stop: &StopId) -> Result<Vec<RealtimeVisit>, RealtimeError> {
        let url = format!("{}/stop-monitoring", self.base_url);

        let response = self
            .http
            .get(&url)
            .query(&[("MonitoringRef", stop.monitoring_ref())])
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(RealtimeError::Unauthorized);
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(RealtimeError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RealtimeError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;
        parse_stop_monitoring(&body)
    }
}

impl VisitSource for RealtimeClient {
    async fn stop_visits(&self, stop: &StopId) -> Result<Vec<RealtimeVisit>, RealtimeError> {
        self.stop_monitoring(stop).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_builder() {
        let config = RealtimeConfig::new("secret")
            .with_base_url("http://localhost:8080")
            .with_timeout(Duration::from_secs(2));

        assert_eq!(config.api_key, "secret");
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.timeout, Duration::from_secs(2));
    }

    #[test]
    fn config_defaults() {
        let config = RealtimeConfig::new("secret");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout, DEFAULT_REALTIME_TIMEOUT);
    }

    #[test]
    fn rejects_unprintable_api_key() {
        let err = RealtimeClient::new(RealtimeConfig::new("bad\nkey")).unwrap_err();
        assert!(matches!(err, RealtimeError::InvalidApiKey));
    }

    #[tokio::test]
    async fn unreachable_host_is_http_error() {
        let client = RealtimeClient::new(
            RealtimeConfig::new("secret")
                .with_base_url("http://127.0.0.1:9")
                .with_timeout(Duration::from_millis(500)),
        )
        .unwrap();

        let stop = StopId::from_raw("IDFM:22092");
        let err = client.stop_monitoring(&stop).await.unwrap_err();
        assert!(matches!(err, RealtimeError::Http(_)));
    }
}
