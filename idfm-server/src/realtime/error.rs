//! Real-time feed error types.

/// Errors from the stop-monitoring feed.
#[derive(Debug, thiserror::Error)]
pub enum RealtimeError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The call exceeded its time budget
    #[error("request timed out")]
    Timeout,

    /// API key rejected
    #[error("unauthorized: check IDFM_API_KEY")]
    Unauthorized,

    /// API key is not a valid header value
    #[error("invalid API key format")]
    InvalidApiKey,

    /// Rate limited by the feed
    #[error("rate limited by stop-monitoring API")]
    RateLimited,

    /// Feed returned an error status code
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// JSON deserialization failed
    #[error("JSON parse error: {message}")]
    Json {
        message: String,
        body: Option<String>,
    },

    /// Response carried no StopMonitoringDelivery section
    #[error("no stop monitoring delivery data found")]
    NoDelivery,

    /// Every stop of a fan-out failed
    #[error("all {} stop queries failed: {}", failures.len(), failures.join("; "))]
    AllStopsFailed { failures: Vec<String> },
}
