//! Open-data portal client for the bulk reference exports.

use std::time::Duration;

use super::error::ReferenceError;
use super::table::{LineReference, StopReference, parse_lines, parse_stops};

/// Default URL of the line reference export.
const DEFAULT_LINES_URL: &str = "https://data.iledefrance-mobilites.fr/explore/dataset/referentiel-des-lignes/download/?format=csv&timezone=Europe/Paris&lang=fr&use_labels_for_header=true&csv_separator=%3B";

/// Default URL of the stop/line association export.
const DEFAULT_STOPS_URL: &str = "https://data.iledefrance-mobilites.fr/explore/dataset/arrets-lignes/download/?format=csv&timezone=Europe/Paris&lang=fr&use_labels_for_header=true&csv_separator=%3B";

/// Configuration for the reference export client.
#[derive(Debug, Clone)]
pub struct ReferenceClientConfig {
    /// URL of the line reference CSV export
    pub lines_url: String,
    /// URL of the stop/line association CSV export
    pub stops_url: String,
    /// Request timeout in seconds (covers download of the whole export)
    pub timeout_secs: u64,
}

impl ReferenceClientConfig {
    pub fn with_lines_url(mut self, url: impl Into<String>) -> Self {
        self.lines_url = url.into();
        self
    }

    pub fn with_stops_url(mut self, url: impl Into<String>) -> Self {
        self.stops_url = url.into();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for ReferenceClientConfig {
    fn default() -> Self {
        Self {
            lines_url: DEFAULT_LINES_URL.to_string(),
            stops_url: DEFAULT_STOPS_URL.to_string(),
            timeout_secs: 60,
        }
    }
}

/// Client downloading the reference CSV exports.
///
/// Exports are requested gzip-compressed (`Accept-Encoding: gzip`);
/// decompression is transparent.
#[derive(Debug, Clone)]
pub struct ReferenceClient {
    http: reqwest::Client,
    lines_url: String,
    stops_url: String,
}

impl ReferenceClient {
    pub fn new(config: ReferenceClientConfig) -> Result<Self, ReferenceError> {
        let http = reqwest::Client::builder()
            .gzip(true)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            lines_url: config.lines_url,
            stops_url: config.stops_url,
        })
    }

    /// Download and parse the line reference table.
    pub async fn fetch_lines(&self) -> Result<Vec<LineReference>, ReferenceError> {
        let body = self.download(&self.lines_url, "lines").await?;
        parse_lines(body.as_ref())
    }

    /// Download and parse the stop/line association table.
    pub async fn fetch_stops(&self) -> Result<Vec<StopReference>, ReferenceError> {
        let body = self.download(&self.stops_url, "stops").await?;
        parse_stops(body.as_ref())
    }

    async fn download(
        &self,
        url: &str,
        dataset: &'static str,
    ) -> Result<impl AsRef<[u8]>, ReferenceError> {
        let response = self.http.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(ReferenceError::Api {
                dataset,
                status: status.as_u16(),
            });
        }

        Ok(response.bytes().await?)
    }
}
