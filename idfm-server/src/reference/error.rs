//! Reference data error types.

/// Errors that can occur while fetching or parsing the bulk reference tables.
#[derive(Debug, thiserror::Error)]
pub enum ReferenceError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Open-data portal returned an error status
    #[error("{dataset} export returned status {status}")]
    Api { dataset: &'static str, status: u16 },

    /// Malformed CSV payload
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Header row lacks a column we rely on
    #[error("{dataset} export has no `{column}` column")]
    MissingColumn {
        dataset: &'static str,
        column: &'static str,
    },
}
