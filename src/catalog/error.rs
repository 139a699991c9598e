use thiserror::Error;

/// Errors raised while talking to the content API.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Transport-level failure (DNS, connect, timeout, TLS, body read).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("Failed to fetch data (HTTP {status})")]
    Status { status: u16 },

    /// The response body was not the expected JSON shape.
    #[error("Failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid catalog URL: {0}")]
    InvalidUrl(String),
}
