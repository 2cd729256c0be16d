use polars::error::PolarsError;
use thiserror::Error;

/// Failures talking to the web service or making sense of its replies.
///
/// Requests are identified by a short label (e.g. `DescribeCoverage PRESSURE__...`)
/// rather than their URL, since URLs carry the access token or the password.
#[derive(Debug, Error)]
pub enum WcsError {
    #[error("Failed to build the HTTP client")]
    ClientBuild(#[source] reqwest::Error),

    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {request} with status {status}{}", detail_suffix(.detail))]
    HttpStatus {
        request: String,
        status: reqwest::StatusCode,
        detail: Option<String>,
    },

    #[error("Access denied for {request} (status {status}); the token may have been issued for invalid credentials")]
    Unauthorized {
        request: String,
        status: reqwest::StatusCode,
    },

    #[error("Service reported an exception for {request}: [{code}] {text}")]
    ServiceException {
        request: String,
        code: String,
        text: String,
    },

    #[error("Data download failed")]
    DownloadIo(#[from] std::io::Error),

    #[error("Malformed XML in {document}")]
    XmlParse {
        document: &'static str,
        #[source]
        source: quick_xml::Error,
    },

    #[error("Element '{element}' missing from {document}")]
    MissingElement {
        document: &'static str,
        element: &'static str,
    },

    #[error("Invalid timestamp '{0}'")]
    InvalidTimestamp(String),

    #[error("Invalid number '{0}'")]
    InvalidNumber(String),

    #[error("Invalid coverage envelope: {0}")]
    InvalidEnvelope(String),

    #[error("Failed to decode raster payload")]
    RasterDecode(#[from] tiff::TiffError),

    #[error("Unexpected raster layout: {0}")]
    RasterLayout(String),

    #[error("Failed processing capabilities table: {0}")]
    Frame(#[from] PolarsError),

    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail
        .as_deref()
        .map(|d| format!(": {d}"))
        .unwrap_or_default()
}
