use crate::config::ServiceConfig;
use crate::wcs::error::WcsError;
use crate::wcs::xml::exception_report;
use futures_util::TryStreamExt;
use log::{info, warn};
use reqwest::{Client, StatusCode};
use tokio::io::AsyncReadExt;
use tokio_util::io::StreamReader;

const MAX_DETAIL_CHARS: usize = 200;

/// Issues GET requests against the service and collects their bodies.
///
/// Every request is tagged with a label used in logs and errors in place of
/// the URL.
#[derive(Debug, Clone)]
pub struct WcsLoader {
    client: Client,
}

impl WcsLoader {
    pub fn new(config: &ServiceConfig) -> Result<WcsLoader, WcsError> {
        let mut builder = Client::builder().user_agent(config.user_agent.as_str());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(WcsError::ClientBuild)?;
        Ok(WcsLoader { client })
    }

    /// Fetches a textual (XML) reply. A reply that is an OWS exception report
    /// is turned into [`WcsError::ServiceException`] even on HTTP 200.
    pub async fn get_text(
        &self,
        request: &str,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<String, WcsError> {
        let bytes = self.get_bytes(request, url, query).await?;
        let text = String::from_utf8_lossy(&bytes).into_owned();
        if let Some((code, text)) = exception_report(&text) {
            warn!("{} returned a service exception [{}] {}", request, code, text);
            return Err(WcsError::ServiceException {
                request: request.to_string(),
                code,
                text,
            });
        }
        Ok(text)
    }

    /// Fetches a reply body as raw bytes.
    pub async fn get_bytes(
        &self,
        request: &str,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<u8>, WcsError> {
        info!("{} request", request);

        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| WcsError::NetworkRequest(request.to_string(), e))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            warn!("{} was refused with status {}", request, status);
            return Err(WcsError::Unauthorized {
                request: request.to_string(),
                status,
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("HTTP error for {}: {}", request, status);
            if let Some((code, text)) = exception_report(&body) {
                return Err(WcsError::ServiceException {
                    request: request.to_string(),
                    code,
                    text,
                });
            }
            let detail = body.trim();
            return Err(WcsError::HttpStatus {
                request: request.to_string(),
                status,
                detail: (!detail.is_empty())
                    .then(|| detail.chars().take(MAX_DETAIL_CHARS).collect()),
            });
        }

        let stream = response
            .bytes_stream()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e));
        let mut reader = StreamReader::new(stream);
        let mut body = Vec::new();
        reader.read_to_end(&mut body).await?;
        info!("Received {} bytes for {}", body.len(), request);
        Ok(body)
    }
}
