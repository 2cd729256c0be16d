//! Entry point of the crate: an authenticated client for the Météo-France web
//! services, from which product sessions are opened.

use crate::auth::credentials::Credentials;
use crate::auth::error::AuthError;
use crate::auth::token::{parse_token_response, Token};
use crate::catalog::product::Product;
use crate::catalog::{self, ProductQuery};
use crate::config::ServiceConfig;
use crate::error::MeteoFranceError;
use crate::session::product_session::ProductSession;
use crate::types::coverage_id::CoverageId;
use crate::wcs::capabilities::Capabilities;
use crate::wcs::description::CoverageDescription;
use crate::wcs::error::WcsError;
use crate::wcs::loader::WcsLoader;
use crate::wcs::raster::decode_geotiff;
use crate::wcs::request::{capabilities_query, describe_query, CoverageRequest};
use crate::wcs::xml::exception_report;
use bon::bon;
use log::info;
use ndarray::Array2;
use std::path::PathBuf;
use tokio::task;

/// Client for the Météo-France WCS products.
///
/// Holds the access token for its whole lifetime; tokens are never refreshed.
/// Create one with [`MeteoFrance::with_token`] if you already have a token, or
/// with [`MeteoFrance::fetch_token`] to obtain one from your account credentials.
///
/// # Examples
///
/// ```no_run
/// # use meteofrance_wcs::{MeteoFrance, MeteoFranceError};
/// # #[tokio::main]
/// # async fn main() -> Result<(), MeteoFranceError> {
/// let client = MeteoFrance::fetch_token()
///     .credentials_file("credentials.json")
///     .call()
///     .await?;
///
/// let arome = client
///     .select_product()
///     .dataset("arome")
///     .area("france")
///     .accuracy(0.01)
///     .call()
///     .await?;
/// for title in arome.list_titles()? {
///     println!("{title}");
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MeteoFrance {
    config: ServiceConfig,
    token: Token,
    loader: WcsLoader,
}

#[bon]
impl MeteoFrance {
    /// Creates a client for an existing token, against the default service
    /// endpoints. No request is sent.
    pub fn with_token(token: impl Into<Token>) -> Result<Self, MeteoFranceError> {
        Self::with_config(token, ServiceConfig::default())
    }

    /// Creates a client for an existing token with a custom [`ServiceConfig`].
    pub fn with_config(
        token: impl Into<Token>,
        config: ServiceConfig,
    ) -> Result<Self, MeteoFranceError> {
        let loader = WcsLoader::new(&config)?;
        Ok(Self {
            config,
            token: token.into(),
            loader,
        })
    }

    /// Requests a token for an account and returns a client using it.
    ///
    /// Either `.credentials_file(path)` (a JSON file with `username` and
    /// `password` keys) or `.username(..).password(..)` must be given; the file
    /// wins when both are. Finish with `.call().await`.
    ///
    /// The service hands out a token even for wrong credentials, so a bad
    /// account only shows up as [`WcsError::Unauthorized`] on the first data
    /// request.
    ///
    /// # Errors
    ///
    /// [`AuthError`] variants when no usable credentials are supplied, or
    /// [`WcsError`] variants when the token request fails.
    #[builder]
    pub async fn fetch_token(
        #[builder(into)] credentials_file: Option<PathBuf>,
        #[builder(into)] username: Option<String>,
        #[builder(into)] password: Option<String>,
        config: Option<ServiceConfig>,
    ) -> Result<Self, MeteoFranceError> {
        let credentials = match credentials_file {
            Some(path) => Credentials::from_file(&path).await?,
            None => match (username, password) {
                (Some(username), Some(password)) => Credentials::new(username, password)?,
                _ => return Err(AuthError::MissingCredentials.into()),
            },
        };
        let config = config.unwrap_or_default();
        let loader = WcsLoader::new(&config)?;

        let query = [
            ("username", credentials.username.clone()),
            ("password", credentials.password.clone()),
        ];
        let reply = loader
            .get_text("GetAPIKey", &config.token_url, &query)
            .await?;
        let token = parse_token_response(&reply)?;
        info!("Obtained access token for {}", credentials.username);

        Ok(Self {
            config,
            token,
            loader,
        })
    }

    /// Selects a product from partial criteria and loads its capabilities.
    ///
    /// Each of `.dataset(..)`, `.area(..)` and `.accuracy(..)` is optional;
    /// the criteria given must single out exactly one product. Finish with
    /// `.call().await`.
    ///
    /// # Errors
    ///
    /// [`crate::CatalogError::AmbiguousSelection`] or [`crate::CatalogError::NoMatch`]
    /// before any request is sent, then [`WcsError`] variants if the
    /// capabilities cannot be retrieved.
    #[builder]
    pub async fn select_product<'a>(
        &'a self,
        #[builder(into)] dataset: Option<String>,
        #[builder(into)] area: Option<String>,
        accuracy: Option<f64>,
    ) -> Result<ProductSession<'a>, MeteoFranceError> {
        let query = ProductQuery {
            dataset,
            area,
            accuracy,
        };
        let product = catalog::select(&query)?;
        self.select(product).await
    }
}

impl MeteoFrance {
    /// Opens a session on a given product, loading its capabilities.
    pub async fn select(
        &self,
        product: &'static Product,
    ) -> Result<ProductSession<'_>, MeteoFranceError> {
        let capabilities = self.get_capabilities(product).await?;
        Ok(ProductSession::new(self, product, capabilities))
    }

    pub fn token(&self) -> &Token {
        &self.token
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    fn endpoint_url(&self, product: &Product) -> String {
        self.config.endpoint_url(self.token.as_str(), product.endpoint)
    }

    pub(crate) async fn get_capabilities(
        &self,
        product: &Product,
    ) -> Result<Capabilities, WcsError> {
        let label = format!("GetCapabilities {}", product.endpoint);
        let xml = self
            .loader
            .get_text(
                &label,
                &self.endpoint_url(product),
                &capabilities_query(&self.config.wcs_version),
            )
            .await?;
        let capabilities = Capabilities::parse(&xml)?;
        info!(
            "{} coverages available for {}",
            capabilities.len(),
            product
        );
        Ok(capabilities)
    }

    pub(crate) async fn describe_coverage(
        &self,
        product: &Product,
        coverage_id: &CoverageId,
    ) -> Result<CoverageDescription, WcsError> {
        let label = format!("DescribeCoverage {coverage_id}");
        let xml = self
            .loader
            .get_text(
                &label,
                &self.endpoint_url(product),
                &describe_query(&self.config.wcs_version, coverage_id),
            )
            .await?;
        CoverageDescription::parse(&xml, product.time_step())
    }

    pub(crate) async fn get_coverage(
        &self,
        product: &Product,
        request: &CoverageRequest<'_>,
    ) -> Result<Array2<f32>, WcsError> {
        let label = request.label();
        let bytes = self
            .loader
            .get_bytes(
                &label,
                &self.endpoint_url(product),
                &request.query_pairs(&self.config.wcs_version),
            )
            .await?;

        if bytes.iter().find(|b| !b.is_ascii_whitespace()) == Some(&b'<') {
            let text = String::from_utf8_lossy(&bytes);
            return Err(match exception_report(&text) {
                Some((code, text)) => WcsError::ServiceException {
                    request: label,
                    code,
                    text,
                },
                None => WcsError::RasterLayout(format!("{label} returned XML instead of GeoTIFF")),
            });
        }

        task::spawn_blocking(move || decode_geotiff(&bytes)).await?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_token_sends_nothing() {
        let client = MeteoFrance::with_token("__abc__").unwrap();
        assert_eq!(client.token().as_str(), "__abc__");
        assert_eq!(
            client.endpoint_url(&crate::catalog::product::PRODUCTS[0]),
            "https://geoservices.meteofrance.fr/api/__abc__/MF-NWP-GLOBAL-ARPEGE-05-GLOBE-WCS"
        );
    }

    #[tokio::test]
    async fn test_fetch_token_requires_credentials() {
        let err = MeteoFrance::fetch_token()
            .username("jane")
            .call()
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            MeteoFranceError::Auth(AuthError::MissingCredentials)
        ));

        let err = MeteoFrance::fetch_token()
            .username("")
            .password("")
            .call()
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            MeteoFranceError::Auth(AuthError::MissingCredentials)
        ));
    }

    #[tokio::test]
    async fn test_ambiguous_product_fails_before_any_request() {
        let config = ServiceConfig::builder()
            .api_root("http://127.0.0.1:9/unreachable")
            .build();
        let client = MeteoFrance::with_config("__abc__", config).unwrap();
        let err = client
            .select_product()
            .dataset("arome")
            .area("france")
            .call()
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            MeteoFranceError::Catalog(crate::catalog::error::CatalogError::AmbiguousSelection { .. })
        ));
    }
}
