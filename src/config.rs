use bon::bon;
use std::time::Duration;

pub const DEFAULT_TOKEN_URL: &str = "https://geoservices.meteofrance.fr/services/GetAPIKey";
pub const DEFAULT_API_ROOT: &str = "https://geoservices.meteofrance.fr/api";
pub const DEFAULT_WCS_VERSION: &str = "2.0.1";

pub const API_ROOT_ENV: &str = "METEOFRANCE_API_ROOT";
pub const TOKEN_URL_ENV: &str = "METEOFRANCE_TOKEN_URL";

/// Where and how to reach the Météo-France web services.
///
/// # Examples
///
/// ```
/// use meteofrance_wcs::ServiceConfig;
/// use std::time::Duration;
///
/// let config = ServiceConfig::builder()
///     .api_root("http://localhost:8080/api")
///     .timeout(Duration::from_secs(30))
///     .build();
/// assert_eq!(config.wcs_version, "2.0.1");
/// assert_eq!(
///     config.endpoint_url("abc", "MF-NWP-GLOBAL-ARPEGE-05-GLOBE-WCS"),
///     "http://localhost:8080/api/abc/MF-NWP-GLOBAL-ARPEGE-05-GLOBE-WCS"
/// );
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub token_url: String,
    pub api_root: String,
    pub wcs_version: String,
    /// Applied to every request when set.
    pub timeout: Option<Duration>,
    pub user_agent: String,
}

#[bon]
impl ServiceConfig {
    #[builder]
    pub fn new(
        #[builder(into, default = DEFAULT_TOKEN_URL.to_string())] token_url: String,
        #[builder(into, default = DEFAULT_API_ROOT.to_string())] api_root: String,
        #[builder(into, default = DEFAULT_WCS_VERSION.to_string())] wcs_version: String,
        timeout: Option<Duration>,
        #[builder(into, default = default_user_agent())] user_agent: String,
    ) -> Self {
        Self {
            token_url,
            api_root,
            wcs_version,
            timeout,
            user_agent,
        }
    }
}

impl ServiceConfig {
    /// Default configuration, with the API root and token URL taken from
    /// `METEOFRANCE_API_ROOT` and `METEOFRANCE_TOKEN_URL` when those are set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(api_root) = non_empty_env(API_ROOT_ENV) {
            config.api_root = api_root;
        }
        if let Some(token_url) = non_empty_env(TOKEN_URL_ENV) {
            config.token_url = token_url;
        }
        config
    }

    /// `{api_root}/{token}/{endpoint}`
    pub fn endpoint_url(&self, token: &str, endpoint: &str) -> String {
        format!("{}/{}/{}", self.api_root.trim_end_matches('/'), token, endpoint)
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

fn default_user_agent() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
