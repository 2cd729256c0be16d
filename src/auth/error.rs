use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Failed to read credentials file '{0}'")]
    CredentialsRead(PathBuf, #[source] std::io::Error),

    #[error("Credentials file '{0}' is not valid JSON with a username and password")]
    CredentialsParse(PathBuf, #[source] serde_json::Error),

    #[error("Both a username and a password are required to fetch a token")]
    MissingCredentials,
}
