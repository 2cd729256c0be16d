use crate::auth::error::AuthError;
use serde::Deserialize;
use std::fmt;
use std::path::Path;

/// Account used to obtain an access token.
///
/// Can be read from a JSON file of the form
/// `{"username": "...", "password": "..."}`.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// # Errors
    ///
    /// [`AuthError::MissingCredentials`] if either field is blank.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Result<Self, AuthError> {
        Credentials {
            username: username.into(),
            password: password.into(),
        }
        .validated()
    }

    pub async fn from_file(path: &Path) -> Result<Self, AuthError> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| AuthError::CredentialsRead(path.to_path_buf(), e))?;
        let credentials: Credentials = serde_json::from_str(&content)
            .map_err(|e| AuthError::CredentialsParse(path.to_path_buf(), e))?;
        credentials.validated()
    }

    fn validated(self) -> Result<Self, AuthError> {
        if self.username.trim().is_empty() || self.password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }
        Ok(self)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}
