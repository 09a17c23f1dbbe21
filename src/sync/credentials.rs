use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("Failed to read credential file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse credentials: {0}")]
    ParseError(#[from] serde_json::Error),
    #[error("No refresh token available")]
    NoRefreshToken,
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("OAuth error: {0}")]
    OAuthError(String),
}

/// The credential material handed over by the session layer after OAuth:
/// enough to call the calendar API and to mint a fresh access token when the
/// current one goes stale. This is the only state the crate persists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialBundle {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub token_uri: String,
    pub client_id: String,
    pub client_secret: String,
    pub scopes: Vec<String>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
    refresh_token: Option<String>,
}

impl CredentialBundle {
    /// Unknown expiry is treated as usable; the API call will fail loudly if
    /// the token is in fact dead.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => expires_at <= Utc::now(),
            None => false,
        }
    }

    pub fn needs_refresh(&self) -> bool {
        let buffer = chrono::Duration::minutes(5);
        match self.expires_at {
            Some(expires_at) => expires_at <= Utc::now() + buffer,
            None => false,
        }
    }

    /// Exchange the refresh token for a new access token at `token_uri`,
    /// yielding an updated bundle. The refresh token itself is preserved if
    /// the endpoint does not rotate it.
    pub async fn refresh(&self) -> Result<CredentialBundle, CredentialError> {
        let refresh_token = self
            .refresh_token
            .as_ref()
            .ok_or(CredentialError::NoRefreshToken)?;

        let params = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("refresh_token", refresh_token.as_str()),
            ("grant_type", "refresh_token"),
        ];

        let client = reqwest::Client::new();
        let response = client.post(&self.token_uri).form(&params).send().await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            tracing::error!("Token refresh failed: {}", error_text);
            return Err(CredentialError::OAuthError(error_text));
        }

        let token_response: TokenResponse = response.json().await?;

        Ok(CredentialBundle {
            access_token: token_response.access_token,
            refresh_token: token_response
                .refresh_token
                .or_else(|| Some(refresh_token.clone())),
            expires_at: Some(Utc::now() + chrono::Duration::seconds(token_response.expires_in)),
            ..self.clone()
        })
    }
}

/// Disk cache for the credential bundle, one JSON file under the config dir.
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn save(&self, bundle: &CredentialBundle) -> Result<(), CredentialError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(bundle)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }

    pub fn load(&self) -> Result<CredentialBundle, CredentialError> {
        let content = std::fs::read_to_string(&self.path)?;
        let bundle: CredentialBundle = serde_json::from_str(&content)?;
        Ok(bundle)
    }
}
