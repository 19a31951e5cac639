//! Sign in with Apple configuration.

use std::path::PathBuf;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use super::client_secret::{ClientSecretParams, MAX_CLIENT_SECRET_LIFETIME, sign_client_secret};
use super::error::AppleAuthError;
use super::request::APPLE_BASE_URL;
use super::types::WebCodeRequest;

/// Credentials and endpoint settings for one Apple client.
#[derive(Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppleConfig {
    /// Apple Developer team ID.
    pub team_id: String,

    /// Services ID (web) or bundle ID (app).
    pub client_id: String,

    /// Sign in with Apple key ID.
    pub key_id: String,

    /// Inline PEM of the private key. Exclusive with `private_key_path`.
    #[serde(default)]
    pub private_key: Option<String>,

    /// Path to the `.p8` private key file. Exclusive with `private_key`.
    #[serde(default)]
    pub private_key_path: Option<PathBuf>,

    /// Redirect URI registered for the web flow, used by [`AppleConfig::web_code_request`].
    #[serde(default)]
    pub redirect_uri: Option<String>,

    /// Lifetime of generated client secrets, in seconds.
    #[serde(default = "default_client_secret_ttl")]
    pub client_secret_ttl_secs: i64,

    /// Base URL of the token and revoke endpoints.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_client_secret_ttl() -> i64 {
    180 * 24 * 60 * 60 // 180 days
}

fn default_base_url() -> String {
    APPLE_BASE_URL.to_string()
}

impl std::fmt::Debug for AppleConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppleConfig")
            .field("team_id", &self.team_id)
            .field("client_id", &self.client_id)
            .field("key_id", &self.key_id)
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .field("private_key_path", &self.private_key_path)
            .field("redirect_uri", &self.redirect_uri)
            .field("client_secret_ttl_secs", &self.client_secret_ttl_secs)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl AppleConfig {
    /// Config with an inline key and defaults for everything else.
    pub fn new(
        team_id: impl Into<String>,
        client_id: impl Into<String>,
        key_id: impl Into<String>,
        private_key_pem: impl Into<String>,
    ) -> Self {
        Self {
            team_id: team_id.into(),
            client_id: client_id.into(),
            key_id: key_id.into(),
            private_key: Some(private_key_pem.into()),
            private_key_path: None,
            redirect_uri: None,
            client_secret_ttl_secs: default_client_secret_ttl(),
            base_url: default_base_url(),
        }
    }

    /// Parse and validate a JSON configuration document.
    pub fn from_json(json: &str) -> Result<Self, AppleAuthError> {
        let config: Self = serde_json::from_str(json).map_err(|e| AppleAuthError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), AppleAuthError> {
        if self.team_id.is_empty() {
            return Err(AppleAuthError::Config("team_id is required".to_string()));
        }
        if self.client_id.is_empty() {
            return Err(AppleAuthError::Config("client_id is required".to_string()));
        }
        if self.key_id.is_empty() {
            return Err(AppleAuthError::Config("key_id is required".to_string()));
        }
        match (&self.private_key, &self.private_key_path) {
            (Some(_), Some(_)) => {
                return Err(AppleAuthError::Config(
                    "private_key and private_key_path are mutually exclusive".to_string(),
                ));
            }
            (None, None) => {
                return Err(AppleAuthError::Config(
                    "one of private_key or private_key_path is required".to_string(),
                ));
            }
            _ => {}
        }
        if self.client_secret_ttl_secs <= 0 || self.client_secret_ttl_secs > MAX_CLIENT_SECRET_LIFETIME {
            return Err(AppleAuthError::Config(format!(
                "client_secret_ttl_secs must be between 1 and {}",
                MAX_CLIENT_SECRET_LIFETIME
            )));
        }
        if !self.base_url.starts_with("https://") && !self.base_url.starts_with("http://") {
            return Err(AppleAuthError::Config("base_url must be a valid HTTP(S) URL".to_string()));
        }
        Ok(())
    }

    /// The private key PEM, read from disk when configured by path.
    pub fn load_private_key(&self) -> Result<String, AppleAuthError> {
        match (&self.private_key, &self.private_key_path) {
            (Some(pem), _) => Ok(pem.clone()),
            (None, Some(path)) => std::fs::read_to_string(path).map_err(|e| {
                AppleAuthError::Config(format!("cannot read private key {}: {}", path.display(), e))
            }),
            (None, None) => Err(AppleAuthError::Config("no private key configured".to_string())),
        }
    }

    /// Parameters of a client secret valid from `now` for the configured TTL.
    pub fn client_secret_params(&self, now: DateTime<Utc>) -> Result<ClientSecretParams, AppleAuthError> {
        Ok(ClientSecretParams {
            team_id: self.team_id.clone(),
            client_id: self.client_id.clone(),
            key_id: self.key_id.clone(),
            private_key: self.load_private_key()?,
            issued_at: now,
            expiry: Duration::try_seconds(self.client_secret_ttl_secs)
                .and_then(|ttl| now.checked_add_signed(ttl))
                .ok_or_else(|| {
                    AppleAuthError::Config(format!(
                        "client_secret_ttl_secs {} is out of range",
                        self.client_secret_ttl_secs
                    ))
                })?,
        })
    }

    /// Sign a client secret valid from `now`.
    pub fn sign_client_secret(&self, now: DateTime<Utc>) -> Result<String, AppleAuthError> {
        sign_client_secret(&self.client_secret_params(now)?)
    }

    /// A web code exchange for `code`, using the configured client ID and `redirect_uri`.
    pub fn web_code_request(
        &self,
        code: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Result<WebCodeRequest, AppleAuthError> {
        let redirect_uri = self
            .redirect_uri
            .clone()
            .ok_or_else(|| AppleAuthError::Config("no redirect_uri configured".to_string()))?;
        Ok(WebCodeRequest {
            client_id: self.client_id.clone(),
            client_secret: client_secret.into(),
            code: code.into(),
            redirect_uri,
        })
    }
}
