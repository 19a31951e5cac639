//! Sign in with Apple primitives: requests, responses and provider errors.

use std::fmt;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Exchange of an authorization code obtained by a web (Services ID) flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebCodeRequest {
    /// Services ID the code was issued to.
    pub client_id: String,
    /// Signed client secret JWT.
    pub client_secret: String,
    /// Authorization code received on the redirect.
    pub code: String,
    /// Redirect URI used when the code was requested.
    pub redirect_uri: String,
}

/// Exchange of an authorization code obtained by a native app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppCodeRequest {
    /// App bundle identifier.
    pub client_id: String,
    /// Signed client secret JWT.
    pub client_secret: String,
    /// Authorization code delivered to the app.
    pub code: String,
}

/// Refresh token grant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshRequest {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

/// Revocation of an access token.
///
/// `client_id` is optional here and only here. Apple accepts a revoke-access
/// call without it, and the asymmetry with every other request kind is
/// deliberate: it mirrors the provider's behaviour rather than a uniform shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevokeAccessRequest {
    pub client_id: Option<String>,
    pub client_secret: String,
    pub access_token: String,
}

/// Revocation of a refresh token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevokeRefreshRequest {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

/// Every request kind sent to Apple's token and revoke endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationRequest {
    /// Web authorization code validation.
    Web(WebCodeRequest),
    /// App authorization code validation.
    App(AppCodeRequest),
    /// Refresh token validation.
    Refresh(RefreshRequest),
    /// Access token revocation.
    RevokeAccess(RevokeAccessRequest),
    /// Refresh token revocation.
    RevokeRefresh(RevokeRefreshRequest),
}

impl ValidationRequest {
    pub fn web(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        code: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        ValidationRequest::Web(WebCodeRequest {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            code: code.into(),
            redirect_uri: redirect_uri.into(),
        })
    }

    pub fn app(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        code: impl Into<String>,
    ) -> Self {
        ValidationRequest::App(AppCodeRequest {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            code: code.into(),
        })
    }

    pub fn refresh(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Self {
        ValidationRequest::Refresh(RefreshRequest {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            refresh_token: refresh_token.into(),
        })
    }

    pub fn revoke_access(
        client_id: Option<String>,
        client_secret: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        ValidationRequest::RevokeAccess(RevokeAccessRequest {
            client_id,
            client_secret: client_secret.into(),
            access_token: access_token.into(),
        })
    }

    pub fn revoke_refresh(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Self {
        ValidationRequest::RevokeRefresh(RevokeRefreshRequest {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            refresh_token: refresh_token.into(),
        })
    }

    /// Short name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ValidationRequest::Web(_) => "web_code",
            ValidationRequest::App(_) => "app_code",
            ValidationRequest::Refresh(_) => "refresh",
            ValidationRequest::RevokeAccess(_) => "revoke_access",
            ValidationRequest::RevokeRefresh(_) => "revoke_refresh",
        }
    }
}

impl From<WebCodeRequest> for ValidationRequest {
    fn from(req: WebCodeRequest) -> Self {
        ValidationRequest::Web(req)
    }
}

impl From<AppCodeRequest> for ValidationRequest {
    fn from(req: AppCodeRequest) -> Self {
        ValidationRequest::App(req)
    }
}

impl From<RefreshRequest> for ValidationRequest {
    fn from(req: RefreshRequest) -> Self {
        ValidationRequest::Refresh(req)
    }
}

impl From<RevokeAccessRequest> for ValidationRequest {
    fn from(req: RevokeAccessRequest) -> Self {
        ValidationRequest::RevokeAccess(req)
    }
}

impl From<RevokeRefreshRequest> for ValidationRequest {
    fn from(req: RevokeRefreshRequest) -> Self {
        ValidationRequest::RevokeRefresh(req)
    }
}

/// Token endpoint answer to a code validation.
///
/// Always check [`error`](Self::error) first: when it is set the token fields
/// are not to be trusted, whatever the HTTP status was.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Identity token (compact JWT), see [`decode_identity_token`](super::claims::decode_identity_token).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,
}

/// Token endpoint answer to a refresh. No new refresh or identity token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,
}

/// Revoke endpoint answer. Success is the absence of `error`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevokeResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,
}

/// Error codes Apple reports in-band (RFC 6749 section 5.2).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderErrorCode {
    /// The request is malformed or missing a parameter.
    InvalidRequest,
    /// Client authentication failed, usually a bad or expired client secret.
    InvalidClient,
    /// The code or refresh token is invalid, expired or already used.
    InvalidGrant,
    /// The client is not allowed to use this grant.
    UnauthorizedClient,
    /// The grant type is not supported.
    UnsupportedGrantType,
    /// The requested scope is invalid.
    InvalidScope,
    /// Any other code, kept verbatim.
    Other(String),
}

impl ProviderErrorCode {
    pub fn from_code(code: &str) -> Self {
        match code {
            "invalid_request" => ProviderErrorCode::InvalidRequest,
            "invalid_client" => ProviderErrorCode::InvalidClient,
            "invalid_grant" => ProviderErrorCode::InvalidGrant,
            "unauthorized_client" => ProviderErrorCode::UnauthorizedClient,
            "unsupported_grant_type" => ProviderErrorCode::UnsupportedGrantType,
            "invalid_scope" => ProviderErrorCode::InvalidScope,
            other => ProviderErrorCode::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ProviderErrorCode::InvalidRequest => "invalid_request",
            ProviderErrorCode::InvalidClient => "invalid_client",
            ProviderErrorCode::InvalidGrant => "invalid_grant",
            ProviderErrorCode::UnauthorizedClient => "unauthorized_client",
            ProviderErrorCode::UnsupportedGrantType => "unsupported_grant_type",
            ProviderErrorCode::InvalidScope => "invalid_scope",
            ProviderErrorCode::Other(code) => code.as_str(),
        }
    }
}

impl fmt::Display for ProviderErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rejection reported by Apple in the response body.
///
/// This is a value, not a failure of the call: the facade returns it inside a
/// successfully decoded response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Apple rejected the request: {code}{}", with_description(.description))]
pub struct ProviderError {
    pub code: ProviderErrorCode,
    pub description: Option<String>,
}

impl ProviderError {
    pub fn new(code: &str, description: Option<&str>) -> Self {
        ProviderError {
            code: ProviderErrorCode::from_code(code),
            description: description.map(str::to_string),
        }
    }
}

fn with_description(description: &Option<String>) -> String {
    description.as_ref().map(|d| format!(" ({})", d)).unwrap_or_default()
}
