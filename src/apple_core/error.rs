use thiserror::Error;

use super::http_client::HttpClientError;

/// Errors raised while signing, exchanging or decoding Sign in with Apple data.
///
/// A rejection reported by Apple inside a response body is not an error of this
/// type; it is carried by the response value itself (see
/// [`ProviderResponse::provider_error`](super::response::ProviderResponse::provider_error)).
#[derive(Debug, Error)]
pub enum AppleAuthError {
    #[error("Client secret signing failed: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),

    #[error("Invalid client secret lifetime: expiry {expiry} is not after issued_at {issued_at}")]
    InvalidSecretLifetime { issued_at: i64, expiry: i64 },

    #[error("Transport error: {0}")]
    Transport(#[source] HttpClientError),

    #[error("Unexpected HTTP status {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Malformed response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Malformed identity token: {0}")]
    MalformedToken(String),

    #[error("Identity token verification failed: {0}")]
    Verification(String),

    #[error("Untrusted identity token: {0}")]
    UntrustedClaims(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppleAuthError {
    /// True for failures of the exchange itself, before any body was decoded.
    pub fn is_transport(&self) -> bool {
        matches!(self, AppleAuthError::Transport(_) | AppleAuthError::HttpStatus { .. })
    }
}
