//! Sign in with Apple for Starberry.
//!
//! Signs the ES256 client secret, exchanges and revokes tokens at Apple's
//! token and revoke endpoints, and decodes the identity token's claims.
//!
//! ```no_run
//! use chrono::Utc;
//! use starberry_apple_signin::{AppleClient, AppleConfig, InMemoryHttpClient, ProviderResponse};
//!
//! # async fn run(config: AppleConfig, http: InMemoryHttpClient) -> Result<(), starberry_apple_signin::AppleAuthError> {
//! let client = AppleClient::from_config(&config, http);
//! let request = config.web_code_request("c_123", config.sign_client_secret(Utc::now())?)?;
//! let response = client.validate_web_code(request).await?;
//! if let Some(err) = response.provider_error() {
//!     println!("rejected: {}", err);
//! }
//! # Ok(())
//! # }
//! ```

pub mod apple_core;

pub use apple_core::apple_client::AppleClient;
pub use apple_core::claims::{AppleBool, IdentityClaims, JwkSetVerifier, NoVerification, RealUserStatus, SignatureVerifier, decode_identity_token};
pub use apple_core::client_secret::{ClientSecretParams, sign_client_secret};
pub use apple_core::config::AppleConfig;
pub use apple_core::error::AppleAuthError;
pub use apple_core::http_client::{AppleHttpClient, HttpClientError, HttpMethod, HttpRequest, HttpResponse, InMemoryHttpClient};
#[cfg(feature = "reqwest")]
pub use apple_core::http_client::ReqwestHttpClient;
pub use apple_core::request::build_request;
pub use apple_core::response::{ProviderResponse, decode_response};
pub use apple_core::types::{
    AppCodeRequest, ProviderError, ProviderErrorCode, RefreshRequest, RefreshResponse, RevokeAccessRequest,
    RevokeRefreshRequest, RevokeResponse, ValidationRequest, ValidationResponse, WebCodeRequest,
};
