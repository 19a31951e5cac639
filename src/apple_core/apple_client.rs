use tracing::{debug, instrument, warn};
use super::config::AppleConfig;
use super::error::AppleAuthError;
use super::http_client::AppleHttpClient;
use super::request::{APPLE_BASE_URL, build_request};
use super::response::{ProviderResponse, decode_response};
use super::types::{
    AppCodeRequest, RefreshRequest, RefreshResponse, RevokeAccessRequest, RevokeRefreshRequest,
    RevokeResponse, ValidationRequest, ValidationResponse, WebCodeRequest,
};

/// Client for Apple's token and revoke endpoints.
///
/// Stateless: each call is one request and one response, with no retries. A
/// rejection reported by Apple comes back as `Ok` with `error` set on the
/// response, so check it before using any token.
///
/// Each request kind has its own operation, and the response type follows from
/// it. No generic entry point pairs a request with an arbitrary response type:
///
/// ```compile_fail
/// use starberry_apple_signin::{AppleClient, InMemoryHttpClient, ValidationRequest, ValidationResponse};
///
/// # async fn run() {
/// let client = AppleClient::new(InMemoryHttpClient::new());
/// let _ = client
///     .exchange::<ValidationResponse>(ValidationRequest::revoke_refresh("id", "secret", "r_1"))
///     .await;
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct AppleClient<C: AppleHttpClient> {
    http: C,
    base_url: String,
}

impl<C: AppleHttpClient> AppleClient<C> {
    /// Client for the production endpoints.
    pub fn new(http: C) -> Self {
        Self::with_base_url(http, APPLE_BASE_URL)
    }

    /// Client for another base URL (a proxy or a test server).
    pub fn with_base_url(http: C, base_url: impl Into<String>) -> Self {
        AppleClient { http, base_url: base_url.into() }
    }

    pub fn from_config(config: &AppleConfig, http: C) -> Self {
        Self::with_base_url(http, config.base_url.clone())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Exchange a web authorization code.
    pub async fn validate_web_code(&self, request: WebCodeRequest) -> Result<ValidationResponse, AppleAuthError> {
        self.exchange(request.into()).await
    }

    /// Exchange an app authorization code.
    pub async fn validate_app_code(&self, request: AppCodeRequest) -> Result<ValidationResponse, AppleAuthError> {
        self.exchange(request.into()).await
    }

    /// Get a new access token from a refresh token.
    pub async fn refresh_tokens(&self, request: RefreshRequest) -> Result<RefreshResponse, AppleAuthError> {
        self.exchange(request.into()).await
    }

    pub async fn revoke_access_token(&self, request: RevokeAccessRequest) -> Result<RevokeResponse, AppleAuthError> {
        self.exchange(request.into()).await
    }

    pub async fn revoke_refresh_token(&self, request: RevokeRefreshRequest) -> Result<RevokeResponse, AppleAuthError> {
        self.exchange(request.into()).await
    }

    /// Build, send and decode one request.
    ///
    /// A non-2xx answer is returned as a response only when its body carries
    /// an `error`; otherwise it is [`AppleAuthError::HttpStatus`].
    #[instrument(skip(self, request), fields(kind = request.kind()), level = "debug")]
    async fn exchange<T: ProviderResponse>(&self, request: ValidationRequest) -> Result<T, AppleAuthError> {
        let http_request = build_request(&self.base_url, &request);
        let url = http_request.url.clone();
        debug!(url = %url, "sending request to Apple");
        let response = self.http.execute(http_request).await.map_err(|e| {
            warn!(url = %url, error = %e, "transport failure");
            AppleAuthError::Transport(e)
        })?;

        let decoded = decode_response::<T>(&response.body);
        let decoded = if response.is_success() {
            decoded?
        } else {
            match decoded {
                Ok(body) if !body.is_success() => body,
                _ => {
                    warn!(url = %url, http_status = response.status, "unexpected response status");
                    return Err(AppleAuthError::HttpStatus { status: response.status, url });
                }
            }
        };

        if let Some(err) = decoded.provider_error() {
            warn!(
                error_code = %err.code,
                error_description = err.description.as_deref().unwrap_or(""),
                http_status = response.status,
                "Apple rejected the request"
            );
        } else {
            debug!(http_status = response.status, "Apple accepted the request");
        }
        Ok(decoded)
    }
}
