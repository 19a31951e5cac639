use std::error::Error;
use std::sync::Arc;
use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::Mutex;

/// HTTP methods used against Apple's endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    POST,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::POST => "POST",
        }
    }
}

/// HTTP request handed to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Target URL.
    pub url: String,
    /// Request headers.
    pub headers: Vec<(String, String)>,
    /// Optional request body.
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// Returns the first header value matching `name`, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// HTTP response returned by the transport.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: Vec<(String, String)>,
    /// Response body.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// A response with the given status and a JSON body.
    pub fn json(status: u16, body: &serde_json::Value) -> Self {
        HttpResponse {
            status,
            headers: vec![("Content-Type".into(), "application/json".into())],
            body: body.to_string().into_bytes(),
        }
    }

    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Error type for HTTP client operations.
pub type HttpClientError = Box<dyn Error + Send + Sync>;

/// Caller-supplied transport used for every exchange.
///
/// Timeouts, retries, proxies and connection pooling are configured on the
/// implementation, never by this crate.
#[async_trait]
pub trait AppleHttpClient: Send + Sync {
    /// Send a request and return the raw status, headers and body.
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, HttpClientError>;
}

#[async_trait]
impl<T: AppleHttpClient + ?Sized> AppleHttpClient for Arc<T> {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, HttpClientError> {
        (**self).execute(request).await
    }
}

/// In-memory HTTP client stub for testing.
#[derive(Clone, Default)]
pub struct InMemoryHttpClient {
    responses: Arc<DashMap<String, HttpResponse>>,
    default_response: Option<HttpResponse>,
    failure: Option<String>,
    sent: Arc<Mutex<Vec<HttpRequest>>>,
}

impl InMemoryHttpClient {
    /// Creates a new in-memory HTTP client with no default response.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new in-memory HTTP client with a default response on miss.
    pub fn with_default(response: HttpResponse) -> Self {
        Self { default_response: Some(response), ..Self::default() }
    }

    /// Creates a client whose every call fails at the transport level.
    pub fn failing(message: impl Into<String>) -> Self {
        Self { failure: Some(message.into()), ..Self::default() }
    }

    /// Register a mock response for a specific URL.
    pub fn insert_response(&self, url: impl Into<String>, response: HttpResponse) {
        self.responses.insert(url.into(), response);
    }

    /// Requests received so far, oldest first.
    pub async fn sent_requests(&self) -> Vec<HttpRequest> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl AppleHttpClient for InMemoryHttpClient {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, HttpClientError> {
        let url = request.url.clone();
        self.sent.lock().await.push(request);
        if let Some(message) = &self.failure {
            return Err(message.clone().into());
        }
        if let Some(entry) = self.responses.get(&url) {
            Ok(entry.value().clone())
        } else if let Some(resp) = &self.default_response {
            Ok(resp.clone())
        } else {
            Err(format!("no mock response for url {}", url).into())
        }
    }
}

/// Transport backed by a shared `reqwest::Client`.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestHttpClient {
    inner: reqwest::Client,
}

#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
    /// Wraps a preconfigured client (timeouts, proxy, TLS settings).
    pub fn new(client: reqwest::Client) -> Self {
        Self { inner: client }
    }
}

#[cfg(feature = "reqwest")]
#[async_trait]
impl AppleHttpClient for ReqwestHttpClient {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, HttpClientError> {
        let mut builder = match request.method {
            HttpMethod::POST => self.inner.post(&request.url),
        };
        for (k, v) in &request.headers {
            builder = builder.header(k.as_str(), v.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }
        let resp = builder.send().await?;
        let status = resp.status().as_u16();
        let headers = resp
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
            .collect();
        let body = resp.bytes().await?.to_vec();
        Ok(HttpResponse { status, headers, body })
    }
}
