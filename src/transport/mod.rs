//! Transport layer for talking to the identity provider
//!
//! The flow drivers never touch an HTTP client directly; they go through the
//! [`Transport`] trait. The default implementation is [`HttpTransport`]
//! (reqwest-backed), and tests substitute recording mocks. Timeouts, retry
//! policy, and connection pooling all belong to the transport, not the core:
//! a transport failure always surfaces as [`AuthError::Network`](crate::AuthError::Network).

pub mod http;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{AuthError, Result};

pub use http::HttpTransport;

/// One HTTP request as the core issues it
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP method ("POST" for everything the core sends)
    pub method: String,
    /// Absolute request URL
    pub url: String,
    /// Additional headers; content-type headers are implied by the body
    pub headers: Vec<(String, String)>,
    /// Request body
    pub body: HttpBody,
}

/// Request body variants used by the protocol
#[derive(Debug, Clone)]
pub enum HttpBody {
    /// No body
    Empty,
    /// JSON payload (authentication-flow endpoint)
    Json(Value),
    /// Form-urlencoded fields (token endpoint)
    Form(Vec<(String, String)>),
}

impl HttpRequest {
    /// Create a POST request with no body
    pub fn post(url: impl Into<String>) -> Self {
        Self {
            method: "POST".to_string(),
            url: url.into(),
            headers: Vec::new(),
            body: HttpBody::Empty,
        }
    }

    /// Add a header
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Set a JSON body
    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = HttpBody::Json(body);
        self
    }

    /// Set a form-urlencoded body
    #[must_use]
    pub fn form(mut self, fields: Vec<(String, String)>) -> Self {
        self.body = HttpBody::Form(fields);
        self
    }
}

/// One HTTP response as the transport returns it
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: Vec<(String, String)>,
    /// Raw response body
    pub body: String,
}

impl HttpResponse {
    /// Whether the status is in the 2xx range
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Deserialize the body as JSON
    ///
    /// # Errors
    ///
    /// A body that does not parse is a transport-level failure
    /// ([`AuthError::Network`]), distinct from a provider rejection.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body)
            .map_err(|err| AuthError::network(format!("malformed response body: {err}")))
    }

    /// Classify an OAuth error body
    ///
    /// Returns the provider's error code (`error` field) when the body is a
    /// standard OAuth error object, plus the best available description
    /// (`error_description`, then `error`, then the HTTP status).
    #[must_use]
    pub fn oauth_error(&self) -> (Option<String>, String) {
        let parsed: Option<Value> = serde_json::from_str(&self.body).ok();
        let code = parsed
            .as_ref()
            .and_then(|body| body.get("error"))
            .and_then(Value::as_str)
            .map(ToString::to_string);
        let description = parsed
            .as_ref()
            .and_then(|body| body.get("error_description"))
            .and_then(Value::as_str)
            .map(ToString::to_string)
            .or_else(|| code.clone())
            .unwrap_or_else(|| format!("HTTP {}", self.status));
        (code, description)
    }
}

/// Transport trait for issuing provider requests
///
/// Implementations must be safe to share across concurrent flow operations;
/// the core issues at most one outstanding request per flow call.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform one HTTP request
    ///
    /// # Errors
    /// Returns [`AuthError::Network`] on any transport-level failure.
    async fn request(&self, request: HttpRequest) -> Result<HttpResponse>;

    /// Release the underlying connection resources
    ///
    /// Must be idempotent: the first call releases, later calls are no-ops.
    ///
    /// # Errors
    /// Returns an error if cleanup fails.
    async fn close(&self) -> Result<()>;
}
