//! reqwest-backed [`Transport`] implementation

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use crate::error::{AuthError, Result};

use super::{HttpBody, HttpRequest, HttpResponse, Transport};

/// Default transport over a pooled [`reqwest::Client`]
///
/// The underlying pool is shared by all clones of the inner client. The
/// transport tracks a closed flag so requests after [`Transport::close`]
/// fail deterministically instead of reviving the pool.
#[derive(Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
    closed: AtomicBool,
}

impl HttpTransport {
    /// Create a transport with a fresh client
    #[must_use]
    pub fn new() -> Self {
        Self::with_client(reqwest::Client::new())
    }

    /// Create a transport over an existing client (shared pool)
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            closed: AtomicBool::new(false),
        }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn request(&self, request: HttpRequest) -> Result<HttpResponse> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(AuthError::network("transport is closed"));
        }

        let method = reqwest::Method::from_bytes(request.method.as_bytes())
            .map_err(|_| AuthError::network(format!("invalid HTTP method: {}", request.method)))?;

        let mut builder = self.client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        builder = match &request.body {
            HttpBody::Empty => builder,
            HttpBody::Json(body) => builder.json(body),
            HttpBody::Form(fields) => builder.form(fields),
        };

        tracing::debug!(url = %request.url, method = %request.method, "sending provider request");

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response.text().await?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }

    async fn close(&self) -> Result<()> {
        // reqwest pools are released on drop; the flag only makes the
        // release point deterministic and repeat closes harmless.
        if !self.closed.swap(true, Ordering::SeqCst) {
            tracing::debug!("http transport closed");
        }
        Ok(())
    }
}
