use std::fmt;
use std::future::Future;
use std::io;
use std::pin::Pin;

use bytes::Bytes;
use futures_util::Stream;
use url::Url;

use super::body::TransferBody;

/// A boxed, sendable stream.
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = T> + Send + 'a>>;

/// Response and part bodies. Dropping the stream releases the connection.
pub type ByteStream = BoxStream<'static, io::Result<Bytes>>;

/// Asynchronous HTTP client abstraction.
///
/// Implementations own connection pooling, timeouts and redirects. A
/// returned error means the call could not complete; any status code,
/// including 4xx and 5xx, is a successful call.
///
/// # Implementations
///
/// - [`ReqwestClient`]: production implementation using `reqwest`
/// - Mock implementations for testing
pub trait HttpClient: Send + Sync + 'static {
    type Error: std::error::Error + Send + Sync + 'static;

    fn execute(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = std::result::Result<HttpResponse, Self::Error>> + Send;
}

/// Outbound request as handed to an [`HttpClient`].
pub struct HttpRequest {
    pub method: String,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: Option<TransferBody>,
}

impl HttpRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Display for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

// Header values may carry credentials, so only names are printed.
impl fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header_names: Vec<&str> = self.headers.iter().map(|(k, _)| k.as_str()).collect();
        f.debug_struct("HttpRequest")
            .field("method", &self.method)
            .field("url", &self.url.as_str())
            .field("headers", &header_names)
            .field("body", &self.body)
            .finish()
    }
}

/// Inbound response. The body, when present, is read lazily.
pub struct HttpResponse {
    pub status: u16,
    pub message: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<ByteStream>,
}

impl HttpResponse {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: ByteStream) -> Self {
        self.body = Some(body);
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .field("message", &self.message)
            .field("headers", &self.headers)
            .field("has_body", &self.body.is_some())
            .finish()
    }
}

#[cfg(feature = "reqwest")]
mod reqwest_impl {
    use futures_util::StreamExt;

    use super::*;
    use crate::error::{Error, Result};

    #[derive(Debug, thiserror::Error)]
    pub enum ReqwestClientError {
        #[error("invalid HTTP method `{0}`")]
        Method(String),

        #[error(transparent)]
        Request(#[from] reqwest::Error),
    }

    /// Production HTTP client implementation using reqwest.
    #[derive(Debug, Clone)]
    pub struct ReqwestClient {
        client: reqwest::Client,
    }

    impl ReqwestClient {
        /// Create a new ReqwestClient with default configuration.
        pub fn new() -> Result<Self> {
            let client = reqwest::Client::builder().build().map_err(Error::call)?;
            Ok(Self { client })
        }

        /// Wrap a preconfigured client, e.g. one with timeouts set.
        pub fn from_client(client: reqwest::Client) -> Self {
            Self { client }
        }
    }

    impl HttpClient for ReqwestClient {
        type Error = ReqwestClientError;

        async fn execute(
            &self,
            request: HttpRequest,
        ) -> std::result::Result<HttpResponse, Self::Error> {
            let method = reqwest::Method::from_bytes(request.method.as_bytes())
                .map_err(|_| ReqwestClientError::Method(request.method.clone()))?;

            let mut builder = self.client.request(method, request.url);
            for (name, value) in &request.headers {
                builder = builder.header(name, value);
            }
            if let Some(body) = request.body {
                builder = builder.header(reqwest::header::CONTENT_TYPE, body.content_type());
                builder = match body {
                    TransferBody::NonChunked(body) => builder.body(body.bytes().clone()),
                    TransferBody::Chunked(body) => {
                        builder.body(reqwest::Body::wrap_stream(body.into_stream()))
                    }
                };
            }

            let response = builder.send().await?;
            let status = response.status();
            let headers = response
                .headers()
                .iter()
                .filter_map(|(k, v)| Some((k.to_string(), v.to_str().ok()?.to_string())))
                .collect();
            let body = match response.content_length() {
                Some(0) => None,
                _ => {
                    let stream = response.bytes_stream().map(|r| r.map_err(io::Error::other));
                    Some(Box::pin(stream) as ByteStream)
                }
            };

            Ok(HttpResponse {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or_default().to_string(),
                headers,
                body,
            })
        }
    }
}

#[cfg(feature = "reqwest")]
pub use reqwest_impl::{ReqwestClient, ReqwestClientError};
