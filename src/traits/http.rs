//! HTTP client trait abstraction.
//!
//! Both the upstream agent client and the downstream chat client are written
//! against [`HttpClient`], so either side can run over reqwest in production
//! or over [`MockHttpClient`](crate::adapters::mock::MockHttpClient) in tests.

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::collections::HashMap;
use std::pin::Pin;

use crate::error::NetworkError;

/// HTTP headers represented as a key-value map.
pub type Headers = HashMap<String, String>;

/// Incremental response body.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, HttpError>> + Send>>;

/// Build a header map carrying a bearer token and a JSON content type.
pub fn bearer_json_headers(token: &str) -> Headers {
    let mut headers = json_headers();
    headers.insert("Authorization".to_string(), format!("Bearer {}", token));
    headers
}

/// Build a header map with a JSON content type.
pub fn json_headers() -> Headers {
    let mut headers = Headers::new();
    headers.insert("Content-Type".to_string(), "application/json".to_string());
    headers
}

/// HTTP response wrapper.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub headers: Headers,
    pub body: Bytes,
}

impl Response {
    pub fn new(status: u16, body: Bytes) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body,
        }
    }

    /// JSON response with the given status.
    pub fn json_body(status: u16, value: &serde_json::Value) -> Self {
        let mut headers = Headers::new();
        headers.insert("content-type".to_string(), "application/json".to_string());
        Self::with_headers(status, headers, Bytes::from(value.to_string()))
    }

    pub fn with_headers(status: u16, headers: Headers, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Check if the response indicates success (2xx status).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn text_lossy(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn text(&self) -> Result<String, std::string::FromUtf8Error> {
        String::from_utf8(self.body.to_vec())
    }

    /// Parse the response body as JSON.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// HTTP client errors.
#[derive(Debug, Clone, PartialEq)]
pub enum HttpError {
    /// Connection failed
    ConnectionFailed(String),
    /// Request timeout
    Timeout(String),
    /// Server returned an error status
    ServerError { status: u16, message: String },
    /// Request was cancelled
    Cancelled,
    /// Body read failed mid-transfer
    Io(String),
    InvalidUrl(String),
    Other(String),
}

impl HttpError {
    /// The HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            HttpError::ServerError { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl std::fmt::Display for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HttpError::ConnectionFailed(msg) => write!(f, "Connection failed: {}", msg),
            HttpError::Timeout(msg) => write!(f, "Request timeout: {}", msg),
            HttpError::ServerError { status, message } => {
                write!(f, "Server error ({}): {}", status, message)
            }
            HttpError::Cancelled => write!(f, "Request cancelled"),
            HttpError::Io(msg) => write!(f, "IO error: {}", msg),
            HttpError::InvalidUrl(msg) => write!(f, "Invalid URL: {}", msg),
            HttpError::Other(msg) => write!(f, "HTTP error: {}", msg),
        }
    }
}

impl std::error::Error for HttpError {}

impl From<NetworkError> for HttpError {
    fn from(err: NetworkError) -> Self {
        match err {
            NetworkError::ConnectionFailed { message, .. } => HttpError::ConnectionFailed(message),
            NetworkError::Timeout { operation } => HttpError::Timeout(operation),
            NetworkError::HttpStatus { status, message } => {
                HttpError::ServerError { status, message }
            }
            NetworkError::InvalidResponse { message } => HttpError::Io(message),
            NetworkError::Other { message } => HttpError::Other(message),
        }
    }
}

impl From<HttpError> for NetworkError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::ConnectionFailed(message) => NetworkError::ConnectionFailed {
                url: String::new(),
                message,
            },
            HttpError::Timeout(operation) => NetworkError::Timeout { operation },
            HttpError::ServerError { status, message } => {
                NetworkError::HttpStatus { status, message }
            }
            HttpError::Io(message) => NetworkError::InvalidResponse { message },
            HttpError::Cancelled => NetworkError::Other {
                message: "request cancelled".to_string(),
            },
            HttpError::InvalidUrl(message) | HttpError::Other(message) => {
                NetworkError::Other { message }
            }
        }
    }
}

/// Trait for HTTP client operations.
///
/// # Example
///
/// ```ignore
/// use citation_relay::traits::{Headers, HttpClient, HttpError};
///
/// async fn fetch<C: HttpClient>(client: &C) -> Result<String, HttpError> {
///     let response = client.get("https://api.example.com/data", &Headers::new()).await?;
///     Ok(response.text_lossy())
/// }
/// ```
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn get(&self, url: &str, headers: &Headers) -> Result<Response, HttpError>;

    async fn post(&self, url: &str, body: &str, headers: &Headers) -> Result<Response, HttpError>;

    /// Perform a POST request and return the body as a byte stream.
    ///
    /// A non-2xx status is reported as [`HttpError::ServerError`] carrying
    /// the response body text, before any bytes are yielded.
    async fn post_stream(
        &self,
        url: &str,
        body: &str,
        headers: &Headers,
    ) -> Result<ByteStream, HttpError>;
}
