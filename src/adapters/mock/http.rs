//! Mock HTTP client for testing.
//!
//! Responses are registered per URL. Lookups try an exact match first, then
//! the longest registered prefix, then the default response.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::traits::{ByteStream, Headers, HttpClient, HttpError, Response};

/// A recorded HTTP request for verification in tests.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub url: String,
    pub headers: Headers,
    /// Request body (POST only)
    pub body: Option<String>,
}

impl RecordedRequest {
    /// Parse the recorded body as JSON.
    pub fn json_body(&self) -> Option<serde_json::Value> {
        serde_json::from_str(self.body.as_deref()?).ok()
    }
}

/// Configuration for a mock response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Return a complete response
    Success(Response),
    /// Fail before any response
    Error(HttpError),
    /// Stream these chunks, then end
    Stream(Vec<Bytes>),
    /// Stream these chunks, then fail with a transport error
    StreamThenError(Vec<Bytes>, HttpError),
    /// Stream these chunks, then stay open without ending
    StreamOpen(Vec<Bytes>),
}

impl MockResponse {
    /// Event stream built from complete text chunks.
    pub fn sse<I, S>(chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        MockResponse::Stream(chunks.into_iter().map(|c| Bytes::from(c.into())).collect())
    }

    pub fn json(status: u16, value: serde_json::Value) -> Self {
        MockResponse::Success(Response::json_body(status, &value))
    }
}

/// Mock HTTP client for testing.
///
/// Clones share their responses and their request log.
#[derive(Debug, Clone, Default)]
pub struct MockHttpClient {
    responses: Arc<Mutex<HashMap<String, MockResponse>>>,
    default_response: Arc<Mutex<Option<MockResponse>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a response for a URL or URL prefix.
    pub fn set_response(&self, url: &str, response: MockResponse) {
        lock(&self.responses).insert(url.to_string(), response);
    }

    /// Set a default response for URLs without specific matches.
    pub fn set_default_response(&self, response: MockResponse) {
        *lock(&self.default_response) = Some(response);
    }

    pub fn get_requests(&self) -> Vec<RecordedRequest> {
        lock(&self.requests).clone()
    }

    /// Recorded requests whose URL starts with `prefix`.
    pub fn requests_to(&self, prefix: &str) -> Vec<RecordedRequest> {
        lock(&self.requests)
            .iter()
            .filter(|r| r.url.starts_with(prefix))
            .cloned()
            .collect()
    }

    pub fn clear_requests(&self) {
        lock(&self.requests).clear();
    }

    fn record_request(&self, method: &str, url: &str, headers: &Headers, body: Option<String>) {
        lock(&self.requests).push(RecordedRequest {
            method: method.to_string(),
            url: url.to_string(),
            headers: headers.clone(),
            body,
        });
    }

    fn get_response(&self, url: &str) -> Option<MockResponse> {
        let responses = lock(&self.responses);

        if let Some(response) = responses.get(url) {
            return Some(response.clone());
        }

        let by_prefix = responses
            .iter()
            .filter(|(pattern, _)| url.starts_with(pattern.as_str()))
            .max_by_key(|(pattern, _)| pattern.len())
            .map(|(_, response)| response.clone());

        by_prefix.or_else(|| lock(&self.default_response).clone())
    }

    fn complete(&self, url: &str) -> Result<Response, HttpError> {
        match self.get_response(url) {
            Some(MockResponse::Success(response)) => Ok(response),
            Some(MockResponse::Error(err)) => Err(err),
            Some(_) => Err(HttpError::Other(
                "Stream response on non-stream request".to_string(),
            )),
            None => Err(HttpError::Other(format!("No mock response for URL: {}", url))),
        }
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn get(&self, url: &str, headers: &Headers) -> Result<Response, HttpError> {
        self.record_request("GET", url, headers, None);
        self.complete(url)
    }

    async fn post(&self, url: &str, body: &str, headers: &Headers) -> Result<Response, HttpError> {
        self.record_request("POST", url, headers, Some(body.to_string()));
        self.complete(url)
    }

    async fn post_stream(
        &self,
        url: &str,
        body: &str,
        headers: &Headers,
    ) -> Result<ByteStream, HttpError> {
        self.record_request("POST", url, headers, Some(body.to_string()));

        match self.get_response(url) {
            Some(MockResponse::Stream(chunks)) => Ok(Box::pin(stream::iter(
                chunks.into_iter().map(Ok::<Bytes, HttpError>),
            ))),
            Some(MockResponse::StreamThenError(chunks, err)) => Ok(Box::pin(
                stream::iter(chunks.into_iter().map(Ok)).chain(stream::once(async move { Err(err) })),
            )),
            Some(MockResponse::StreamOpen(chunks)) => Ok(Box::pin(
                stream::iter(chunks.into_iter().map(Ok)).chain(stream::pending()),
            )),
            Some(MockResponse::Success(response)) if !response.is_success() => {
                Err(HttpError::ServerError {
                    status: response.status,
                    message: response.text_lossy(),
                })
            }
            Some(MockResponse::Success(_)) => Err(HttpError::Other(
                "Non-stream response on stream request".to_string(),
            )),
            Some(MockResponse::Error(err)) => Err(err),
            None => Err(HttpError::Other(format!("No mock response for URL: {}", url))),
        }
    }
}
