//! Reqwest-based HTTP client adapter.

use async_trait::async_trait;
use futures_util::StreamExt;

use crate::error::classify_reqwest_error;
use crate::traits::{ByteStream, Headers, HttpClient, HttpError, Response};

/// [`HttpClient`] over a shared `reqwest::Client`.
///
/// No request timeout is configured: event streams stay open for as long as
/// the agent keeps answering, and the relay's heartbeat keeps intermediaries
/// from closing them.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    fn convert_error(err: reqwest::Error, url: &str) -> HttpError {
        if err.is_builder() {
            return HttpError::InvalidUrl(err.to_string());
        }
        classify_reqwest_error(&err, url).into()
    }

    fn convert_headers(headers: &reqwest::header::HeaderMap) -> Headers {
        headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.to_string(), v.to_string()))
            })
            .collect()
    }

    fn apply_headers(
        mut builder: reqwest::RequestBuilder,
        headers: &Headers,
    ) -> reqwest::RequestBuilder {
        for (key, value) in headers {
            builder = builder.header(key, value);
        }
        builder
    }

    async fn read_response(
        response: reqwest::Response,
        url: &str,
    ) -> Result<Response, HttpError> {
        let status = response.status().as_u16();
        let headers = Self::convert_headers(response.headers());
        let body = response
            .bytes()
            .await
            .map_err(|e| Self::convert_error(e, url))?;
        Ok(Response::with_headers(status, headers, body))
    }
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get(&self, url: &str, headers: &Headers) -> Result<Response, HttpError> {
        let builder = Self::apply_headers(self.client.get(url), headers);
        let response = builder
            .send()
            .await
            .map_err(|e| Self::convert_error(e, url))?;
        Self::read_response(response, url).await
    }

    async fn post(&self, url: &str, body: &str, headers: &Headers) -> Result<Response, HttpError> {
        let builder = Self::apply_headers(self.client.post(url).body(body.to_string()), headers);
        let response = builder
            .send()
            .await
            .map_err(|e| Self::convert_error(e, url))?;
        Self::read_response(response, url).await
    }

    async fn post_stream(
        &self,
        url: &str,
        body: &str,
        headers: &Headers,
    ) -> Result<ByteStream, HttpError> {
        let builder = Self::apply_headers(self.client.post(url).body(body.to_string()), headers);
        let response = builder
            .send()
            .await
            .map_err(|e| Self::convert_error(e, url))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(HttpError::ServerError { status, message });
        }

        let stream = response.bytes_stream().map(|result| {
            result.map_err(|e| {
                if e.is_timeout() {
                    HttpError::Timeout(e.to_string())
                } else {
                    HttpError::Io(e.to_string())
                }
            })
        });

        Ok(Box::pin(stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_convert_headers() {
        let mut header_map = reqwest::header::HeaderMap::new();
        header_map.insert(
            reqwest::header::CONTENT_TYPE,
            "text/event-stream".parse().unwrap(),
        );

        let headers = ReqwestHttpClient::convert_headers(&header_map);
        assert_eq!(
            headers.get("content-type"),
            Some(&"text/event-stream".to_string())
        );
    }

    #[tokio::test]
    async fn test_get_invalid_url() {
        let client = ReqwestHttpClient::new();
        let result = client.get("not-a-valid-url", &Headers::new()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_post_stream_connection_refused() {
        let client = ReqwestHttpClient::new();
        let result = client
            .post_stream("http://127.0.0.1:59999/query", "{}", &Headers::new())
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_post_stream_yields_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/stream"))
            .and(header("Authorization", "Bearer k"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_string("data: {}\n\n"),
            )
            .mount(&server)
            .await;

        let client = ReqwestHttpClient::new();
        let mut stream = client
            .post_stream(
                &format!("{}/stream", server.uri()),
                "{}",
                &crate::traits::bearer_json_headers("k"),
            )
            .await
            .unwrap();

        let mut body = Vec::new();
        while let Some(chunk) = stream.next().await {
            body.extend_from_slice(&chunk.unwrap());
        }
        assert_eq!(body, b"data: {}\n\n");
    }

    #[tokio::test]
    async fn test_post_stream_non_success_carries_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/stream"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
            .mount(&server)
            .await;

        let client = ReqwestHttpClient::new();
        let result = client
            .post_stream(&format!("{}/stream", server.uri()), "{}", &Headers::new())
            .await;

        match result {
            Err(HttpError::ServerError { status, message }) => {
                assert_eq!(status, 401);
                assert_eq!(message, "Unauthorized");
            }
            other => panic!("expected ServerError, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_get_returns_non_success_as_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/info"))
            .respond_with(ResponseTemplate::new(404).set_body_string("missing"))
            .mount(&server)
            .await;

        let client = ReqwestHttpClient::new();
        let response = client
            .get(&format!("{}/info", server.uri()), &Headers::new())
            .await
            .unwrap();
        assert_eq!(response.status, 404);
        assert_eq!(response.text_lossy(), "missing");
    }
}
