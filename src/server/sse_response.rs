//! Event-stream response body fed by the relay channel.

use std::convert::Infallible;
use std::pin::Pin;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use futures::Stream;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

/// Streams every frame the relay writes, in order, until the relay drops its
/// senders. Dropping the body (client gone) closes the channel, which the
/// relay notices and stops.
pub struct SseResponse {
    rx: ReceiverStream<Bytes>,
}

impl SseResponse {
    pub fn new(rx: mpsc::Receiver<Bytes>) -> Self {
        Self {
            rx: ReceiverStream::new(rx),
        }
    }
}

impl Stream for SseResponse {
    type Item = Result<Bytes, Infallible>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.rx).poll_next(cx).map(|opt| opt.map(Ok))
    }
}

impl IntoResponse for SseResponse {
    fn into_response(self) -> Response {
        (
            [
                (header::CONTENT_TYPE, "text/event-stream; charset=utf-8"),
                (header::CACHE_CONTROL, "no-cache, no-transform"),
                (header::CONNECTION, "keep-alive"),
                (header::HeaderName::from_static("x-accel-buffering"), "no"),
            ],
            Body::from_stream(self),
        )
            .into_response()
    }
}
