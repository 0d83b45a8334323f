//! Upstream relay: pass-through forwarding with side-channel capture.
//!
//! One relay task runs per downstream connection. It writes into a single
//! `mpsc` channel whose receiver is the response body; the heartbeat task is
//! the only other writer.
//!
//! Output sequence for a healthy stream:
//!
//! ```text
//! : stream-start
//! <upstream bytes, unmodified, interleaved with ": keep-alive" frames>
//! data: {"event":"content_metadatas",...}   (when enrichment succeeded)
//! : stream-end
//! ```
//!
//! When the upstream refuses the query, `: stream-start` is followed by one
//! `error` event and the stream closes.

mod enrich;
mod heartbeat;
mod observer;

pub use enrich::MetadataEnricher;
pub use heartbeat::Heartbeat;
pub use observer::{StreamObservation, StreamObserver};

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::agent::AgentClient;
use crate::config::DEFAULT_HEARTBEAT_INTERVAL;
use crate::error::StreamError;
use crate::models::ChatMessage;
use crate::sse::encode::{comment_frame, error_event, FRAME_END, STREAM_END, STREAM_START};
use crate::traits::HttpError;

/// Buffered frames between the relay task and the response body.
pub const RELAY_CHANNEL_CAPACITY: usize = 64;

/// How a relay run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum RelayOutcome {
    /// Upstream finished normally
    Completed {
        observation: StreamObservation,
        enriched: bool,
    },
    /// Upstream refused the query; one `error` event was sent
    UpstreamFailed { status: Option<u16> },
    /// Upstream broke mid-stream; one `error` event was sent
    StreamFailed,
    /// The downstream consumer went away
    ConsumerGone,
}

/// Relays one agent answer stream to one consumer.
#[derive(Clone)]
pub struct UpstreamRelay {
    agent: AgentClient,
    enricher: MetadataEnricher,
    heartbeat_interval: Duration,
}

impl UpstreamRelay {
    /// Relay that enriches through the same agent it queries.
    pub fn new(agent: AgentClient) -> Self {
        let enricher = MetadataEnricher::new(Arc::new(agent.clone()));
        Self {
            agent,
            enricher,
            heartbeat_interval: DEFAULT_HEARTBEAT_INTERVAL,
        }
    }

    pub fn with_enricher(mut self, enricher: MetadataEnricher) -> Self {
        self.enricher = enricher;
        self
    }

    pub fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = interval;
        self
    }

    /// Start relaying on a new task and return the consumer end.
    pub fn spawn(
        &self,
        messages: Vec<ChatMessage>,
    ) -> (mpsc::Receiver<Bytes>, JoinHandle<RelayOutcome>) {
        let (tx, rx) = mpsc::channel(RELAY_CHANNEL_CAPACITY);
        let relay = self.clone();
        let handle = tokio::spawn(async move { relay.run(messages, tx).await });
        (rx, handle)
    }

    /// Relay the answer for `messages` into `tx` until upstream ends, fails,
    /// or the receiver is dropped.
    pub async fn run(&self, messages: Vec<ChatMessage>, tx: mpsc::Sender<Bytes>) -> RelayOutcome {
        if tx.send(comment_frame(STREAM_START)).await.is_err() {
            return RelayOutcome::ConsumerGone;
        }

        let mut upstream = match self.agent.query_stream(&messages).await {
            Ok(stream) => stream,
            Err(e) => {
                let message = upstream_error_message(&e);
                tracing::warn!(
                    agent_id = %self.agent.agent_id(),
                    "Upstream query failed: {}",
                    message
                );
                let _ = tx.send(error_event(&message)).await;
                return RelayOutcome::UpstreamFailed { status: e.status() };
            }
        };

        tracing::info!(agent_id = %self.agent.agent_id(), "Relaying agent stream");
        let heartbeat = Heartbeat::spawn(tx.clone(), self.heartbeat_interval);
        let mut observer = StreamObserver::new();
        let mut forwarded = 0usize;

        loop {
            let item = tokio::select! {
                _ = tx.closed() => {
                    tracing::info!(forwarded, "Consumer disconnected, dropping upstream");
                    return RelayOutcome::ConsumerGone;
                }
                item = upstream.next() => item,
            };

            match item {
                Some(Ok(chunk)) => {
                    forwarded += chunk.len();
                    if tx.send(chunk.clone()).await.is_err() {
                        tracing::info!(forwarded, "Consumer disconnected, dropping upstream");
                        return RelayOutcome::ConsumerGone;
                    }
                    observer.observe(&chunk);
                }
                Some(Err(e)) => {
                    heartbeat.stop();
                    let message = StreamError::ConnectionLost {
                        message: e.to_string(),
                    }
                    .to_string();
                    tracing::warn!(forwarded, "Upstream stream failed: {}", message);
                    let _ = tx.send(error_event(&message)).await;
                    return RelayOutcome::StreamFailed;
                }
                None => break,
            }
        }
        heartbeat.stop();

        if observer.close_partial_frame() {
            tracing::debug!(forwarded, "Upstream ended mid-frame, closing it");
            if tx.send(Bytes::from_static(FRAME_END)).await.is_err() {
                return RelayOutcome::ConsumerGone;
            }
        }

        let observation = observer.into_observation();
        let lookup = tokio::select! {
            _ = tx.closed() => {
                tracing::info!(forwarded, "Consumer disconnected during enrichment");
                return RelayOutcome::ConsumerGone;
            }
            frame = self.enricher.enrich(&observation) => frame,
        };
        let mut enriched = false;
        if let Some(frame) = lookup {
            if tx.send(frame).await.is_err() {
                return RelayOutcome::ConsumerGone;
            }
            enriched = true;
        }

        let _ = tx.send(comment_frame(STREAM_END)).await;
        tracing::info!(
            forwarded,
            message_id = observation.message_id.as_deref().unwrap_or(""),
            content_ids = observation.content_ids.len(),
            enriched,
            "Relay stream complete"
        );
        RelayOutcome::Completed {
            observation,
            enriched,
        }
    }
}

/// Detail text for a refused upstream query.
pub fn upstream_error_message(err: &HttpError) -> String {
    match err {
        HttpError::ServerError { status, message } => {
            format!("Upstream error {}: {}", status, message)
        }
        other => format!("Upstream request failed: {}", other),
    }
}
