//! Keep-alive comment frames for idle streams.

use std::time::Duration;

use bytes::Bytes;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::sse::encode::{comment_frame, KEEP_ALIVE};

/// Background task writing `: keep-alive` frames into the relay channel.
///
/// The task is aborted when the handle is stopped or dropped, so it can never
/// outlive the relay loop that owns it.
#[derive(Debug)]
pub struct Heartbeat {
    handle: JoinHandle<()>,
}

impl Heartbeat {
    /// Start emitting a keep-alive frame every `period`, first one after one
    /// full period.
    pub fn spawn(tx: mpsc::Sender<Bytes>, period: Duration) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if tx.send(comment_frame(KEEP_ALIVE)).await.is_err() {
                    tracing::debug!("Heartbeat stopping, consumer gone");
                    break;
                }
            }
        });
        Self { handle }
    }

    pub fn stop(self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for Heartbeat {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
