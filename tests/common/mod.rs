//! Shared fixtures for the integration tests.
//!
//! A wiremock server stands in for the agent service; the relay runs on an
//! ephemeral port in front of it.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use citation_relay::adapters::ReqwestHttpClient;
use citation_relay::config::RelayConfig;
use citation_relay::server::start_server_on;
use serde_json::{json, Value};
use tokio::task::JoinHandle;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const API_KEY: &str = "test-key";
pub const AGENT_ID: &str = "agent-1";

pub const QUERY_PATH: &str = "/v1/agents/agent-1/query";
pub const RETRIEVAL_INFO_PATH: &str = "/v1/agents/agent-1/query/m1/retrieval/info";

/// A running relay and the address it listens on.
pub struct TestRelay {
    pub handle: JoinHandle<()>,
    pub addr: SocketAddr,
}

impl TestRelay {
    pub fn url(&self, route: &str) -> String {
        format!("http://{}{}", self.addr, route)
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for TestRelay {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Relay configuration pointing at the mock agent service.
pub fn relay_config(upstream: &MockServer) -> RelayConfig {
    RelayConfig::new()
        .with_api_key(API_KEY)
        .with_agent_id(AGENT_ID)
        .with_api_base(format!("{}/v1", upstream.uri()))
}

/// Start the relay on an ephemeral port.
pub async fn start_relay(config: RelayConfig) -> TestRelay {
    let addr: SocketAddr = "127.0.0.1:0".parse().unwrap();
    let (handle, addr) = start_server_on(addr, config, Arc::new(ReqwestHttpClient::new()))
        .await
        .expect("Failed to start relay");
    TestRelay { handle, addr }
}

/// One upstream event frame.
pub fn frame(event: &str, data: Value) -> String {
    format!("data: {}\n\n", json!({ "event": event, "data": data }))
}

/// A complete agent answer citing two sources.
pub fn agent_answer() -> String {
    [
        frame("metadata", json!({"message_id": "m1", "conversation_id": "conv-1"})),
        frame(
            "retrievals",
            json!({"contents": [
                {"content_id": "c1", "content_text": "First source", "doc_name": "a.pdf", "page": 3},
                {"content_id": "c2", "content_text": "Second source", "doc_name": "b.pdf", "page": 7}
            ]}),
        ),
        frame("message_delta", json!({"delta": "Hello"})),
        frame("message_delta", json!({"delta": " world [1]()"})),
        frame("attributions", json!({"spans": []})),
        frame("end", json!({})),
    ]
    .concat()
}

/// Mount the streaming query answer.
pub async fn mount_answer(server: &MockServer, body: String) {
    Mock::given(method("POST"))
        .and(path(QUERY_PATH))
        .and(header("Authorization", format!("Bearer {}", API_KEY).as_str()))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/event-stream")
                .set_body_string(body),
        )
        .mount(server)
        .await;
}

/// Mount the retrieval-info lookup for message `m1`.
pub async fn mount_retrieval_info(server: &MockServer, status: u16, body: Value) {
    Mock::given(method("GET"))
        .and(path(RETRIEVAL_INFO_PATH))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}

/// Page images for both sources of [`agent_answer`].
pub fn page_images() -> Value {
    json!({"content_metadatas": [
        {"content_id": "c2", "page_img": "cGFnZTI="},
        {"content_id": "c1", "page_img": "cGFnZTE="}
    ]})
}
