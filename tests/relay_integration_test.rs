//! End-to-end tests for the relay routes using wiremock as the agent service.

mod common;

use citation_relay::config::RelayConfig;
use citation_relay::sse::{SseDecoder, StreamEvent};
use common::*;
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn post_json(url: &str, body: &Value) -> reqwest::Response {
    reqwest::Client::new()
        .post(url)
        .json(body)
        .send()
        .await
        .expect("Failed to send request")
}

fn decode_all(body: &str) -> Vec<StreamEvent> {
    SseDecoder::new().feed(body.as_bytes())
}

#[tokio::test]
async fn test_chat_relays_stream_then_metadata() {
    let upstream = MockServer::start().await;
    mount_answer(&upstream, agent_answer()).await;
    Mock::given(method("GET"))
        .and(path(RETRIEVAL_INFO_PATH))
        .and(query_param("content_ids", "c1"))
        .and(query_param("content_ids", "c2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_images()))
        .expect(1)
        .mount(&upstream)
        .await;
    let relay = start_relay(relay_config(&upstream)).await;

    let response = post_json(
        &relay.url("/api/chat"),
        &json!({"messages": [{"role": "user", "content": "Hi"}]}),
    )
    .await;

    assert_eq!(response.status(), 200);
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/event-stream"));
    assert_eq!(
        response.headers().get("cache-control").unwrap(),
        "no-cache, no-transform"
    );

    let body = response.text().await.unwrap();
    assert!(body.starts_with(": stream-start\n\n"));
    assert!(body.ends_with(": stream-end\n\n"));
    // Upstream bytes pass through untouched.
    assert!(body.contains(&agent_answer()));

    let events = decode_all(&body);
    assert_eq!(events.first().map(|e| e.event_type_name()), Some("metadata"));
    match events.last() {
        Some(StreamEvent::ContentMetadatas { content_metadatas }) => {
            assert_eq!(content_metadatas.len(), 2);
            assert_eq!(content_metadatas[0].id(), Some("c2"));
        }
        other => panic!("expected content_metadatas last, got {:?}", other),
    }
}

#[tokio::test]
async fn test_chat_forwards_history_upstream() {
    let upstream = MockServer::start().await;
    mount_answer(&upstream, frame("end", json!({}))).await;
    let relay = start_relay(relay_config(&upstream)).await;

    let history = json!({"messages": [
        {"role": "user", "content": "First"},
        {"role": "assistant", "content": "Answer"},
        {"role": "user", "content": "Second"}
    ]});
    let response = post_json(&relay.url("/api/chat"), &history).await;
    assert_eq!(response.status(), 200);
    response.text().await.unwrap();

    let requests = upstream.received_requests().await.unwrap();
    let query = requests
        .iter()
        .find(|r| r.url.path() == QUERY_PATH)
        .expect("query was sent");
    let sent: Value = serde_json::from_slice(&query.body).unwrap();
    assert_eq!(sent["stream"], true);
    assert_eq!(sent["messages"], history["messages"]);
    assert_eq!(
        query.url.query(),
        Some("include_retrieval_content_text=true")
    );
}

#[tokio::test]
async fn test_chat_upstream_error_sends_one_error_event() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(QUERY_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .mount(&upstream)
        .await;
    let relay = start_relay(relay_config(&upstream)).await;

    let response = post_json(
        &relay.url("/api/chat"),
        &json!({"messages": [{"role": "user", "content": "Hi"}]}),
    )
    .await;
    assert_eq!(response.status(), 200);

    let body = response.text().await.unwrap();
    assert!(body.starts_with(": stream-start\n\n"));
    assert!(!body.contains("keep-alive"));
    assert!(!body.contains("stream-end"));

    let events = decode_all(&body);
    assert_eq!(
        events,
        vec![StreamEvent::Error {
            message: Some("Upstream error 401: Unauthorized".to_string())
        }]
    );
}

#[tokio::test]
async fn test_chat_enrichment_failure_still_closes_cleanly() {
    let upstream = MockServer::start().await;
    mount_answer(&upstream, agent_answer()).await;
    mount_retrieval_info(&upstream, 500, json!({"detail": "down"})).await;
    let relay = start_relay(relay_config(&upstream)).await;

    let response = post_json(
        &relay.url("/api/chat"),
        &json!({"messages": [{"role": "user", "content": "Hi"}]}),
    )
    .await;
    let body = response.text().await.unwrap();

    assert!(body.ends_with(": stream-end\n\n"));
    assert!(decode_all(&body)
        .iter()
        .all(|e| !matches!(e, StreamEvent::ContentMetadatas { .. })));
}

#[tokio::test]
async fn test_chat_skips_enrichment_without_message_id() {
    let upstream = MockServer::start().await;
    let body = [
        frame("retrievals", json!({"contents": [{"content_id": "c1", "content_text": "x"}]})),
        frame("message_delta", json!({"delta": "Hi"})),
        frame("end", json!({})),
    ]
    .concat();
    mount_answer(&upstream, body).await;
    let relay = start_relay(relay_config(&upstream)).await;

    let response = post_json(
        &relay.url("/api/chat"),
        &json!({"messages": [{"role": "user", "content": "Hi"}]}),
    )
    .await;
    response.text().await.unwrap();

    let requests = upstream.received_requests().await.unwrap();
    assert!(requests.iter().all(|r| r.method.as_str() != "GET"));
}

#[tokio::test]
async fn test_chat_without_messages_is_400() {
    let upstream = MockServer::start().await;
    let relay = start_relay(relay_config(&upstream)).await;

    for body in [json!({"messages": []}), json!({})] {
        let response = post_json(&relay.url("/api/chat"), &body).await;
        assert_eq!(response.status(), 400);
        let error: Value = response.json().await.unwrap();
        assert_eq!(error, json!({"error": "No messages provided"}));
    }
    assert!(upstream.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_chat_invalid_json_is_400() {
    let upstream = MockServer::start().await;
    let relay = start_relay(relay_config(&upstream)).await;

    let response = reqwest::Client::new()
        .post(relay.url("/api/chat"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let error: Value = response.json().await.unwrap();
    assert_eq!(error["error"], "Invalid JSON body");
}

#[tokio::test]
async fn test_chat_missing_credentials_is_500() {
    let upstream = MockServer::start().await;
    let config = RelayConfig::new().with_api_base(format!("{}/v1", upstream.uri()));
    let relay = start_relay(config).await;

    let response = post_json(
        &relay.url("/api/chat"),
        &json!({"messages": [{"role": "user", "content": "Hi"}]}),
    )
    .await;
    assert_eq!(response.status(), 500);
    let error: Value = response.json().await.unwrap();
    assert!(error["error"].as_str().unwrap().contains("CONTEXTUAL_API_KEY"));
    assert!(upstream.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_retrieval_info_route_returns_metadata() {
    let upstream = MockServer::start().await;
    mount_retrieval_info(&upstream, 200, page_images()).await;
    let relay = start_relay(relay_config(&upstream)).await;

    let response = post_json(
        &relay.url("/api/retrieval-info"),
        &json!({"messageId": "m1", "contentIds": ["c1", "c2"]}),
    )
    .await;
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.unwrap();
    let metadatas = body["contentMetadatas"].as_array().unwrap();
    assert_eq!(metadatas.len(), 2);
    assert_eq!(metadatas[1]["content_id"], "c1");
    assert_eq!(metadatas[1]["page_img"], "cGFnZTE=");
}

#[tokio::test]
async fn test_retrieval_info_validates_body() {
    let upstream = MockServer::start().await;
    let relay = start_relay(relay_config(&upstream)).await;

    let cases = [
        (json!({"contentIds": ["c1"]}), "Message ID is required"),
        (json!({"messageId": "", "contentIds": ["c1"]}), "Message ID is required"),
        (json!({"messageId": "m1"}), "Content IDs are required"),
        (json!({"messageId": "m1", "contentIds": []}), "Content IDs are required"),
    ];
    for (body, expected) in cases {
        let response = post_json(&relay.url("/api/retrieval-info"), &body).await;
        assert_eq!(response.status(), 400, "body: {}", body);
        let error: Value = response.json().await.unwrap();
        assert_eq!(error["error"], expected);
    }
}

#[tokio::test]
async fn test_retrieval_info_passes_upstream_status() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(RETRIEVAL_INFO_PATH))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such message"))
        .mount(&upstream)
        .await;
    let relay = start_relay(relay_config(&upstream)).await;

    let response = post_json(
        &relay.url("/api/retrieval-info"),
        &json!({"messageId": "m1", "contentIds": ["c1"]}),
    )
    .await;
    assert_eq!(response.status(), 404);
    let error: Value = response.json().await.unwrap();
    assert_eq!(
        error["error"],
        "API Error: Upstream error 404: no such message"
    );
}

#[tokio::test]
async fn test_health() {
    let upstream = MockServer::start().await;
    let relay = start_relay(relay_config(&upstream)).await;

    let response = reqwest::get(relay.url("/health")).await.unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "ok");
}
