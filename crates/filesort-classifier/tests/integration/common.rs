//! Shared helpers for classifier integration tests

use filesort_classifier::{AnthropicClient, LlmClassifier};
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TEST_API_KEY: &str = "test-key";
pub const TEST_MODEL: &str = "claude-test";

/// Starts a mock server and a classifier pointed at it
pub async fn setup_classifier_mock() -> (MockServer, LlmClassifier) {
    let server = MockServer::start().await;
    let client = AnthropicClient::with_base_url(TEST_API_KEY, TEST_MODEL, server.uri());
    (server, LlmClassifier::new(client))
}

/// Messages API body whose single text block is `text`
pub fn message_body(text: &str) -> Value {
    json!({
        "id": "msg_01",
        "type": "message",
        "role": "assistant",
        "model": TEST_MODEL,
        "content": [{ "type": "text", "text": text }],
        "stop_reason": "end_turn",
        "usage": { "input_tokens": 120, "output_tokens": 60 }
    })
}

/// Mounts a reply for POST /v1/messages that checks the required headers
pub async fn mount_reply(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", TEST_API_KEY))
        .and(header("anthropic-version", "2023-06-01"))
        .respond_with(response)
        .mount(server)
        .await;
}
