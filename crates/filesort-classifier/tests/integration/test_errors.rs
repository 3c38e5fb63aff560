//! Failure modes surface as `ProviderError` so callers can fall back

use std::time::Duration;

use filesort_core::domain::FileDescriptor;
use filesort_core::ports::{FolderHints, IClassifier, ProviderError};
use serde_json::json;
use wiremock::ResponseTemplate;

use crate::common::{message_body, mount_reply, setup_classifier_mock};

fn descriptor() -> FileDescriptor {
    FileDescriptor::new("report.pdf")
}

#[tokio::test]
async fn test_server_error_maps_to_status() {
    let (server, classifier) = setup_classifier_mock().await;
    mount_reply(
        &server,
        ResponseTemplate::new(529).set_body_json(json!({
            "type": "error",
            "error": { "type": "overloaded_error", "message": "Overloaded" }
        })),
    )
    .await;

    let err = classifier
        .classify(&descriptor(), &FolderHints::none())
        .await
        .unwrap_err();
    match err {
        ProviderError::Status { status, message } => {
            assert_eq!(status, 529);
            assert_eq!(message, "Overloaded");
        }
        other => panic!("expected Status, got {other:?}"),
    }
}

#[tokio::test]
async fn test_internal_error_without_body() {
    let (server, classifier) = setup_classifier_mock().await;
    mount_reply(&server, ResponseTemplate::new(500)).await;

    let err = classifier
        .classify(&descriptor(), &FolderHints::none())
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::Status { status: 500, .. }));
}

#[tokio::test]
async fn test_prose_reply_is_unparsable() {
    let (server, classifier) = setup_classifier_mock().await;
    mount_reply(
        &server,
        ResponseTemplate::new(200).set_body_json(message_body("I am not sure what this is.")),
    )
    .await;

    let err = classifier
        .classify(&descriptor(), &FolderHints::none())
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::Unparsable(_)));
}

#[tokio::test]
async fn test_missing_path_is_unparsable() {
    let (server, classifier) = setup_classifier_mock().await;
    mount_reply(
        &server,
        ResponseTemplate::new(200)
            .set_body_json(message_body(r#"{"category":"work","confidence":0.95}"#)),
    )
    .await;

    let err = classifier
        .classify(&descriptor(), &FolderHints::none())
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::Unparsable(_)));
}

#[tokio::test]
async fn test_non_json_body_is_unparsable() {
    let (server, classifier) = setup_classifier_mock().await;
    mount_reply(&server, ResponseTemplate::new(200).set_body_string("<html>oops</html>")).await;

    let err = classifier
        .classify(&descriptor(), &FolderHints::none())
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::Unparsable(_)));
}

#[tokio::test]
async fn test_slow_reply_can_be_abandoned_by_caller() {
    let (server, classifier) = setup_classifier_mock().await;
    mount_reply(
        &server,
        ResponseTemplate::new(200)
            .set_body_json(message_body(r#"{"suggested_path":"documents"}"#))
            .set_delay(Duration::from_secs(5)),
    )
    .await;

    let d = descriptor();
    let hints = FolderHints::none();
    let outcome =
        tokio::time::timeout(Duration::from_millis(200), classifier.classify(&d, &hints)).await;
    assert!(outcome.is_err());
}

#[tokio::test]
async fn test_unreachable_server_is_request_error() {
    let client = filesort_classifier::AnthropicClient::with_base_url(
        "k",
        "m",
        "http://127.0.0.1:9",
    );
    let classifier = filesort_classifier::LlmClassifier::new(client);
    let err = classifier
        .classify(&descriptor(), &FolderHints::none())
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::Request(_)));
}
