//! Successful classification round trips

use filesort_core::domain::{Category, FileDescriptor};
use filesort_core::ports::{FolderHints, IClassifier};
use wiremock::ResponseTemplate;

use crate::common::{message_body, mount_reply, setup_classifier_mock, TEST_MODEL};

#[tokio::test]
async fn test_classify_homework() {
    let (server, classifier) = setup_classifier_mock().await;
    let reply = r#"{"category":"homework","subcategory":"assignment",
        "suggested_path":"school/cs170/homework","confidence":0.9,
        "reasoning":"Course code in name","metadata":{"course":"CS170"}}"#;
    mount_reply(&server, ResponseTemplate::new(200).set_body_json(message_body(reply))).await;

    let d = FileDescriptor::new("CS170_HW7.pdf").with_mime_type("application/pdf");
    let result = classifier.classify(&d, &FolderHints::none()).await.unwrap();

    assert_eq!(result.category, Category::Homework);
    assert_eq!(result.suggested_path, "school/cs170/homework");
    assert!((result.confidence.value() - 0.9).abs() < 1e-9);
    assert!(!result.is_fallback());
    assert_eq!(
        result.metadata.and_then(|m| m.course).as_deref(),
        Some("CS170")
    );
}

#[tokio::test]
async fn test_classify_fenced_reply() {
    let (server, classifier) = setup_classifier_mock().await;
    let reply = "Here is the classification:\n```json\n{\"category\":\"receipt\",\
        \"suggested_path\":\"personal/receipts\",\"confidence\":0.8}\n```";
    mount_reply(&server, ResponseTemplate::new(200).set_body_json(message_body(reply))).await;

    let result = classifier
        .classify(&FileDescriptor::new("invoice.pdf"), &FolderHints::none())
        .await
        .unwrap();
    assert_eq!(result.category, Category::Receipt);
    assert_eq!(result.suggested_path, "personal/receipts");
}

#[tokio::test]
async fn test_request_carries_model_preview_and_hints() {
    let (server, classifier) = setup_classifier_mock().await;
    mount_reply(
        &server,
        ResponseTemplate::new(200)
            .set_body_json(message_body(r#"{"suggested_path":"documents"}"#)),
    )
    .await;

    let d = FileDescriptor::new("notes.txt").with_content_preview("Lecture 4: graphs");
    let hints = FolderHints::new(vec!["school/cs170".to_string()], 10);
    classifier.classify(&d, &hints).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["model"], TEST_MODEL);
    assert_eq!(body["messages"][0]["role"], "user");
    let user = body["messages"][0]["content"].as_str().unwrap();
    assert!(user.contains("Filename: notes.txt"));
    assert!(user.contains("Lecture 4: graphs"));
    assert!(user.contains("- school/cs170"));
    assert!(body["system"].as_str().unwrap().contains("suggested_path"));
}
