use std::sync::Arc;
use std::time::Duration;

use regwatch::inference::{
    HostedBackend, InferenceBackend, InferenceError, ModelHandle, SummaryParams,
};

fn backend_for(server: &mockito::ServerGuard) -> HostedBackend {
    HostedBackend::new(server.url(), "test-classifier", "test-summarizer")
}

#[tokio::test]
async fn rank_labels_parses_and_sorts_scores() {
    let mut server = mockito::Server::new_async().await;

    // Scores arrive unordered; the backend must rank best-first.
    let mock = server
        .mock("POST", "/models/test-classifier")
        .match_header("authorization", "Bearer token-123")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "sequence": "NCC revokes operator license",
                "labels": ["Not urgent", "Urgent"],
                "scores": [0.35, 0.65]
            }"#,
        )
        .create_async()
        .await;

    let backend = backend_for(&server).with_api_token("token-123");

    let ranked = backend
        .rank_labels("NCC revokes operator license", &["Urgent", "Not urgent"])
        .await
        .expect("rank");

    assert_eq!(ranked.len(), 2);
    assert_eq!(ranked[0].label, "Urgent");
    assert!(ranked[0].score > ranked[1].score);

    mock.assert_async().await;
}

#[tokio::test]
async fn rank_labels_maps_api_errors() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("POST", "/models/test-classifier")
        .with_status(503)
        .with_body(r#"{"error": "model overloaded"}"#)
        .create_async()
        .await;

    let backend = backend_for(&server);
    let err = backend
        .rank_labels("anything", &["Urgent", "Not urgent"])
        .await
        .unwrap_err();

    assert!(matches!(err, InferenceError::Api { status: 503, .. }));
    mock.assert_async().await;
}

#[tokio::test]
async fn rank_labels_rejects_mismatched_response() {
    let mut server = mockito::Server::new_async().await;

    let _mock = server
        .mock("POST", "/models/test-classifier")
        .with_status(200)
        .with_body(r#"{"labels": ["Urgent", "Not urgent"], "scores": [0.9]}"#)
        .create_async()
        .await;

    let backend = backend_for(&server);
    let err = backend
        .rank_labels("anything", &["Urgent", "Not urgent"])
        .await
        .unwrap_err();

    assert!(matches!(err, InferenceError::Decode(_)));
}

#[tokio::test]
async fn summarize_extracts_the_first_choice() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("POST", "/models/test-summarizer")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"[{"summary_text": "Regulator suspends licensee."}]"#)
        .create_async()
        .await;

    let backend = backend_for(&server);
    let params = SummaryParams {
        max_length: 150,
        min_length: 30,
        deterministic: true,
    };

    let summary = backend
        .summarize("A long article body...", &params)
        .await
        .expect("summarize");
    assert_eq!(summary, "Regulator suspends licensee.");

    mock.assert_async().await;
}

#[tokio::test]
async fn summarize_empty_response_is_a_decode_error() {
    let mut server = mockito::Server::new_async().await;

    let _mock = server
        .mock("POST", "/models/test-summarizer")
        .with_status(200)
        .with_body("[]")
        .create_async()
        .await;

    let backend = backend_for(&server);
    let params = SummaryParams {
        max_length: 150,
        min_length: 30,
        deterministic: true,
    };

    let err = backend.summarize("text", &params).await.unwrap_err();
    assert!(matches!(err, InferenceError::Decode(_)));
}

#[tokio::test]
async fn slow_responses_hit_the_call_timeout() {
    let mut server = mockito::Server::new_async().await;

    let _mock = server
        .mock("POST", "/models/test-classifier")
        .with_status(200)
        .with_chunked_body(|w| {
            std::thread::sleep(Duration::from_secs(2));
            w.write_all(b"too late")
        })
        .create_async()
        .await;

    let backend = backend_for(&server).with_timeout(Duration::from_millis(300));
    let err = backend
        .rank_labels("anything", &["Urgent", "Not urgent"])
        .await
        .unwrap_err();

    assert!(matches!(err, InferenceError::Timeout(_)));
}

#[tokio::test]
async fn probe_success_loads_the_handle() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("GET", "/status/test-classifier")
        .with_status(200)
        .with_body(r#"{"loaded": true}"#)
        .create_async()
        .await;

    let backend = Arc::new(backend_for(&server));
    let models = ModelHandle::load(backend).await;

    assert!(models.is_loaded());
    assert!(models.unavailable_reason().is_none());
    mock.assert_async().await;
}

#[tokio::test]
async fn probe_unloaded_model_leaves_handle_degraded() {
    let mut server = mockito::Server::new_async().await;

    let _mock = server
        .mock("GET", "/status/test-classifier")
        .with_status(200)
        .with_body(r#"{"loaded": false}"#)
        .create_async()
        .await;

    let backend = Arc::new(backend_for(&server));
    let models = ModelHandle::load(backend).await;

    assert!(!models.is_loaded());
    let reason = models.unavailable_reason().expect("reason");
    assert!(reason.contains("test-classifier"));
}

#[tokio::test]
async fn probe_http_error_leaves_handle_degraded() {
    let mut server = mockito::Server::new_async().await;

    let _mock = server
        .mock("GET", "/status/test-classifier")
        .with_status(500)
        .with_body("backend down")
        .create_async()
        .await;

    let backend = Arc::new(backend_for(&server));
    let models = ModelHandle::load(backend).await;

    assert!(!models.is_loaded());
    assert!(models.backend().is_none());
}
