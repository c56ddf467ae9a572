//! Wire-level tests for the job protocol clients against a mock server.

use assert_matches::assert_matches;
use doclab_client::{
    ApiError, ConversionBackend, ConversionRequest, JobBackend, PrelabelBackend, PrelabelRequest,
};
use doclab_core::normalize;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn prelabel_request() -> PrelabelRequest {
    PrelabelRequest {
        project_name: "oncology-july".to_string(),
        model: "llama3".to_string(),
        system_prompt: "Extract the requested fields.".to_string(),
        qal_file: "questions.json".to_string(),
        token: "tok-123".to_string(),
        questions_and_labels: json!({"age": ["<50", ">=50"]}),
    }
}

#[tokio::test]
async fn prelabel_submit_returns_job_handle_fields() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/prelabel/submit"))
        .respond_with(
            ResponseTemplate::new(202).set_body_json(json!({"job_id": "j-42", "message": "accepted"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let backend = PrelabelBackend::new(server.uri());
    let accepted = backend.submit(&prelabel_request()).await.unwrap();
    assert_eq!(accepted.job_id, "j-42");
    assert_eq!(accepted.message.as_deref(), Some("accepted"));
}

#[tokio::test]
async fn submit_rejection_surfaces_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/prelabel/submit"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"error": "Missing field: model"})),
        )
        .mount(&server)
        .await;

    let backend = PrelabelBackend::new(server.uri());
    let err = backend.submit(&prelabel_request()).await.unwrap_err();
    assert_matches!(err, ApiError::Status { status: 400, ref body } => {
        assert!(body.contains("Missing field"));
    });
}

#[tokio::test]
async fn acceptance_without_job_id_is_a_submission_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/prelabel/submit"))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({"message": "accepted"})))
        .mount(&server)
        .await;

    let backend = PrelabelBackend::new(server.uri());
    assert_matches!(
        backend.submit(&prelabel_request()).await,
        Err(ApiError::MissingJobId)
    );
}

#[tokio::test]
async fn status_payload_feeds_the_normalizer() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/prelabel/status/j-42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "state": "RUNNING",
            "progress": "40",
            "message": "step 2/5",
        })))
        .mount(&server)
        .await;

    let backend = PrelabelBackend::new(server.uri());
    let raw = backend.status("j-42").await.unwrap();
    let status = normalize(&raw);
    assert_eq!(status.state, doclab_core::JobState::Running);
    assert_eq!(status.progress, 0.4);
    assert_eq!(status.message, "step 2/5");
}

#[tokio::test]
async fn status_404_maps_to_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/prelabel/status/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let backend = PrelabelBackend::new(server.uri());
    assert_matches!(backend.status("gone").await, Err(ApiError::NotFound));
}

#[tokio::test]
async fn server_error_is_distinguishable_from_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/prelabel/status/j-42"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let backend = PrelabelBackend::new(server.uri());
    assert_matches!(
        backend.status("j-42").await,
        Err(ApiError::Status { status: 503, .. })
    );
}

#[tokio::test]
async fn cancel_reply_carries_status_and_final_state() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/prelabel/cancel/j-42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "already_finished",
            "state": "done",
        })))
        .mount(&server)
        .await;

    let backend = PrelabelBackend::new(server.uri());
    let reply = backend.cancel("j-42").await.unwrap();
    assert_eq!(reply.status, "already_finished");
    assert_eq!(reply.state.as_deref(), Some("done"));
}

#[tokio::test]
async fn cancel_404_maps_to_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/prelabel/cancel/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let backend = PrelabelBackend::new(server.uri());
    assert_matches!(backend.cancel("gone").await, Err(ApiError::NotFound));
}

#[tokio::test]
async fn conversion_submit_uploads_folder_and_files() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/conversion/submit"))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({"job_id": "c-1"})))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("report.pdf");
    std::fs::write(&pdf, b"%PDF-1.4 test").unwrap();

    let backend = ConversionBackend::new(server.uri());
    let accepted = backend
        .submit(&ConversionRequest {
            folder: "oncology-july".to_string(),
            files: vec![pdf],
        })
        .await
        .unwrap();
    assert_eq!(accepted.job_id, "c-1");

    // The multipart body must carry the folder field and the file part.
    let requests = server.received_requests().await.unwrap();
    let body = String::from_utf8_lossy(&requests[0].body).into_owned();
    assert!(body.contains("name=\"folder\""));
    assert!(body.contains("oncology-july"));
    assert!(body.contains("filename=\"report.pdf\""));
}

#[tokio::test]
async fn conversion_submit_fails_on_unreadable_file() {
    let server = MockServer::start().await;
    let backend = ConversionBackend::new(server.uri());

    let err = backend
        .submit(&ConversionRequest {
            folder: "x".to_string(),
            files: vec!["/definitely/not/there.pdf".into()],
        })
        .await
        .unwrap_err();
    assert_matches!(err, ApiError::File { .. });
}

#[tokio::test]
async fn folder_listing_parses_string_arrays() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/list-subfolders"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["a", "b"])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/list-files"))
        .and(query_param("folder", "a"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["x.pdf"])))
        .mount(&server)
        .await;

    let backend = ConversionBackend::new(server.uri());
    assert_eq!(backend.list_folders().await.unwrap(), vec!["a", "b"]);
    assert_eq!(backend.list_files("a").await.unwrap(), vec!["x.pdf"]);
}
