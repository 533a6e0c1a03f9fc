use std::time::Duration;

use pretty_assertions::assert_eq;
use scribe_client::{ActionKind, ApiError, ClientSettings, GenerateRequest, GenerationApi, HttpApi};
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn settings(server: &MockServer) -> ClientSettings {
    ClientSettings::new(Url::parse(&server.uri()).unwrap(), "test-csrf-token")
}

fn request(title: &str) -> GenerateRequest {
    GenerateRequest {
        title: title.to_string(),
        ..GenerateRequest::default()
    }
}

#[tokio::test]
async fn generate_returns_content_and_sends_csrf_header() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate_abstract_cn"))
        .and(header("X-CSRFToken", "test-csrf-token"))
        .and(body_partial_json(json!({"title": "AI in Education"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "abstract_cn": "This paper studies...",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = HttpApi::new(settings(&server)).unwrap();
    let content = api
        .generate(ActionKind::AbstractCn, &request("AI in Education"))
        .await
        .expect("generate ok");

    assert_eq!(content, "This paper studies...");
}

#[tokio::test]
async fn generate_omits_unused_fields_and_sends_word_count_for_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate_paper_body"))
        .and(body_partial_json(json!({"title": "T", "word_count": 3000})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "body": "",
        })))
        .mount(&server)
        .await;

    let api = HttpApi::new(settings(&server)).unwrap();
    let mut body_request = request("T");
    body_request.outline = Some("1. A".to_string());
    body_request.word_count = Some(3000);

    let content = api
        .generate(ActionKind::Body, &body_request)
        .await
        .expect("generate ok");
    assert_eq!(content, "");
}

#[tokio::test]
async fn server_rejection_carries_the_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate_references"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "message": "generation quota exceeded",
        })))
        .mount(&server)
        .await;

    let api = HttpApi::new(settings(&server)).unwrap();
    let err = api
        .generate(ActionKind::References, &request("T"))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        ApiError::Rejected {
            message: Some("generation quota exceeded".to_string()),
        }
    );
    assert!(!err.is_transport());
}

#[tokio::test]
async fn validation_failure_with_envelope_maps_to_rejection() {
    // The backend answers 400 but still sends the JSON envelope.
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate_abstract_en"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "success": false,
            "message": "title too long",
        })))
        .mount(&server)
        .await;

    let api = HttpApi::new(settings(&server)).unwrap();
    let err = api
        .generate(ActionKind::AbstractEn, &request("T"))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        ApiError::Rejected {
            message: Some("title too long".to_string()),
        }
    );
}

#[tokio::test]
async fn bare_http_error_maps_to_transport() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate_keywords_cn"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let api = HttpApi::new(settings(&server)).unwrap();
    let err = api
        .generate(ActionKind::KeywordsCn, &request("T"))
        .await
        .unwrap_err();

    assert_eq!(err, ApiError::HttpStatus(500));
    assert!(err.is_transport());
}

#[tokio::test]
async fn slow_response_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate_acknowledgement"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_json(json!({"success": true, "acknowledgement": "thanks"})),
        )
        .mount(&server)
        .await;

    let mut settings = settings(&server);
    settings.request_timeout = Duration::from_millis(50);
    let api = HttpApi::new(settings).unwrap();

    let err = api
        .generate(ActionKind::Acknowledgement, &request("T"))
        .await
        .unwrap_err();
    assert_eq!(err, ApiError::Timeout);
}

#[tokio::test]
async fn missing_content_field_is_an_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate_keywords_en"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .mount(&server)
        .await;

    let api = HttpApi::new(settings(&server)).unwrap();
    let err = api
        .generate(ActionKind::KeywordsEn, &request("T"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidResponse(_)));
}

#[tokio::test]
async fn status_is_fetched_without_csrf() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "progress": 0.42,
            "current_section": "3. Results",
            "content": "partial text",
            "in_progress": true,
        })))
        .mount(&server)
        .await;

    let api = HttpApi::new(settings(&server)).unwrap();
    let report = api.status().await.expect("status ok");

    assert_eq!(report.progress, 0.42);
    assert_eq!(report.current_section, "3. Results");
    assert_eq!(report.content.as_deref(), Some("partial text"));
    assert!(report.in_progress);
}

#[tokio::test]
async fn stop_maps_success_and_refusal() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/stop"))
        .and(header("X-CSRFToken", "test-csrf-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/stop"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "message": "no job running",
        })))
        .mount(&server)
        .await;

    let api = HttpApi::new(settings(&server)).unwrap();
    api.stop().await.expect("stop ok");
    let err = api.stop().await.unwrap_err();
    assert_eq!(
        err,
        ApiError::Rejected {
            message: Some("no job running".to_string()),
        }
    );
}

#[tokio::test]
async fn parse_outline_returns_section_count() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/parse_outline"))
        .and(body_partial_json(json!({"outline_text": "1. A\n2. B"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "section_count": 2,
        })))
        .mount(&server)
        .await;

    let api = HttpApi::new(settings(&server)).unwrap();
    let count = api.parse_outline("1. A\n2. B").await.expect("parse ok");
    assert_eq!(count, 2);
}

#[tokio::test]
async fn parse_outline_failure_uses_the_error_field() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/parse_outline"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "error": "no numbered headings found",
        })))
        .mount(&server)
        .await;

    let api = HttpApi::new(settings(&server)).unwrap();
    let err = api.parse_outline("prose only").await.unwrap_err();
    assert_eq!(
        err,
        ApiError::Rejected {
            message: Some("no numbered headings found".to_string()),
        }
    );
}
