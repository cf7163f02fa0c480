/*!
 * Integration tests for the HTTP routes
 */

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use serde_json::{Value, json};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

use qamus::providers::mock::{MockProvider, MockReply};
use qamus::server::{AppContext, router};
use qamus::speech::SpeechService;

use crate::common::{is_word_call, service_with};

/// Router backed by `provider`, with speech written to `speech_dir`
fn test_router(provider: &MockProvider, speech_dir: Option<&TempDir>) -> Router {
    let speech = speech_dir.map(|dir| SpeechService::new(Arc::new(provider.clone()), dir.path()));
    router(AppContext::new(service_with(provider), speech))
}

/// Send one request and decode the JSON body
async fn send(app: &Router, method: Method, path: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(path);
    let request = match body {
        Some(json_body) => builder
            .header("content-type", "application/json")
            .body(Body::from(json_body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, value)
}

#[tokio::test]
async fn test_health_endpoint_shouldReportOk() {
    let app = test_router(&MockProvider::working(), None);

    let (status, body) = send(&app, Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn test_lookupWord_endpoint_shouldReturnEntry() {
    let app = test_router(&MockProvider::working(), None);

    let (status, body) = send(&app, Method::POST, "/lookup/word", Some(json!({"input": "كتاب"}))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["word"], "كتاب");
    assert!(body["attributes"].is_object());
}

#[tokio::test]
async fn test_lookupWord_endpoint_withLatinInput_shouldBe400() {
    let provider = MockProvider::working();
    let app = test_router(&provider, None);

    let (status, body) = send(&app, Method::POST, "/lookup/word", Some(json!({"input": "book"}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_input");
    assert!(body["detail"].as_str().unwrap().contains("book"));
    assert_eq!(provider.request_count(), 0);
}

#[tokio::test]
async fn test_lookupSentenceAsync_endpoint_shouldReturnNullPlaceholders() {
    let provider = MockProvider::scripted(|request| {
        if is_word_call(request) {
            MockReply::text("garbage")
        } else {
            MockReply::text(MockProvider::default_reply(request))
        }
    });
    let app = test_router(&provider, None);

    let (status, body) = send(&app, Method::POST, "/lookup/sentence/async", Some(json!({"input": "ذهب الولد"}))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["translation"], "[EN] ذهب الولد");
    assert_eq!(body["words"], json!([null, null]));
    assert_eq!(provider.request_count(), 3);
}

#[tokio::test]
async fn test_lookupSentence_endpoint_shouldMakeSingleCall() {
    let provider = MockProvider::working();
    let app = test_router(&provider, None);

    let (status, body) = send(&app, Method::POST, "/lookup/sentence", Some(json!({"input": "ذهب الولد إلى المدرسة"}))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["words"].as_array().unwrap().len(), 4);
    assert_eq!(body["words"][3]["word"], "المدرسة");
    assert_eq!(provider.request_count(), 1);
}

#[tokio::test]
async fn test_lookupSentence_endpoint_withServiceReportedError_shouldBe400() {
    let provider = MockProvider::scripted(|_| MockReply::text(r#"{"error": "not a sentence"}"#));
    let app = test_router(&provider, None);

    let (status, body) = send(&app, Method::POST, "/lookup/sentence", Some(json!({"input": "ذهب"}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_input");
}

#[tokio::test]
async fn test_endpoints_withMalformedBody_shouldReturnInvalidInputEnvelope() {
    let provider = MockProvider::working();
    let app = test_router(&provider, None);

    for path in ["/lookup/word", "/lookup/sentence", "/lookup/sentence/async", "/speech"] {
        let (status, body) = send(&app, Method::POST, path, Some(json!({"text": "ذهب"}))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "path {}", path);
        assert_eq!(body["error"], "invalid_input", "path {}", path);
        assert!(body["detail"].as_str().unwrap().contains("input"), "path {}", path);
    }

    let request = Request::builder()
        .method(Method::POST)
        .uri("/lookup/word")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], "invalid_input");

    assert_eq!(provider.request_count(), 0);
}

#[tokio::test]
async fn test_lookupSentence_endpoint_withQuotaError_shouldBe429() {
    let app = test_router(&MockProvider::rate_limited(), None);

    let (status, body) = send(&app, Method::POST, "/lookup/sentence", Some(json!({"input": "ذهب الولد"}))).await;

    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"], "rate_limited");
}

#[tokio::test]
async fn test_lookupSentence_endpoint_withUnreachableService_shouldBe503() {
    let app = test_router(&MockProvider::unreachable(), None);

    let (status, body) = send(&app, Method::POST, "/lookup/sentence", Some(json!({"input": "ذهب"}))).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "service_unavailable");
}

#[tokio::test]
async fn test_speech_endpoint_shouldReturnFilename() {
    let dir = TempDir::new().unwrap();
    let app = test_router(&MockProvider::working(), Some(&dir));

    let (status, body) = send(&app, Method::POST, "/speech", Some(json!({"input": "مرحبا"}))).await;

    assert_eq!(status, StatusCode::OK);
    let filename = body["filename"].as_str().unwrap();
    assert!(filename.ends_with(".mp3"));
    assert!(dir.path().join(filename).exists());
}

#[tokio::test]
async fn test_speech_endpoint_withoutSpeechProvider_shouldBe500() {
    let app = test_router(&MockProvider::working(), None);

    let (status, body) = send(&app, Method::POST, "/speech", Some(json!({"input": "مرحبا"}))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "unexpected_service_error");
}
