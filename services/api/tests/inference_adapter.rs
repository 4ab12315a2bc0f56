//! services/api/tests/inference_adapter.rs
//!
//! Exercises `GeminiInferenceAdapter` against a mock chat-completions endpoint.

use api_lib::adapters::GeminiInferenceAdapter;
use bytes::Bytes;
use kitchen_king_core::{
    request::response_schema, ImageInput, InferenceRequest, InferenceService,
};
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn completion(content: Option<&str>) -> Value {
    let choices = match content {
        Some(text) => json!([{
            "index": 0,
            "message": {"role": "assistant", "content": text},
            "finish_reason": "stop"
        }]),
        None => json!([]),
    };
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "created": 1_700_000_000,
        "model": "gemini-3-flash-preview",
        "choices": choices
    })
}

fn adapter(server: &MockServer) -> GeminiInferenceAdapter {
    let client = GeminiInferenceAdapter::client_for("test-key", &server.uri());
    GeminiInferenceAdapter::new(
        client,
        "gemini-3-flash-preview".to_string(),
        "gemini-3-flash-lite".to_string(),
    )
}

fn photo_request() -> InferenceRequest {
    InferenceRequest {
        instruction: "Analyze this image of refrigerator contents.".to_string(),
        image: Some(ImageInput {
            mime_type: "image/jpeg".to_string(),
            data: Bytes::from_static(b"abc"),
        }),
        response_schema: response_schema(),
    }
}

#[tokio::test]
async fn structured_request_uses_json_schema_and_inline_image() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "model": "gemini-3-flash-preview",
            "reasoning_effort": "none",
            "response_format": {
                "type": "json_schema",
                "json_schema": {"name": "kitchen_analysis"}
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(Some("{\"ok\":true}"))))
        .expect(1)
        .mount(&mock_server)
        .await;

    let raw = adapter(&mock_server)
        .generate_structured(&photo_request())
        .await
        .unwrap();
    assert_eq!(raw, "{\"ok\":true}");

    let requests = mock_server.received_requests().await.unwrap();
    let body: Value = requests[0].body_json().unwrap();
    let parts = body["messages"][0]["content"].as_array().unwrap();
    assert_eq!(parts[0]["type"], "image_url");
    assert_eq!(parts[0]["image_url"]["url"], "data:image/jpeg;base64,YWJj");
    assert_eq!(parts[1]["type"], "text");
    assert!(body["response_format"]["json_schema"]["schema"]["required"]
        .as_array()
        .unwrap()
        .contains(&json!("recipes")));
}

#[tokio::test]
async fn text_request_uses_the_substitution_model_without_schema() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({"model": "gemini-3-flash-lite"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(completion(Some("Use curd instead."))),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let reply = adapter(&mock_server)
        .generate_text("What replaces yogurt?")
        .await
        .unwrap();
    assert_eq!(reply, "Use curd instead.");

    let requests = mock_server.received_requests().await.unwrap();
    let body: Value = requests[0].body_json().unwrap();
    assert!(body.get("response_format").is_none());
}

fn api_error(kind: &str) -> Value {
    json!({"error": {"message": "try again later", "type": kind, "param": null, "code": null}})
}

#[tokio::test]
async fn server_error_is_reported_once_without_retrying() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_json(api_error("server_error")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = adapter(&mock_server).generate_structured(&photo_request()).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn rate_limit_is_reported_once_without_retrying() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_json(api_error("rate_limit_exceeded")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = adapter(&mock_server).generate_text("Suggest a substitute").await;
    assert!(result.is_err());
    let received = mock_server.received_requests().await.unwrap_or_default();
    assert_eq!(received.len(), 1);
}

#[tokio::test]
async fn empty_choices_and_blank_content_are_errors() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(None)))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(Some("   "))))
        .mount(&mock_server)
        .await;

    let adapter = adapter(&mock_server);
    assert!(adapter.generate_structured(&photo_request()).await.is_err());
    assert!(adapter.generate_text("anything").await.is_err());
}
