//! Provider adapter tests against local mock servers.
//!
//! Each adapter is pointed at a `wiremock` server through its base-URL
//! variable, so these run offline and make no real API calls.

use image::{DynamicImage, RgbImage};
use pretty_assertions::assert_eq;
use recipe_pdf2json::{
    convert_images, ConversionConfig, ErrorKind, PageImage, ProviderKind, RecipeError,
    StaticCredentials,
};
use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Test helpers ─────────────────────────────────────────────────────────────

const SOUP_JSON: &str = r#"{"title": "Test Soup", "servings": 4, "ingredients": [{"item": "water", "amount": "1 l"}], "instructions": ["Boil the water."], "tags": ["soup"]}"#;

fn pages(n: usize) -> Vec<PageImage> {
    (1..=n)
        .map(|i| PageImage::new(i, 150, DynamicImage::ImageRgb8(RgbImage::new(4, 4))))
        .collect()
}

fn config(kind: ProviderKind, creds: StaticCredentials) -> ConversionConfig {
    ConversionConfig::builder()
        .provider_kind(kind)
        .credentials(Arc::new(creds))
        .request_timeout_secs(10)
        .build()
        .unwrap()
}

fn openai_config(server: &MockServer) -> ConversionConfig {
    config(
        ProviderKind::OpenAi,
        StaticCredentials::new()
            .with("OPENAI_API_KEY", "sk-test")
            .with("OPENAI_BASE_URL", format!("{}/v1", server.uri())),
    )
}

fn anthropic_config(server: &MockServer) -> ConversionConfig {
    config(
        ProviderKind::Anthropic,
        StaticCredentials::new()
            .with("ANTHROPIC_API_KEY", "sk-ant-test")
            .with("ANTHROPIC_BASE_URL", server.uri()),
    )
}

fn ollama_config(url: &str) -> ConversionConfig {
    config(
        ProviderKind::Ollama,
        StaticCredentials::new().with("OLLAMA_URL", url),
    )
}

fn openai_reply(content: &str) -> Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{"index": 0, "message": {"role": "assistant", "content": content}, "finish_reason": "stop"}]
    })
}

fn anthropic_reply(text: &str) -> Value {
    json!({
        "id": "msg_1",
        "type": "message",
        "role": "assistant",
        "content": [{"type": "text", "text": text}],
        "stop_reason": "end_turn"
    })
}

fn expected_soup() -> Value {
    serde_json::from_str(SOUP_JSON).unwrap()
}

// ── OpenAI ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn openai_fenced_reply_parses_to_equal_mapping() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(openai_reply(&format!("```json\n{SOUP_JSON}\n```"))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let recipe = convert_images(&pages(2), &openai_config(&server)).await.unwrap();
    assert_eq!(Value::from(recipe), expected_soup());

    let requests = server.received_requests().await.unwrap();
    let body: Value = requests[0].body_json().unwrap();
    let content = body["messages"][0]["content"].as_array().unwrap();
    assert_eq!(content.len(), 3);
    assert_eq!(content[0]["type"], json!("text"));
    assert_eq!(body["model"], json!("gpt-4o"));
}

#[tokio::test]
async fn openai_missing_key_sends_nothing() {
    let server = MockServer::start().await;
    let config = config(
        ProviderKind::OpenAi,
        StaticCredentials::new().with("OPENAI_BASE_URL", format!("{}/v1", server.uri())),
    );

    let err = convert_images(&pages(1), &config).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert!(err.to_string().contains("OPENAI_API_KEY"));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn openai_malformed_reply_is_content_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(openai_reply("Sorry, I can't read that.")),
        )
        .mount(&server)
        .await;

    let err = convert_images(&pages(1), &openai_config(&server)).await.unwrap_err();
    match err {
        RecipeError::Content { provider, raw, .. } => {
            assert_eq!(provider, "openai");
            assert_eq!(raw, "Sorry, I can't read that.");
        }
        other => panic!("expected Content, got {other:?}"),
    }
}

#[tokio::test]
async fn openai_server_error_is_remote_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let err = convert_images(&pages(1), &openai_config(&server)).await.unwrap_err();
    match err {
        RecipeError::RemoteApi { status, body, .. } => {
            assert_eq!(status, 500);
            assert_eq!(body, "upstream exploded");
        }
        other => panic!("expected RemoteApi, got {other:?}"),
    }
}

#[tokio::test]
async fn openai_null_content_is_content_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": null}}]
        })))
        .mount(&server)
        .await;

    let err = convert_images(&pages(1), &openai_config(&server)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Content);
}

// ── Anthropic ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn anthropic_sends_headers_and_parses_plain_json() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "sk-ant-test"))
        .and(header("anthropic-version", "2023-06-01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(anthropic_reply(SOUP_JSON)))
        .expect(1)
        .mount(&server)
        .await;

    let recipe = convert_images(&pages(2), &anthropic_config(&server)).await.unwrap();
    assert_eq!(recipe.title(), Some("Test Soup"));
    assert_eq!(Value::from(recipe), expected_soup());

    let requests = server.received_requests().await.unwrap();
    let body: Value = requests[0].body_json().unwrap();
    let content = body["messages"][0]["content"].as_array().unwrap();
    assert_eq!(content[0]["type"], json!("image"));
    assert_eq!(content[1]["type"], json!("image"));
    assert_eq!(content[2]["type"], json!("text"));
}

#[tokio::test]
async fn anthropic_missing_key_sends_nothing() {
    let server = MockServer::start().await;
    let config = config(
        ProviderKind::Anthropic,
        StaticCredentials::new().with("ANTHROPIC_BASE_URL", server.uri()),
    );

    let err = convert_images(&pages(1), &config).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert!(err.to_string().contains("ANTHROPIC_API_KEY"));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn anthropic_rate_limit_is_remote_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "type": "error",
            "error": {"type": "rate_limit_error", "message": "slow down"}
        })))
        .mount(&server)
        .await;

    let err = convert_images(&pages(1), &anthropic_config(&server)).await.unwrap_err();
    match err {
        RecipeError::RemoteApi { status, body, .. } => {
            assert_eq!(status, 429);
            assert!(body.contains("rate_limit_error"));
        }
        other => panic!("expected RemoteApi, got {other:?}"),
    }
}

// ── Ollama ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn ollama_sends_raw_base64_and_parses_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "llama3.2-vision",
            "response": SOUP_JSON,
            "done": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let recipe = convert_images(&pages(2), &ollama_config(&server.uri())).await.unwrap();
    assert_eq!(Value::from(recipe), expected_soup());

    let requests = server.received_requests().await.unwrap();
    let body: Value = requests[0].body_json().unwrap();
    assert_eq!(body["stream"], json!(false));
    assert_eq!(body["format"], json!("json"));
    let images = body["images"].as_array().unwrap();
    assert_eq!(images.len(), 2);
    assert!(!images[0].as_str().unwrap().starts_with("data:"));
}

#[tokio::test]
async fn ollama_missing_response_field_is_content_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"done": true})))
        .mount(&server)
        .await;

    let err = convert_images(&pages(1), &ollama_config(&server.uri())).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Content);
}

#[tokio::test]
async fn ollama_unknown_model_is_remote_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(
            ResponseTemplate::new(404).set_body_string(r#"{"error":"model not found"}"#),
        )
        .mount(&server)
        .await;

    let err = convert_images(&pages(1), &ollama_config(&server.uri())).await.unwrap_err();
    match err {
        RecipeError::RemoteApi { status, body, .. } => {
            assert_eq!(status, 404);
            assert!(body.contains("model not found"));
        }
        other => panic!("expected RemoteApi, got {other:?}"),
    }
}

#[tokio::test]
async fn ollama_refused_connection_is_connectivity_error() {
    let err = convert_images(&pages(1), &ollama_config("http://127.0.0.1:1"))
        .await
        .unwrap_err();
    match err {
        RecipeError::Connectivity { provider, endpoint, .. } => {
            assert_eq!(provider, "ollama");
            assert_eq!(endpoint, "http://127.0.0.1:1/api/generate");
        }
        other => panic!("expected Connectivity, got {other:?}"),
    }
}

// ── Shared behaviour ─────────────────────────────────────────────────────────

#[tokio::test]
async fn empty_image_list_is_rejected_without_a_request() {
    let server = MockServer::start().await;

    let configs = [
        openai_config(&server),
        anthropic_config(&server),
        ollama_config(&server.uri()),
    ];
    for config in &configs {
        let err = convert_images(&[], config).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyDocument);
        assert!(matches!(err, RecipeError::NoPageImages { .. }), "got {err:?}");
    }
    assert!(server.received_requests().await.unwrap().is_empty());
}
