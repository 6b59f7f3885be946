//! Integration tests for `ChatCompletionsClient` using wiremock HTTP mocks.

use revpost_writer::{ChatCompletionsClient, ContentGenerator, WriterError};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str, api_key: Option<&str>) -> ChatCompletionsClient {
    ChatCompletionsClient::new(
        &format!("{base_url}/v1/"),
        "test-model",
        api_key.map(str::to_string),
        5,
        0.7,
    )
    .expect("client construction should not fail")
}

#[tokio::test]
async fn complete_returns_first_choice_content() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(serde_json::json!({
            "model": "test-model",
            "stream": false,
            "messages": [
                { "role": "system", "content": "system prompt" },
                { "role": "user", "content": "user prompt" }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "chatcmpl-1",
            "choices": [
                { "index": 0, "message": { "role": "assistant", "content": "  ### 제품 소개\n본문  " } }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), None);
    let text = client
        .complete("system prompt", "user prompt")
        .await
        .expect("should return content");

    assert_eq!(text, "### 제품 소개\n본문");
}

#[tokio::test]
async fn complete_sends_bearer_token_when_configured() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{ "message": { "content": "ok" } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), Some("sk-test"));
    assert_eq!(client.complete("s", "u").await.unwrap(), "ok");
}

#[tokio::test]
async fn complete_maps_server_error_to_llm_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("model not loaded"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), None);
    let err = client.complete("s", "u").await.expect_err("500 should fail");
    match err {
        WriterError::Llm(msg) => assert!(msg.contains("model not loaded"), "got: {msg}"),
        other => panic!("expected Llm error, got {other:?}"),
    }
}

#[tokio::test]
async fn complete_rejects_empty_choices() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "choices": [] })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), None);
    assert!(matches!(
        client.complete("s", "u").await,
        Err(WriterError::Llm(_))
    ));
}
