//! Integration tests for the OpenRouter backend against a mock server.
//!
//! Verifies the multimodal request body, authentication and attribution
//! headers, and error mapping for non-success responses.

use fleetlog_core::{ChatBackend, ChatOptions, Error, UserPart};
use fleetlog_inference::{OpenRouterBackend, OpenRouterConfig};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn chat_response(content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "gen-123",
        "choices": [{
            "index": 0,
            "message": {
                "role": "assistant",
                "content": content
            },
            "finish_reason": "stop"
        }],
        "usage": {
            "prompt_tokens": 900,
            "completion_tokens": 40,
            "total_tokens": 940
        }
    })
}

fn config_for(server: &MockServer) -> OpenRouterConfig {
    OpenRouterConfig {
        base_url: server.uri(),
        api_key: Some("test-key".to_string()),
        model: "openai/gpt-4o".to_string(),
        timeout_seconds: 60,
        http_referer: None,
        x_title: None,
    }
}

#[tokio::test]
async fn test_complete_sends_multimodal_body() {
    let mock_server = MockServer::start().await;

    // Temperature, system message, and both part kinds must be on the wire.
    let expected_body = serde_json::json!({
        "model": "openai/gpt-4o",
        "temperature": 0.0,
        "messages": [
            {"role": "system", "content": "You extract structured data."},
            {"role": "user", "content": [
                {"type": "text", "text": "Extract the table."},
                {"type": "image_url", "image_url": {"url": "data:image/png;base64,AAAA"}}
            ]}
        ]
    });

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("Authorization", "Bearer test-key"))
        .and(header("Content-Type", "application/json"))
        .and(body_partial_json(&expected_body))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_response("{\"msn\": \"4521\"}")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let backend = OpenRouterBackend::new(config_for(&mock_server)).unwrap();
    let parts = vec![
        UserPart::Text("Extract the table.".to_string()),
        UserPart::ImageUrl("data:image/png;base64,AAAA".to_string()),
    ];

    let result = backend
        .complete(
            "You extract structured data.",
            &parts,
            ChatOptions { temperature: 0.0 },
        )
        .await;

    assert_eq!(result.unwrap(), "{\"msn\": \"4521\"}");
}

#[tokio::test]
async fn test_attribution_headers_sent_when_configured() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("HTTP-Referer", "https://fleetlog.example"))
        .and(header("X-Title", "Fleetlog"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_response("ok")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = OpenRouterConfig {
        http_referer: Some("https://fleetlog.example".to_string()),
        x_title: Some("Fleetlog".to_string()),
        ..config_for(&mock_server)
    };
    let backend = OpenRouterBackend::new(config).unwrap();

    let result = backend
        .complete("", &[UserPart::Text("ping".to_string())], ChatOptions::default())
        .await;
    assert!(result.is_ok(), "Request should succeed: {:?}", result.err());
}

#[tokio::test]
async fn test_api_error_maps_to_inference_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
            "error": {"message": "Rate limit exceeded", "type": "rate_limit"}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let backend = OpenRouterBackend::new(config_for(&mock_server)).unwrap();
    let err = backend
        .complete("", &[UserPart::Text("ping".to_string())], ChatOptions::default())
        .await
        .unwrap_err();

    match err {
        Error::Inference(message) => {
            assert!(message.contains("429"), "got: {}", message);
            assert!(message.contains("Rate limit exceeded"), "got: {}", message);
        }
        other => panic!("Expected Inference error, got: {:?}", other),
    }
}

#[tokio::test]
async fn test_empty_choices_is_inference_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "gen-123",
            "choices": [],
            "usage": null
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let backend = OpenRouterBackend::new(config_for(&mock_server)).unwrap();
    let err = backend
        .complete("", &[UserPart::Text("ping".to_string())], ChatOptions::default())
        .await
        .unwrap_err();

    match err {
        Error::Inference(message) => assert!(message.contains("no choices"), "got: {}", message),
        other => panic!("Expected Inference error, got: {:?}", other),
    }
}

#[tokio::test]
async fn test_null_content_is_inference_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "gen-123",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": null},
                "finish_reason": "stop"
            }],
            "usage": null
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let backend = OpenRouterBackend::new(config_for(&mock_server)).unwrap();
    let err = backend
        .complete("", &[UserPart::Text("ping".to_string())], ChatOptions::default())
        .await
        .unwrap_err();

    match err {
        Error::Inference(message) => assert!(message.contains("no content"), "got: {}", message),
        other => panic!("Expected Inference error, got: {:?}", other),
    }
}

#[tokio::test]
async fn test_health_check_against_models_endpoint() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": []})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let backend = OpenRouterBackend::new(config_for(&mock_server)).unwrap();
    assert!(backend.health_check().await.unwrap());
}

#[tokio::test]
async fn test_health_check_false_on_unreachable_endpoint() {
    let config = OpenRouterConfig {
        base_url: "http://127.0.0.1:9".to_string(),
        ..OpenRouterConfig::default()
    };
    let backend = OpenRouterBackend::new(config).unwrap();
    assert!(!backend.health_check().await.unwrap());
}
