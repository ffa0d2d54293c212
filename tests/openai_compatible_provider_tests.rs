//! Wire-format tests for the OpenAI-compatible provider against a mock server.

use std::sync::Arc;

use serde_json::json;
use swift_agent::error::SwiftAgentError;
use swift_agent::prelude::*;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn model_for(server: &MockServer) -> OpenAiCompatibleModel {
    OpenAiCompatibleModel::new("gpt-4o-mini", "sk-test".into(), Some(server.uri()))
}

fn chat_request(messages: Vec<ModelMessage>) -> ChatRequest {
    ChatRequest {
        messages,
        settings: GenerationSettings::default(),
        tools: None,
    }
}

fn completion_body(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 9, "completion_tokens": 3, "total_tokens": 12 }
    })
}

#[tokio::test]
async fn generate_parses_text_and_usage() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({"model": "gpt-4o-mini"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("Hello there")))
        .expect(1)
        .mount(&server)
        .await;

    let model = model_for(&server);
    let response = model
        .generate(&chat_request(vec![ModelMessage::user("Hello")]))
        .await
        .expect("generate should succeed");

    assert_eq!(response.text, "Hello there");
    assert_eq!(response.usage.total_tokens, 12);
    assert_eq!(response.finish_reason, Some(FinishReason::Stop));
    assert!(response.tool_calls.is_empty());
}

#[tokio::test]
async fn generate_parses_tool_calls_with_json_arguments() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_abc",
                        "type": "function",
                        "function": {
                            "name": "mcp__math__add",
                            "arguments": "{\"a\": 13, \"b\": 74}"
                        }
                    }]
                },
                "finish_reason": "tool_calls"
            }]
        })))
        .mount(&server)
        .await;

    let model = model_for(&server);
    let response = model
        .generate(&chat_request(vec![ModelMessage::user("add")]))
        .await
        .expect("generate should succeed");

    assert_eq!(response.finish_reason, Some(FinishReason::ToolCalls));
    assert_eq!(response.tool_calls.len(), 1);
    let call = &response.tool_calls[0];
    assert_eq!(call.id, "call_abc");
    assert_eq!(call.name, "mcp__math__add");
    assert_eq!(call.arguments, json!({"a": 13, "b": 74}));
}

#[tokio::test]
async fn tool_definitions_and_transcript_serialize_onto_the_wire() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("87 x 234 = 20358")))
        .expect(1)
        .mount(&server)
        .await;

    let transcript = vec![
        ModelMessage::system("You are a calculator."),
        ModelMessage::user("add then multiply"),
        ModelMessage {
            role: Role::Assistant,
            content: vec![ContentPart::ToolCall(ToolCall {
                id: "call_abc".into(),
                name: "mcp__math__add".into(),
                arguments: json!({"a": 13, "b": 74}),
            })],
            timestamp: None,
        },
        ModelMessage::tool_result("call_abc", json!({"sum": 87}), false),
    ];

    let model = model_for(&server);
    let response = model
        .generate(&ChatRequest {
            messages: transcript,
            settings: GenerationSettings::default(),
            tools: Some(vec![ToolDefinition {
                name: "mcp__math__add".into(),
                description: "add two numbers".into(),
                parameters: json!({"type": "object"}),
            }]),
        })
        .await
        .expect("generate should succeed");

    assert_eq!(response.text, "87 x 234 = 20358");

    let requests = server.received_requests().await.expect("requests recorded");
    assert_eq!(requests.len(), 1);
    let body: serde_json::Value = requests[0].body_json().expect("request body is JSON");
    assert_eq!(body["tools"][0]["type"], "function");
    assert_eq!(body["tools"][0]["function"]["name"], "mcp__math__add");
    assert_eq!(body["messages"][0]["role"], "system");
    assert_eq!(body["messages"][2]["tool_calls"][0]["id"], "call_abc");
    assert_eq!(
        body["messages"][2]["tool_calls"][0]["function"]["arguments"],
        r#"{"a":13,"b":74}"#
    );
    assert_eq!(body["messages"][3]["role"], "tool");
    assert_eq!(body["messages"][3]["tool_call_id"], "call_abc");
}

#[tokio::test]
async fn unauthorized_maps_to_authentication_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&server)
        .await;

    let model = model_for(&server);
    let err = model
        .generate(&chat_request(vec![ModelMessage::user("hi")]))
        .await
        .expect_err("401 should fail");
    assert!(matches!(err, SwiftAgentError::Authentication(msg) if msg.contains("invalid api key")));
}

#[tokio::test]
async fn rate_limit_maps_with_retry_after() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(429).set_body_string(r#"{"error":{"retry_after":1.5}}"#),
        )
        .mount(&server)
        .await;

    let model = model_for(&server);
    let err = model
        .generate(&chat_request(vec![ModelMessage::user("hi")]))
        .await
        .expect_err("429 should fail");
    assert!(matches!(
        err,
        SwiftAgentError::RateLimited {
            retry_after_ms: Some(1500)
        }
    ));
}

#[tokio::test]
async fn empty_choices_is_an_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let model = model_for(&server);
    let err = model
        .generate(&chat_request(vec![ModelMessage::user("hi")]))
        .await
        .expect_err("empty choices should fail");
    assert!(matches!(err, SwiftAgentError::Api { status: 200, .. }));
}

#[tokio::test]
async fn facade_drives_the_provider_end_to_end() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("four")))
        .expect(1)
        .mount(&server)
        .await;

    let mut agent = SwiftAgent::new(
        Arc::new(model_for(&server)),
        SwiftAgentOptions::default(),
    )
    .expect("agent builds");

    let transcript = agent.run("what is 2+2?").await.expect("run succeeds");
    assert_eq!(transcript.last().expect("assistant reply").text(), "four");
}
