//! OpenAI-compatible Chat Completions provider.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::config::SwiftConfig;
use crate::error::SwiftAgentError;
use crate::types::{ContentPart, FinishReason, ModelMessage, Role, ToolCall, Usage};

use super::http::{bearer_headers, shared_client, status_to_error};
use super::{ChatModel, ChatRequest, ChatResponse};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const PROVIDER_NAME: &str = "openai-compatible";

/// Chat model speaking the OpenAI Chat Completions dialect.
///
/// Works against api.openai.com and any server exposing the same surface
/// (local runtimes, gateways, proxies).
#[derive(Debug)]
pub struct OpenAiCompatibleModel {
    model_id: String,
    api_key: String,
    base_url: String,
}

impl OpenAiCompatibleModel {
    pub fn new(model_id: impl Into<String>, api_key: String, base_url: Option<String>) -> Self {
        Self {
            model_id: model_id.into(),
            api_key,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        }
    }

    /// Resolve credentials from a [`SwiftConfig`].
    ///
    /// Checks the `openai-compatible` provider entry first, then `openai`.
    pub fn from_config(
        model_id: impl Into<String>,
        config: &SwiftConfig,
    ) -> Result<Self, SwiftAgentError> {
        let api_key = config
            .get_api_key(PROVIDER_NAME)
            .or_else(|| config.get_api_key("openai"))
            .ok_or_else(|| SwiftAgentError::Authentication("Missing OPENAI_API_KEY".into()))?;
        let base_url = config
            .get_base_url(PROVIDER_NAME)
            .or_else(|| config.get_base_url("openai"));
        Ok(Self::new(model_id, api_key, base_url))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build_request_body(&self, request: &ChatRequest) -> serde_json::Value {
        let messages = request
            .messages
            .iter()
            .map(message_to_openai)
            .collect::<Vec<_>>();

        let mut body = serde_json::json!({
            "model": self.model_id,
            "messages": messages,
        });

        let obj = body.as_object_mut().unwrap();

        if let Some(max) = request.settings.max_tokens {
            obj.insert("max_tokens".into(), max.into());
        }
        if let Some(temp) = request.settings.temperature {
            obj.insert("temperature".into(), temp.into());
        }
        if let Some(top_p) = request.settings.top_p {
            obj.insert("top_p".into(), top_p.into());
        }
        if let Some(ref stops) = request.settings.stop_sequences {
            obj.insert("stop".into(), serde_json::json!(stops));
        }
        if let Some(seed) = request.settings.seed {
            obj.insert("seed".into(), seed.into());
        }
        if let Some(ref user) = request.settings.user {
            obj.insert("user".into(), user.clone().into());
        }

        if let Some(ref tools) = request.tools {
            if !tools.is_empty() {
                let tool_defs: Vec<serde_json::Value> = tools
                    .iter()
                    .map(|t| {
                        serde_json::json!({
                            "type": "function",
                            "function": {
                                "name": t.name,
                                "description": t.description,
                                "parameters": t.parameters,
                            }
                        })
                    })
                    .collect();
                obj.insert("tools".into(), tool_defs.into());
            }
        }

        body
    }
}

#[async_trait]
impl ChatModel for OpenAiCompatibleModel {
    fn provider_name(&self) -> &str {
        PROVIDER_NAME
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn generate(&self, request: &ChatRequest) -> Result<ChatResponse, SwiftAgentError> {
        let body = self.build_request_body(request);
        let url = format!("{}/chat/completions", self.base_url);

        debug!(model = %self.model_id, "chat completions request");

        let resp = shared_client()
            .post(&url)
            .headers(bearer_headers(&self.api_key))
            .json(&body)
            .send()
            .await?;

        let status = resp.status().as_u16();
        if status != 200 {
            let body_text = resp.text().await.unwrap_or_default();
            return Err(status_to_error(status, &body_text));
        }

        let data: OpenAiChatResponse = resp.json().await?;
        let choice = data
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| SwiftAgentError::api(200, "No choices in chat completions response"))?;

        let tool_calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|tc| ToolCall {
                id: tc.id,
                name: tc.function.name,
                arguments: serde_json::from_str(&tc.function.arguments)
                    .unwrap_or(serde_json::Value::String(tc.function.arguments)),
            })
            .collect();

        let finish_reason = choice.finish_reason.as_deref().and_then(parse_finish_reason);

        Ok(ChatResponse {
            text: choice.message.content.unwrap_or_default(),
            tool_calls,
            usage: data
                .usage
                .map(|u| Usage {
                    input_tokens: u.prompt_tokens,
                    output_tokens: u.completion_tokens,
                    total_tokens: u.total_tokens,
                })
                .unwrap_or_default(),
            finish_reason,
        })
    }
}

fn parse_finish_reason(s: &str) -> Option<FinishReason> {
    match s {
        "stop" => Some(FinishReason::Stop),
        "length" => Some(FinishReason::Length),
        "tool_calls" => Some(FinishReason::ToolCalls),
        "content_filter" => Some(FinishReason::ContentFilter),
        _ => None,
    }
}

fn message_to_openai(msg: &ModelMessage) -> serde_json::Value {
    let role = match msg.role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
        Role::Tool => "tool",
    };

    // Simple single-part messages
    if msg.content.len() == 1 {
        if let ContentPart::Text { ref text } = msg.content[0] {
            return serde_json::json!({ "role": role, "content": text });
        }
        if let ContentPart::ToolResult(ref tr) = msg.content[0] {
            return serde_json::json!({
                "role": "tool",
                "tool_call_id": tr.tool_call_id,
                "content": tr.result.to_string(),
            });
        }
    }

    // Assistant message carrying tool calls (and maybe text)
    let tool_calls = msg.tool_calls();
    if !tool_calls.is_empty() {
        let tc_json: Vec<serde_json::Value> = tool_calls
            .iter()
            .map(|tc| {
                serde_json::json!({
                    "id": tc.id,
                    "type": "function",
                    "function": {
                        "name": tc.name,
                        "arguments": tc.arguments.to_string(),
                    }
                })
            })
            .collect();
        let text = msg.text();
        return serde_json::json!({
            "role": role,
            "content": if text.is_empty() { serde_json::Value::Null } else { serde_json::Value::String(text) },
            "tool_calls": tc_json,
        });
    }

    serde_json::json!({ "role": role, "content": msg.text() })
}

// Chat Completions response types (internal)

#[derive(Deserialize)]
struct OpenAiChatResponse {
    choices: Vec<OpenAiChoice>,
    usage: Option<OpenAiUsage>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct OpenAiMessage {
    content: Option<String>,
    tool_calls: Option<Vec<OpenAiToolCall>>,
}

#[derive(Deserialize)]
struct OpenAiToolCall {
    id: String,
    function: OpenAiFunction,
}

#[derive(Deserialize)]
struct OpenAiFunction {
    name: String,
    arguments: String,
}

#[derive(Deserialize)]
struct OpenAiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ToolDefinition;
    use crate::types::GenerationSettings;
    use serde_json::json;

    fn test_model() -> OpenAiCompatibleModel {
        OpenAiCompatibleModel::new("gpt-4o-mini", "sk-test".into(), None)
    }

    #[test]
    fn default_base_url_is_openai() {
        assert_eq!(test_model().base_url(), DEFAULT_BASE_URL);
    }

    #[test]
    fn from_config_prefers_compatible_provider_entry() {
        let config = SwiftConfig::new();
        config.set_api_key("openai", "sk-openai".to_string());
        config.set_api_key("openai-compatible", "sk-compat".to_string());
        config.set_base_url("openai-compatible", "http://localhost:1234/v1".to_string());

        let model = OpenAiCompatibleModel::from_config("local-model", &config).unwrap();
        assert_eq!(model.api_key, "sk-compat");
        assert_eq!(model.base_url(), "http://localhost:1234/v1");
    }

    #[test]
    fn from_config_without_credentials_fails() {
        let config = SwiftConfig::new();
        let err = OpenAiCompatibleModel::from_config("gpt-4o", &config).unwrap_err();
        assert!(matches!(err, SwiftAgentError::Authentication(_)));
    }

    #[test]
    fn request_body_includes_settings_and_tools() {
        let request = ChatRequest {
            messages: vec![ModelMessage::user("hi")],
            settings: GenerationSettings {
                max_tokens: Some(256),
                temperature: Some(0.2),
                ..Default::default()
            },
            tools: Some(vec![ToolDefinition {
                name: "search".into(),
                description: "query index".into(),
                parameters: json!({"type": "object", "properties": {}}),
            }]),
        };

        let body = test_model().build_request_body(&request);
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["max_tokens"], 256);
        assert_eq!(body["temperature"], 0.2);
        assert_eq!(body["tools"][0]["function"]["name"], "search");
        assert_eq!(body["messages"][0]["content"], "hi");
    }

    #[test]
    fn assistant_tool_calls_serialize_with_stringified_arguments() {
        let message = ModelMessage {
            role: Role::Assistant,
            content: vec![ContentPart::ToolCall(ToolCall {
                id: "call_1".into(),
                name: "search".into(),
                arguments: json!({"q": "rust"}),
            })],
            timestamp: None,
        };

        let wire = message_to_openai(&message);
        assert_eq!(wire["role"], "assistant");
        assert_eq!(wire["content"], serde_json::Value::Null);
        assert_eq!(wire["tool_calls"][0]["function"]["name"], "search");
        assert_eq!(
            wire["tool_calls"][0]["function"]["arguments"],
            r#"{"q":"rust"}"#
        );
    }

    #[test]
    fn tool_result_serializes_with_call_id() {
        let message = ModelMessage::tool_result("call_7", json!({"count": 3}), false);
        let wire = message_to_openai(&message);
        assert_eq!(wire["role"], "tool");
        assert_eq!(wire["tool_call_id"], "call_7");
        assert_eq!(wire["content"], r#"{"count":3}"#);
    }

    #[test]
    fn finish_reasons_parse() {
        assert_eq!(parse_finish_reason("stop"), Some(FinishReason::Stop));
        assert_eq!(
            parse_finish_reason("tool_calls"),
            Some(FinishReason::ToolCalls)
        );
        assert_eq!(parse_finish_reason("mystery"), None);
    }
}
