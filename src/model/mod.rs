//! Chat model abstraction and built-in provider.

pub mod http;
pub mod openai_compatible;

pub use openai_compatible::OpenAiCompatibleModel;

use async_trait::async_trait;

use crate::error::SwiftAgentError;
use crate::types::{FinishReason, GenerationSettings, ModelMessage, ToolCall, Usage};

/// A request sent to a chat model.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub messages: Vec<ModelMessage>,
    pub settings: GenerationSettings,
    pub tools: Option<Vec<ToolDefinition>>,
}

/// Tool definition sent to the model API.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// Response from a chat model.
#[derive(Debug, Clone)]
pub struct ChatResponse {
    pub text: String,
    pub tool_calls: Vec<ToolCall>,
    pub usage: Usage,
    pub finish_reason: Option<FinishReason>,
}

/// Core trait implemented by chat models.
///
/// The agent only ever talks to a model through this seam, so anything that
/// can turn a message list (plus optional tool definitions) into a response
/// can drive it.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Provider name (e.g., "openai-compatible").
    fn provider_name(&self) -> &str;

    /// The model ID this instance serves.
    fn model_id(&self) -> &str;

    /// Generate a response (non-streaming).
    async fn generate(&self, request: &ChatRequest) -> Result<ChatResponse, SwiftAgentError>;
}
