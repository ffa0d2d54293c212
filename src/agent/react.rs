//! ReAct-style tool-calling loop over a chat model.

use std::sync::Arc;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::SwiftAgentError;
use crate::model::{ChatModel, ChatRequest, ToolDefinition};
use crate::tools::{Tool, ToolArguments, ToolExecutionContext};
use crate::types::{
    ContentPart, FinishReason, GenerationSettings, ModelMessage, Role, ToolResult, Usage,
};

/// Maximum tool loop iterations to prevent infinite loops.
const MAX_TOOL_ITERATIONS: usize = 20;

/// Result of one agent invocation.
#[derive(Debug, Clone)]
pub struct AgentRunResult {
    /// Final assistant text.
    pub text: String,
    /// Complete transcript including tool traffic.
    pub messages: Vec<ModelMessage>,
    /// Usage accumulated across loop iterations.
    pub usage: Usage,
    pub finish_reason: Option<FinishReason>,
}

/// An agent that reasons with a chat model and acts through tools.
///
/// Stateless across invocations: callers own the message history and pass
/// the full transcript into [`invoke`](Self::invoke).
pub struct ReactAgent {
    model: Arc<dyn ChatModel>,
    tools: Vec<Arc<dyn Tool>>,
    settings: GenerationSettings,
}

impl ReactAgent {
    /// Create an agent from a model and a tool set.
    pub fn new(model: Arc<dyn ChatModel>, tools: Vec<Arc<dyn Tool>>) -> Self {
        Self {
            model,
            tools,
            settings: GenerationSettings::default(),
        }
    }

    /// Set generation settings.
    pub fn with_settings(mut self, settings: GenerationSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Tools available to this agent.
    pub fn tools(&self) -> &[Arc<dyn Tool>] {
        &self.tools
    }

    /// Run the loop over the given transcript until the model stops calling
    /// tools or the iteration cap is hit.
    ///
    /// Tool failures (including calls to unknown tools) are fed back to the
    /// model as error results rather than aborting the run.
    pub async fn invoke(
        &self,
        mut messages: Vec<ModelMessage>,
    ) -> Result<AgentRunResult, SwiftAgentError> {
        let run_id = Uuid::new_v4();
        let tool_defs: Option<Vec<ToolDefinition>> = if self.tools.is_empty() {
            None
        } else {
            Some(
                self.tools
                    .iter()
                    .map(|t| ToolDefinition {
                        name: t.name().to_string(),
                        description: t.description().to_string(),
                        parameters: t.parameters().schema.clone(),
                    })
                    .collect(),
            )
        };

        let mut total_usage = Usage::default();
        let mut last_text = String::new();

        for iteration in 0..MAX_TOOL_ITERATIONS {
            debug!(%run_id, iteration, "agent loop: calling model");
            let request = ChatRequest {
                messages: messages.clone(),
                settings: self.settings.clone(),
                tools: tool_defs.clone(),
            };
            let response = self.model.generate(&request).await?;
            total_usage.merge(&response.usage);

            if response.tool_calls.is_empty() {
                if !response.text.is_empty() {
                    messages.push(ModelMessage::assistant(&response.text));
                }
                return Ok(AgentRunResult {
                    text: response.text,
                    messages,
                    usage: total_usage,
                    finish_reason: response.finish_reason,
                });
            }

            last_text = response.text.clone();

            let mut assistant_content: Vec<ContentPart> = Vec::new();
            if !response.text.is_empty() {
                assistant_content.push(ContentPart::Text {
                    text: response.text,
                });
            }
            for tc in &response.tool_calls {
                assistant_content.push(ContentPart::ToolCall(tc.clone()));
            }
            messages.push(ModelMessage {
                role: Role::Assistant,
                content: assistant_content,
                timestamp: Some(chrono::Utc::now()),
            });

            for tc in &response.tool_calls {
                let ctx = ToolExecutionContext {
                    tool_call_id: Some(tc.id.clone()),
                    tool_name: Some(tc.name.clone()),
                };
                let result = match self.tools.iter().find(|t| t.name() == tc.name) {
                    Some(tool) => {
                        let args = ToolArguments::new(tc.arguments.clone());
                        match tool.execute(&args, &ctx).await {
                            Ok(val) => ToolResult {
                                tool_call_id: tc.id.clone(),
                                result: val,
                                is_error: false,
                            },
                            Err(e) => {
                                warn!(tool = %tc.name, error = %e, "tool execution failed");
                                ToolResult {
                                    tool_call_id: tc.id.clone(),
                                    result: serde_json::json!({"error": e.to_string()}),
                                    is_error: true,
                                }
                            }
                        }
                    }
                    None => {
                        warn!(tool = %tc.name, "tool not found");
                        ToolResult {
                            tool_call_id: tc.id.clone(),
                            result: serde_json::json!({
                                "error": format!("Tool '{}' not found", tc.name)
                            }),
                            is_error: true,
                        }
                    }
                };
                messages.push(ModelMessage::tool_result(
                    result.tool_call_id.clone(),
                    result.result,
                    result.is_error,
                ));
            }
        }

        warn!(%run_id, "agent loop hit the iteration cap");
        Ok(AgentRunResult {
            text: last_text,
            messages,
            usage: total_usage,
            finish_reason: Some(FinishReason::Length),
        })
    }
}
