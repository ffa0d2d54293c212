//! Convenience re-exports for common use.

pub use crate::agent::{AgentRunResult, ReactAgent, SwiftAgent, SwiftAgentOptions};
pub use crate::config::SwiftConfig;
pub use crate::error::{Result, SwiftAgentError};
pub use crate::mcp::{MCPClientOptions, MCPServerConfig, MCPTool, MultiServerMCPClient};
pub use crate::model::{ChatModel, ChatRequest, ChatResponse, OpenAiCompatibleModel, ToolDefinition};
pub use crate::tools::{Tool, ToolArguments, ToolParameters};
pub use crate::types::{
    ContentPart, FinishReason, GenerationSettings, ModelMessage, Role, ToolCall, ToolResult, Usage,
};
