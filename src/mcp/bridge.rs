//! Bridge MCP tools into the crate tool system.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::SwiftAgentError;
use crate::tools::{Tool, ToolArguments, ToolExecutionContext, ToolParameters};

use super::multi::{MCPLoadedTool, MultiServerMCPClient};

/// One MCP-discovered tool, tagged with its owning server and an enabled
/// flag the facade flips between turns.
#[derive(Clone)]
pub struct MCPTool {
    name: String,
    description: String,
    parameters: ToolParameters,
    server_name: String,
    upstream_tool_name: String,
    enabled: bool,
    client: Arc<MultiServerMCPClient>,
}

impl MCPTool {
    pub(crate) fn from_loaded(tool: MCPLoadedTool, client: Arc<MultiServerMCPClient>) -> Self {
        Self {
            name: tool.exposed_name,
            description: tool.description,
            parameters: tool.parameters,
            server_name: tool.server_name,
            upstream_tool_name: tool.upstream_tool_name,
            enabled: true,
            client,
        }
    }

    /// Name of the server this tool came from.
    pub fn server_name(&self) -> &str {
        &self.server_name
    }

    /// Tool name on the server, before namespacing.
    pub fn upstream_tool_name(&self) -> &str {
        &self.upstream_tool_name
    }

    /// Whether the tool is currently passed to the agent.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}

impl std::fmt::Debug for MCPTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MCPTool")
            .field("name", &self.name)
            .field("server_name", &self.server_name)
            .field("enabled", &self.enabled)
            .finish()
    }
}

#[async_trait]
impl Tool for MCPTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters(&self) -> &ToolParameters {
        &self.parameters
    }

    async fn execute(
        &self,
        args: &ToolArguments,
        _ctx: &ToolExecutionContext,
    ) -> Result<serde_json::Value, SwiftAgentError> {
        self.client.call_tool(&self.name, args.raw().clone()).await
    }
}
