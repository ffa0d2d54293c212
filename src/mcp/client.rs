//! Client for a single MCP server over a stdio child process.

use rmcp::{
    model::{
        CallToolRequestParams, CallToolResult, ClientInfo, Content, JsonObject, ProtocolVersion,
        ResourceContents,
    },
    service::{ClientInitializeError, DynService, RoleClient, RunningService, ServiceError, ServiceExt},
    transport::TokioChildProcess,
};
use tokio::process::Command;
use tracing::debug;

use crate::error::SwiftAgentError;

use super::config::MCPServerConfig;
use super::schema::MCPToolSchema;

type DynClientService = Box<dyn DynService<RoleClient>>;
pub type MCPRunningService = RunningService<RoleClient, DynClientService>;

/// Result of one MCP tool invocation.
#[derive(Debug, Clone)]
pub struct MCPToolCallResult {
    pub structured_content: Option<serde_json::Value>,
    pub text_content: Option<String>,
    pub content: Vec<serde_json::Value>,
}

impl MCPToolCallResult {
    /// Collapse into a single JSON value: structured content first, then
    /// joined text, then the raw content array.
    pub fn into_value_or_text(self) -> serde_json::Value {
        if let Some(structured) = self.structured_content {
            return structured;
        }
        if let Some(text) = self.text_content {
            return serde_json::Value::String(text);
        }
        serde_json::Value::Array(self.content)
    }
}

/// Client for one Model Context Protocol server.
///
/// [`connect`](Self::connect) spawns the configured command as a child
/// process and completes the initialize handshake through rmcp.
pub struct MCPClient {
    server_name: String,
    session: Option<MCPRunningService>,
}

impl MCPClient {
    /// Spawn the server process and initialize the session.
    pub async fn connect(config: &MCPServerConfig) -> Result<Self, SwiftAgentError> {
        debug!(server = %config.name, command = %config.command, "connecting MCP server");

        let mut command = Command::new(&config.command);
        command.args(&config.args);
        let transport = TokioChildProcess::new(command)?;

        let client_info = ClientInfo {
            protocol_version: ProtocolVersion::LATEST,
            ..Default::default()
        };
        let session = client_info
            .into_dyn()
            .serve(transport)
            .await
            .map_err(|e| map_client_initialize_error(&config.name, e))?;

        Ok(Self {
            server_name: config.name.clone(),
            session: Some(session),
        })
    }

    pub fn server_name(&self) -> &str {
        &self.server_name
    }

    /// List available tools from the server.
    pub async fn list_tools(&mut self) -> Result<Vec<MCPToolSchema>, SwiftAgentError> {
        let server_name = self.server_name.clone();
        let session = self.session_mut()?;

        let tools = match session.list_all_tools().await {
            Ok(tools) => tools,
            // Servers without pagination support can reject the cursor walk.
            Err(ServiceError::UnexpectedResponse) => {
                let page = session
                    .list_tools(None)
                    .await
                    .map_err(|e| map_service_error(&server_name, "list_tools", e))?;
                page.tools
            }
            Err(e) => return Err(map_service_error(&server_name, "list_tools", e)),
        };

        Ok(tools.into_iter().map(map_mcp_tool_schema).collect())
    }

    /// Execute a tool on the server.
    pub async fn call_tool(
        &mut self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<MCPToolCallResult, SwiftAgentError> {
        let server_name = self.server_name.clone();
        let arguments = coerce_tool_arguments(arguments)?;
        let session = self.session_mut()?;

        let result = session
            .call_tool(CallToolRequestParams {
                meta: None,
                name: name.to_owned().into(),
                arguments,
                task: None,
            })
            .await
            .map_err(|e| map_service_error(&server_name, "call_tool", e))?;

        map_call_result(name, result)
    }

    /// Shut the session down, terminating the child process.
    pub async fn close(&mut self) -> Result<(), SwiftAgentError> {
        if let Some(session) = self.session.take() {
            session.cancel().await.map_err(|e| {
                SwiftAgentError::Stream(format!(
                    "MCP server '{}' shutdown failed: {e}",
                    self.server_name
                ))
            })?;
        }
        Ok(())
    }

    fn session_mut(&mut self) -> Result<&mut MCPRunningService, SwiftAgentError> {
        match self.session.as_mut() {
            Some(session) => Ok(session),
            None => Err(SwiftAgentError::Stream(format!(
                "MCP server '{}' session is closed",
                self.server_name
            ))),
        }
    }
}

fn map_mcp_tool_schema(tool: rmcp::model::Tool) -> MCPToolSchema {
    MCPToolSchema {
        name: tool.name.to_string(),
        description: tool.description.map(|d| d.to_string()),
        input_schema: serde_json::Value::Object((*tool.input_schema).clone()),
    }
}

fn coerce_tool_arguments(
    value: serde_json::Value,
) -> Result<Option<JsonObject>, SwiftAgentError> {
    match value {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::Object(map) => Ok(Some(map)),
        serde_json::Value::String(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            let parsed: serde_json::Value = serde_json::from_str(trimmed).map_err(|e| {
                SwiftAgentError::InvalidArgument(format!(
                    "MCP tool arguments must be valid JSON: {e}"
                ))
            })?;
            coerce_tool_arguments(parsed)
        }
        other => Err(SwiftAgentError::InvalidArgument(format!(
            "MCP tool arguments must be a JSON object; got {other}"
        ))),
    }
}

fn extract_text_content(content: &[Content]) -> Option<String> {
    let mut lines = Vec::new();
    for item in content {
        if let Some(text) = item.as_text() {
            lines.push(text.text.clone());
            continue;
        }
        if let Some(resource) = item.as_resource() {
            if let ResourceContents::TextResourceContents { text, .. } = &resource.resource {
                lines.push(text.clone());
            }
        }
    }

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

fn map_call_result(
    name: &str,
    result: CallToolResult,
) -> Result<MCPToolCallResult, SwiftAgentError> {
    let text_content = extract_text_content(&result.content);
    let content = result
        .content
        .iter()
        .filter_map(|item| serde_json::to_value(item).ok())
        .collect::<Vec<_>>();

    if result.is_error.unwrap_or(false) {
        let message = result
            .structured_content
            .as_ref()
            .map(|v| v.to_string())
            .or_else(|| text_content.clone())
            .unwrap_or_else(|| "MCP tool returned an error result".into());

        return Err(SwiftAgentError::ToolExecution {
            tool_name: name.to_string(),
            message,
        });
    }

    Ok(MCPToolCallResult {
        structured_content: result.structured_content,
        text_content,
        content,
    })
}

fn map_client_initialize_error(server_name: &str, error: ClientInitializeError) -> SwiftAgentError {
    match error {
        ClientInitializeError::ConnectionClosed(context) => SwiftAgentError::Stream(format!(
            "MCP server '{server_name}' initialize connection closed: {context}"
        )),
        ClientInitializeError::TransportError { error, context } => SwiftAgentError::Stream(
            format!("MCP server '{server_name}' transport error ({context}): {error}"),
        ),
        ClientInitializeError::JsonRpcError(error) => SwiftAgentError::Provider {
            provider: "mcp".into(),
            message: format!(
                "'{server_name}' initialize JSON-RPC error {}: {}",
                error.code.0, error.message
            ),
        },
        ClientInitializeError::Cancelled => SwiftAgentError::Stream(format!(
            "MCP server '{server_name}' initialize cancelled"
        )),
        other => SwiftAgentError::Provider {
            provider: "mcp".into(),
            message: format!("'{server_name}' initialize error: {other}"),
        },
    }
}

fn map_service_error(server_name: &str, context: &str, error: ServiceError) -> SwiftAgentError {
    match error {
        ServiceError::McpError(error) => SwiftAgentError::Provider {
            provider: "mcp".into(),
            message: format!(
                "'{server_name}' {context}: MCP error {}: {}",
                error.code.0, error.message
            ),
        },
        ServiceError::TransportSend(error) => SwiftAgentError::Stream(format!(
            "'{server_name}' {context}: transport send failed: {error}"
        )),
        ServiceError::TransportClosed => SwiftAgentError::Stream(format!(
            "'{server_name}' {context}: transport closed"
        )),
        ServiceError::UnexpectedResponse => SwiftAgentError::Provider {
            provider: "mcp".into(),
            message: format!("'{server_name}' {context}: unexpected MCP response"),
        },
        ServiceError::Cancelled { reason } => {
            let suffix = reason
                .as_deref()
                .map(|r| format!(" ({r})"))
                .unwrap_or_default();
            SwiftAgentError::Stream(format!(
                "'{server_name}' {context}: request cancelled{suffix}"
            ))
        }
        ServiceError::Timeout { timeout } => SwiftAgentError::Timeout(timeout.as_millis() as u64),
        other => SwiftAgentError::Provider {
            provider: "mcp".into(),
            message: format!("'{server_name}' {context}: service error: {other}"),
        },
    }
}
