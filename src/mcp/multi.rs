//! Multi-server MCP client with deterministic tool routing.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::SwiftAgentError;
use crate::tools::ToolParameters;

use super::client::{MCPClient, MCPToolCallResult};
use super::config::{MCPClientOptions, MCPServerConfig};
use super::schema::MCPToolSchema;

/// Internal session operations, seam for tests.
#[async_trait]
trait ServerSession: Send {
    async fn list_tools(&mut self) -> Result<Vec<MCPToolSchema>, SwiftAgentError>;
    async fn call_tool(
        &mut self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<MCPToolCallResult, SwiftAgentError>;
    async fn close(&mut self) -> Result<(), SwiftAgentError>;
}

#[async_trait]
impl ServerSession for MCPClient {
    async fn list_tools(&mut self) -> Result<Vec<MCPToolSchema>, SwiftAgentError> {
        MCPClient::list_tools(self).await
    }

    async fn call_tool(
        &mut self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<MCPToolCallResult, SwiftAgentError> {
        MCPClient::call_tool(self, name, arguments).await
    }

    async fn close(&mut self) -> Result<(), SwiftAgentError> {
        MCPClient::close(self).await
    }
}

enum SessionSlot {
    Idle,
    Active(Box<dyn ServerSession>),
    Closed,
}

struct ServerEntry {
    config: MCPServerConfig,
    slot: Mutex<SessionSlot>,
}

/// A tool discovered across the configured servers.
#[derive(Debug, Clone)]
pub struct MCPLoadedTool {
    pub exposed_name: String,
    pub server_name: String,
    pub upstream_tool_name: String,
    pub description: String,
    pub parameters: ToolParameters,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct MCPToolRoute {
    server_name: String,
    upstream_tool_name: String,
}

/// Client spanning one or more MCP servers.
///
/// Servers connect lazily, tools are exposed under the configured naming
/// policy, and calls route back to the owning server by exposed name.
pub struct MultiServerMCPClient {
    options: MCPClientOptions,
    entries: Vec<ServerEntry>,
    entry_index_by_name: HashMap<String, usize>,
    routes: Mutex<HashMap<String, MCPToolRoute>>,
}

impl std::fmt::Debug for MultiServerMCPClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiServerMCPClient")
            .field("options", &self.options)
            .field("entry_index_by_name", &self.entry_index_by_name)
            .finish_non_exhaustive()
    }
}

impl MultiServerMCPClient {
    /// Create a client from options (defaults filled here if not already).
    ///
    /// Server names must be non-empty after trimming and unique.
    pub fn new(options: MCPClientOptions) -> Result<Self, SwiftAgentError> {
        let options = options.with_defaults();
        let mut entries = Vec::with_capacity(options.servers.len());
        let mut index = HashMap::with_capacity(options.servers.len());

        for (position, server) in options.servers.iter().enumerate() {
            let mut config = server.clone();
            let normalized = config.name.trim().to_owned();
            if normalized.is_empty() {
                return Err(SwiftAgentError::Configuration(
                    "MCP server name must not be empty".into(),
                ));
            }
            if index.insert(normalized.clone(), position).is_some() {
                return Err(SwiftAgentError::Configuration(format!(
                    "Duplicate MCP server name '{normalized}'"
                )));
            }
            config.name = normalized;
            entries.push(ServerEntry {
                config,
                slot: Mutex::new(SessionSlot::Idle),
            });
        }

        Ok(Self {
            options,
            entries,
            entry_index_by_name: index,
            routes: Mutex::new(HashMap::new()),
        })
    }

    #[cfg(test)]
    fn with_sessions(
        options: MCPClientOptions,
        sessions: Vec<(MCPServerConfig, Box<dyn ServerSession>)>,
    ) -> Self {
        let options = options.with_defaults();
        let mut entries = Vec::with_capacity(sessions.len());
        let mut index = HashMap::new();
        for (position, (config, session)) in sessions.into_iter().enumerate() {
            index.insert(config.name.clone(), position);
            entries.push(ServerEntry {
                config,
                slot: Mutex::new(SessionSlot::Active(session)),
            });
        }
        Self {
            options,
            entries,
            entry_index_by_name: index,
            routes: Mutex::new(HashMap::new()),
        }
    }

    /// Resolved client options.
    pub fn options(&self) -> &MCPClientOptions {
        &self.options
    }

    /// Server names in configuration order.
    pub fn server_names(&self) -> Vec<&str> {
        self.entries
            .iter()
            .map(|entry| entry.config.name.as_str())
            .collect()
    }

    /// Connect to each server in configuration order and collect its tools.
    ///
    /// With `throw_on_load_error` unset or `true`, the first failing server
    /// aborts the load and the previous route table is left in place. With it
    /// set to `false`, failing servers are logged and skipped.
    pub async fn load_tools(&self) -> Result<Vec<MCPLoadedTool>, SwiftAgentError> {
        let throw_on_load_error = self.options.throw_on_load_error();
        let mut loaded = Vec::new();
        let mut routing = HashMap::new();

        for entry in &self.entries {
            let server_name = entry.config.name.as_str();
            let mut slot = entry.slot.lock().await;

            let tools = match Self::list_via_slot(&entry.config, &mut slot).await {
                Ok(tools) => tools,
                Err(err) if !throw_on_load_error => {
                    warn!(server = server_name, error = %err, "skipping MCP server that failed to load");
                    continue;
                }
                Err(err) => return Err(err),
            };
            debug!(server = server_name, count = tools.len(), "loaded MCP tools");

            for tool in tools {
                let exposed_name = self
                    .options
                    .exposed_tool_name(server_name, &tool.name);
                let route = MCPToolRoute {
                    server_name: server_name.to_owned(),
                    upstream_tool_name: tool.name.clone(),
                };
                if routing.insert(exposed_name.clone(), route).is_some() {
                    return Err(SwiftAgentError::InvalidState(format!(
                        "Duplicate MCP tool name '{exposed_name}'"
                    )));
                }
                loaded.push(MCPLoadedTool {
                    exposed_name,
                    server_name: server_name.to_owned(),
                    upstream_tool_name: tool.name,
                    description: tool.description.unwrap_or_default(),
                    parameters: ToolParameters::from_schema(tool.input_schema),
                });
            }
        }

        *self.routes.lock().await = routing;
        Ok(loaded)
    }

    /// Execute a tool by its exposed name.
    pub async fn call_tool(
        &self,
        exposed_name: &str,
        arguments: serde_json::Value,
    ) -> Result<serde_json::Value, SwiftAgentError> {
        let route = self
            .routes
            .lock()
            .await
            .get(exposed_name)
            .cloned()
            .ok_or_else(|| {
                SwiftAgentError::InvalidArgument(format!("Unknown MCP tool '{exposed_name}'"))
            })?;

        let entry_idx = self
            .entry_index_by_name
            .get(&route.server_name)
            .copied()
            .ok_or_else(|| {
                SwiftAgentError::InvalidState(format!(
                    "Tool route points to missing MCP server '{}'",
                    route.server_name
                ))
            })?;

        let entry = &self.entries[entry_idx];
        let mut slot = entry.slot.lock().await;
        let session = Self::session_via_slot(&entry.config, &mut slot).await?;
        let result = session
            .call_tool(&route.upstream_tool_name, arguments)
            .await?;
        Ok(result.into_value_or_text())
    }

    /// Close every connected session.
    ///
    /// All servers are attempted; the first failure is reported afterwards.
    pub async fn close(&self) -> Result<(), SwiftAgentError> {
        let mut first_error = None;
        for entry in &self.entries {
            let mut slot = entry.slot.lock().await;
            if let SessionSlot::Active(session) = &mut *slot {
                if let Err(err) = session.close().await {
                    warn!(server = %entry.config.name, error = %err, "MCP server close failed");
                    first_error.get_or_insert(err);
                }
            }
            *slot = SessionSlot::Closed;
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn list_via_slot(
        config: &MCPServerConfig,
        slot: &mut SessionSlot,
    ) -> Result<Vec<MCPToolSchema>, SwiftAgentError> {
        let session = Self::session_via_slot(config, slot).await?;
        session.list_tools().await
    }

    async fn session_via_slot<'a>(
        config: &MCPServerConfig,
        slot: &'a mut SessionSlot,
    ) -> Result<&'a mut Box<dyn ServerSession>, SwiftAgentError> {
        if matches!(slot, SessionSlot::Closed) {
            return Err(SwiftAgentError::Stream(format!(
                "MCP server '{}' is closed",
                config.name
            )));
        }
        if matches!(slot, SessionSlot::Idle) {
            let client = MCPClient::connect(config).await?;
            *slot = SessionSlot::Active(Box::new(client));
        }
        match slot {
            SessionSlot::Active(session) => Ok(session),
            _ => Err(SwiftAgentError::InvalidState(format!(
                "MCP server '{}' has no active session",
                config.name
            ))),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;
    use std::sync::{Arc, Mutex as StdMutex};

    pub(crate) struct MockSession {
        list_result: Result<Vec<MCPToolSchema>, String>,
        call_results: HashMap<String, serde_json::Value>,
        call_log: Arc<StdMutex<Vec<(String, serde_json::Value)>>>,
        close_calls: Arc<AtomicUsize>,
    }

    impl MockSession {
        pub(crate) fn new(
            list_result: Result<Vec<MCPToolSchema>, String>,
            call_results: HashMap<String, serde_json::Value>,
        ) -> (
            Self,
            Arc<StdMutex<Vec<(String, serde_json::Value)>>>,
            Arc<AtomicUsize>,
        ) {
            let call_log = Arc::new(StdMutex::new(Vec::new()));
            let close_calls = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    list_result,
                    call_results,
                    call_log: Arc::clone(&call_log),
                    close_calls: Arc::clone(&close_calls),
                },
                call_log,
                close_calls,
            )
        }
    }

    #[async_trait]
    impl ServerSession for MockSession {
        async fn list_tools(&mut self) -> Result<Vec<MCPToolSchema>, SwiftAgentError> {
            match &self.list_result {
                Ok(tools) => Ok(tools.clone()),
                Err(message) => Err(SwiftAgentError::Provider {
                    provider: "mcp".into(),
                    message: message.clone(),
                }),
            }
        }

        async fn call_tool(
            &mut self,
            name: &str,
            arguments: serde_json::Value,
        ) -> Result<MCPToolCallResult, SwiftAgentError> {
            self.call_log
                .lock()
                .expect("call log lock should not be poisoned")
                .push((name.to_owned(), arguments));
            let result = self
                .call_results
                .get(name)
                .ok_or_else(|| SwiftAgentError::ToolExecution {
                    tool_name: name.to_owned(),
                    message: "missing mock tool call result".into(),
                })?
                .clone();
            Ok(MCPToolCallResult {
                structured_content: Some(result),
                text_content: None,
                content: Vec::new(),
            })
        }

        async fn close(&mut self) -> Result<(), SwiftAgentError> {
            self.close_calls
                .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok(())
        }
    }

    pub(crate) fn test_tool(name: &str) -> MCPToolSchema {
        MCPToolSchema {
            name: name.into(),
            description: Some(format!("{name} description")),
            input_schema: json!({
                "type": "object",
                "properties": { "q": { "type": "string" } }
            }),
        }
    }

    pub(crate) fn server_config(name: &str) -> MCPServerConfig {
        MCPServerConfig::new(name, "npx", vec!["-y".into(), format!("{name}-server")])
    }

    pub(crate) fn client_with_servers(
        options: MCPClientOptions,
        servers: Vec<(&str, MockSession)>,
    ) -> MultiServerMCPClient {
        MultiServerMCPClient::with_sessions(
            options,
            servers
                .into_iter()
                .map(|(name, session)| {
                    (
                        server_config(name),
                        Box::new(session) as Box<dyn ServerSession>,
                    )
                })
                .collect(),
        )
    }
}
