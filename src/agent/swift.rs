//! SwiftAgent: a conversation-holding facade over a chat model, the tool
//! loop, and a set of MCP servers.

use std::sync::Arc;

use tracing::debug;

use crate::error::SwiftAgentError;
use crate::mcp::{MCPClientOptions, MCPTool, MultiServerMCPClient};
use crate::model::ChatModel;
use crate::tools::Tool;
use crate::types::{GenerationSettings, ModelMessage, Role};

use super::react::ReactAgent;

/// Options accepted by [`SwiftAgent::new`].
#[derive(Clone, Default)]
pub struct SwiftAgentOptions {
    /// MCP servers to load tools from. Unset MCP sub-options are filled with
    /// their defaults during construction.
    pub mcp: Option<MCPClientOptions>,
    /// Seed conversation history.
    pub message_history: Option<Vec<ModelMessage>>,
    /// System prompt enforced as the single leading system message.
    pub system_prompt: Option<String>,
    /// Generation settings forwarded to the model on every turn.
    pub settings: GenerationSettings,
}

/// Facade holding conversation state and lazily building an agent from a
/// model and the tools fetched from the configured MCP servers.
///
/// Tools are loaded on the first [`run`](Self::run). Between turns, whole
/// servers can be switched on and off; the agent is rebuilt from the enabled
/// subset each time.
pub struct SwiftAgent {
    model: Arc<dyn ChatModel>,
    options: SwiftAgentOptions,
    mcp_client: Option<Arc<MultiServerMCPClient>>,
    tools: Option<Vec<MCPTool>>,
    agent: Option<ReactAgent>,
    messages: Vec<ModelMessage>,
    initialized: bool,
}

impl std::fmt::Debug for SwiftAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SwiftAgent")
            .field("mcp_client", &self.mcp_client)
            .field("messages", &self.messages)
            .field("initialized", &self.initialized)
            .finish_non_exhaustive()
    }
}

impl SwiftAgent {
    /// Create an agent from a model and options.
    ///
    /// Fails on invalid MCP configuration (blank or duplicate server names).
    pub fn new(
        model: Arc<dyn ChatModel>,
        mut options: SwiftAgentOptions,
    ) -> Result<Self, SwiftAgentError> {
        let mcp_client = match options.mcp.take() {
            Some(mcp) => {
                let mcp = mcp.with_defaults();
                let client = MultiServerMCPClient::new(mcp.clone())?;
                options.mcp = Some(mcp);
                Some(Arc::new(client))
            }
            None => None,
        };

        let mut messages = options.message_history.clone().unwrap_or_default();
        if let Some(ref prompt) = options.system_prompt {
            if messages.is_empty() {
                messages.push(ModelMessage::system(prompt.clone()));
            } else if messages[0].role == Role::System {
                messages[0] = ModelMessage::system(prompt.clone());
            } else {
                messages.insert(0, ModelMessage::system(prompt.clone()));
            }
        }

        Ok(Self {
            model,
            options,
            mcp_client,
            tools: None,
            agent: None,
            messages,
            initialized: false,
        })
    }

    /// The current chat model.
    pub fn model(&self) -> &Arc<dyn ChatModel> {
        &self.model
    }

    /// The options this agent was built with, MCP defaults filled.
    pub fn options(&self) -> &SwiftAgentOptions {
        &self.options
    }

    /// Tools loaded from the MCP servers, or `None` before the first run.
    pub fn tools(&self) -> Option<&[MCPTool]> {
        self.tools.as_deref()
    }

    /// The conversation history.
    pub fn messages(&self) -> &[ModelMessage] {
        &self.messages
    }

    /// Send a user message through the agent and return the updated
    /// transcript.
    ///
    /// The first call fetches tools from every configured MCP server and
    /// builds the agent; later calls reuse them.
    pub async fn run(
        &mut self,
        message: impl Into<String>,
    ) -> Result<Vec<ModelMessage>, SwiftAgentError> {
        if !self.initialized {
            let tools = self.load_tools().await?;
            debug!(count = tools.len(), "initialized agent with MCP tools");
            self.tools = Some(tools);
            self.agent = Some(self.build_agent());
            self.initialized = true;
        }

        self.messages.push(ModelMessage::user(message));

        let agent = self.agent.as_ref().ok_or_else(|| {
            SwiftAgentError::InvalidState("The agent is not initialized yet".into())
        })?;
        let result = agent.invoke(self.messages.clone()).await?;
        self.messages = result.messages;
        Ok(self.messages.clone())
    }

    /// Replace the model and rebuild the agent with the current tool set.
    pub fn set_model(&mut self, model: Arc<dyn ChatModel>) {
        self.model = model;
        self.agent = Some(self.build_agent());
    }

    /// Close every MCP server session.
    pub async fn disconnect_mcp_servers(&self) -> Result<(), SwiftAgentError> {
        match self.mcp_client {
            Some(ref client) => client.close().await,
            None => Ok(()),
        }
    }

    /// Pass the named server's tools to the agent again.
    pub fn enable_mcp_server(&mut self, server_name: &str) {
        self.set_server_tools_enabled(server_name, true);
    }

    /// Withhold the named server's tools from the agent.
    pub fn disable_mcp_server(&mut self, server_name: &str) {
        self.set_server_tools_enabled(server_name, false);
    }

    /// Pass a single tool (by exposed name) to the agent again.
    pub fn enable_tool(&mut self, tool_name: &str) {
        self.set_tool_enabled(tool_name, true);
    }

    /// Withhold a single tool (by exposed name) from the agent.
    pub fn disable_tool(&mut self, tool_name: &str) {
        self.set_tool_enabled(tool_name, false);
    }

    /// Clear the conversation, optionally keeping the leading system message.
    pub fn reset_messages(&mut self, keep_system_message: bool) {
        if keep_system_message && self.messages.first().map(|m| m.role) == Some(Role::System) {
            self.messages.truncate(1);
        } else {
            self.messages.clear();
        }
    }

    async fn load_tools(&self) -> Result<Vec<MCPTool>, SwiftAgentError> {
        let Some(ref client) = self.mcp_client else {
            return Ok(Vec::new());
        };
        let loaded = client.load_tools().await?;
        Ok(loaded
            .into_iter()
            .map(|tool| MCPTool::from_loaded(tool, Arc::clone(client)))
            .collect())
    }

    fn build_agent(&self) -> ReactAgent {
        let tools: Vec<Arc<dyn Tool>> = self
            .tools
            .as_deref()
            .unwrap_or_default()
            .iter()
            .filter(|tool| tool.is_enabled())
            .map(|tool| Arc::new(tool.clone()) as Arc<dyn Tool>)
            .collect();
        ReactAgent::new(Arc::clone(&self.model), tools)
            .with_settings(self.options.settings.clone())
    }

    fn set_server_tools_enabled(&mut self, server_name: &str, enabled: bool) {
        let Some(ref mut tools) = self.tools else {
            return;
        };
        let mut changed = false;
        for tool in tools
            .iter_mut()
            .filter(|tool| tool.server_name() == server_name)
        {
            tool.set_enabled(enabled);
            changed = true;
        }
        if changed {
            debug!(server = server_name, enabled, "rebuilt agent after toggling server");
            self.agent = Some(self.build_agent());
        }
    }

    fn set_tool_enabled(&mut self, tool_name: &str, enabled: bool) {
        let Some(ref mut tools) = self.tools else {
            return;
        };
        let mut changed = false;
        for tool in tools.iter_mut().filter(|tool| tool.name() == tool_name) {
            tool.set_enabled(enabled);
            changed = true;
        }
        if changed {
            debug!(tool = tool_name, enabled, "rebuilt agent after toggling tool");
            self.agent = Some(self.build_agent());
        }
    }
}
