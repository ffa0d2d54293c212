//! MCP server launch configuration and client options.

use serde::{Deserialize, Serialize};

const DEFAULT_TOOL_NAME_PREFIX: &str = "mcp";

/// Launch description for one stdio MCP server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MCPServerConfig {
    /// Server name used for tool ownership and namespacing.
    pub name: String,
    /// Executable to spawn.
    pub command: String,
    /// Arguments passed to the executable.
    #[serde(default)]
    pub args: Vec<String>,
}

impl MCPServerConfig {
    pub fn new(
        name: impl Into<String>,
        command: impl Into<String>,
        args: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            args,
        }
    }
}

/// Options for the multi-server MCP client.
///
/// Unset fields are filled with defaults by [`with_defaults`](Self::with_defaults):
/// `throw_on_load_error` and `prefix_tool_name_with_server_name` default to
/// `true`, `additional_tool_name_prefix` defaults to `"mcp"`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MCPClientOptions {
    /// Servers in the order their tools are loaded.
    #[serde(default)]
    pub servers: Vec<MCPServerConfig>,
    pub throw_on_load_error: Option<bool>,
    pub prefix_tool_name_with_server_name: Option<bool>,
    pub additional_tool_name_prefix: Option<String>,
}

impl MCPClientOptions {
    /// Add a server to the load order.
    pub fn with_server(mut self, server: MCPServerConfig) -> Self {
        self.servers.push(server);
        self
    }

    /// Fill unset options with their defaults.
    pub fn with_defaults(mut self) -> Self {
        self.throw_on_load_error = Some(self.throw_on_load_error.unwrap_or(true));
        self.prefix_tool_name_with_server_name =
            Some(self.prefix_tool_name_with_server_name.unwrap_or(true));
        self.additional_tool_name_prefix = Some(
            self.additional_tool_name_prefix
                .unwrap_or_else(|| DEFAULT_TOOL_NAME_PREFIX.to_string()),
        );
        self
    }

    pub(crate) fn throw_on_load_error(&self) -> bool {
        self.throw_on_load_error.unwrap_or(true)
    }

    /// Compute the name a tool is exposed under.
    ///
    /// Joins the non-empty parts of `[additional_prefix, server_name, tool_name]`
    /// with `__`; the server part is included only when prefixing is enabled.
    pub fn exposed_tool_name(&self, server_name: &str, tool_name: &str) -> String {
        let prefix = self
            .additional_tool_name_prefix
            .as_deref()
            .unwrap_or(DEFAULT_TOOL_NAME_PREFIX);
        let mut parts = Vec::with_capacity(3);
        if !prefix.is_empty() {
            parts.push(prefix);
        }
        if self.prefix_tool_name_with_server_name.unwrap_or(true) {
            parts.push(server_name);
        }
        parts.push(tool_name);
        parts.join("__")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_defaults_fills_unset_fields() {
        let options = MCPClientOptions::default().with_defaults();
        assert_eq!(options.throw_on_load_error, Some(true));
        assert_eq!(options.prefix_tool_name_with_server_name, Some(true));
        assert_eq!(options.additional_tool_name_prefix.as_deref(), Some("mcp"));
    }

    #[test]
    fn with_defaults_keeps_explicit_values() {
        let options = MCPClientOptions {
            throw_on_load_error: Some(false),
            prefix_tool_name_with_server_name: Some(false),
            additional_tool_name_prefix: Some(String::new()),
            ..Default::default()
        }
        .with_defaults();
        assert_eq!(options.throw_on_load_error, Some(false));
        assert_eq!(options.prefix_tool_name_with_server_name, Some(false));
        assert_eq!(options.additional_tool_name_prefix.as_deref(), Some(""));
    }

    #[test]
    fn exposed_name_joins_prefix_server_and_tool() {
        let options = MCPClientOptions::default().with_defaults();
        assert_eq!(options.exposed_tool_name("math", "add"), "mcp__math__add");
    }

    #[test]
    fn exposed_name_without_server_prefix() {
        let options = MCPClientOptions {
            prefix_tool_name_with_server_name: Some(false),
            ..Default::default()
        }
        .with_defaults();
        assert_eq!(options.exposed_tool_name("math", "add"), "mcp__add");
    }

    #[test]
    fn exposed_name_with_empty_prefix_is_upstream_name() {
        let options = MCPClientOptions {
            prefix_tool_name_with_server_name: Some(false),
            additional_tool_name_prefix: Some(String::new()),
            ..Default::default()
        }
        .with_defaults();
        assert_eq!(options.exposed_tool_name("math", "add"), "add");
    }
}
