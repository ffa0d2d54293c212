//! Model Context Protocol (MCP) client layer.
//!
//! Wire protocol, framing, and the stdio child-process transport are
//! delegated to the `rmcp` crate; this module adds server configuration,
//! multi-server aggregation with deterministic tool naming, and the bridge
//! into the crate's [`Tool`](crate::tools::Tool) system.

pub mod bridge;
pub mod client;
pub mod config;
pub mod multi;
pub mod schema;

pub use bridge::MCPTool;
pub use client::{MCPClient, MCPToolCallResult};
pub use config::{MCPClientOptions, MCPServerConfig};
pub use multi::{MCPLoadedTool, MultiServerMCPClient};
pub use schema::MCPToolSchema;
