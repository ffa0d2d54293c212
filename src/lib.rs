//! swift-agent — a thin agent facade for Rust
//!
//! Holds conversation state, lazily builds a tool-calling agent from a chat
//! model and the tools fetched from one or more MCP servers, and lets the
//! caller enable or disable individual servers between turns.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use swift_agent::prelude::*;
//!
//! # async fn example() -> swift_agent::error::Result<()> {
//! let model = OpenAiCompatibleModel::from_config("gpt-4o-mini", SwiftConfig::global())?;
//! let mcp = MCPClientOptions::default()
//!     .with_server(MCPServerConfig::new("math", "npx", vec!["-y".into(), "mcp-math".into()]));
//!
//! let mut agent = SwiftAgent::new(
//!     Arc::new(model),
//!     SwiftAgentOptions { mcp: Some(mcp), ..Default::default() },
//! )?;
//! let messages = agent.run("what's (13 + 74) x 234?").await?;
//! println!("{}", messages.last().map(|m| m.text()).unwrap_or_default());
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod config;
pub mod error;
pub mod mcp;
pub mod model;
pub mod prelude;
pub mod tools;
pub mod types;
