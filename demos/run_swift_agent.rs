//! Runnable sample: one MCP math server behind an OpenAI-compatible model.
//!
//! Add your key to the environment (or a `.env` file) as
//! `OPENAI_API_KEY="your-api-key"` before running.

use std::sync::Arc;

use swift_agent::prelude::*;

#[tokio::main]
async fn main() -> swift_agent::error::Result<()> {
    let model = OpenAiCompatibleModel::from_config("gpt-4o-mini", SwiftConfig::global())?;

    let mcp = MCPClientOptions::default().with_server(MCPServerConfig::new(
        "math",
        "npx",
        vec!["-y".into(), "nm-mcp-math".into()],
    ));

    let mut agent = SwiftAgent::new(
        Arc::new(model),
        SwiftAgentOptions {
            mcp: Some(mcp),
            ..Default::default()
        },
    )?;

    let messages = agent.run("what's (13 + 74) x 234?").await?;
    if let Some(last) = messages.last() {
        println!("{}", last.text());
    }

    agent.disconnect_mcp_servers().await?;
    Ok(())
}
