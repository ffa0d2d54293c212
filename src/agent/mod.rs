//! Agent runtime: the tool-calling loop and the SwiftAgent facade.

pub mod react;
pub mod swift;

pub use react::{AgentRunResult, ReactAgent};
pub use swift::{SwiftAgent, SwiftAgentOptions};
