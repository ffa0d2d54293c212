//! Tool system for function calling.

pub mod arguments;
pub mod tool;

pub use arguments::ToolArguments;
pub use tool::{Tool, ToolExecutionContext, ToolParameters};
