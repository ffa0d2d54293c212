//! Core types for swift-agent.

pub mod generation;
pub mod message;

pub use generation::*;
pub use message::*;
