//! Parley Agent: conversation loop, tool specs, and tool dispatch.
//!
//! This crate contains:
//! - **tools**: Tool trait, declarative builder, registry and batch dispatcher
//! - **agent_loop**: The model ↔ tool-calling conversation driver

pub mod agent_loop;
pub mod tools;

pub use agent_loop::{AgentError, ConversationAgent, MessageListenerFn, SystemPromptFn};
pub use tools::{FunctionTool, Tool, ToolRegistry, ToolSource, ToolSpecBuilder};
