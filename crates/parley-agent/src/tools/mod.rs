//! Tool modules for the Parley agent.

pub mod base;
pub mod builder;
pub mod registry;

pub use base::{require_i64, Tool};
pub use builder::{handler, FunctionTool, ToolHandlerFn, ToolSpecBuilder};
pub use registry::{ToolDispatcher, ToolRegistry, ToolSource};
