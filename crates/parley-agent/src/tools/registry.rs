//! Tool registry and per-batch dispatch.
//!
//! The agent reads the current tool list from a [`ToolSource`] on every
//! round-trip. When the model asks for tools, one [`ToolDispatcher`] snapshot
//! is taken for the whole batch and each call is resolved by name against it.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde_json::Value;
use tracing::{debug, info, warn};

use parley_core::types::{FunctionCallItem, ToolResponse};

use super::base::Tool;

// ─────────────────────────────────────────────
// ToolSource
// ─────────────────────────────────────────────

/// Supplies the tools currently available to the agent.
pub trait ToolSource: Send + Sync {
    fn tools(&self) -> Vec<Arc<dyn Tool>>;
}

// ─────────────────────────────────────────────
// Registry
// ─────────────────────────────────────────────

/// In-memory [`ToolSource`] keyed by tool name.
///
/// Registration takes `&self` so tools can be added or removed while an
/// agent holds the registry.
pub struct ToolRegistry {
    tools: RwLock<HashMap<String, Arc<dyn Tool>>>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            tools: RwLock::new(HashMap::new()),
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, Arc<dyn Tool>>> {
        self.tools.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, Arc<dyn Tool>>> {
        self.tools.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Register a tool. Overwrites any previous tool with the same name.
    pub fn register(&self, tool: Arc<dyn Tool>) {
        info!(tool = tool.name(), "registered tool");
        self.write().insert(tool.name().to_string(), tool);
    }

    /// Unregister a tool by name. Returns the removed tool, if any.
    pub fn unregister(&self, name: &str) -> Option<Arc<dyn Tool>> {
        let removed = self.write().remove(name);
        if removed.is_some() {
            info!(tool = name, "unregistered tool");
        }
        removed
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.read().get(name).cloned()
    }

    pub fn has(&self, name: &str) -> bool {
        self.read().contains_key(name)
    }

    /// Names of all registered tools, sorted for determinism.
    pub fn tool_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolSource for ToolRegistry {
    /// Tools sorted by name, so requests are stable across round-trips.
    fn tools(&self) -> Vec<Arc<dyn Tool>> {
        let mut tools: Vec<Arc<dyn Tool>> = self.read().values().cloned().collect();
        tools.sort_by(|a, b| a.name().cmp(b.name()));
        tools
    }
}

// ─────────────────────────────────────────────
// Dispatch
// ─────────────────────────────────────────────

/// Name → tool map frozen for one batch of tool calls.
pub struct ToolDispatcher {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolDispatcher {
    /// Snapshot `source` once. Later registrations do not affect this batch.
    pub fn snapshot(source: &dyn ToolSource) -> Self {
        let tools = source
            .tools()
            .into_iter()
            .map(|tool| (tool.name().to_string(), tool))
            .collect();
        Self { tools }
    }

    /// Resolve and run one call.
    ///
    /// Never fails: a missing tool, undecodable arguments, a handler error
    /// and a handler panic all come back as `success: false` responses.
    pub async fn dispatch(&self, call: &FunctionCallItem) -> ToolResponse {
        let Some(tool) = self.tools.get(&call.name) else {
            warn!(tool = %call.name, call_id = %call.call_id, "tool not found");
            return ToolResponse::not_found();
        };

        let args = match parse_arguments(&call.arguments) {
            Ok(args) => args,
            Err(e) => {
                warn!(tool = %call.name, error = %e, "malformed tool arguments");
                return ToolResponse::failure(format!("Invalid arguments for {}: {e}", call.name));
            }
        };

        info!(tool = %call.name, call_id = %call.call_id, "executing tool call");

        // Run on its own task so a panicking handler surfaces as a JoinError
        let tool = Arc::clone(tool);
        let handle = tokio::spawn(async move { tool.execute(args).await });

        match handle.await {
            Ok(Ok(response)) => {
                debug!(tool = %call.name, success = response.success, "tool result");
                response
            }
            Ok(Err(e)) => {
                warn!(tool = %call.name, error = %e, "tool execution failed");
                ToolResponse::failure(format!("Error executing {}: {e}", call.name))
            }
            Err(e) => {
                warn!(tool = %call.name, error = %e, "tool handler aborted");
                ToolResponse::failure(format!("Tool {} failed unexpectedly", call.name))
            }
        }
    }
}

/// Decode the argument string. The model sends `""` for parameterless calls.
fn parse_arguments(raw: &str) -> Result<Value, serde_json::Error> {
    if raw.trim().is_empty() {
        return Ok(Value::Object(Default::default()));
    }
    serde_json::from_str(raw)
}
