//! Tool trait: a declared spec bound to an async handler.

use async_trait::async_trait;
use serde_json::Value;

use parley_core::types::{ToolResponse, ToolSpec};

// ─────────────────────────────────────────────
// Tool trait
// ─────────────────────────────────────────────

/// Every agent tool implements this trait.
///
/// The agent advertises `spec()` to the remote model on every round-trip and
/// dispatches matching `function_call` items to `execute()`.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Declared name, description and parameters.
    fn spec(&self) -> &ToolSpec;

    /// Name the remote model uses to call this tool.
    fn name(&self) -> &str {
        &self.spec().name
    }

    /// Run the tool with the decoded argument object.
    ///
    /// An `Err` is converted into a `success: false` result by the
    /// dispatcher and handed back to the model.
    async fn execute(&self, args: Value) -> anyhow::Result<ToolResponse>;
}

// ─────────────────────────────────────────────
// Argument helpers
// ─────────────────────────────────────────────

/// Extract a required integer argument.
pub fn require_i64(args: &Value, key: &str) -> anyhow::Result<i64> {
    args.get(key)
        .and_then(|v| v.as_i64())
        .ok_or_else(|| anyhow::anyhow!("Missing required integer parameter: {key}"))
}
