//! Declarative tool construction.
//!
//! `ToolSpecBuilder` turns a parameter list into a [`ToolSpec`] and binds it
//! to an async closure, producing a [`FunctionTool`] that can be registered
//! like any hand-written [`Tool`].

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use parley_core::types::{ParameterType, ToolParameter, ToolResponse, ToolSpec};

use super::base::Tool;

/// Handler bound to a [`FunctionTool`].
pub type ToolHandlerFn = Arc<
    dyn Fn(Value) -> Pin<Box<dyn Future<Output = anyhow::Result<ToolResponse>> + Send>>
        + Send
        + Sync,
>;

/// Wrap an async closure as a [`ToolHandlerFn`].
pub fn handler<F, Fut>(f: F) -> ToolHandlerFn
where
    F: Fn(Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<ToolResponse>> + Send + 'static,
{
    Arc::new(move |args| Box::pin(f(args)))
}

// ─────────────────────────────────────────────
// Builder
// ─────────────────────────────────────────────

pub struct ToolSpecBuilder;

impl ToolSpecBuilder {
    /// Declare one parameter. Pass `ParameterType::Array(..)` for arrays.
    pub fn parameter(
        name: impl Into<String>,
        param_type: impl Into<ParameterType>,
        description: impl Into<String>,
        required: bool,
    ) -> ToolParameter {
        ToolParameter {
            name: name.into(),
            param_type: param_type.into(),
            description: description.into(),
            required,
        }
    }

    /// Bind a spec to its handler.
    pub fn tool(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: Vec<ToolParameter>,
        handler: ToolHandlerFn,
    ) -> FunctionTool {
        FunctionTool {
            spec: ToolSpec {
                name: name.into(),
                description: description.into(),
                parameters,
            },
            handler,
        }
    }
}

// ─────────────────────────────────────────────
// FunctionTool
// ─────────────────────────────────────────────

/// A tool whose behaviour is a closure.
pub struct FunctionTool {
    spec: ToolSpec,
    handler: ToolHandlerFn,
}

impl std::fmt::Debug for FunctionTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionTool")
            .field("spec", &self.spec)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Tool for FunctionTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, args: Value) -> anyhow::Result<ToolResponse> {
        (self.handler)(args).await
    }
}
