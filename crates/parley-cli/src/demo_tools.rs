//! Demo tool wiring for the CLI agent.

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::debug;

use parley_agent::tools::{handler, require_i64, FunctionTool, ToolRegistry, ToolSpecBuilder};
use parley_core::types::{PrimitiveType, ToolResponse};

/// `get_blog_posts(limit, page)`: returns a canned post.
pub fn get_blog_posts() -> FunctionTool {
    ToolSpecBuilder::tool(
        "get_blog_posts",
        "Retrieve blog posts",
        vec![
            ToolSpecBuilder::parameter(
                "limit",
                PrimitiveType::Integer,
                "Maximum number of blog posts to retrieve",
                true,
            ),
            ToolSpecBuilder::parameter(
                "page",
                PrimitiveType::Integer,
                "Page number to retrieve",
                true,
            ),
        ],
        handler(fetch_blog_posts),
    )
}

async fn fetch_blog_posts(args: Value) -> anyhow::Result<ToolResponse> {
    let limit = require_i64(&args, "limit")?;
    let page = require_i64(&args, "page")?;
    debug!(limit, page, "get_blog_posts called");
    Ok(ToolResponse::ok(json!({ "title": "Comisar Rex" })))
}

/// Registry holding every demo tool.
pub fn registry() -> Arc<ToolRegistry> {
    let registry = Arc::new(ToolRegistry::new());
    registry.register(Arc::new(get_blog_posts()));
    registry
}
