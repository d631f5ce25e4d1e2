//! Model provider trait: the remote capability the agent loop drives.

use async_trait::async_trait;
use parley_core::types::{OutputItem, ToolSpec, Turn};

use crate::error::ProviderError;

/// A remote conversational model.
///
/// `ResponsesProvider` is the HTTP implementation; tests substitute
/// scripted providers.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Send one request and return the response's output items in order.
    ///
    /// # Arguments
    /// * `transcript`: every turn so far, oldest first.
    /// * `instructions`: the system prompt for this call.
    /// * `tools`: tools the model may call on this turn.
    async fn respond(
        &self,
        transcript: &[Turn],
        instructions: &str,
        tools: &[ToolSpec],
    ) -> Result<Vec<OutputItem>, ProviderError>;

    /// Model identifier sent with each request.
    fn model(&self) -> &str;

    /// Display name for logging.
    fn display_name(&self) -> &str;
}
