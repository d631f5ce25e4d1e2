//! Channel trait: a delivery surface for conversation text.
//!
//! A channel accepts user text from somewhere (an HTTP endpoint, a terminal)
//! and publishes it to the bus as `InboundMessage`s; assistant text comes
//! back through `send()`.

use async_trait::async_trait;
use parley_core::bus::OutboundMessage;

/// Every delivery channel implements this trait.
///
/// The `ChannelManager` holds `Arc<dyn Channel>` and orchestrates
/// start/stop/send across registered channels.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Unique channel name; matches `OutboundMessage.channel`.
    fn name(&self) -> &str;

    /// Begin accepting user messages. Long-running: returns once `stop()`
    /// is called or the listener fails.
    async fn start(&self) -> anyhow::Result<()>;

    /// Graceful shutdown.
    async fn stop(&self) -> anyhow::Result<()>;

    /// Deliver assistant text.
    async fn send(&self, msg: &OutboundMessage) -> anyhow::Result<()>;
}
