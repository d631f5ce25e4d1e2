//! Message bus: queues between delivery channels, the scheduler, and the
//! agent task.

pub mod queue;
pub mod types;

pub use queue::MessageBus;
pub use types::{InboundMessage, OutboundMessage};
