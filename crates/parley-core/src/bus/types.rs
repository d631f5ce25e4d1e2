//! Bus event types: plain-text messages flowing between channels and the
//! agent task.

use chrono::{DateTime, Utc};

/// A message delivered into the agent (user text or a scheduled prompt).
#[derive(Clone, Debug)]
pub struct InboundMessage {
    /// Source name (e.g. "http", "schedule", "cli").
    pub channel: String,
    /// Text content of the message.
    pub content: String,
    /// When the message was received.
    pub timestamp: DateTime<Utc>,
}

impl InboundMessage {
    pub fn new(channel: impl Into<String>, content: impl Into<String>) -> Self {
        InboundMessage {
            channel: channel.into(),
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Assistant text on its way out to a channel.
#[derive(Clone, Debug)]
pub struct OutboundMessage {
    /// Target channel name.
    pub channel: String,
    /// Text content to deliver.
    pub content: String,
}

impl OutboundMessage {
    pub fn new(channel: impl Into<String>, content: impl Into<String>) -> Self {
        OutboundMessage {
            channel: channel.into(),
            content: content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inbound_message_creation() {
        let before = Utc::now();
        let msg = InboundMessage::new("http", "Hello Parley!");

        assert_eq!(msg.channel, "http");
        assert_eq!(msg.content, "Hello Parley!");
        assert!(msg.timestamp >= before);
    }

    #[test]
    fn test_outbound_message_creation() {
        let msg = OutboundMessage::new("http", "Here's your answer!");

        assert_eq!(msg.channel, "http");
        assert_eq!(msg.content, "Here's your answer!");
    }
}
