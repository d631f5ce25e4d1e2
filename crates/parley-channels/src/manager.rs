//! Channel Manager: channel lifecycle and outbound routing.
//!
//! Responsibilities:
//! - Register channels by name
//! - Start every channel on its own task
//! - Route outbound messages from the bus to the named channel

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use parley_core::bus::MessageBus;

use crate::base::Channel;

// ─────────────────────────────────────────────
// ChannelManager
// ─────────────────────────────────────────────

pub struct ChannelManager {
    channels: HashMap<String, Arc<dyn Channel>>,
    bus: Arc<MessageBus>,
    /// Flips to `true` once on shutdown; every task watches it.
    shutdown: watch::Sender<bool>,
}

impl ChannelManager {
    pub fn new(bus: Arc<MessageBus>) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            channels: HashMap::new(),
            bus,
            shutdown,
        }
    }

    /// Register a channel. Overwrites any previous channel with the same name.
    pub fn register(&mut self, channel: Arc<dyn Channel>) {
        let name = channel.name().to_string();
        info!(channel = %name, "registered channel");
        self.channels.insert(name, channel);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Channel>> {
        self.channels.get(name)
    }

    /// Names of all registered channels, sorted.
    pub fn channel_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.channels.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Start all channels and the outbound dispatcher, then wait for
    /// [`stop_all`](Self::stop_all).
    pub async fn start_all(&self) -> Result<()> {
        if self.channels.is_empty() {
            warn!("no channels registered, nothing to start");
            return Ok(());
        }

        info!(channels = ?self.channel_names(), "starting channels");

        for (name, channel) in &self.channels {
            let ch = channel.clone();
            let ch_name = name.clone();
            tokio::spawn(async move {
                if let Err(e) = ch.start().await {
                    error!(channel = %ch_name, error = %e, "channel failed");
                }
                debug!(channel = %ch_name, "channel task finished");
            });
        }

        let bus = self.bus.clone();
        let channels = self.channels.clone();
        let shutdown = self.shutdown.subscribe();
        tokio::spawn(Self::dispatch_outbound(bus, channels, shutdown));

        let mut shutdown = self.shutdown.subscribe();
        // Err means the sender is gone, which also ends the wait
        let _ = shutdown.wait_for(|stopped| *stopped).await;

        info!("channel manager shutting down");
        Ok(())
    }

    /// Signal shutdown and stop every channel.
    pub async fn stop_all(&self) {
        info!("stopping all channels");
        self.shutdown.send_replace(true);

        for (name, channel) in &self.channels {
            if let Err(e) = channel.stop().await {
                error!(channel = %name, error = %e, "channel stop failed");
            }
        }
    }

    /// Route outbound messages until the bus closes or shutdown is signalled.
    async fn dispatch_outbound(
        bus: Arc<MessageBus>,
        channels: HashMap<String, Arc<dyn Channel>>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        debug!("outbound dispatcher started");

        loop {
            tokio::select! {
                msg = bus.consume_outbound() => {
                    let Some(outbound) = msg else {
                        info!("outbound bus closed, dispatcher exiting");
                        break;
                    };

                    match channels.get(&outbound.channel) {
                        Some(channel) => {
                            if let Err(e) = channel.send(&outbound).await {
                                error!(
                                    channel = %outbound.channel,
                                    error = %e,
                                    "failed to send outbound message"
                                );
                            }
                        }
                        None => {
                            warn!(
                                channel = %outbound.channel,
                                "no channel registered for outbound message"
                            );
                        }
                    }
                }
                // The watch::Ref guard is not Send; drop it inside the branch
                _ = async { let _ = shutdown.wait_for(|stopped| *stopped).await; } => {
                    debug!("dispatcher received shutdown signal");
                    break;
                }
            }
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parley_core::bus::OutboundMessage;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;
    use tokio::sync::Notify;

    /// Mock channel recording what it was sent.
    struct MockChannel {
        channel_name: String,
        started: AtomicBool,
        stopped: AtomicBool,
        stop_signal: Notify,
        sent: Mutex<Vec<String>>,
    }

    impl MockChannel {
        fn new(name: &str) -> Arc<Self> {
            Arc::new(Self {
                channel_name: name.into(),
                started: AtomicBool::new(false),
                stopped: AtomicBool::new(false),
                stop_signal: Notify::new(),
                sent: Mutex::new(Vec::new()),
            })
        }

        fn sent(&self) -> Vec<String> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Channel for MockChannel {
        fn name(&self) -> &str {
            &self.channel_name
        }

        async fn start(&self) -> anyhow::Result<()> {
            self.started.store(true, Ordering::SeqCst);
            self.stop_signal.notified().await;
            Ok(())
        }

        async fn stop(&self) -> anyhow::Result<()> {
            self.stopped.store(true, Ordering::SeqCst);
            self.stop_signal.notify_one();
            Ok(())
        }

        async fn send(&self, msg: &OutboundMessage) -> anyhow::Result<()> {
            self.sent.lock().unwrap().push(msg.content.clone());
            Ok(())
        }
    }

    #[test]
    fn test_register_and_names() {
        let mut mgr = ChannelManager::new(Arc::new(MessageBus::new(8)));
        assert!(mgr.is_empty());

        mgr.register(MockChannel::new("http"));
        mgr.register(MockChannel::new("cli"));
        mgr.register(MockChannel::new("http"));

        assert_eq!(mgr.len(), 2);
        assert_eq!(mgr.channel_names(), vec!["cli", "http"]);
        assert!(mgr.get("http").is_some());
        assert!(mgr.get("slack").is_none());
    }

    #[tokio::test]
    async fn test_shutdown_ends_dispatcher_task() {
        let bus = Arc::new(MessageBus::new(8));
        let (tx, rx) = watch::channel(false);
        let mut channels: HashMap<String, Arc<dyn Channel>> = HashMap::new();
        let http = MockChannel::new("http");
        channels.insert("http".into(), http.clone());

        let dispatcher = tokio::spawn(ChannelManager::dispatch_outbound(bus.clone(), channels, rx));

        bus.publish_outbound(OutboundMessage::new("http", "before stop")).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert_eq!(http.sent(), vec!["before stop"]);

        tx.send_replace(true);
        tokio::time::timeout(std::time::Duration::from_secs(2), dispatcher)
            .await
            .expect("dispatcher did not stop")
            .unwrap();
    }

    #[tokio::test]
    async fn test_start_all_empty_returns() {
        let mgr = ChannelManager::new(Arc::new(MessageBus::new(8)));
        assert!(mgr.start_all().await.is_ok());
    }

    #[tokio::test]
    async fn test_routes_outbound_and_stops() {
        let bus = Arc::new(MessageBus::new(8));
        let http = MockChannel::new("http");
        let cli = MockChannel::new("cli");

        let mut mgr = ChannelManager::new(bus.clone());
        mgr.register(http.clone());
        mgr.register(cli.clone());
        let mgr = Arc::new(mgr);

        let runner = {
            let mgr = mgr.clone();
            tokio::spawn(async move { mgr.start_all().await })
        };

        bus.publish_outbound(OutboundMessage::new("http", "Hello web")).await.unwrap();
        bus.publish_outbound(OutboundMessage::new("cli", "Hello term")).await.unwrap();
        bus.publish_outbound(OutboundMessage::new("nowhere", "dropped")).await.unwrap();
        bus.publish_outbound(OutboundMessage::new("http", "Again web")).await.unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(100)).await;

        assert!(http.started.load(Ordering::SeqCst));
        assert_eq!(http.sent(), vec!["Hello web", "Again web"]);
        assert_eq!(cli.sent(), vec!["Hello term"]);

        mgr.stop_all().await;
        assert!(http.stopped.load(Ordering::SeqCst));

        let result = tokio::time::timeout(std::time::Duration::from_secs(2), runner)
            .await
            .expect("start_all did not return")
            .unwrap();
        assert!(result.is_ok());
    }
}
