//! Gateway command: HTTP chat channel, agent task and interval scheduler.
//!
//! Startup sequence:
//! 1. Create message bus
//! 2. Build the agent with a listener that publishes to the HTTP channel
//! 3. Register the HTTP channel with the channel manager
//! 4. Start the interval scheduler when enabled
//! 5. Run: `tokio::select!` of agent task + channel manager + Ctrl+C

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use parley_agent::{ConversationAgent, MessageListenerFn};
use parley_channels::{ChannelManager, HttpChannel, HTTP_CHANNEL};
use parley_core::bus::{InboundMessage, MessageBus, OutboundMessage};
use parley_core::config::Config;
use parley_core::utils::truncate_string;
use parley_schedule::{IntervalScheduler, TriggerFn};

use crate::helpers;

/// Channel name scheduler-injected prompts arrive on.
const SCHEDULE_CHANNEL: &str = "schedule";

/// Run the gateway until Ctrl+C.
pub async fn run(config: Config, config_path: &Path) -> Result<()> {
    helpers::print_banner();
    println!("  Mode: Gateway");
    println!();

    let bus = Arc::new(MessageBus::new(100));

    let agent = crate::build_agent(&config, config_path, outbound_listener(&bus))?;

    let mut channel_manager = ChannelManager::new(bus.clone());
    let http = HttpChannel::new(&config.gateway, bus.inbound_sender());
    let addr = http.addr().to_string();
    channel_manager.register(Arc::new(http));

    let scheduler = if config.schedule.enabled {
        let scheduler = IntervalScheduler::start(
            &config.schedule.intervals,
            schedule_trigger(&bus, config.schedule.prompt.clone()),
        )
        .context("invalid schedule configuration")?;
        Some(scheduler)
    } else {
        None
    };

    info!(
        model = agent.model(),
        addr = %addr,
        channels = ?channel_manager.channel_names(),
        intervals = config.schedule.intervals.len(),
        schedule = scheduler.is_some(),
        "gateway starting"
    );

    println!("  Model:     {}", agent.model());
    println!("  Chat:      http://{addr}/app");
    match &scheduler {
        Some(_) => println!("  Schedule:  {} interval(s)", config.schedule.intervals.len()),
        None => println!("  Schedule:  disabled"),
    }
    println!();
    println!("  Ctrl+C to stop");
    println!();

    tokio::select! {
        _ = run_agent_task(agent, bus.clone()) => {
            info!("agent task exited");
        }
        result = channel_manager.start_all() => {
            if let Err(e) = result {
                error!(error = %e, "channel manager error");
            }
        }
        _ = tokio::signal::ctrl_c() => {
            println!();
            println!("  Shutting down...");
            info!("received Ctrl+C, shutting down");
            if let Some(scheduler) = &scheduler {
                scheduler.terminate();
            }
            channel_manager.stop_all().await;
        }
    }

    println!("  Gateway stopped. Goodbye!");
    Ok(())
}

/// Listener that queues each assistant message for the HTTP channel.
fn outbound_listener(bus: &MessageBus) -> MessageListenerFn {
    let outbound = bus.outbound_sender();
    Arc::new(move |text: &str| {
        if let Err(e) = outbound.try_send(OutboundMessage::new(HTTP_CHANNEL, text)) {
            warn!(error = %e, "dropping assistant message");
        }
    })
}

/// Trigger that injects the scheduled prompt as a user message.
fn schedule_trigger(bus: &MessageBus, prompt: String) -> TriggerFn {
    let inbound = bus.inbound_sender();
    Arc::new(move || {
        if let Err(e) = inbound.try_send(InboundMessage::new(SCHEDULE_CHANNEL, prompt.clone())) {
            warn!(error = %e, "dropping scheduled prompt");
        }
    })
}

/// Feed inbound messages to the agent one at a time, in arrival order.
///
/// Owning the agent here serializes every `chat()` on one transcript.
async fn run_agent_task(mut agent: ConversationAgent, bus: Arc<MessageBus>) {
    while let Some(msg) = bus.consume_inbound().await {
        info!(
            channel = %msg.channel,
            preview = %truncate_string(&msg.content, 60),
            "processing inbound message"
        );

        if let Err(e) = agent.chat(msg.content).await {
            error!(error = %e, "agent chat failed");
            let reply = OutboundMessage::new(HTTP_CHANNEL, format!("Error: {e}"));
            if let Err(e) = bus.publish_outbound(reply).await {
                warn!(error = %e, "failed to publish error reply");
            }
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
