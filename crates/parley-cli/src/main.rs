//! Parley CLI: entry point.
//!
//! # Commands
//!
//! - `parley agent [-m MESSAGE]`: chat (single-shot or REPL)
//! - `parley gateway`: HTTP chat channel + agent task + interval scheduler
//! - `parley schedule <check|add|remove|enable|disable>`: manage intervals
//! - `parley status`: show configuration summary

mod demo_tools;
mod gateway;
mod helpers;
mod repl;
mod schedule_cmd;
mod status;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use parley_agent::{ConversationAgent, MessageListenerFn};
use parley_core::config::{get_config_path, load_config, Config};
use parley_core::utils::expand_tilde;
use parley_providers::ResponsesProvider;

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// Parley: a conversational agent with local tools and interval triggers
#[derive(Parser)]
#[command(name = "parley", version, about, long_about = None)]
struct Cli {
    /// Config file (default: ~/.parley/config.json)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with the agent (single-shot or interactive REPL)
    Agent {
        /// Single message (non-interactive). Omit for REPL mode.
        #[arg(short, long)]
        message: Option<String>,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Start the gateway (HTTP chat channel + agent + scheduler)
    Gateway {
        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Manage schedule intervals
    Schedule {
        #[command(subcommand)]
        action: schedule_cmd::ScheduleCommands,
    },

    /// Show configuration status
    Status,
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config_path: PathBuf = cli
        .config
        .as_deref()
        .map(expand_tilde)
        .unwrap_or_else(get_config_path);

    match cli.command {
        Commands::Agent { message, logs } => {
            init_logging(logs);
            let config = load_config(Some(&config_path));
            run_agent(&config, &config_path, message).await
        }
        Commands::Gateway { logs } => {
            init_logging(logs);
            let config = load_config(Some(&config_path));
            gateway::run(config, &config_path).await
        }
        Commands::Schedule { action } => {
            init_logging(false);
            schedule_cmd::dispatch(action, Some(&config_path))
        }
        Commands::Status => status::run(&config_path),
    }
}

// ─────────────────────────────────────────────
// Agent command
// ─────────────────────────────────────────────

async fn run_agent(config: &Config, config_path: &Path, message: Option<String>) -> Result<()> {
    match message {
        Some(msg) => {
            let listener: MessageListenerFn = Arc::new(|text: &str| helpers::print_response(text));
            let mut agent = build_agent(config, config_path, listener)?;

            info!("processing single message");
            agent.chat(msg).await.context("agent processing failed")?;
        }
        None => {
            let listener: MessageListenerFn = Arc::new(|text: &str| {
                helpers::clear_thinking();
                helpers::print_response(text);
            });
            let agent = build_agent(config, config_path, listener)?;
            repl::run(agent).await?;
        }
    }

    Ok(())
}

/// Build a `ConversationAgent` from the loaded configuration, with the demo
/// tools registered. `config_path` is only used in error messages.
pub fn build_agent(
    config: &Config,
    config_path: &Path,
    listener: MessageListenerFn,
) -> Result<ConversationAgent> {
    if !config.provider.is_configured() {
        anyhow::bail!(
            "No API key configured. Set OPENAI_API_KEY or provider.apiKey in {}",
            config_path.display()
        );
    }

    let provider = ResponsesProvider::new(
        &config.provider,
        config.agent.model.clone(),
        config.agent.verbosity.clone(),
    )
    .context("failed to create model provider")?;

    let system_prompt = config.agent.system_prompt.clone();

    let agent = ConversationAgent::new(
        Arc::new(provider),
        Arc::new(move || system_prompt.clone()),
        demo_tools::registry(),
        listener,
    )
    .with_max_round_trips(config.agent.max_round_trips);

    Ok(agent)
}

/// Initialize tracing/logging.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("parley=debug,info")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
