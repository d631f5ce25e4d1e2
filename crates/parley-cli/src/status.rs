//! `parley status`: show configuration, provider and schedule status.

use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use parley_core::config::load_config;
use parley_schedule::validate;

use crate::{demo_tools, helpers};

/// Run the status command.
pub fn run(path: &Path) -> Result<()> {
    let config = load_config(Some(path));

    println!();
    println!("{}", "Parley Status".cyan().bold());
    println!();

    println!(
        "  {:<18} {} {}",
        "Config:".bold(),
        path.display(),
        if path.exists() {
            helpers::mark(true)
        } else {
            "(not found)".red().to_string()
        }
    );

    println!("  {:<18} {}", "Model:".bold(), config.agent.model);
    println!(
        "  {:<18} {}",
        "Round-trip cap:".bold(),
        config
            .agent
            .max_round_trips
            .map_or_else(|| "unbounded".dimmed().to_string(), |n| n.to_string())
    );

    // Provider
    println!();
    println!("  {:<18} {}", "API base:".bold(), config.provider.api_base);
    let key_status = if config.provider.is_configured() {
        format!("{} (key set)", helpers::mark(true))
    } else {
        format!("{}", "· not configured".dimmed())
    };
    println!("  {:<18} {}", "API key:".bold(), key_status);

    // Gateway + schedule
    println!();
    println!(
        "  {:<18} http://{}:{}/app",
        "Gateway:".bold(),
        config.gateway.host,
        config.gateway.port
    );

    let intervals = &config.schedule.intervals;
    let invalid = intervals.iter().filter(|i| validate(i).is_err()).count();
    let schedule_status = if !config.schedule.enabled {
        format!("{}", "disabled".dimmed())
    } else if invalid > 0 {
        format!("{} {} interval(s), {} invalid", helpers::mark(false), intervals.len(), invalid)
    } else {
        format!("{} {} interval(s)", helpers::mark(true), intervals.len())
    };
    println!("  {:<18} {}", "Schedule:".bold(), schedule_status);

    // Tools
    println!();
    println!(
        "  {:<18} {}",
        "Tools:".bold(),
        demo_tools::registry().tool_names().join(", ")
    );
    println!();

    Ok(())
}
