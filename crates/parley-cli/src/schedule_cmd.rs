//! `parley schedule`: inspect and edit the gateway's interval schedule.
//!
//! - `parley schedule check`: validate every configured interval
//! - `parley schedule add <TYPE> [ARGS...]`: append an interval
//! - `parley schedule remove <INDEX>`: remove an interval
//! - `parley schedule enable` / `disable`: toggle the scheduler

use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use colored::Colorize;

use parley_core::config::{load_config, save_config, try_load_config_file, Config};
use parley_core::types::{IntervalType, ScheduleInterval};
use parley_schedule::{from_args, validate};

use crate::helpers;

// ─────────────────────────────────────────────
// Subcommand enum
// ─────────────────────────────────────────────

#[derive(Subcommand)]
pub enum ScheduleCommands {
    /// Validate and list the configured intervals
    Check,

    /// Add an interval
    Add {
        /// minute | hourly | daily | hours
        #[arg(value_parser = parse_interval_type)]
        interval_type: IntervalType,

        /// hourly: MINUTE · daily: HOUR MINUTE · hours: N · minute: any number
        args: Vec<u32>,
    },

    /// Remove an interval by its position in `check` output
    Remove {
        /// 1-based index
        index: usize,
    },

    /// Start the scheduler with the gateway
    Enable,

    /// Don't start the scheduler with the gateway
    Disable,
}

fn parse_interval_type(s: &str) -> Result<IntervalType, String> {
    serde_json::from_value(serde_json::Value::String(s.to_lowercase()))
        .map_err(|_| {
            format!("unknown interval type '{s}' (expected minute, hourly, daily or hours)")
        })
}

// ─────────────────────────────────────────────
// Dispatch
// ─────────────────────────────────────────────

pub fn dispatch(cmd: ScheduleCommands, config_path: Option<&Path>) -> Result<()> {
    match cmd {
        ScheduleCommands::Check => check(&load_config(config_path)),
        ScheduleCommands::Add {
            interval_type,
            args,
        } => edit(config_path, |config| {
            let interval = add_interval(config, interval_type, &args)?;
            println!(
                "  {} Added {} interval {}",
                helpers::mark(true),
                interval.interval_type,
                interval.options
            );
            Ok(())
        }),
        ScheduleCommands::Remove { index } => edit(config_path, |config| {
            let removed = remove_interval(config, index)?;
            println!(
                "  {} Removed {} interval {}",
                helpers::mark(true),
                removed.interval_type,
                removed.options
            );
            Ok(())
        }),
        ScheduleCommands::Enable => edit(config_path, |config| {
            config.schedule.enabled = true;
            println!("  {} Scheduler enabled", helpers::mark(true));
            Ok(())
        }),
        ScheduleCommands::Disable => edit(config_path, |config| {
            config.schedule.enabled = false;
            println!("  {} Scheduler disabled", helpers::mark(true));
            Ok(())
        }),
    }
}

/// Load the file without env overrides, apply `f`, save.
///
/// An unreadable or malformed file aborts before anything is written.
fn edit(config_path: Option<&Path>, f: impl FnOnce(&mut Config) -> Result<()>) -> Result<()> {
    let mut config = try_load_config_file(config_path).context("refusing to edit config")?;
    f(&mut config)?;
    save_config(&config, config_path).context("failed to save config")?;
    Ok(())
}

// ─────────────────────────────────────────────
// Operations
// ─────────────────────────────────────────────

fn check(config: &Config) -> Result<()> {
    let intervals = &config.schedule.intervals;

    println!();
    println!(
        "  {:<10} {}",
        "Scheduler:".bold(),
        if config.schedule.enabled {
            "enabled".green()
        } else {
            "disabled".dimmed()
        }
    );
    println!("  {:<10} {}", "Prompt:".bold(), config.schedule.prompt);
    println!();

    if intervals.is_empty() {
        println!("  {}", "No intervals configured.".dimmed());
        println!();
        return Ok(());
    }

    let mut invalid = 0;
    for (i, interval) in intervals.iter().enumerate() {
        match validate(interval) {
            Ok(spec) => println!("  {} {:>2}. {}", helpers::mark(true), i + 1, spec),
            Err(e) => {
                invalid += 1;
                println!("  {} {:>2}. {}", helpers::mark(false), i + 1, e.to_string().red());
            }
        }
    }
    println!();

    if invalid > 0 {
        bail!("{invalid} of {} interval(s) invalid", intervals.len());
    }
    Ok(())
}

/// Build, validate and append an interval.
fn add_interval(
    config: &mut Config,
    interval_type: IntervalType,
    args: &[u32],
) -> Result<ScheduleInterval> {
    let interval = from_args(interval_type, args)?;
    validate(&interval)?;
    config.schedule.intervals.push(interval.clone());
    Ok(interval)
}

fn remove_interval(config: &mut Config, index: usize) -> Result<ScheduleInterval> {
    let len = config.schedule.intervals.len();
    if index == 0 || index > len {
        bail!("no interval at position {index} ({len} configured)");
    }
    Ok(config.schedule.intervals.remove(index - 1))
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_interval_type() {
        assert_eq!(parse_interval_type("hourly").unwrap(), IntervalType::Hourly);
        assert_eq!(parse_interval_type("Daily").unwrap(), IntervalType::Daily);
        assert!(parse_interval_type("weekly").is_err());
    }

    #[test]
    fn test_add_interval_validates() {
        let mut config = Config::default();

        add_interval(&mut config, IntervalType::Daily, &[9, 30]).unwrap();
        assert_eq!(config.schedule.intervals, vec![ScheduleInterval::daily(9, 30)]);

        assert!(add_interval(&mut config, IntervalType::Daily, &[9]).is_err());
        assert!(add_interval(&mut config, IntervalType::Hourly, &[60]).is_err());
        assert_eq!(config.schedule.intervals.len(), 1);
    }

    #[test]
    fn test_remove_interval_bounds() {
        let mut config = Config::default();
        config.schedule.intervals = vec![ScheduleInterval::minute(), ScheduleInterval::hours(2)];

        assert!(remove_interval(&mut config, 0).is_err());
        assert!(remove_interval(&mut config, 3).is_err());
        assert_eq!(remove_interval(&mut config, 1).unwrap(), ScheduleInterval::minute());
        assert_eq!(config.schedule.intervals, vec![ScheduleInterval::hours(2)]);
    }

    #[test]
    fn test_check_fails_on_invalid_entry() {
        let mut config = Config::default();
        config.schedule.intervals = vec![
            ScheduleInterval::hourly(5),
            ScheduleInterval {
                interval_type: IntervalType::Hours,
                options: json!({ "hours": 0 }),
            },
        ];
        assert!(check(&config).is_err());

        config.schedule.intervals.pop();
        assert!(check(&config).is_ok());
    }

    #[test]
    fn test_dispatch_edits_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        dispatch(
            ScheduleCommands::Add {
                interval_type: IntervalType::Hourly,
                args: vec![27],
            },
            Some(&path),
        )
        .unwrap();
        dispatch(ScheduleCommands::Enable, Some(&path)).unwrap();

        let saved = try_load_config_file(Some(&path)).unwrap();
        assert!(saved.schedule.enabled);
        assert_eq!(saved.schedule.intervals, vec![ScheduleInterval::hourly(27)]);

        dispatch(ScheduleCommands::Remove { index: 1 }, Some(&path)).unwrap();
        dispatch(ScheduleCommands::Disable, Some(&path)).unwrap();

        let saved = try_load_config_file(Some(&path)).unwrap();
        assert!(!saved.schedule.enabled);
        assert!(saved.schedule.intervals.is_empty());
    }

    #[test]
    fn test_malformed_file_left_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let original = r#"{"provider":{"apiKey":"sk-secret"},"agent":{"systemPrompt":"Custom"},}"#;
        std::fs::write(&path, original).unwrap();

        let result = dispatch(ScheduleCommands::Enable, Some(&path));

        assert!(result.is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), original);
    }
}
