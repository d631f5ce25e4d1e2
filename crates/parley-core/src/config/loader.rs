//! Config loader: reads `~/.parley/config.json` and merges env vars.
//!
//! # Loading precedence
//! 1. Defaults (from `Config::default()`)
//! 2. JSON file at `~/.parley/config.json`
//! 3. Environment variables `PARLEY_<SECTION>__<FIELD>` (override JSON)
//! 4. `OPENAI_API_KEY`, only when no key is configured by 2 or 3

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::schema::Config;

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    crate::utils::get_data_path().join("config.json")
}

/// Load configuration from the default path (or `path`) + env vars.
///
/// Falls back to `Config::default()` if the file doesn't exist or can't be parsed.
pub fn load_config(path: Option<&Path>) -> Config {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    load_config_from_path(&config_path)
}

fn load_config_from_path(path: &Path) -> Config {
    apply_env_overrides(read_config_file(path))
}

/// Load the file only, skipping env overrides and failing on unreadable or
/// malformed JSON. A missing file yields `Config::default()`.
///
/// Use this before `save_config`: environment values are never written to
/// disk, and a typo never turns into a file full of defaults.
pub fn try_load_config_file(path: Option<&Path>) -> std::io::Result<Config> {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);
    if !config_path.exists() {
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(&config_path)?;
    serde_json::from_str(&content).map_err(|e| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("{}: {e}", config_path.display()),
        )
    })
}

/// Read and parse the JSON file, without env overrides.
fn read_config_file(path: &Path) -> Config {
    if !path.exists() {
        info!("No config file found at {}, using defaults", path.display());
        return Config::default();
    }

    debug!("Loading config from {}", path.display());

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return Config::default();
        }
    };

    match serde_json::from_str(&content) {
        Ok(config) => config,
        Err(e) => {
            warn!("Failed to parse config JSON: {}", e);
            Config::default()
        }
    }
}

/// Save configuration to disk (pretty-printed JSON with camelCase keys).
pub fn save_config(config: &Config, path: Option<&Path>) -> std::io::Result<()> {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(config).map_err(std::io::Error::other)?;

    std::fs::write(&config_path, json)?;
    debug!("Config saved to {}", config_path.display());
    Ok(())
}

/// Apply environment variable overrides on top of a loaded config.
///
/// Supported overrides:
/// - `PARLEY_AGENT__MODEL` → `agent.model`
/// - `PARLEY_AGENT__SYSTEM_PROMPT` → `agent.system_prompt`
/// - `PARLEY_AGENT__MAX_ROUND_TRIPS` → `agent.max_round_trips`
/// - `PARLEY_PROVIDER__API_KEY` → `provider.api_key`
/// - `PARLEY_PROVIDER__API_BASE` → `provider.api_base`
/// - `PARLEY_GATEWAY__HOST` → `gateway.host`
/// - `PARLEY_GATEWAY__PORT` → `gateway.port`
/// - `PARLEY_SCHEDULE__ENABLED` → `schedule.enabled`
fn apply_env_overrides(mut config: Config) -> Config {
    // Agent
    if let Ok(val) = std::env::var("PARLEY_AGENT__MODEL") {
        config.agent.model = val;
    }
    if let Ok(val) = std::env::var("PARLEY_AGENT__SYSTEM_PROMPT") {
        config.agent.system_prompt = val;
    }
    if let Ok(val) = std::env::var("PARLEY_AGENT__MAX_ROUND_TRIPS") {
        if let Ok(n) = val.parse::<usize>() {
            config.agent.max_round_trips = Some(n);
        }
    }

    // Provider
    if let Ok(val) = std::env::var("PARLEY_PROVIDER__API_KEY") {
        config.provider.api_key = val;
    }
    if let Ok(val) = std::env::var("PARLEY_PROVIDER__API_BASE") {
        config.provider.api_base = val;
    }
    if !config.provider.is_configured() {
        if let Ok(val) = std::env::var("OPENAI_API_KEY") {
            config.provider.api_key = val;
        }
    }

    // Gateway
    if let Ok(val) = std::env::var("PARLEY_GATEWAY__HOST") {
        config.gateway.host = val;
    }
    if let Ok(val) = std::env::var("PARLEY_GATEWAY__PORT") {
        if let Ok(p) = val.parse::<u16>() {
            config.gateway.port = p;
        }
    }

    // Schedule
    if let Ok(val) = std::env::var("PARLEY_SCHEDULE__ENABLED") {
        config.schedule.enabled = val == "true" || val == "1";
    }

    config
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
