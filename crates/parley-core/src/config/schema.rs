//! Configuration schema.
//!
//! Hierarchy: `Config` → `AgentConfig`, `ProviderConfig`, `GatewayConfig`,
//! `ScheduleConfig`.
//!
//! JSON on disk uses **camelCase** keys; Rust uses snake_case.

use serde::{Deserialize, Serialize};

use crate::types::ScheduleInterval;

// ─────────────────────────────────────────────
// Root Config
// ─────────────────────────────────────────────

/// Root configuration: loaded from `~/.parley/config.json` + env vars.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub agent: AgentConfig,
    pub provider: ProviderConfig,
    pub gateway: GatewayConfig,
    pub schedule: ScheduleConfig,
}

// ─────────────────────────────────────────────
// Agent
// ─────────────────────────────────────────────

/// Conversation agent settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AgentConfig {
    /// Remote model identifier.
    pub model: String,
    /// Instructions sent with every request.
    pub system_prompt: String,
    /// Responses API text verbosity ("low", "medium", "high").
    pub verbosity: String,
    /// Upper bound on remote round-trips per `chat()`. Unbounded when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_round_trips: Option<usize>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4.1".to_string(),
            system_prompt: "You are a helpful AI assistant.".to_string(),
            verbosity: "medium".to_string(),
            max_round_trips: None,
        }
    }
}

// ─────────────────────────────────────────────
// Provider
// ─────────────────────────────────────────────

/// Remote model endpoint and credentials.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderConfig {
    /// API key for bearer authentication.
    pub api_key: String,
    /// API base URL; `/responses` is appended.
    pub api_base: String,
    /// HTTP request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: "https://api.openai.com/v1".to_string(),
            timeout_secs: 120,
        }
    }
}

impl ProviderConfig {
    /// Whether an API key is configured.
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }
}

// ─────────────────────────────────────────────
// Gateway
// ─────────────────────────────────────────────

/// HTTP chat channel listen address.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

// ─────────────────────────────────────────────
// Schedule
// ─────────────────────────────────────────────

/// Interval scheduler wiring for gateway mode.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScheduleConfig {
    /// Whether the gateway starts the scheduler.
    pub enabled: bool,
    /// Prompt injected into the conversation each time an interval fires.
    pub prompt: String,
    /// Raw intervals; validated when the scheduler starts.
    pub intervals: Vec<ScheduleInterval>,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            prompt: "Scheduled check-in: review anything that needs attention.".to_string(),
            intervals: Vec::new(),
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::IntervalType;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.agent.model, "gpt-4.1");
        assert_eq!(config.agent.system_prompt, "You are a helpful AI assistant.");
        assert!(config.agent.max_round_trips.is_none());
        assert_eq!(config.provider.api_base, "https://api.openai.com/v1");
        assert_eq!(config.gateway.port, 3000);
        assert!(!config.schedule.enabled);
    }

    #[test]
    fn test_config_from_json_camel_case() {
        let json = serde_json::json!({
            "agent": {
                "model": "gpt-4o",
                "systemPrompt": "Be terse.",
                "maxRoundTrips": 8
            },
            "provider": {
                "apiKey": "sk-test",
                "timeoutSecs": 30
            },
            "schedule": {
                "enabled": true,
                "intervals": [
                    { "intervalType": "hourly", "options": { "minutes": 27 } },
                    { "intervalType": "minute", "options": 1 }
                ]
            }
        });

        let config: Config = serde_json::from_value(json).unwrap();
        assert_eq!(config.agent.model, "gpt-4o");
        assert_eq!(config.agent.system_prompt, "Be terse.");
        assert_eq!(config.agent.max_round_trips, Some(8));
        assert_eq!(config.provider.api_key, "sk-test");
        assert_eq!(config.provider.timeout_secs, 30);
        // Defaults preserved for missing fields
        assert_eq!(config.provider.api_base, "https://api.openai.com/v1");
        assert_eq!(config.agent.verbosity, "medium");
        assert!(config.schedule.enabled);
        assert_eq!(config.schedule.intervals.len(), 2);
        assert_eq!(config.schedule.intervals[0].interval_type, IntervalType::Hourly);
    }

    #[test]
    fn test_config_json_uses_camel_case() {
        let config = Config::default();
        let json = serde_json::to_value(&config).unwrap();
        assert!(json["agent"].get("systemPrompt").is_some());
        assert!(json["provider"].get("timeoutSecs").is_some());
        assert!(json["agent"].get("system_prompt").is_none());
        // Unset round-trip cap is omitted entirely
        assert!(json["agent"].get("maxRoundTrips").is_none());
    }

    #[test]
    fn test_provider_config_is_configured() {
        assert!(!ProviderConfig::default().is_configured());

        let with_key = ProviderConfig {
            api_key: "sk-123".to_string(),
            ..Default::default()
        };
        assert!(with_key.is_configured());
    }

    #[test]
    fn test_empty_json_gives_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.agent.model, "gpt-4.1");
        assert_eq!(config.gateway.host, "127.0.0.1");
        assert!(config.schedule.intervals.is_empty());
    }
}
