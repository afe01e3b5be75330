use std::time::Duration;

use anyhow::{Context, Result};

use crate::assessment::heuristic::ScoringPolicy;

pub const DEFAULT_REASONING_API_URL: &str = "https://api.anthropic.com/v1/messages";

/// Application configuration loaded from environment variables.
/// Every variable is optional; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub reasoning: ReasoningConfig,
    pub delivery: DeliveryConfig,
    pub scoring: ScoringPolicy,
}

/// Settings for the structured-reasoning service behind the assessment client.
#[derive(Debug, Clone)]
pub struct ReasoningConfig {
    pub enabled: bool,
    /// `None` puts the assessment client in offline (heuristic-only) mode.
    pub api_key: Option<String>,
    pub api_url: String,
    pub request_timeout: Duration,
    pub max_attempts: u32,
    pub backoff_base: Duration,
}

impl Default for ReasoningConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: None,
            api_url: DEFAULT_REASONING_API_URL.to_string(),
            request_timeout: Duration::from_secs(30),
            max_attempts: 3,
            backoff_base: Duration::from_millis(1000),
        }
    }
}

/// Settings for the downstream webhook.
#[derive(Debug, Clone)]
pub struct DeliveryConfig {
    pub enabled: bool,
    pub endpoint: Option<String>,
    pub timeout: Duration,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: None,
            timeout: Duration::from_secs(10),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let reasoning_defaults = ReasoningConfig::default();
        let delivery_defaults = DeliveryConfig::default();
        let scoring_defaults = ScoringPolicy::default();

        Ok(Config {
            port: parse_or(&lookup, "PORT", 8080)?,
            rust_log: optional(&lookup, "RUST_LOG").unwrap_or_else(|| "info".to_string()),
            reasoning: ReasoningConfig {
                enabled: parse_flag(
                    &lookup,
                    "REASONING_SERVICE_ENABLED",
                    reasoning_defaults.enabled,
                )?,
                api_key: optional(&lookup, "ANTHROPIC_API_KEY"),
                api_url: optional(&lookup, "REASONING_API_URL")
                    .unwrap_or(reasoning_defaults.api_url),
                request_timeout: Duration::from_secs(
                    parse_or(
                        &lookup,
                        "REASONING_TIMEOUT_SECS",
                        reasoning_defaults.request_timeout.as_secs(),
                    )?
                    .max(1),
                ),
                max_attempts: parse_or(
                    &lookup,
                    "REASONING_MAX_ATTEMPTS",
                    reasoning_defaults.max_attempts,
                )?
                .max(1),
                backoff_base: Duration::from_millis(parse_or(
                    &lookup,
                    "REASONING_BACKOFF_MS",
                    reasoning_defaults.backoff_base.as_millis() as u64,
                )?),
            },
            delivery: DeliveryConfig {
                enabled: parse_flag(&lookup, "DELIVERY_ENABLED", delivery_defaults.enabled)?,
                endpoint: optional(&lookup, "DELIVERY_ENDPOINT"),
                timeout: Duration::from_secs(
                    parse_or(
                        &lookup,
                        "DELIVERY_TIMEOUT_SECS",
                        delivery_defaults.timeout.as_secs(),
                    )?
                    .max(1),
                ),
            },
            scoring: ScoringPolicy {
                base: parse_or(&lookup, "SCORE_BASE", scoring_defaults.base)?,
                per_skill: parse_or(&lookup, "SCORE_PER_SKILL", scoring_defaults.per_skill)?,
                per_year: parse_or(&lookup, "SCORE_PER_YEAR", scoring_defaults.per_year)?,
                ceiling: parse_or(&lookup, "SCORE_CEILING", scoring_defaults.ceiling)?.min(100),
            },
        })
    }
}

/// Returns the trimmed value, treating blank strings as unset.
fn optional<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional(lookup, key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| {
                format!("Environment variable '{key}' has invalid value '{raw}'")
            }),
        None => Ok(default),
    }
}

fn parse_flag<F>(lookup: &F, key: &str, default: bool) -> Result<bool>
where
    F: Fn(&str) -> Option<String>,
{
    match optional(lookup, key).map(|v| v.to_ascii_lowercase()) {
        None => Ok(default),
        Some(v) => match v.as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => anyhow::bail!("Environment variable '{key}' must be a boolean, got '{v}'"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_nothing_is_set() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.rust_log, "info");
        assert!(config.reasoning.enabled);
        assert!(config.reasoning.api_key.is_none());
        assert_eq!(config.reasoning.max_attempts, 3);
        assert_eq!(config.reasoning.backoff_base, Duration::from_secs(1));
        assert!(!config.delivery.enabled);
        assert!(config.delivery.endpoint.is_none());
        assert_eq!(config.delivery.timeout, Duration::from_secs(10));
        assert_eq!(config.scoring.base, 50);
    }

    #[test]
    fn test_blank_credential_is_treated_as_missing() {
        let config = config_from(&[("ANTHROPIC_API_KEY", "   ")]).unwrap();
        assert!(config.reasoning.api_key.is_none());
    }

    #[test]
    fn test_delivery_settings_are_read() {
        let config = config_from(&[
            ("DELIVERY_ENABLED", "TRUE"),
            ("DELIVERY_ENDPOINT", "https://hooks.internal/resume"),
            ("DELIVERY_TIMEOUT_SECS", "4"),
        ])
        .unwrap();
        assert!(config.delivery.enabled);
        assert_eq!(
            config.delivery.endpoint.as_deref(),
            Some("https://hooks.internal/resume")
        );
        assert_eq!(config.delivery.timeout, Duration::from_secs(4));
    }

    #[test]
    fn test_scoring_ceiling_is_capped_at_100() {
        let config = config_from(&[("SCORE_CEILING", "250"), ("SCORE_BASE", "60")]).unwrap();
        assert_eq!(config.scoring.ceiling, 100);
        assert_eq!(config.scoring.base, 60);
    }

    #[test]
    fn test_zero_attempts_is_raised_to_one() {
        let config = config_from(&[("REASONING_MAX_ATTEMPTS", "0")]).unwrap();
        assert_eq!(config.reasoning.max_attempts, 1);
    }

    #[test]
    fn test_zero_timeouts_are_raised_to_one_second() {
        let config = config_from(&[
            ("REASONING_TIMEOUT_SECS", "0"),
            ("DELIVERY_TIMEOUT_SECS", "0"),
        ])
        .unwrap();
        assert_eq!(config.reasoning.request_timeout, Duration::from_secs(1));
        assert_eq!(config.delivery.timeout, Duration::from_secs(1));
    }

    #[test]
    fn test_invalid_number_fails() {
        assert!(config_from(&[("PORT", "eighty")]).is_err());
    }

    #[test]
    fn test_invalid_flag_fails() {
        assert!(config_from(&[("DELIVERY_ENABLED", "maybe")]).is_err());
    }
}
