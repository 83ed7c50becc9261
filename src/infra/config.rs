// src/infra/config.rs — Configuration loading (TOML + env overrides)
//
// Every knob has a working default; a run needs no config file at all.
// DERMBENCH_* environment variables override whatever the file says, so CI
// jobs can tune retry behavior without shipping a config.toml.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::infra::paths;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub judge: JudgeConfig,

    #[serde(default)]
    pub retry: RetryConfig,

    #[serde(default)]
    pub pacing: PacingConfig,
}

/// Judge endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JudgeConfig {
    pub model: String,
    /// 0.0 keeps scoring reproducible run-to-run.
    pub temperature: f32,
    pub max_output_tokens: u32,
    /// Hard cap on the growable output budget.
    pub max_output_tokens_cap: u32,
    /// Added to the budget on each truncation retry.
    pub token_growth_increment: u32,
    pub request_timeout_secs: u64,
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".into(),
            temperature: 0.0,
            max_output_tokens: 1200,
            max_output_tokens_cap: 4096,
            token_growth_increment: 400,
            request_timeout_secs: 120,
        }
    }
}

/// Retry and backoff settings. Network and HTTP failures keep independent
/// budgets: a flaky connection and an overloaded API recover differently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    pub max_network_retries: u32,
    pub max_http_retries: u32,
    pub backoff_ceiling_secs: u64,
    pub backoff_jitter: f64,
    /// Whole-batch retry passes over transient failures, after the initial pass.
    pub retry_passes: u32,
    pub retry_cooldown_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_network_retries: 3,
            max_http_retries: 5,
            backoff_ceiling_secs: 60,
            backoff_jitter: 0.3,
            retry_passes: 2,
            retry_cooldown_secs: 30,
        }
    }
}

/// Adaptive inter-request delay settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacingConfig {
    pub base_delay_secs: f64,
    pub min_delay_secs: f64,
    pub max_delay_secs: f64,
    /// Rolling window of request outcomes used to estimate the error rate.
    pub error_window: usize,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            base_delay_secs: 3.0,
            min_delay_secs: 1.0,
            max_delay_secs: 10.0,
            error_window: 10,
        }
    }
}

impl Config {
    /// Load config from file if present, then apply env overrides.
    pub fn load() -> anyhow::Result<Self> {
        let path = paths::config_file_path();
        let mut config = if path.exists() {
            Self::load_from(&path)?
        } else {
            Self::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Resolve the judge API key. Env-only, never stored in config.toml.
    pub fn api_key() -> Option<String> {
        std::env::var("GOOGLE_API_KEY")
            .or_else(|_| std::env::var("GEMINI_API_KEY"))
            .ok()
            .filter(|k| !k.is_empty())
    }

    pub fn apply_env_overrides(&mut self) {
        env_override("GEMINI_MODEL", &mut self.judge.model);
        env_override("DERMBENCH_JUDGE_MODEL", &mut self.judge.model);
        env_parse("DERMBENCH_TEMPERATURE", &mut self.judge.temperature);
        env_parse("DERMBENCH_MAX_OUTPUT_TOKENS", &mut self.judge.max_output_tokens);
        env_parse(
            "DERMBENCH_MAX_OUTPUT_TOKENS_CAP",
            &mut self.judge.max_output_tokens_cap,
        );
        env_parse(
            "DERMBENCH_REQUEST_TIMEOUT_SECS",
            &mut self.judge.request_timeout_secs,
        );

        env_parse(
            "DERMBENCH_MAX_NETWORK_RETRIES",
            &mut self.retry.max_network_retries,
        );
        env_parse("DERMBENCH_MAX_HTTP_RETRIES", &mut self.retry.max_http_retries);
        env_parse(
            "DERMBENCH_BACKOFF_CEILING_SECS",
            &mut self.retry.backoff_ceiling_secs,
        );
        env_parse("DERMBENCH_BACKOFF_JITTER", &mut self.retry.backoff_jitter);
        env_parse("DERMBENCH_RETRY_PASSES", &mut self.retry.retry_passes);
        env_parse(
            "DERMBENCH_RETRY_COOLDOWN_SECS",
            &mut self.retry.retry_cooldown_secs,
        );

        env_parse("DERMBENCH_BASE_DELAY_SECS", &mut self.pacing.base_delay_secs);
        env_parse("DERMBENCH_MIN_DELAY_SECS", &mut self.pacing.min_delay_secs);
        env_parse("DERMBENCH_MAX_DELAY_SECS", &mut self.pacing.max_delay_secs);
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.judge.request_timeout_secs)
    }

    pub fn retry_cooldown(&self) -> Duration {
        Duration::from_secs(self.retry.retry_cooldown_secs)
    }
}

fn env_override(var: &str, slot: &mut String) {
    if let Ok(v) = std::env::var(var) {
        if !v.is_empty() {
            *slot = v;
        }
    }
}

fn env_parse<T: std::str::FromStr>(var: &str, slot: &mut T) {
    if let Ok(v) = std::env::var(var) {
        if let Ok(parsed) = v.parse() {
            *slot = parsed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_reasonable() {
        let c = Config::default();
        assert_eq!(c.judge.model, "gemini-2.5-flash");
        assert!((c.judge.temperature - 0.0).abs() < 0.001);
        assert_eq!(c.judge.max_output_tokens, 1200);
        assert_eq!(c.judge.max_output_tokens_cap, 4096);
        assert_eq!(c.retry.max_network_retries, 3);
        assert_eq!(c.retry.max_http_retries, 5);
        assert_eq!(c.retry.retry_passes, 2);
        assert_eq!(c.pacing.error_window, 10);
    }

    #[test]
    fn test_parse_minimal_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.judge.max_output_tokens, 1200);
        assert_eq!(config.retry.backoff_ceiling_secs, 60);
    }

    #[test]
    fn test_parse_full_toml() {
        let toml_str = r#"
[judge]
model = "gemini-2.5-pro"
temperature = 0.2
max_output_tokens = 2000
max_output_tokens_cap = 8192
token_growth_increment = 500
request_timeout_secs = 60

[retry]
max_network_retries = 4
max_http_retries = 8
backoff_ceiling_secs = 120
backoff_jitter = 0.1
retry_passes = 3
retry_cooldown_secs = 45

[pacing]
base_delay_secs = 2.0
min_delay_secs = 0.5
max_delay_secs = 20.0
error_window = 20
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.judge.model, "gemini-2.5-pro");
        assert_eq!(config.judge.max_output_tokens_cap, 8192);
        assert_eq!(config.retry.max_http_retries, 8);
        assert!((config.retry.backoff_jitter - 0.1).abs() < 0.001);
        assert_eq!(config.retry.retry_passes, 3);
        assert!((config.pacing.max_delay_secs - 20.0).abs() < 0.001);
        assert_eq!(config.pacing.error_window, 20);
    }

    #[test]
    fn test_serialize_roundtrip() {
        let config = Config::default();
        let serialized = toml::to_string(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(deserialized.judge.model, config.judge.model);
        assert_eq!(
            deserialized.retry.max_network_retries,
            config.retry.max_network_retries
        );
    }

    #[test]
    fn test_load_nonexistent_file() {
        assert!(Config::load_from(Path::new("/nonexistent/config.toml")).is_err());
    }

    #[test]
    fn test_durations() {
        let c = Config::default();
        assert_eq!(c.request_timeout(), Duration::from_secs(120));
        assert_eq!(c.retry_cooldown(), Duration::from_secs(30));
    }
}
