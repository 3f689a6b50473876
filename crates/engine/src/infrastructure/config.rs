//! Engine configuration read from the environment.

use std::time::Duration;

/// Default OpenAI-compatible endpoint.
pub const DEFAULT_LLM_API_ENDPOINT: &str = "http://localhost:11434/v1";

/// Default model name.
pub const DEFAULT_LLM_MODEL: &str = "llama3.2";

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Capacity of each subscriber mailbox on the event bus.
    pub mailbox_capacity: usize,
    /// Deadline for a single reaction's LLM call.
    pub llm_timeout: Duration,
    /// Upper bound on concurrent global-observer accruals.
    pub max_concurrent_accruals: usize,
    pub llm_api_endpoint: String,
    pub llm_api_key: Option<String>,
    pub llm_model: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            mailbox_capacity: 256,
            llm_timeout: Duration::from_secs(30),
            max_concurrent_accruals: 16,
            llm_api_endpoint: DEFAULT_LLM_API_ENDPOINT.to_string(),
            llm_api_key: None,
            llm_model: DEFAULT_LLM_MODEL.to_string(),
        }
    }
}

impl EngineConfig {
    /// Read configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`, falling back to defaults for
    /// unset keys.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let lookup = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let mailbox_capacity =
            parse_positive(&lookup, "MUDMIND_MAILBOX_CAPACITY", defaults.mailbox_capacity)?;
        let llm_timeout_secs = parse_positive(
            &lookup,
            "MUDMIND_LLM_TIMEOUT_SECS",
            defaults.llm_timeout.as_secs() as usize,
        )?;
        let max_concurrent_accruals = parse_positive(
            &lookup,
            "MUDMIND_MAX_CONCURRENT_ACCRUALS",
            defaults.max_concurrent_accruals,
        )?;

        Ok(Self {
            mailbox_capacity,
            llm_timeout: Duration::from_secs(llm_timeout_secs as u64),
            max_concurrent_accruals,
            llm_api_endpoint: lookup("LLM_API_ENDPOINT").unwrap_or(defaults.llm_api_endpoint),
            llm_api_key: lookup("LLM_API_KEY"),
            llm_model: lookup("LLM_MODEL_NAME").unwrap_or(defaults.llm_model),
        })
    }
}

fn parse_positive(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: usize,
) -> Result<usize, ConfigError> {
    match lookup(key) {
        None => Ok(default),
        Some(raw) => match raw.parse::<usize>() {
            Ok(0) | Err(_) => Err(ConfigError::Invalid { key, value: raw }),
            Ok(value) => Ok(value),
        },
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: '{value}' (expected a positive integer)")]
    Invalid { key: &'static str, value: String },
}
