use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails if a required variable is missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    /// Whether extraction calls the language model first.
    pub use_llm: bool,
    /// Present exactly when `use_llm` is set.
    pub anthropic_api_key: Option<String>,
    /// Overrides the Messages API URL, e.g. for a gateway.
    pub llm_endpoint: Option<String>,
    pub llm_retry_delay: Duration,
    pub llm_timeout: Duration,
    /// Directory that path-based screening requests are resolved against. Without it only
    /// uploads are accepted.
    pub document_root: Option<PathBuf>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let use_llm = match lookup("USE_LLM") {
            Some(value) => parse_bool(&value)
                .with_context(|| format!("USE_LLM must be true or false, got '{value}'"))?,
            None => true,
        };

        let anthropic_api_key = if use_llm {
            Some(require(&lookup, "ANTHROPIC_API_KEY")?)
        } else {
            None
        };

        Ok(Config {
            use_llm,
            anthropic_api_key,
            llm_endpoint: optional(&lookup, "ANTHROPIC_API_URL"),
            llm_retry_delay: Duration::from_secs(parse_or(&lookup, "LLM_RETRY_DELAY_SECS", 10)?),
            llm_timeout: Duration::from_secs(parse_or(&lookup, "LLM_TIMEOUT_SECS", 120)?),
            document_root: optional(&lookup, "DOCUMENT_ROOT").map(PathBuf::from),
            port: parse_or(&lookup, "PORT", 8080)?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn require(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<String> {
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key).filter(|v| !v.trim().is_empty())
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{value}'")),
        None => Ok(default),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_with_api_key() {
        let config = load(&[("ANTHROPIC_API_KEY", "sk-test")]).unwrap();
        assert!(config.use_llm);
        assert_eq!(config.anthropic_api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.llm_retry_delay, Duration::from_secs(10));
        assert_eq!(config.llm_timeout, Duration::from_secs(120));
        assert_eq!(config.port, 8080);
        assert_eq!(config.rust_log, "info");
        assert!(config.llm_endpoint.is_none());
        assert!(config.document_root.is_none());
    }

    #[test]
    fn test_api_key_required_when_llm_enabled() {
        let err = load(&[]).unwrap_err();
        assert!(err.to_string().contains("ANTHROPIC_API_KEY"));
    }

    #[test]
    fn test_llm_disabled_needs_no_key() {
        let config = load(&[("USE_LLM", "FALSE")]).unwrap();
        assert!(!config.use_llm);
        assert!(config.anthropic_api_key.is_none());
    }

    #[test]
    fn test_overrides_and_invalid_values() {
        let config = load(&[
            ("USE_LLM", "false"),
            ("LLM_RETRY_DELAY_SECS", "2"),
            ("PORT", "3000"),
            ("DOCUMENT_ROOT", "/srv/screening"),
            ("ANTHROPIC_API_URL", "http://gateway.internal/v1/messages"),
        ])
        .unwrap();
        assert_eq!(config.llm_retry_delay, Duration::from_secs(2));
        assert_eq!(config.port, 3000);
        assert_eq!(config.document_root, Some(PathBuf::from("/srv/screening")));
        assert_eq!(
            config.llm_endpoint.as_deref(),
            Some("http://gateway.internal/v1/messages")
        );

        assert!(load(&[("USE_LLM", "false"), ("PORT", "eighty")]).is_err());
        assert!(load(&[("USE_LLM", "maybe")]).is_err());
    }
}
