//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Which record store backend to use.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    Redis,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "redis" => Ok(StoreBackend::Redis),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(format!("'{}' is not one of redis, memory", other)),
        }
    }
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    pub store_backend: StoreBackend,
    /// Absent means the records API answers 500 until an operator sets it.
    pub redis_url: Option<String>,
    /// Absent means the report API answers 500 until an operator sets it.
    pub llm_api_key: Option<String>,
    pub llm_api_base: String,
    pub report_model: String,
    pub report_temperature: f32,
    /// Upper bound on one relayed report stream.
    pub report_timeout: Duration,
    /// Amount recorded when a payment update does not name one.
    pub paid_amount: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([0, 0, 0, 0], 3000)),
            log_level: Level::INFO,
            store_backend: StoreBackend::Redis,
            redis_url: None,
            llm_api_key: None,
            llm_api_base: "https://api.deepseek.com".to_string(),
            report_model: "deepseek-chat".to_string(),
            report_temperature: 0.9,
            report_timeout: Duration::from_secs(180),
            paid_amount: 3.9,
        }
    }
}

/// Reads `name` and parses it, falling back to `default` when unset.
fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}

/// Reads an optional variable, treating an empty value as unset.
fn optional_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        let defaults = Config::default();

        // --- Server Settings ---
        let bind_address = parse_var("BIND_ADDRESS", defaults.bind_address)?;

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Record Store ---
        let store_backend = parse_var("RECORD_STORE", defaults.store_backend)?;
        let redis_url = optional_var("REDIS_URL");

        // --- Language Model (key is optional) ---
        let llm_api_key = optional_var("DEEPSEEK_API_KEY");
        let llm_api_base = optional_var("LLM_API_BASE").unwrap_or(defaults.llm_api_base);
        let report_model = optional_var("REPORT_MODEL").unwrap_or(defaults.report_model);
        let report_temperature = parse_var("REPORT_TEMPERATURE", defaults.report_temperature)?;
        let report_timeout = parse_var("REPORT_TIMEOUT_SECS", defaults.report_timeout.as_secs())
            .map(Duration::from_secs)?;
        if report_timeout.is_zero() {
            return Err(ConfigError::InvalidValue(
                "REPORT_TIMEOUT_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        let paid_amount = parse_var("PAID_AMOUNT", defaults.paid_amount)?;

        Ok(Self {
            bind_address,
            log_level,
            store_backend,
            redis_url,
            llm_api_key,
            llm_api_base,
            report_model,
            report_temperature,
            report_timeout,
            paid_amount,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_backend_parses_case_insensitively() {
        assert_eq!("Redis".parse::<StoreBackend>(), Ok(StoreBackend::Redis));
        assert_eq!("memory".parse::<StoreBackend>(), Ok(StoreBackend::Memory));
        assert!("postgres".parse::<StoreBackend>().is_err());
    }

    #[test]
    fn defaults_point_at_deepseek() {
        let config = Config::default();
        assert_eq!(config.llm_api_base, "https://api.deepseek.com");
        assert_eq!(config.report_model, "deepseek-chat");
        assert_eq!(config.report_timeout, Duration::from_secs(180));
        assert!(config.redis_url.is_none());
        assert!(config.llm_api_key.is_none());
    }
}
