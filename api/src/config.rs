/// Service configuration module
/// Loads server, reference-data and validation settings from environment variables

use chrono::NaiveDate;
use shared::{ValidationSettings, DEFAULT_PASSPORT_EXPIRY_CUTOFF};
use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Output format for log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(ConfigError::InvalidConfig(format!(
                "Unknown log format: {}",
                other
            ))),
        }
    }
}

/// HTTP server binding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self.host.parse().map_err(|e| {
            ConfigError::InvalidConfig(format!("Invalid host '{}': {}", self.host, e))
        })?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Reference-data service used for drop-down existence checks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceConfig {
    pub base_url: String,
    pub timeout: Duration,
    /// Zero disables caching
    pub cache_ttl: Duration,
    pub cache_capacity: u64,
}

/// Full service configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub reference: ReferenceConfig,
    pub validation: ValidationSettings,
    pub log_format: LogFormat,
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = lookup(key).unwrap_or_else(|| default.to_string());
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidConfig(format!("Invalid {}: '{}' ({})", key, raw, e)))
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(|key| env::var(key).ok())
    }

    /// Load configuration from any key/value source; missing keys use defaults
    pub fn from_source(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = lookup("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port: u16 = parse_var(&lookup, "API_PORT", "3000")?;

        let base_url = lookup("REFERENCE_SERVICE_URL")
            .unwrap_or_else(|| "http://localhost:4000".to_string());
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidConfig(format!(
                "REFERENCE_SERVICE_URL must start with http:// or https:// (got '{}')",
                base_url
            )));
        }

        let timeout_secs: u64 = parse_var(&lookup, "REFERENCE_TIMEOUT_SECS", "5")?;
        // Lookups suspend the request, so keep the timeout bounded (1 second to 1 minute)
        if !(1..=60).contains(&timeout_secs) {
            return Err(ConfigError::InvalidConfig(
                "REFERENCE_TIMEOUT_SECS must be between 1 and 60 seconds".to_string(),
            ));
        }

        let cache_ttl_secs: u64 = parse_var(&lookup, "REFERENCE_CACHE_TTL_SECS", "0")?;
        let cache_capacity: u64 = parse_var(&lookup, "REFERENCE_CACHE_CAPACITY", "10000")?;

        let passport_expiry_cutoff = parse_var::<NaiveDate>(
            &lookup,
            "PASSPORT_EXPIRY_CUTOFF",
            DEFAULT_PASSPORT_EXPIRY_CUTOFF,
        )?;

        let log_format: LogFormat = parse_var(&lookup, "LOG_FORMAT", "pretty")?;

        let config = AppConfig {
            server: ServerConfig { host, port },
            reference: ReferenceConfig {
                base_url,
                timeout: Duration::from_secs(timeout_secs),
                cache_ttl: Duration::from_secs(cache_ttl_secs),
                cache_capacity,
            },
            validation: ValidationSettings {
                passport_expiry_cutoff,
            },
            log_format,
        };

        info!(
            "Service configuration loaded: reference={}, timeout={}s, cache_ttl={}s, expiry_cutoff={}",
            config.reference.base_url,
            timeout_secs,
            cache_ttl_secs,
            config.validation.passport_expiry_cutoff
        );

        Ok(config)
    }
}
