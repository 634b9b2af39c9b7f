//! Environment-backed configuration.
//!
//! Most settings have defaults. Override with `GROUNDTRUTH_*` environment variables.

pub mod error;

#[cfg(test)]
mod tests;

pub use error::ConfigError;

use std::env;
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{DEFAULT_BLOCKED_DOMAINS, DEFAULT_FETCH_TIMEOUT};

/// Server configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `GROUNDTRUTH_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port. Default: `5001`.
    pub port: u16,

    /// IP address to bind to. Default: `127.0.0.1`.
    pub bind_addr: IpAddr,

    /// Directory holding the entailment classifier (config, safetensors, tokenizer).
    pub classifier_path: Option<PathBuf>,

    /// Directory holding the sentence encoder used for similarity.
    pub encoder_path: Option<PathBuf>,

    /// Base URL of a remote model service. When set, it replaces the local models.
    /// Calls are bounded by [`VerifierConfig::call_timeout`](crate::verification::VerifierConfig).
    pub capability_url: Option<String>,

    /// Timeout applied to source document fetches. Default: 3s.
    pub fetch_timeout: Duration,

    /// Host fragments the source policy refuses. Default: `reddit`.
    pub blocked_domains: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 5001,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
            classifier_path: None,
            encoder_path: None,
            capability_url: None,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            blocked_domains: DEFAULT_BLOCKED_DOMAINS
                .iter()
                .map(|d| d.to_string())
                .collect(),
        }
    }
}

impl Config {
    const ENV_PORT: &'static str = "GROUNDTRUTH_PORT";
    const ENV_BIND_ADDR: &'static str = "GROUNDTRUTH_BIND_ADDR";
    const ENV_CLASSIFIER_PATH: &'static str = "GROUNDTRUTH_CLASSIFIER_PATH";
    const ENV_ENCODER_PATH: &'static str = "GROUNDTRUTH_ENCODER_PATH";
    const ENV_CAPABILITY_URL: &'static str = "GROUNDTRUTH_CAPABILITY_URL";
    const ENV_FETCH_TIMEOUT_MS: &'static str = "GROUNDTRUTH_FETCH_TIMEOUT_MS";
    const ENV_BLOCKED_DOMAINS: &'static str = "GROUNDTRUTH_BLOCKED_DOMAINS";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = Self::parse_port_from_env(defaults.port)?;
        let bind_addr = Self::parse_bind_addr_from_env(defaults.bind_addr)?;
        let classifier_path = Self::parse_optional_path_from_env(Self::ENV_CLASSIFIER_PATH);
        let encoder_path = Self::parse_optional_path_from_env(Self::ENV_ENCODER_PATH);
        let capability_url = Self::parse_optional_string_from_env(Self::ENV_CAPABILITY_URL);
        let fetch_timeout =
            Self::parse_millis_from_env(Self::ENV_FETCH_TIMEOUT_MS, defaults.fetch_timeout)?;
        let blocked_domains =
            Self::parse_list_from_env(Self::ENV_BLOCKED_DOMAINS, defaults.blocked_domains);

        Ok(Self {
            port,
            bind_addr,
            classifier_path,
            encoder_path,
            capability_url,
            fetch_timeout,
            blocked_domains,
        })
    }

    /// Validates paths and basic invariants (does not load any model).
    pub fn validate(&self) -> Result<(), ConfigError> {
        for path in [&self.classifier_path, &self.encoder_path].into_iter().flatten() {
            if !path.exists() {
                return Err(ConfigError::PathNotFound { path: path.clone() });
            }
            if !path.is_dir() {
                return Err(ConfigError::NotADirectory { path: path.clone() });
            }
        }

        if let Some(ref url) = self.capability_url
            && !(url.starts_with("http://") || url.starts_with("https://"))
        {
            return Err(ConfigError::InvalidUrl { value: url.clone() });
        }

        if self.fetch_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout {
                name: Self::ENV_FETCH_TIMEOUT_MS,
            });
        }

        Ok(())
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    fn parse_port_from_env(default: u16) -> Result<u16, ConfigError> {
        match env::var(Self::ENV_PORT) {
            Ok(value) => {
                let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match env::var(Self::ENV_BIND_ADDR) {
            Ok(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            Err(_) => Ok(default),
        }
    }

    fn parse_millis_from_env(
        var_name: &'static str,
        default: Duration,
    ) -> Result<Duration, ConfigError> {
        match env::var(var_name) {
            Ok(value) => value
                .trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|e| ConfigError::DurationParseError {
                    name: var_name,
                    value,
                    source: e,
                }),
            Err(_) => Ok(default),
        }
    }

    fn parse_optional_path_from_env(var_name: &str) -> Option<PathBuf> {
        Self::parse_optional_string_from_env(var_name).map(PathBuf::from)
    }

    fn parse_optional_string_from_env(var_name: &str) -> Option<String> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse_list_from_env(var_name: &str, default: Vec<String>) -> Vec<String> {
        match env::var(var_name) {
            Ok(value) => value
                .split(',')
                .map(|item| item.trim().to_lowercase())
                .filter(|item| !item.is_empty())
                .collect(),
            Err(_) => default,
        }
    }
}
