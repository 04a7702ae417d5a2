//! Server configuration loaded from the environment.
//!
//! Missing variables fall back to defaults; present but unparsable ones are errors.

use std::time::Duration;
use thiserror::Error;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
/// Competitions nobody touched for this long are evicted.
const DEFAULT_INACTIVITY_TIMEOUT_SECS: u64 = 12 * 3600;
const DEFAULT_CLEANUP_INTERVAL_SECS: u64 = 30 * 60;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub inactivity_timeout: Duration,
    pub cleanup_interval: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            inactivity_timeout: Duration::from_secs(DEFAULT_INACTIVITY_TIMEOUT_SECS),
            cleanup_interval: Duration::from_secs(DEFAULT_CLEANUP_INTERVAL_SECS),
        }
    }
}

impl ServerConfig {
    /// Read `HOST`, `PORT`, `INACTIVITY_TIMEOUT_SECS` and `CLEANUP_INTERVAL_SECS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`ServerConfig::from_env`] with an injectable variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = lookup("HOST")
            .filter(|h| !h.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = parse_or(&lookup, "PORT", DEFAULT_PORT)?;
        let inactivity = parse_or(&lookup, "INACTIVITY_TIMEOUT_SECS", DEFAULT_INACTIVITY_TIMEOUT_SECS)?;
        let cleanup = parse_or(&lookup, "CLEANUP_INTERVAL_SECS", DEFAULT_CLEANUP_INTERVAL_SECS)?;
        if cleanup == 0 {
            return Err(ConfigError::Invalid {
                var: "CLEANUP_INTERVAL_SECS".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        Ok(Self {
            host,
            port,
            inactivity_timeout: Duration::from_secs(inactivity),
            cleanup_interval: Duration::from_secs(cleanup),
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, var: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(var) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            var: var.to_string(),
            reason: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|var| map.get(var).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        assert_eq!(config(&[]).unwrap(), ServerConfig::default());
    }

    #[test]
    fn overrides_are_parsed() {
        let cfg = config(&[("HOST", "127.0.0.1"), ("PORT", "9000"), ("INACTIVITY_TIMEOUT_SECS", "60")]).unwrap();
        assert_eq!(cfg.host, "127.0.0.1");
        assert_eq!(cfg.port, 9000);
        assert_eq!(cfg.inactivity_timeout, Duration::from_secs(60));
        assert_eq!(cfg.cleanup_interval, Duration::from_secs(1800));
    }

    #[test]
    fn bad_port_is_reported() {
        let err = config(&[("PORT", "eighty")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref var, .. } if var == "PORT"));
    }

    #[test]
    fn zero_cleanup_interval_is_rejected() {
        assert!(config(&[("CLEANUP_INTERVAL_SECS", "0")]).is_err());
    }
}
