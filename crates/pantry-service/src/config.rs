//! Service configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `PANTRY_DATABASE_PATH` | `./pantry.db` |
//! | `PANTRY_DB_MAX_CONNECTIONS` | `5` |
//! | `PANTRY_CONVERSION_POLICY` | `stock_unit` |
//! | `PANTRY_LOW_STOCK_ALERTS` | `true` |
//! | `PANTRY_RELAY_POLL_INTERVAL_SECS` | `5` |
//! | `PANTRY_RELAY_BATCH_SIZE` | `100` |
//! | `PANTRY_RELAY_MAX_ATTEMPTS` | `10` |

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use pantry_core::ConversionPolicy;
use pantry_db::DbConfig;

/// Service configuration.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// SQLite database file
    pub database_path: PathBuf,

    /// Pool size
    pub db_max_connections: u32,

    /// How recipe lines are converted into stock units
    pub conversion_policy: ConversionPolicy,

    /// Queue a low-stock alert when a write leaves an ingredient below minimum
    pub low_stock_alerts: bool,

    /// Relay settings
    pub relay: RelayConfig,
}

/// Outbox relay settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelayConfig {
    pub poll_interval: Duration,
    pub batch_size: u32,
    /// Entries that failed this many times are skipped.
    pub max_attempts: u32,
}

impl Default for RelayConfig {
    fn default() -> Self {
        RelayConfig {
            poll_interval: Duration::from_secs(5),
            batch_size: 100,
            max_attempts: 10,
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            database_path: PathBuf::from("./pantry.db"),
            db_max_connections: 5,
            conversion_policy: ConversionPolicy::default(),
            low_stock_alerts: true,
            relay: RelayConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ServiceConfig::default();

        let config = ServiceConfig {
            database_path: lookup("PANTRY_DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),

            db_max_connections: parse_or(
                &lookup,
                "PANTRY_DB_MAX_CONNECTIONS",
                defaults.db_max_connections,
            )?,

            conversion_policy: parse_or(
                &lookup,
                "PANTRY_CONVERSION_POLICY",
                defaults.conversion_policy,
            )?,

            low_stock_alerts: parse_or(
                &lookup,
                "PANTRY_LOW_STOCK_ALERTS",
                defaults.low_stock_alerts,
            )?,

            relay: RelayConfig {
                poll_interval: Duration::from_secs(parse_or(
                    &lookup,
                    "PANTRY_RELAY_POLL_INTERVAL_SECS",
                    defaults.relay.poll_interval.as_secs(),
                )?),
                batch_size: parse_or(
                    &lookup,
                    "PANTRY_RELAY_BATCH_SIZE",
                    defaults.relay.batch_size,
                )?,
                max_attempts: parse_or(
                    &lookup,
                    "PANTRY_RELAY_MAX_ATTEMPTS",
                    defaults.relay.max_attempts,
                )?,
            },
        };

        if config.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "PANTRY_DB_MAX_CONNECTIONS".to_string(),
            ));
        }
        if config.relay.poll_interval.is_zero() {
            return Err(ConfigError::InvalidValue(
                "PANTRY_RELAY_POLL_INTERVAL_SECS".to_string(),
            ));
        }
        if config.relay.batch_size == 0 {
            return Err(ConfigError::InvalidValue(
                "PANTRY_RELAY_BATCH_SIZE".to_string(),
            ));
        }

        Ok(config)
    }

    /// Database settings derived from this configuration.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(self.database_path.clone()).max_connections(self.db_max_connections)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = ServiceConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.database_path, PathBuf::from("./pantry.db"));
        assert_eq!(config.conversion_policy, ConversionPolicy::StockUnit);
        assert!(config.low_stock_alerts);
        assert_eq!(config.relay, RelayConfig::default());
    }

    #[test]
    fn test_overrides() {
        let config = ServiceConfig::from_lookup(lookup(&[
            ("PANTRY_DATABASE_PATH", "/var/lib/pantry/pantry.db"),
            ("PANTRY_CONVERSION_POLICY", "Legacy"),
            ("PANTRY_LOW_STOCK_ALERTS", "false"),
            ("PANTRY_RELAY_POLL_INTERVAL_SECS", "30"),
            ("PANTRY_RELAY_BATCH_SIZE", "25"),
            ("PANTRY_RELAY_MAX_ATTEMPTS", " 3 "),
        ]))
        .unwrap();

        assert_eq!(config.database_path, PathBuf::from("/var/lib/pantry/pantry.db"));
        assert_eq!(config.conversion_policy, ConversionPolicy::Legacy);
        assert!(!config.low_stock_alerts);
        assert_eq!(config.relay.poll_interval, Duration::from_secs(30));
        assert_eq!(config.relay.batch_size, 25);
        assert_eq!(config.relay.max_attempts, 3);
    }

    #[test]
    fn test_invalid_values_name_the_variable() {
        let err = ServiceConfig::from_lookup(lookup(&[("PANTRY_CONVERSION_POLICY", "metric")]))
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid value for PANTRY_CONVERSION_POLICY");

        let err = ServiceConfig::from_lookup(lookup(&[("PANTRY_RELAY_BATCH_SIZE", "0")]))
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid value for PANTRY_RELAY_BATCH_SIZE");

        assert!(
            ServiceConfig::from_lookup(lookup(&[("PANTRY_LOW_STOCK_ALERTS", "maybe")])).is_err()
        );
    }
}
