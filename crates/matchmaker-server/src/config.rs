//! Configuration for the matchmaker server.
//!
//! Defaults can be overridden via environment variables:
//!
//! - `MATCHMAKER_BIND_ADDR`         (default: "0.0.0.0")
//! - `MATCHMAKER_PORT`              (default: "80")
//! - `MATCHMAKER_MAX_CONNECTIONS`   (default: "4096")
//! - `MATCHMAKER_MATCH_INTERVAL_MS` (default: "1000")
//! - `MATCHMAKER_KEEPALIVE_SECS`    (default: "5")
//! - `MATCHMAKER_STATUS_SECS`       (default: "5")
//! - `MATCHMAKER_HANDSHAKE_SECS`    (default: "5")

use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context};

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// IP address / interface to bind to (e.g. "0.0.0.0" or "127.0.0.1").
    pub bind_addr: String,

    /// TCP port to listen on.
    pub port: u16,

    /// Maximum number of simultaneously open connections (servers + players).
    pub max_connections: usize,

    /// How often the matching pass runs.
    pub match_interval: Duration,

    /// Keep-alive period on both endpoints.
    pub keepalive_interval: Duration,

    /// How often players are sent the current player count.
    pub status_interval: Duration,

    /// Time a new connection gets to send its request line and finish the
    /// WebSocket upgrade before it is dropped.
    pub handshake_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bind_addr: "0.0.0.0".to_string(),
            port: 80,
            max_connections: 4096,
            match_interval: Duration::from_millis(1000),
            keepalive_interval: Duration::from_secs(5),
            status_interval: Duration::from_secs(5),
            handshake_timeout: Duration::from_secs(5),
        }
    }
}

impl Config {
    /// Construct a `Config` from environment variables, falling back
    /// to the defaults.
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Config::default();

        let bind_addr = env::var("MATCHMAKER_BIND_ADDR").unwrap_or(defaults.bind_addr);
        let port = read_env_or_default("MATCHMAKER_PORT", defaults.port)?;
        let max_connections =
            read_env_or_default("MATCHMAKER_MAX_CONNECTIONS", defaults.max_connections)?;
        let match_interval_ms = read_env_or_default("MATCHMAKER_MATCH_INTERVAL_MS", 1000u64)?;
        let keepalive_secs = read_env_or_default("MATCHMAKER_KEEPALIVE_SECS", 5u64)?;
        let status_secs = read_env_or_default("MATCHMAKER_STATUS_SECS", 5u64)?;
        let handshake_secs = read_env_or_default("MATCHMAKER_HANDSHAKE_SECS", 5u64)?;

        let config = Config {
            bind_addr,
            port,
            max_connections,
            match_interval: Duration::from_millis(match_interval_ms),
            keepalive_interval: Duration::from_secs(keepalive_secs),
            status_interval: Duration::from_secs(status_secs),
            handshake_timeout: Duration::from_secs(handshake_secs),
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject values the server cannot run with.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.max_connections == 0 {
            bail!("MATCHMAKER_MAX_CONNECTIONS must be greater than zero");
        }
        // tokio intervals panic on a zero period.
        if self.match_interval.is_zero() {
            bail!("MATCHMAKER_MATCH_INTERVAL_MS must be greater than zero");
        }
        if self.keepalive_interval.is_zero() {
            bail!("MATCHMAKER_KEEPALIVE_SECS must be greater than zero");
        }
        if self.status_interval.is_zero() {
            bail!("MATCHMAKER_STATUS_SECS must be greater than zero");
        }
        if self.handshake_timeout.is_zero() {
            bail!("MATCHMAKER_HANDSHAKE_SECS must be greater than zero");
        }
        Ok(())
    }

    /// Convenience: `addr:port` socket string.
    pub fn socket_addr_string(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

fn read_env_or_default<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(val) => val
            .trim()
            .parse::<T>()
            .with_context(|| format!("invalid value for {key}: {val:?}")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.socket_addr_string(), "0.0.0.0:80");
    }

    #[test]
    fn zero_intervals_are_rejected() {
        let config = Config {
            match_interval: Duration::ZERO,
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            keepalive_interval: Duration::ZERO,
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            handshake_timeout: Duration::ZERO,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn unset_variable_uses_default() {
        let v: u16 = read_env_or_default("MATCHMAKER_TEST_SURELY_UNSET_VAR", 42).unwrap();
        assert_eq!(v, 42);
    }
}
