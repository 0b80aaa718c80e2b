//! Configuration Module
//!
//! Handles loading and managing gateway configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Gateway configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Base URL of the computation backend; None means local aggregation only
    pub backend_url: Option<String>,
    /// Lifetime of a cached result in seconds
    pub cache_ttl_secs: u64,
    /// Maximum number of cached results
    pub cache_max_entries: usize,
    /// Bound on a single backend exchange in milliseconds
    pub backend_timeout_ms: u64,
    /// HTTP server port
    pub server_port: u16,
    /// Background cleanup task interval in seconds
    pub cleanup_interval_secs: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `BACKEND_URL` - Computation backend base URL (default: none, local aggregation)
    /// - `CACHE_TTL_SECONDS` - Cache entry TTL in seconds (default: 60)
    /// - `CACHE_MAX_ENTRIES` - Maximum cache entries (default: 100)
    /// - `BACKEND_TIMEOUT_MS` - Backend call timeout in milliseconds (default: 3000)
    /// - `SERVER_PORT` - HTTP server port (default: 3001)
    /// - `CLEANUP_INTERVAL_SECONDS` - Expired entry sweep frequency (default: 5)
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a Config from an arbitrary variable lookup.
    ///
    /// Unparseable values fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let parsed = |name: &str, default| parse_or(lookup(name), default);

        Self {
            backend_url: lookup("BACKEND_URL")
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            cache_ttl_secs: parsed("CACHE_TTL_SECONDS", defaults.cache_ttl_secs),
            cache_max_entries: parse_or(lookup("CACHE_MAX_ENTRIES"), defaults.cache_max_entries),
            backend_timeout_ms: parsed("BACKEND_TIMEOUT_MS", defaults.backend_timeout_ms),
            server_port: parse_or(lookup("SERVER_PORT"), defaults.server_port),
            cleanup_interval_secs: parsed(
                "CLEANUP_INTERVAL_SECONDS",
                defaults.cleanup_interval_secs,
            ),
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn backend_timeout(&self) -> Duration {
        Duration::from_millis(self.backend_timeout_ms)
    }
}

fn parse_or<T: FromStr>(raw: Option<String>, default: T) -> T {
    raw.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: None,
            cache_ttl_secs: 60,
            cache_max_entries: 100,
            backend_timeout_ms: 3000,
            server_port: 3001,
            cleanup_interval_secs: 5,
        }
    }
}
