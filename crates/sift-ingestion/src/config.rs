//! Configuration for the attribution pipeline.

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Duration as ChronoDuration;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

const CONFIG_FILE: &str = "sift.toml";

/// Pipeline configuration with defaults, file, and environment overrides.
///
/// Loaded in priority order:
/// 1. Environment variables with the `SIFT_` prefix (highest priority)
/// 2. Configuration file (`sift.toml`)
/// 3. Built-in defaults (lowest priority)
///
/// The defaults are production-ready; most deployments override nothing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionConfig {
    /// Time budget for one team directory lookup, in milliseconds.
    ///
    /// Exceeding it is treated as a directory fault and aborts processing
    /// of the event; it is never recorded as an invalid token.
    ///
    /// Environment variable: `SIFT_DIRECTORY_LOOKUP_TIMEOUT_MS`
    #[serde(default = "default_lookup_timeout_ms")]
    pub directory_lookup_timeout_ms: u64,

    /// How long cached token lookups (hits and misses) stay fresh, in
    /// seconds.
    ///
    /// Environment variable: `SIFT_TEAM_CACHE_TTL_SECS`
    #[serde(default = "default_team_cache_ttl_secs")]
    pub team_cache_ttl_secs: u64,

    /// Maximum number of tokens held in the directory cache.
    ///
    /// Environment variable: `SIFT_TEAM_CACHE_CAPACITY`
    #[serde(default = "default_team_cache_capacity")]
    pub team_cache_capacity: usize,
}

fn default_lookup_timeout_ms() -> u64 {
    2_000
}

fn default_team_cache_ttl_secs() -> u64 {
    120
}

fn default_team_cache_capacity() -> usize {
    10_000
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            directory_lookup_timeout_ms: default_lookup_timeout_ms(),
            team_cache_ttl_secs: default_team_cache_ttl_secs(),
            team_cache_capacity: default_team_cache_capacity(),
        }
    }
}

impl IngestionConfig {
    /// Loads configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if `sift.toml` is malformed or an environment
    /// override fails to parse.
    pub fn load() -> Result<Self> {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed("SIFT_"))
            .extract()
            .context("failed to load ingestion configuration")
    }

    /// Directory lookup budget as a [`Duration`].
    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.directory_lookup_timeout_ms)
    }

    /// Cache TTL as a chrono [`ChronoDuration`], for clock arithmetic.
    pub fn team_cache_ttl(&self) -> ChronoDuration {
        ChronoDuration::seconds(i64::try_from(self.team_cache_ttl_secs).unwrap_or(i64::MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = IngestionConfig::default();
        assert_eq!(config.lookup_timeout(), Duration::from_millis(2_000));
        assert_eq!(config.team_cache_ttl(), ChronoDuration::seconds(120));
        assert!(config.team_cache_capacity > 0);
    }

    #[test]
    fn environment_overrides_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("SIFT_DIRECTORY_LOOKUP_TIMEOUT_MS", "250");
            jail.set_env("SIFT_TEAM_CACHE_TTL_SECS", "30");

            let config = IngestionConfig::load().expect("config should load");
            assert_eq!(config.directory_lookup_timeout_ms, 250);
            assert_eq!(config.team_cache_ttl_secs, 30);
            assert_eq!(config.team_cache_capacity, default_team_cache_capacity());
            Ok(())
        });
    }
}
