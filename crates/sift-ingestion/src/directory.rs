//! Team directory capability and caching decorator.
//!
//! The directory resolves an API token to the team that owns it. The
//! source of truth lives outside this crate (team management service plus
//! its store); the pipeline consumes it through the [`TeamDirectory`]
//! trait so tests can substitute deterministic doubles.
//!
//! An unknown token is `Ok(None)`, never an error. Tokens from
//! decommissioned or misconfigured SDKs arrive constantly, so "not found"
//! must stay a cheap, expected outcome. Errors are reserved for the
//! directory itself being unreachable.

use std::{collections::HashMap, fmt, sync::Arc};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sift_core::{Clock, Team};
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::Result;

/// Capability for resolving API tokens to team records.
#[async_trait]
pub trait TeamDirectory: Send + Sync + fmt::Debug {
    /// Looks up the team owning `token`.
    ///
    /// Returns `Ok(None)` for unknown or malformed tokens.
    ///
    /// # Errors
    ///
    /// Returns [`crate::IngestionError`] only when the directory itself is
    /// unavailable, distinguishably from "unknown token".
    async fn team_by_token(&self, token: &str) -> Result<Option<Team>>;
}

struct CacheEntry {
    cached_at: DateTime<Utc>,
    team: Option<Team>,
}

/// Caching decorator over a [`TeamDirectory`] source.
///
/// Token lookups happen once per captured event, and the same handful of
/// tokens dominate traffic, so results are memoized for a short TTL. Both
/// hits and misses are cached: a hot unknown token must stay as cheap as a
/// hot valid one. Lookup errors are never cached, so a directory blip does
/// not pin stale failures.
pub struct CachedTeamDirectory {
    source: Arc<dyn TeamDirectory>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    capacity: usize,
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl fmt::Debug for CachedTeamDirectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedTeamDirectory")
            .field("ttl", &self.ttl)
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

impl CachedTeamDirectory {
    /// Creates a cache in front of `source`.
    ///
    /// `ttl` bounds staleness of both hits and misses; `capacity` bounds
    /// memory. At capacity, expired entries are purged first, then the
    /// stalest entry is evicted.
    pub fn new(
        source: Arc<dyn TeamDirectory>,
        clock: Arc<dyn Clock>,
        ttl: Duration,
        capacity: usize,
    ) -> Self {
        Self { source, clock, ttl, capacity, entries: RwLock::new(HashMap::new()) }
    }

    fn is_fresh(&self, entry: &CacheEntry, now: DateTime<Utc>) -> bool {
        now - entry.cached_at < self.ttl
    }

    async fn insert(&self, token: &str, team: Option<Team>, now: DateTime<Utc>) {
        let mut entries = self.entries.write().await;

        if entries.len() >= self.capacity && !entries.contains_key(token) {
            entries.retain(|_, entry| self.is_fresh(entry, now));

            if entries.len() >= self.capacity {
                let stalest = entries
                    .iter()
                    .min_by_key(|(_, entry)| entry.cached_at)
                    .map(|(key, _)| key.clone());
                if let Some(key) = stalest {
                    entries.remove(&key);
                }
            }
        }

        entries.insert(token.to_string(), CacheEntry { cached_at: now, team });
    }
}

#[async_trait]
impl TeamDirectory for CachedTeamDirectory {
    async fn team_by_token(&self, token: &str) -> Result<Option<Team>> {
        let now = self.clock.now();

        {
            let entries = self.entries.read().await;
            if let Some(entry) = entries.get(token) {
                if self.is_fresh(entry, now) {
                    return Ok(entry.team.clone());
                }
            }
        }

        let team = self.source.team_by_token(token).await?;
        debug!(hit = team.is_some(), "team directory cache fill");
        self.insert(token, team.clone(), now).await;
        Ok(team)
    }
}
