//! Deterministic team directory doubles.
//!
//! Cover the three behaviors the pipeline must handle: a directory that
//! answers, a directory that faults, and a directory that never answers.

use std::{
    collections::HashMap,
    sync::atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use sift_core::Team;
use sift_ingestion::{IngestionError, Result, TeamDirectory};

/// Directory backed by a fixed token-to-team map.
///
/// Unknown tokens resolve to `None`, matching the capability contract.
/// Lookups are counted so tests can assert on cache behavior.
#[derive(Debug, Default)]
pub struct StaticTeamDirectory {
    teams: HashMap<String, Team>,
    lookups: AtomicUsize,
}

impl StaticTeamDirectory {
    /// Creates an empty directory; every lookup misses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a directory containing the given teams, keyed by api token.
    pub fn with_teams(teams: impl IntoIterator<Item = Team>) -> Self {
        Self {
            teams: teams.into_iter().map(|team| (team.api_token.clone(), team)).collect(),
            lookups: AtomicUsize::new(0),
        }
    }

    /// Number of lookups served so far.
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TeamDirectory for StaticTeamDirectory {
    async fn team_by_token(&self, token: &str) -> Result<Option<Team>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.teams.get(token).cloned())
    }
}

/// Directory that fails every lookup with an unavailability error.
///
/// Models the backing store being down; the pipeline must propagate this
/// rather than classify it as an invalid token.
#[derive(Debug)]
pub struct FailingTeamDirectory {
    message: String,
}

impl FailingTeamDirectory {
    /// Creates a failing directory with the given error message.
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

#[async_trait]
impl TeamDirectory for FailingTeamDirectory {
    async fn team_by_token(&self, _token: &str) -> Result<Option<Team>> {
        Err(IngestionError::DirectoryUnavailable { message: self.message.clone() })
    }
}

/// Directory whose lookups never complete.
///
/// Used to exercise the bounded-timeout path without real sleeps.
#[derive(Debug, Default)]
pub struct HangingTeamDirectory;

impl HangingTeamDirectory {
    /// Creates a hanging directory.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TeamDirectory for HangingTeamDirectory {
    async fn team_by_token(&self, _token: &str) -> Result<Option<Team>> {
        std::future::pending().await
    }
}
