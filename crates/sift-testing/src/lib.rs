//! Test infrastructure for the sift attribution pipeline.
//!
//! Provides fixture builders for events and teams, deterministic
//! capability doubles for the team directory, and tracing initialization
//! for test binaries. Everything here is in-memory and reproducible; no
//! external services are involved.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod directory;
pub mod fixtures;

pub use directory::{FailingTeamDirectory, HangingTeamDirectory, StaticTeamDirectory};
pub use fixtures::{EventBuilder, TeamBuilder};

/// Initializes tracing for tests, honoring `RUST_LOG`.
///
/// Safe to call from every test; repeated initialization is ignored.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sift_ingestion=debug"));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_test_writer().try_init();
}
