//! Event attribution pipeline for multi-tenant analytics ingestion.
//!
//! This crate sits at the head of the event processing pipeline. Every
//! captured event passes through it before any storage or aggregation:
//! the event is resolved to the team that owns it, per-team privacy policy
//! is applied, and events that cannot be attributed are dropped with the
//! reason recorded as a metric.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐    ┌────────────────────┐    ┌───────────────┐
//! │ Capture         │───▶│ Pipeline           │───▶│ Next step     │
//! │ (external)      │    │  TeamResolutionStep│    │ (dedup, etc.) │
//! └─────────────────┘    └────────────────────┘    └───────────────┘
//!                           │              │
//!                           ▼              ▼
//!                    ┌──────────────┐ ┌─────────────┐
//!                    │ TeamDirectory│ │ MetricsSink │
//!                    │ (capability) │ │ (capability)│
//!                    └──────────────┘ └─────────────┘
//! ```
//!
//! The team directory and metrics sink are narrow capability traits; the
//! pipeline never talks to a database or metrics backend directly, which
//! keeps every step testable by substitution.
//!
//! # Key behavior
//!
//! - **Drop outcomes are not errors.** Missing or unknown credentials are
//!   expected, high-frequency outcomes handled via [`StepOutcome::Drop`]
//!   plus a counter emission.
//! - **Directory outages are errors.** An unreachable or slow directory
//!   propagates as [`IngestionError`] so an infrastructure problem is never
//!   misclassified as a client sending a bad token.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod directory;
pub mod error;
pub mod metrics;
pub mod pipeline;
pub mod steps;

pub use config::IngestionConfig;
pub use directory::{CachedTeamDirectory, TeamDirectory};
pub use error::{IngestionError, Result};
pub use metrics::{
    InMemoryMetrics, MetricsSink, NoOpMetrics, EVENT_DROPPED_TOTAL, TEAM_RESOLUTION_CHECKS_TOTAL,
};
pub use pipeline::{Pipeline, PipelineContext, PipelineStep, StepOutcome};
pub use steps::team_resolution::TeamResolutionStep;
