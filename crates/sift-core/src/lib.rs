//! Core domain models for the sift analytics ingestion pipeline.
//!
//! Provides the captured-event and team types shared by every pipeline
//! stage, plus the clock abstraction used wherever elapsed time matters.
//! All other crates depend on these foundational types.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod models;
pub mod time;

pub use models::{CapturedEvent, Team, TeamId};
pub use time::{Clock, SystemClock, TestClock};
