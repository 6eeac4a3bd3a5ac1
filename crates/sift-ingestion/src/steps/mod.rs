//! Pipeline step implementations.

pub mod team_resolution;

pub use team_resolution::TeamResolutionStep;
