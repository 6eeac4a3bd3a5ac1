//! Metrics sink capability and in-memory recorder.
//!
//! Metric names and label keys are part of the wire contract with the
//! downstream observability stack and must match exactly. The pipeline only
//! ever increments counters; it never reads them back.

use std::{
    collections::{BTreeMap, HashMap},
    fmt,
    sync::Mutex,
};

/// Counter for events dropped before enrichment.
///
/// Labels: `drop_cause` (`no_token` or `invalid_token`), `event_type`.
pub const EVENT_DROPPED_TOTAL: &str = "ingestion_event_dropped_total";

/// Counter for client-supplied vs. server-resolved team id comparisons.
///
/// Labels: `check_ok` (`"true"` or `"false"`). Exists only for the
/// trust-capture rollout window; see
/// [`crate::steps::team_resolution::TeamResolutionStep`].
pub const TEAM_RESOLUTION_CHECKS_TOTAL: &str = "ingestion_team_resolution_checks_total";

/// Capability for recording counter increments.
///
/// Implementations must be cheap and non-blocking; the pipeline calls this
/// on the hot path, once per decision branch. Emissions are append-only
/// and commutative, so concurrent events may interleave freely.
pub trait MetricsSink: Send + Sync + fmt::Debug {
    /// Increments the counter `name` for the given label set by one.
    fn increment(&self, name: &str, labels: &[(&str, &str)]);
}

/// Metrics sink that discards all emissions.
///
/// Used when metrics are disabled, or in tests that don't assert on them.
#[derive(Debug, Default)]
pub struct NoOpMetrics;

impl NoOpMetrics {
    /// Creates a new no-op sink.
    pub fn new() -> Self {
        Self
    }
}

impl MetricsSink for NoOpMetrics {
    fn increment(&self, _name: &str, _labels: &[(&str, &str)]) {}
}

/// Label set stored in sorted order so equal sets compare equal regardless
/// of emission order.
type LabelSet = BTreeMap<String, String>;

/// In-memory counter store.
///
/// The production deployment hands the pipeline a sink backed by the real
/// metrics exporter; this recorder backs tests and local runs, and lets
/// tests assert exact per-label counts.
#[derive(Debug, Default)]
pub struct InMemoryMetrics {
    counters: Mutex<HashMap<String, HashMap<LabelSet, u64>>>,
}

impl InMemoryMetrics {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the count for `name` with exactly the given labels.
    pub fn value(&self, name: &str, labels: &[(&str, &str)]) -> u64 {
        let key = to_label_set(labels);
        let counters = self.counters.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        counters.get(name).and_then(|series| series.get(&key)).copied().unwrap_or(0)
    }

    /// Returns the total across all label sets for `name`.
    pub fn total(&self, name: &str) -> u64 {
        let counters = self.counters.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        counters.get(name).map(|series| series.values().sum()).unwrap_or(0)
    }
}

fn to_label_set(labels: &[(&str, &str)]) -> LabelSet {
    labels.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect()
}

impl MetricsSink for InMemoryMetrics {
    fn increment(&self, name: &str, labels: &[(&str, &str)]) {
        let key = to_label_set(labels);
        let mut counters = self.counters.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        *counters.entry(name.to_string()).or_default().entry(key).or_insert(0) += 1;
    }
}
