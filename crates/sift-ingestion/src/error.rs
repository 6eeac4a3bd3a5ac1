//! Error types for the attribution pipeline.
//!
//! Only infrastructure faults are errors here. Missing or unknown
//! credentials are ordinary outcomes expressed through
//! [`crate::StepOutcome::Drop`], never through this type, so the drop-cause
//! metrics stay an accurate picture of client behavior.

use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, IngestionError>;

/// Infrastructure faults that abort processing of an event.
///
/// These propagate to the pipeline caller, which decides retry vs. discard
/// at the transport level.
#[derive(Debug, Clone, Error)]
pub enum IngestionError {
    /// The team directory could not be reached.
    #[error("team directory unavailable: {message}")]
    DirectoryUnavailable {
        /// Description of the underlying failure.
        message: String,
    },

    /// The team directory lookup exceeded its time budget.
    #[error("team directory lookup timed out after {timeout_ms}ms")]
    LookupTimeout {
        /// The budget that was exceeded, in milliseconds.
        timeout_ms: u64,
    },
}
