//! Step sequencing with short-circuit on drop.
//!
//! A pipeline is an ordered list of steps. Each step receives the current
//! event value and the shared collaborator handles, and returns either the
//! next event value or a drop signal. The first drop terminates processing
//! of that event; later steps are never invoked for it. Steps run strictly
//! in order with no intra-event parallelism.

use std::sync::Arc;

use async_trait::async_trait;
use sift_core::CapturedEvent;
use tracing::debug;

use crate::{directory::TeamDirectory, error::Result, metrics::MetricsSink};

/// Outcome of running one step (or a whole pipeline) on an event.
///
/// A two-variant result rather than an `Option` so the short-circuit
/// contract is explicit at every call site. `Drop` carries no payload: the
/// reason was already recorded as a metric at the point of decision, and a
/// dropped event is a normal terminal outcome, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// The event survives; hand this value to the next step.
    Continue(CapturedEvent),

    /// The event must not proceed.
    Drop,
}

impl StepOutcome {
    /// Returns true for the `Drop` variant.
    pub fn is_drop(&self) -> bool {
        matches!(self, Self::Drop)
    }
}

/// Shared collaborators available to every step of a pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineContext {
    /// Resolves API tokens to team records.
    pub directory: Arc<dyn TeamDirectory>,

    /// Records counter increments for drop causes and resolution checks.
    pub metrics: Arc<dyn MetricsSink>,
}

impl PipelineContext {
    /// Creates a context from the collaborator handles.
    pub fn new(directory: Arc<dyn TeamDirectory>, metrics: Arc<dyn MetricsSink>) -> Self {
        Self { directory, metrics }
    }
}

/// One stage of event processing.
///
/// Steps must treat drop and continue as the only two outcomes; partial
/// results are not representable. Infrastructure faults propagate as
/// errors and abort the run for that event.
#[async_trait]
pub trait PipelineStep: Send + Sync {
    /// Stable name for logging.
    fn name(&self) -> &'static str;

    /// Processes one event.
    ///
    /// # Errors
    ///
    /// Returns [`crate::IngestionError`] on infrastructure faults only;
    /// expected rejections are `Ok(StepOutcome::Drop)`.
    async fn process(&self, ctx: &PipelineContext, event: CapturedEvent) -> Result<StepOutcome>;
}

/// Ordered sequence of steps over one event.
#[derive(Default)]
pub struct Pipeline {
    steps: Vec<Box<dyn PipelineStep>>,
}

impl Pipeline {
    /// Creates an empty pipeline.
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Appends a step; steps run in insertion order.
    #[must_use]
    pub fn with_step(mut self, step: Box<dyn PipelineStep>) -> Self {
        self.steps.push(step);
        self
    }

    /// Returns the number of configured steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns true if no steps are configured.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Runs the event through every step in order.
    ///
    /// Stops at the first step that returns [`StepOutcome::Drop`]. An empty
    /// pipeline passes the event through unchanged.
    ///
    /// # Errors
    ///
    /// Propagates the first step error; subsequent steps are not invoked.
    pub async fn run(&self, ctx: &PipelineContext, event: CapturedEvent) -> Result<StepOutcome> {
        let mut current = event;

        for step in &self.steps {
            match step.process(ctx, current).await? {
                StepOutcome::Continue(next) => current = next,
                StepOutcome::Drop => {
                    debug!(step = step.name(), "event dropped, short-circuiting pipeline");
                    return Ok(StepOutcome::Drop);
                },
            }
        }

        Ok(StepOutcome::Continue(current))
    }
}
