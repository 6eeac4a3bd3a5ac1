//! Integration tests for the pipeline runner's sequencing contract.
//!
//! Verifies strict step ordering, pass-through of the empty pipeline,
//! short-circuit on drop, and error propagation aborting the run.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use anyhow::Result;
use async_trait::async_trait;
use serde_json::json;
use sift_core::CapturedEvent;
use sift_ingestion::{
    InMemoryMetrics, IngestionError, Pipeline, PipelineContext, PipelineStep, StepOutcome,
};
use sift_testing::{EventBuilder, StaticTeamDirectory};

fn context() -> PipelineContext {
    PipelineContext::new(Arc::new(StaticTeamDirectory::new()), Arc::new(InMemoryMetrics::new()))
}

/// Step that tags the event with its name and counts invocations.
struct TaggingStep {
    name: &'static str,
    invocations: Arc<AtomicUsize>,
}

impl TaggingStep {
    fn new(name: &'static str) -> (Self, Arc<AtomicUsize>) {
        let invocations = Arc::new(AtomicUsize::new(0));
        (Self { name, invocations: invocations.clone() }, invocations)
    }
}

#[async_trait]
impl PipelineStep for TaggingStep {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn process(
        &self,
        _ctx: &PipelineContext,
        mut event: CapturedEvent,
    ) -> sift_ingestion::Result<StepOutcome> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        let order = event.properties.len();
        event.properties.insert(self.name.to_string(), json!(order));
        Ok(StepOutcome::Continue(event))
    }
}

/// Step that drops every event.
struct DroppingStep;

#[async_trait]
impl PipelineStep for DroppingStep {
    fn name(&self) -> &'static str {
        "dropping"
    }

    async fn process(
        &self,
        _ctx: &PipelineContext,
        _event: CapturedEvent,
    ) -> sift_ingestion::Result<StepOutcome> {
        Ok(StepOutcome::Drop)
    }
}

/// Step that fails every event with an infrastructure error.
struct FaultingStep;

#[async_trait]
impl PipelineStep for FaultingStep {
    fn name(&self) -> &'static str {
        "faulting"
    }

    async fn process(
        &self,
        _ctx: &PipelineContext,
        _event: CapturedEvent,
    ) -> sift_ingestion::Result<StepOutcome> {
        Err(IngestionError::DirectoryUnavailable { message: "boom".to_string() })
    }
}

#[tokio::test]
async fn empty_pipeline_passes_event_through_unchanged() -> Result<()> {
    let event = EventBuilder::with_defaults().build();
    let expected = event.clone();

    let outcome = Pipeline::new().run(&context(), event).await?;

    assert_eq!(outcome, StepOutcome::Continue(expected));
    Ok(())
}

#[tokio::test]
async fn steps_run_strictly_in_insertion_order() -> Result<()> {
    let (first, _) = TaggingStep::new("first");
    let (second, _) = TaggingStep::new("second");
    let pipeline = Pipeline::new().with_step(Box::new(first)).with_step(Box::new(second));
    // Start from an event with no properties so tag order is observable.
    let mut event = EventBuilder::with_defaults().build();
    event.properties.clear();

    let outcome = pipeline.run(&context(), event).await?;

    let StepOutcome::Continue(processed) = outcome else {
        panic!("tagging steps never drop");
    };
    assert_eq!(processed.properties.get("first"), Some(&json!(0)));
    assert_eq!(processed.properties.get("second"), Some(&json!(1)));
    Ok(())
}

#[tokio::test]
async fn drop_short_circuits_remaining_steps() -> Result<()> {
    let (tail, invocations) = TaggingStep::new("tail");
    let pipeline = Pipeline::new().with_step(Box::new(DroppingStep)).with_step(Box::new(tail));

    let outcome = pipeline.run(&context(), EventBuilder::with_defaults().build()).await?;

    assert_eq!(outcome, StepOutcome::Drop);
    assert_eq!(invocations.load(Ordering::SeqCst), 0, "steps after a drop must not run");
    Ok(())
}

#[tokio::test]
async fn step_error_aborts_the_run() {
    let (tail, invocations) = TaggingStep::new("tail");
    let pipeline = Pipeline::new().with_step(Box::new(FaultingStep)).with_step(Box::new(tail));

    let result = pipeline.run(&context(), EventBuilder::with_defaults().build()).await;

    assert!(matches!(result, Err(IngestionError::DirectoryUnavailable { .. })));
    assert_eq!(invocations.load(Ordering::SeqCst), 0, "steps after a fault must not run");
}

#[tokio::test]
async fn outcome_reports_drop_state() {
    assert!(StepOutcome::Drop.is_drop());
    assert!(!StepOutcome::Continue(EventBuilder::with_defaults().build()).is_drop());
}
