//! Team resolution and privacy enrichment.
//!
//! Decides, for exactly one event, whether it can be attributed to a team.
//! Attributable events come out enriched with a team id and with the
//! team's IP anonymization policy applied; everything else is dropped with
//! the cause recorded as a metric. The step is stateless and pure with
//! respect to the event; its only side effects go to the metrics sink.

use std::time::Duration;

use async_trait::async_trait;
use sift_core::{CapturedEvent, Team};
use tracing::{debug, warn};

use crate::{
    config::IngestionConfig,
    error::{IngestionError, Result},
    metrics::{MetricsSink, EVENT_DROPPED_TOTAL, TEAM_RESOLUTION_CHECKS_TOTAL},
    pipeline::{PipelineContext, PipelineStep, StepOutcome},
};

const DROP_CAUSE_NO_TOKEN: &str = "no_token";
const DROP_CAUSE_INVALID_TOKEN: &str = "invalid_token";
const EVENT_TYPE_ANALYTICS: &str = "analytics";

/// Resolves each event to its owning team, or drops it.
///
/// Decision order is load-bearing:
///
/// 1. No token and no team id: drop with cause `no_token`. The only branch
///    that never touches the directory.
/// 2. Token present: look the team up, under a bounded timeout. Unknown
///    token is an expected absence; a directory fault or timeout aborts
///    processing instead, so an outage is never counted as a bad token.
/// 3. A team id already on the event wins over the lookup result
///    (trust-capture rollout, see below). Otherwise the resolved team's id
///    is assigned, or the event is dropped with cause `invalid_token`.
/// 4. If a team record was resolved and it has `anonymize_ips` set, the
///    event's ip is nulled.
///
/// # Trust-capture rollout
///
/// While attribution migrates from client-trusted to server-verified, an
/// event arriving with a team id keeps it even when token resolution
/// disagrees. Each such event emits a resolution-check metric comparing
/// the two, measuring how often they diverge before the fallback is
/// retired. The whole device is the `Some(client_id)` arm of one match;
/// deleting that arm removes it.
#[derive(Debug, Clone)]
pub struct TeamResolutionStep {
    lookup_timeout: Duration,
}

impl TeamResolutionStep {
    /// Creates the step with the configured directory lookup budget.
    pub fn new(config: &IngestionConfig) -> Self {
        Self { lookup_timeout: config.lookup_timeout() }
    }

    /// Looks up `token` under the configured time budget.
    async fn resolve_token(&self, ctx: &PipelineContext, token: &str) -> Result<Option<Team>> {
        tokio::time::timeout(self.lookup_timeout, ctx.directory.team_by_token(token))
            .await
            .map_err(|_| IngestionError::LookupTimeout {
                timeout_ms: u64::try_from(self.lookup_timeout.as_millis()).unwrap_or(u64::MAX),
            })?
    }

    fn drop_event(&self, metrics: &dyn MetricsSink, event: &CapturedEvent, cause: &str) {
        warn!(
            event_uuid = %event.uuid,
            distinct_id = %event.distinct_id,
            drop_cause = cause,
            "dropping unattributable event"
        );
        metrics.increment(
            EVENT_DROPPED_TOTAL,
            &[("drop_cause", cause), ("event_type", EVENT_TYPE_ANALYTICS)],
        );
    }
}

#[async_trait]
impl PipelineStep for TeamResolutionStep {
    fn name(&self) -> &'static str {
        "team_resolution"
    }

    async fn process(
        &self,
        ctx: &PipelineContext,
        mut event: CapturedEvent,
    ) -> Result<StepOutcome> {
        if !event.has_credentials() {
            self.drop_event(ctx.metrics.as_ref(), &event, DROP_CAUSE_NO_TOKEN);
            return Ok(StepOutcome::Drop);
        }

        let team = match event.token.as_deref() {
            Some(token) => self.resolve_token(ctx, token).await?,
            None => None,
        };

        match event.team_id {
            // Trust-capture rollout: the client-supplied team id wins until
            // the fallback is retired. The check metric measures divergence.
            Some(client_id) => {
                let check_ok = team.as_ref().is_some_and(|team| team.id == client_id);
                ctx.metrics.increment(
                    TEAM_RESOLUTION_CHECKS_TOTAL,
                    &[("check_ok", if check_ok { "true" } else { "false" })],
                );
                if !check_ok {
                    debug!(
                        event_uuid = %event.uuid,
                        client_team_id = %client_id,
                        resolved = team.is_some(),
                        "token resolution disagrees with client-supplied team id"
                    );
                }
            },
            None => match &team {
                Some(team) => event.team_id = Some(team.id),
                None => {
                    self.drop_event(ctx.metrics.as_ref(), &event, DROP_CAUSE_INVALID_TOKEN);
                    return Ok(StepOutcome::Drop);
                },
            },
        }

        // Privacy policy comes from the resolved record, not from whichever
        // branch supplied the final team id.
        if team.as_ref().is_some_and(|team| team.anonymize_ips) {
            event.ip = None;
        }

        Ok(StepOutcome::Continue(event))
    }
}
