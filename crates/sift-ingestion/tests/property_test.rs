//! Property-based tests for the attribution decision surface.
//!
//! For arbitrary credential combinations the step must land on exactly one
//! of its three terminal outcomes, with metric emissions that are a pure
//! function of the decision taken.

use std::sync::Arc;

use proptest::{prelude::*, test_runner::Config as ProptestConfig};
use sift_core::TeamId;
use sift_ingestion::{
    IngestionConfig, InMemoryMetrics, PipelineContext, PipelineStep, StepOutcome,
    TeamResolutionStep, EVENT_DROPPED_TOTAL, TEAM_RESOLUTION_CHECKS_TOTAL,
};
use sift_testing::{EventBuilder, StaticTeamDirectory, TeamBuilder};

/// Deterministic property test configuration for CI stability.
fn proptest_config() -> ProptestConfig {
    ProptestConfig {
        cases: 64,
        timeout: 5000,
        fork: false,
        failure_persistence: None,
        source_file: None,
        ..ProptestConfig::default()
    }
}

/// Tokens drawn from a mix of known and unknown values.
fn token_strategy() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        Just(Some("known-token".to_string())),
        prop::string::string_regex("phc_[a-z0-9]{8}").unwrap().prop_map(Some),
    ]
}

fn team_id_strategy() -> impl Strategy<Value = Option<i64>> {
    prop_oneof![Just(None), (1i64..100).prop_map(Some)]
}

proptest! {
    #![proptest_config(proptest_config())]

    #[test]
    fn resolution_always_lands_on_one_terminal_outcome(
        token in token_strategy(),
        team_id in team_id_strategy(),
        anonymize in any::<bool>(),
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("runtime builds");

        runtime.block_on(async {
            let directory = Arc::new(StaticTeamDirectory::with_teams([
                TeamBuilder::with_defaults()
                    .id(7)
                    .api_token("known-token")
                    .anonymize_ips(anonymize)
                    .build(),
            ]));
            let metrics = Arc::new(InMemoryMetrics::new());
            let ctx = PipelineContext::new(directory, metrics.clone());

            let event = EventBuilder::with_defaults()
                .token(token.as_deref())
                .team_id(team_id)
                .build();
            let step = TeamResolutionStep::new(&IngestionConfig::default());

            let outcome = step.process(&ctx, event).await.expect("static directory never faults");

            let token_resolves = token.as_deref() == Some("known-token");
            match (team_id, token_resolves) {
                // Client-supplied id always survives and always emits a check.
                (Some(id), _) => {
                    let StepOutcome::Continue(enriched) = outcome else {
                        panic!("events with a team id must never drop");
                    };
                    prop_assert_eq!(enriched.team_id, Some(TeamId(id)));
                    prop_assert_eq!(metrics.total(TEAM_RESOLUTION_CHECKS_TOTAL), 1);
                    prop_assert_eq!(metrics.total(EVENT_DROPPED_TOTAL), 0);
                }
                // Server-resolved attribution.
                (None, true) => {
                    let StepOutcome::Continue(enriched) = outcome else {
                        panic!("resolvable token must enrich");
                    };
                    prop_assert_eq!(enriched.team_id, Some(TeamId(7)));
                    prop_assert_eq!(enriched.ip.is_none(), anonymize);
                    prop_assert_eq!(metrics.total(EVENT_DROPPED_TOTAL), 0);
                    prop_assert_eq!(metrics.total(TEAM_RESOLUTION_CHECKS_TOTAL), 0);
                }
                // No way to attribute: dropped with exactly one drop metric.
                (None, false) => {
                    prop_assert_eq!(outcome, StepOutcome::Drop);
                    prop_assert_eq!(metrics.total(EVENT_DROPPED_TOTAL), 1);
                    prop_assert_eq!(metrics.total(TEAM_RESOLUTION_CHECKS_TOTAL), 0);
                }
            }
            Ok(())
        })?;
    }

    #[test]
    fn enriched_events_always_carry_a_team_id(
        token in token_strategy(),
        team_id in team_id_strategy(),
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("runtime builds");

        runtime.block_on(async {
            let directory = Arc::new(StaticTeamDirectory::with_teams([
                TeamBuilder::with_defaults().id(7).api_token("known-token").build(),
            ]));
            let metrics = Arc::new(InMemoryMetrics::new());
            let ctx = PipelineContext::new(directory, metrics);

            let event = EventBuilder::with_defaults()
                .token(token.as_deref())
                .team_id(team_id)
                .build();
            let step = TeamResolutionStep::new(&IngestionConfig::default());

            if let StepOutcome::Continue(enriched) =
                step.process(&ctx, event).await.expect("static directory never faults")
            {
                prop_assert!(enriched.team_id.is_some());
            }
            Ok(())
        })?;
    }
}
