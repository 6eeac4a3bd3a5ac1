//! Builders for test events and teams.
//!
//! `with_defaults` constructors produce a representative captured event and
//! a matching team (the event's token resolves to the team), so most tests
//! only override the one or two fields they care about.

use std::collections::HashMap;

use chrono::{TimeZone, Utc};
use serde_json::{json, Value};
use sift_core::{CapturedEvent, Team, TeamId};
use uuid::Uuid;

/// Default api token shared by the event and team fixtures.
pub const DEFAULT_TOKEN: &str = "phc_test_token";

/// Default team id shared by the event and team fixtures.
pub const DEFAULT_TEAM_ID: i64 = 2;

/// Builder for captured analytics events.
#[derive(Debug, Clone)]
pub struct EventBuilder {
    event: CapturedEvent,
}

impl EventBuilder {
    /// Creates a builder with a representative pageview event.
    ///
    /// The event carries the default token and no team id, matching the
    /// common case of a client SDK submitting with a project token.
    pub fn with_defaults() -> Self {
        let mut properties = HashMap::new();
        properties.insert("foo".to_string(), json!("bar"));

        let captured_at = Utc.with_ymd_and_hms(2020, 2, 23, 2, 15, 0).unwrap();

        Self {
            event: CapturedEvent {
                event: "$pageview".to_string(),
                properties,
                timestamp: captured_at,
                now: captured_at,
                team_id: None,
                distinct_id: "my_id".to_string(),
                ip: Some("127.0.0.1".to_string()),
                site_url: "https://example.com".to_string(),
                uuid: Uuid::new_v4(),
                token: Some(DEFAULT_TOKEN.to_string()),
            },
        }
    }

    /// Sets the event name.
    #[must_use]
    pub fn event_name(mut self, name: impl Into<String>) -> Self {
        self.event.event = name.into();
        self
    }

    /// Sets a single event property.
    #[must_use]
    pub fn property(mut self, key: impl Into<String>, value: Value) -> Self {
        self.event.properties.insert(key.into(), value);
        self
    }

    /// Sets the api token; `None` removes it.
    #[must_use]
    pub fn token(mut self, token: Option<&str>) -> Self {
        self.event.token = token.map(str::to_string);
        self
    }

    /// Sets the pre-populated team id; `None` removes it.
    #[must_use]
    pub fn team_id(mut self, team_id: Option<i64>) -> Self {
        self.event.team_id = team_id.map(TeamId);
        self
    }

    /// Sets the origin ip; `None` removes it.
    #[must_use]
    pub fn ip(mut self, ip: Option<&str>) -> Self {
        self.event.ip = ip.map(str::to_string);
        self
    }

    /// Sets the distinct actor id.
    #[must_use]
    pub fn distinct_id(mut self, distinct_id: impl Into<String>) -> Self {
        self.event.distinct_id = distinct_id.into();
        self
    }

    /// Builds the event.
    pub fn build(self) -> CapturedEvent {
        self.event
    }
}

/// Builder for team records.
#[derive(Debug, Clone)]
pub struct TeamBuilder {
    team: Team,
}

impl TeamBuilder {
    /// Creates a builder for a team owning the default fixture token.
    pub fn with_defaults() -> Self {
        Self {
            team: Team {
                id: TeamId(DEFAULT_TEAM_ID),
                uuid: Uuid::new_v4(),
                organization_id: Uuid::new_v4(),
                name: "test-team".to_string(),
                anonymize_ips: false,
                api_token: DEFAULT_TOKEN.to_string(),
                slack_incoming_webhook: None,
                session_recording_opt_in: false,
                ingested_event: true,
            },
        }
    }

    /// Sets the numeric team id.
    #[must_use]
    pub fn id(mut self, id: i64) -> Self {
        self.team.id = TeamId(id);
        self
    }

    /// Sets the api token the team owns.
    #[must_use]
    pub fn api_token(mut self, token: impl Into<String>) -> Self {
        self.team.api_token = token.into();
        self
    }

    /// Sets the ip anonymization flag.
    #[must_use]
    pub fn anonymize_ips(mut self, anonymize: bool) -> Self {
        self.team.anonymize_ips = anonymize;
        self
    }

    /// Sets the display name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.team.name = name.into();
        self
    }

    /// Builds the team.
    pub fn build(self) -> Team {
        self.team
    }
}
