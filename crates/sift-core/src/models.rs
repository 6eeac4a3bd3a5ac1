//! Domain models for captured analytics events and the teams that own them.
//!
//! Defines the event shape received at the pipeline boundary, the team
//! record resolved during attribution, and the `TeamId` newtype that keeps
//! team identifiers from mixing with other integers.

use std::{collections::HashMap, fmt};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Strongly-typed team identifier.
///
/// Teams are identified by a numeric id assigned by the team management
/// system. The newtype prevents accidental mixing with other integer
/// fields on the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamId(pub i64);

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for TeamId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// A team account that owns analytics events.
///
/// Teams are created and mutated exclusively by the external team
/// management system. The ingestion pipeline only reads them, through the
/// team directory, to attribute events and apply per-team privacy policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    /// Numeric identifier, unique across all teams.
    pub id: TeamId,

    /// Globally unique identifier for the team.
    pub uuid: Uuid,

    /// Identifier of the organization this team belongs to.
    pub organization_id: Uuid,

    /// Human-readable display name.
    pub name: String,

    /// Whether origin IP addresses must be stripped from this team's
    /// events before they reach storage.
    pub anonymize_ips: bool,

    /// API token presented by client SDKs. The only externally visible
    /// credential; uniquely identifies the team within the directory.
    pub api_token: String,

    /// Optional webhook URL for outbound notifications.
    pub slack_incoming_webhook: Option<String>,

    /// Whether the team has opted into session recording.
    pub session_recording_opt_in: bool,

    /// Whether any event has ever been ingested for this team.
    pub ingested_event: bool,
}

/// One analytics event as received at the pipeline boundary.
///
/// Constructed by the capture transport and handed to the pipeline. The
/// team resolution step either enriches it (assigns `team_id`, possibly
/// nulls `ip`) or drops it. `team_id` and `token` are each optional on
/// arrival, but at least one must resolve to a team for the event to
/// survive attribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapturedEvent {
    /// Event name, e.g. `$pageview`.
    pub event: String,

    /// Free-form event properties.
    pub properties: HashMap<String, Value>,

    /// Timestamp reported by the client.
    pub timestamp: DateTime<Utc>,

    /// Server receipt timestamp.
    pub now: DateTime<Utc>,

    /// Owning team, if already attributed upstream.
    pub team_id: Option<TeamId>,

    /// Identifier of the acting person or device.
    pub distinct_id: String,

    /// Origin IP address. Nulled during enrichment for teams with
    /// `anonymize_ips` set.
    pub ip: Option<String>,

    /// URL of the site the event was captured on.
    pub site_url: String,

    /// Globally unique event identifier.
    pub uuid: Uuid,

    /// API token presented by the client SDK, if any.
    pub token: Option<String>,
}

impl CapturedEvent {
    /// Returns true if the event carries neither an API token nor a
    /// pre-populated team id, i.e. it cannot possibly be attributed.
    pub fn has_credentials(&self) -> bool {
        self.token.is_some() || self.team_id.is_some()
    }
}
