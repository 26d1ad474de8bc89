// =====================================================================================
// PING CELL MODELS
// =====================================================================================

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PingError;

/// Identifier of one monitored service configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigurationId(String);

impl ConfigurationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigurationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConfigurationId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ConfigurationId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Named destination stream subscribers attach to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(String);

impl ChannelId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Health metrics reported by the upstream metrics store. Opaque to this cell.
pub type ServiceMetrics = serde_json::Map<String, serde_json::Value>;

/// Cache-owned snapshot of a configuration's metrics. Never carries incident events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PingSnapshot {
    pub configuration_id: ConfigurationId,
    #[serde(default)]
    pub metrics: ServiceMetrics,
    pub captured_at: DateTime<Utc>,
}

impl PingSnapshot {
    pub fn new(configuration_id: impl Into<ConfigurationId>, metrics: ServiceMetrics) -> Self {
        Self {
            configuration_id: configuration_id.into(),
            metrics,
            captured_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncidentStatus {
    Triggered,
    Acknowledged,
    Resolved,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncidentUrgency {
    High,
    Low,
}

/// An incident reported by PagerDuty for the service linked to a configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagerDutyEvent {
    pub id: String,
    #[serde(alias = "incident_number")]
    pub incident_number: u64,
    pub title: String,
    pub status: IncidentStatus,
    pub urgency: IncidentUrgency,
    #[serde(alias = "created_at")]
    pub created_at: DateTime<Utc>,
    #[serde(alias = "html_url", default)]
    pub html_url: Option<String>,
}

/// A snapshot enriched with the incident events current at fetch time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationPing {
    pub configuration_id: ConfigurationId,
    pub metrics: ServiceMetrics,
    pub captured_at: DateTime<Utc>,
    pub pager_duty_events: Vec<PagerDutyEvent>,
}

impl ConfigurationPing {
    /// Builds the enriched value from a copy of the snapshot.
    pub fn enriched(snapshot: PingSnapshot, events: Vec<PagerDutyEvent>) -> Self {
        Self {
            configuration_id: snapshot.configuration_id,
            metrics: snapshot.metrics,
            captured_at: snapshot.captured_at,
            pager_duty_events: events,
        }
    }
}

/// A monitored service definition as held by the configuration registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfiguration {
    pub id: ConfigurationId,
    pub name: String,
    #[serde(default)]
    pub pagerduty_service_id: Option<String>,
}

/// Per-key outcome of a batch fetch.
#[derive(Debug, Default)]
pub struct FetchResult {
    pub pings: Vec<ConfigurationPing>,
    pub errors: HashMap<ConfigurationId, PingError>,
}

impl FetchResult {
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn resolved_ids(&self) -> impl Iterator<Item = &ConfigurationId> {
        self.pings.iter().map(|ping| &ping.configuration_id)
    }

    pub fn error_messages(&self) -> HashMap<String, String> {
        self.errors
            .iter()
            .map(|(id, err)| (id.to_string(), err.to_string()))
            .collect()
    }
}

/// What a broadcast cycle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BroadcastOutcome {
    Dispatched { pings: usize, subscribers: usize },
    Suppressed { errors: usize },
    Abandoned { reason: String },
}

// Request/Response models
#[derive(Debug, Serialize, Deserialize)]
pub struct PingQueryRequest {
    pub configuration_ids: Vec<ConfigurationId>,
    pub use_cache: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PingsResponse {
    pub pings: Vec<ConfigurationPing>,
    pub errors: HashMap<String, String>,
    pub timestamp: DateTime<Utc>,
}

impl From<FetchResult> for PingsResponse {
    fn from(result: FetchResult) -> Self {
        let errors = result.error_messages();
        Self {
            pings: result.pings,
            errors,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BroadcastResponse {
    pub status: String,
    pub pings: usize,
    pub subscribers: usize,
    pub errors: usize,
    pub channel: String,
}

impl BroadcastResponse {
    pub fn from_outcome(outcome: &BroadcastOutcome, channel: &ChannelId) -> Self {
        let (status, pings, subscribers, errors) = match outcome {
            BroadcastOutcome::Dispatched { pings, subscribers } => ("dispatched", *pings, *subscribers, 0),
            BroadcastOutcome::Suppressed { errors } => ("suppressed", 0, 0, *errors),
            BroadcastOutcome::Abandoned { .. } => ("abandoned", 0, 0, 0),
        };

        Self {
            status: status.to_string(),
            pings,
            subscribers,
            errors,
            channel: channel.to_string(),
        }
    }
}
