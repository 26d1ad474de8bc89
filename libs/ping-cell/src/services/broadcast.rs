// =====================================================================================
// PING BROADCAST DISPATCHER
// =====================================================================================

use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info, instrument, warn};

use crate::error::PingError;
use crate::models::{BroadcastOutcome, ChannelId, ConfigurationPing, FetchResult};
use crate::services::fetch::PingFetchService;
use crate::services::hub::SubscriberBroadcast;

/// Decides which pings of a fetch may be broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BroadcastPolicy {
    /// Any unresolved configuration suppresses the whole cycle.
    #[default]
    RequireComplete,
    /// Broadcast whatever resolved.
    AvailableSubset,
}

impl BroadcastPolicy {
    /// Returns the pings to broadcast, or `None` when the cycle must be suppressed.
    pub fn admit<'a>(&self, result: &'a FetchResult) -> Option<&'a [ConfigurationPing]> {
        match self {
            BroadcastPolicy::RequireComplete if !result.is_complete() => None,
            _ => Some(&result.pings),
        }
    }
}

impl FromStr for BroadcastPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "require_complete" | "all_or_nothing" => Ok(BroadcastPolicy::RequireComplete),
            "available_subset" => Ok(BroadcastPolicy::AvailableSubset),
            other => Err(format!("Unknown broadcast policy: {}", other)),
        }
    }
}

/// Pushes the full ping dataset to every subscriber of the update channel.
pub struct BroadcastDispatcher {
    fetcher: PingFetchService,
    subscribers: Arc<dyn SubscriberBroadcast>,
    update_channel: ChannelId,
    policy: BroadcastPolicy,
}

impl BroadcastDispatcher {
    pub fn new(
        fetcher: PingFetchService,
        subscribers: Arc<dyn SubscriberBroadcast>,
        update_channel: ChannelId,
    ) -> Self {
        Self {
            fetcher,
            subscribers,
            update_channel,
            policy: BroadcastPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: BroadcastPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn update_channel(&self) -> &ChannelId {
        &self.update_channel
    }

    pub fn policy(&self) -> BroadcastPolicy {
        self.policy
    }

    /// Run one broadcast cycle. Failures are logged, never returned.
    // TODO: track change sets and send deltas instead of the full dataset
    #[instrument(skip(self), fields(channel = %self.update_channel, policy = ?self.policy))]
    pub async fn broadcast_all(&self) -> BroadcastOutcome {
        let result = self.fetcher.fetch_all(true).await;

        for (id, err) in &result.errors {
            error!(configuration_id = %id, "{}", err);
        }

        match self.policy.admit(&result) {
            Some(pings) => self.broadcast_pings(pings).await,
            None => {
                warn!(
                    errors = result.errors.len(),
                    "Suppressing ping broadcast, not every configuration resolved"
                );
                BroadcastOutcome::Suppressed {
                    errors: result.errors.len(),
                }
            }
        }
    }

    /// Serialize the pings and dispatch them to the update channel.
    pub async fn broadcast_pings<T: Serialize>(&self, pings: &[T]) -> BroadcastOutcome {
        match serialize_payload(pings) {
            Ok(payload) => {
                let subscribers = self.dispatch(payload, &self.update_channel).await;
                BroadcastOutcome::Dispatched {
                    pings: pings.len(),
                    subscribers,
                }
            }
            Err(err) => {
                error!("{}", err);
                BroadcastOutcome::Abandoned {
                    reason: err.to_string(),
                }
            }
        }
    }

    pub async fn dispatch(&self, payload: String, channel: &ChannelId) -> usize {
        let subscribers = self
            .subscribers
            .broadcast_client_update(payload, channel)
            .await;
        info!("Broadcast ping update to {} subscribers on {}", subscribers, channel);
        subscribers
    }
}

pub fn serialize_payload<T: Serialize>(pings: &[T]) -> Result<String, PingError> {
    Ok(serde_json::to_string(pings)?)
}
