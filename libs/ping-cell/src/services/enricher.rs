// =====================================================================================
// INCIDENT EVENT ENRICHER
// =====================================================================================

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use shared_config::AppConfig;

use crate::models::{ConfigurationId, PagerDutyEvent};
use crate::services::registry::ConfigurationRegistry;

/// Supplies the open incidents for a configuration.
///
/// Never fails: an unreachable upstream degrades to an empty list.
#[async_trait]
pub trait EventEnricher: Send + Sync {
    async fn events_for(&self, id: &ConfigurationId) -> Vec<PagerDutyEvent>;
}

/// Used when no incident source is configured.
#[derive(Debug, Default, Clone)]
pub struct NoopEventEnricher;

#[async_trait]
impl EventEnricher for NoopEventEnricher {
    async fn events_for(&self, _id: &ConfigurationId) -> Vec<PagerDutyEvent> {
        Vec::new()
    }
}

/// PagerDuty's maximum page size for list endpoints.
const INCIDENTS_PAGE_LIMIT: usize = 100;
/// Upper bound on followed pages per lookup.
const MAX_INCIDENT_PAGES: usize = 10;

#[derive(Debug, Deserialize)]
struct IncidentsResponse {
    #[serde(default)]
    incidents: Vec<PagerDutyEvent>,
    #[serde(default)]
    more: bool,
}

/// PagerDuty REST API client for the incidents of a configuration's linked service
/// Based on: https://developer.pagerduty.com/api-reference/
pub struct PagerDutyEventEnricher {
    client: Client,
    api_key: String,
    base_url: String,
    registry: Arc<dyn ConfigurationRegistry>,
}

impl PagerDutyEventEnricher {
    pub fn new(config: &AppConfig, registry: Arc<dyn ConfigurationRegistry>) -> Self {
        let timeout = Duration::from_secs(config.pagerduty_timeout_secs);
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                warn!("Failed to build PagerDuty HTTP client, using defaults: {}", e);
                Client::new()
            });

        Self {
            client,
            api_key: config.pagerduty_api_key.clone(),
            base_url: config.pagerduty_base_url.trim_end_matches('/').to_string(),
            registry,
        }
    }

    /// Collects every open incident of the service, following `more` across pages.
    async fn fetch_incidents(&self, service_id: &str) -> Result<Vec<PagerDutyEvent>, String> {
        let mut events = Vec::new();

        for page in 0..MAX_INCIDENT_PAGES {
            let offset = page * INCIDENTS_PAGE_LIMIT;
            let response = self.fetch_incidents_page(service_id, offset).await?;
            events.extend(response.incidents);

            if !response.more {
                return Ok(events);
            }
        }

        warn!(
            service_id = %service_id,
            "PagerDuty reports more than {} open incidents, returning the first {}",
            MAX_INCIDENT_PAGES * INCIDENTS_PAGE_LIMIT,
            events.len()
        );
        Ok(events)
    }

    /// GET /incidents?service_ids[]={serviceId}&statuses[]=triggered&statuses[]=acknowledged&limit=100&offset={offset}
    async fn fetch_incidents_page(&self, service_id: &str, offset: usize) -> Result<IncidentsResponse, String> {
        let url = format!("{}/incidents", self.base_url);

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Token token={}", self.api_key))
            .header("Accept", "application/vnd.pagerduty+json;version=2")
            .query(&[
                ("service_ids[]", service_id),
                ("statuses[]", "triggered"),
                ("statuses[]", "acknowledged"),
            ])
            .query(&[("limit", INCIDENTS_PAGE_LIMIT), ("offset", offset)])
            .send()
            .await
            .map_err(|e| format!("request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(format!("HTTP {}: {}", status, body));
        }

        response
            .json()
            .await
            .map_err(|e| format!("failed to parse incidents response: {}", e))
    }
}

#[async_trait]
impl EventEnricher for PagerDutyEventEnricher {
    async fn events_for(&self, id: &ConfigurationId) -> Vec<PagerDutyEvent> {
        let Some(service_id) = self
            .registry
            .get(id)
            .and_then(|configuration| configuration.pagerduty_service_id)
        else {
            debug!("Configuration {} has no linked PagerDuty service", id);
            return Vec::new();
        };

        match self.fetch_incidents(&service_id).await {
            Ok(events) => {
                debug!("Fetched {} PagerDuty incidents for configuration {}", events.len(), id);
                events
            }
            Err(e) => {
                warn!(
                    configuration_id = %id,
                    service_id = %service_id,
                    "PagerDuty enrichment unavailable, continuing without events: {}", e
                );
                Vec::new()
            }
        }
    }
}
