#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;

use ping_cell::models::{IncidentStatus, IncidentUrgency};
use ping_cell::services::{
    EventEnricher, InMemoryPingCache, NoopEventEnricher, StaticConfigurationRegistry,
    SubscriberBroadcast,
};
use ping_cell::{
    ChannelId, ConfigurationId, PagerDutyEvent, PingFetchService, PingSnapshot,
    ServiceConfiguration,
};

pub fn snapshot(id: &str, latency_ms: i64) -> PingSnapshot {
    let mut metrics = serde_json::Map::new();
    metrics.insert("latencyMs".to_string(), json!(latency_ms));
    metrics.insert("healthy".to_string(), json!(true));
    PingSnapshot::new(id, metrics)
}

pub fn configuration(id: &str) -> ServiceConfiguration {
    ServiceConfiguration {
        id: ConfigurationId::from(id),
        name: format!("Service {}", id),
        pagerduty_service_id: Some(format!("PD-{}", id)),
    }
}

pub fn registry(ids: &[&str]) -> StaticConfigurationRegistry {
    StaticConfigurationRegistry::new(ids.iter().map(|id| configuration(id)))
}

pub fn ids(ids: &[&str]) -> Vec<ConfigurationId> {
    ids.iter().map(|id| ConfigurationId::from(*id)).collect()
}

pub fn incident(id: &str) -> PagerDutyEvent {
    PagerDutyEvent {
        id: id.to_string(),
        incident_number: 42,
        title: "Elevated error rate".to_string(),
        status: IncidentStatus::Triggered,
        urgency: IncidentUrgency::High,
        created_at: Utc::now(),
        html_url: Some(format!("https://example.pagerduty.com/incidents/{}", id)),
    }
}

/// Cache holding svc-1 and svc-2, registry listing `registered`.
pub async fn populated_cache() -> InMemoryPingCache {
    let cache = InMemoryPingCache::new();
    cache.store(snapshot("svc-1", 120)).await;
    cache.store(snapshot("svc-2", 340)).await;
    cache
}

pub fn fetch_service(
    cache: InMemoryPingCache,
    enricher: Arc<dyn EventEnricher>,
    registered: &[&str],
) -> PingFetchService {
    PingFetchService::new(Arc::new(cache), enricher, Arc::new(registry(registered)))
}

pub async fn default_fetch_service(registered: &[&str]) -> PingFetchService {
    fetch_service(populated_cache().await, Arc::new(NoopEventEnricher), registered)
}

/// Enricher returning fixed events per id and counting calls.
#[derive(Default)]
pub struct StubEnricher {
    pub events: HashMap<ConfigurationId, Vec<PagerDutyEvent>>,
    pub calls: AtomicUsize,
}

impl StubEnricher {
    pub fn with_events(id: &str, events: Vec<PagerDutyEvent>) -> Self {
        let mut map = HashMap::new();
        map.insert(ConfigurationId::from(id), events);
        Self {
            events: map,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EventEnricher for StubEnricher {
    async fn events_for(&self, id: &ConfigurationId) -> Vec<PagerDutyEvent> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.events.get(id).cloned().unwrap_or_default()
    }
}

/// Records every dispatched payload instead of delivering it.
#[derive(Default)]
pub struct RecordingBroadcast {
    pub dispatched: Mutex<Vec<(String, ChannelId)>>,
}

impl RecordingBroadcast {
    pub fn dispatches(&self) -> Vec<(String, ChannelId)> {
        self.dispatched.lock().unwrap().clone()
    }
}

#[async_trait]
impl SubscriberBroadcast for RecordingBroadcast {
    async fn broadcast_client_update(&self, payload: String, channel: &ChannelId) -> usize {
        self.dispatched.lock().unwrap().push((payload, channel.clone()));
        1
    }
}
