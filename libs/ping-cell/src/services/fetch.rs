// =====================================================================================
// PING FETCH SERVICE
// =====================================================================================

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::error::PingError;
use crate::models::{ConfigurationId, ConfigurationPing, FetchResult};
use crate::services::cache::PingCache;
use crate::services::enricher::EventEnricher;
use crate::services::registry::ConfigurationRegistry;

/// Resolves configuration ids to enriched pings, one outcome per id.
#[derive(Clone)]
pub struct PingFetchService {
    cache: Arc<dyn PingCache>,
    enricher: Arc<dyn EventEnricher>,
    registry: Arc<dyn ConfigurationRegistry>,
}

impl PingFetchService {
    pub fn new(
        cache: Arc<dyn PingCache>,
        enricher: Arc<dyn EventEnricher>,
        registry: Arc<dyn ConfigurationRegistry>,
    ) -> Self {
        Self {
            cache,
            enricher,
            registry,
        }
    }

    pub fn registry(&self) -> &Arc<dyn ConfigurationRegistry> {
        &self.registry
    }

    /// Fetch a single ping from the cache and attach its current incident events.
    ///
    /// `use_cache` is reserved for a live metrics path; pings are always served
    /// from the cache today.
    #[instrument(skip(self))]
    pub async fn fetch_one(
        &self,
        id: &ConfigurationId,
        use_cache: bool,
    ) -> Result<ConfigurationPing, PingError> {
        if !use_cache {
            debug!("Live ping fetch requested for {}, serving from cache", id);
        }

        let snapshot = self
            .cache
            .lookup(id)
            .await?
            .ok_or_else(|| PingError::not_found(id))?;

        let events = self.enricher.events_for(id).await;
        Ok(ConfigurationPing::enriched(snapshot, events))
    }

    /// Fetch every id in order. A failure for one id never blocks the others;
    /// repeated ids are resolved once.
    #[instrument(skip(self, ids), fields(requested = ids.len()))]
    pub async fn fetch_many(&self, ids: &[ConfigurationId], use_cache: bool) -> FetchResult {
        let mut result = FetchResult::default();
        let mut seen = HashSet::with_capacity(ids.len());

        for id in ids {
            if !seen.insert(id) {
                continue;
            }

            match self.fetch_one(id, use_cache).await {
                Ok(ping) => result.pings.push(ping),
                Err(err) => {
                    result.errors.insert(id.clone(), err);
                }
            }
        }

        debug!(
            resolved = result.pings.len(),
            failed = result.errors.len(),
            "Batch ping fetch finished"
        );
        result
    }

    /// Fetch the pings of every configuration known to the registry.
    pub async fn fetch_all(&self, use_cache: bool) -> FetchResult {
        let ids = self.registry.configuration_ids();
        self.fetch_many(&ids, use_cache).await
    }
}
