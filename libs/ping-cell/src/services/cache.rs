// =====================================================================================
// PING CACHE
// =====================================================================================

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::PingError;
use crate::models::{ConfigurationId, PingSnapshot};

/// Last-known ping snapshot per configuration.
///
/// Writers (the refill process) replace whole entries; readers always get a
/// consistent copy of one entry. `Ok(None)` is a cache miss, `Err` a backend
/// failure for that key.
#[async_trait]
pub trait PingCache: Send + Sync {
    async fn lookup(&self, id: &ConfigurationId) -> Result<Option<PingSnapshot>, PingError>;
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryPingCache {
    entries: Arc<RwLock<HashMap<ConfigurationId, PingSnapshot>>>,
}

impl InMemoryPingCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn store(&self, snapshot: PingSnapshot) {
        let mut entries = self.entries.write().await;
        debug!("Storing ping snapshot for configuration {}", snapshot.configuration_id);
        entries.insert(snapshot.configuration_id.clone(), snapshot);
    }

    pub async fn remove(&self, id: &ConfigurationId) -> Option<PingSnapshot> {
        let mut entries = self.entries.write().await;
        entries.remove(id)
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl PingCache for InMemoryPingCache {
    async fn lookup(&self, id: &ConfigurationId) -> Result<Option<PingSnapshot>, PingError> {
        let entries = self.entries.read().await;
        Ok(entries.get(id).cloned())
    }
}
