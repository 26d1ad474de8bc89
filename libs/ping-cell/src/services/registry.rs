// =====================================================================================
// CONFIGURATION REGISTRY
// =====================================================================================

use std::collections::HashMap;
use std::path::Path;

use tracing::{info, warn};

use crate::error::PingError;
use crate::models::{ConfigurationId, ServiceConfiguration};

/// Source of the monitored configurations.
pub trait ConfigurationRegistry: Send + Sync {
    /// Every known configuration id. Order is unspecified.
    fn configuration_ids(&self) -> Vec<ConfigurationId>;

    fn get(&self, id: &ConfigurationId) -> Option<ServiceConfiguration>;
}

#[derive(Debug, Default, Clone)]
pub struct StaticConfigurationRegistry {
    configurations: HashMap<ConfigurationId, ServiceConfiguration>,
}

impl StaticConfigurationRegistry {
    pub fn new(configurations: impl IntoIterator<Item = ServiceConfiguration>) -> Self {
        let mut map = HashMap::new();
        for configuration in configurations {
            if map.contains_key(&configuration.id) {
                warn!("Duplicate configuration id {}, keeping the last definition", configuration.id);
            }
            map.insert(configuration.id.clone(), configuration);
        }
        Self { configurations: map }
    }

    /// Loads a JSON array of configurations.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, PingError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            PingError::Registry(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let configurations: Vec<ServiceConfiguration> = serde_json::from_str(&contents)
            .map_err(|e| PingError::Registry(format!("Invalid configuration file {}: {}", path.display(), e)))?;

        info!("Loaded {} configurations from {}", configurations.len(), path.display());
        Ok(Self::new(configurations))
    }

    pub fn len(&self) -> usize {
        self.configurations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configurations.is_empty()
    }
}

impl ConfigurationRegistry for StaticConfigurationRegistry {
    fn configuration_ids(&self) -> Vec<ConfigurationId> {
        self.configurations.keys().cloned().collect()
    }

    fn get(&self, id: &ConfigurationId) -> Option<ServiceConfiguration> {
        self.configurations.get(id).cloned()
    }
}
