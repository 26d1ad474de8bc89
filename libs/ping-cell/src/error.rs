use thiserror::Error;

use shared_models::AppError;

use crate::models::ConfigurationId;

#[derive(Error, Debug)]
pub enum PingError {
    #[error("Configuration not found in Ping cache, configurationId: {configuration_id}")]
    NotFound { configuration_id: ConfigurationId },

    #[error("Ping cache lookup failed for configurationId {configuration_id}: {message}")]
    Cache {
        configuration_id: ConfigurationId,
        message: String,
    },

    #[error("Ping cache unavailable: {0}")]
    CacheUnavailable(String),

    #[error("Error creating JSON representation of details data: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration registry error: {0}")]
    Registry(String),
}

impl PingError {
    pub fn not_found(configuration_id: &ConfigurationId) -> Self {
        Self::NotFound {
            configuration_id: configuration_id.clone(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<PingError> for AppError {
    fn from(err: PingError) -> Self {
        match err {
            PingError::NotFound { .. } => AppError::NotFound(err.to_string()),
            PingError::Cache { .. } | PingError::CacheUnavailable(_) => {
                AppError::ExternalService(err.to_string())
            }
            PingError::Serialization(_) | PingError::Registry(_) => AppError::Internal(err.to_string()),
        }
    }
}
