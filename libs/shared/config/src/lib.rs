use std::env;
use std::net::SocketAddr;
use tracing::warn;

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3000";
pub const DEFAULT_PAGERDUTY_BASE_URL: &str = "https://api.pagerduty.com";
pub const DEFAULT_UPDATE_CHANNEL: &str = "updates";
pub const DEFAULT_PING_CACHE_KEY_PREFIX: &str = "ping:";
pub const DEFAULT_BROADCAST_INTERVAL_SECS: u64 = 30;
pub const DEFAULT_PAGERDUTY_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_address: SocketAddr,
    pub redis_url: Option<String>,
    pub ping_cache_key_prefix: String,
    pub pagerduty_api_key: String,
    pub pagerduty_base_url: String,
    pub pagerduty_timeout_secs: u64,
    pub configurations_path: Option<String>,
    pub update_channel: String,
    pub broadcast_interval_secs: u64,
    pub broadcast_policy: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS
                .parse()
                .unwrap_or_else(|_| SocketAddr::from(([0, 0, 0, 0], 3000))),
            redis_url: None,
            ping_cache_key_prefix: DEFAULT_PING_CACHE_KEY_PREFIX.to_string(),
            pagerduty_api_key: String::new(),
            pagerduty_base_url: DEFAULT_PAGERDUTY_BASE_URL.to_string(),
            pagerduty_timeout_secs: DEFAULT_PAGERDUTY_TIMEOUT_SECS,
            configurations_path: None,
            update_channel: DEFAULT_UPDATE_CHANNEL.to_string(),
            broadcast_interval_secs: DEFAULT_BROADCAST_INTERVAL_SECS,
            broadcast_policy: "require_complete".to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let config = Self {
            bind_address: env::var("BIND_ADDRESS")
                .ok()
                .and_then(|value| match value.parse() {
                    Ok(addr) => Some(addr),
                    Err(_) => {
                        warn!("BIND_ADDRESS '{}' is not a valid socket address, using default", value);
                        None
                    }
                })
                .unwrap_or(defaults.bind_address),
            redis_url: env::var("REDIS_URL").ok().filter(|url| !url.is_empty()),
            ping_cache_key_prefix: env::var("PING_CACHE_KEY_PREFIX")
                .unwrap_or(defaults.ping_cache_key_prefix),
            pagerduty_api_key: env::var("PAGERDUTY_API_KEY")
                .unwrap_or_else(|_| {
                    warn!("PAGERDUTY_API_KEY not set, incident enrichment disabled");
                    String::new()
                }),
            pagerduty_base_url: env::var("PAGERDUTY_BASE_URL")
                .unwrap_or_else(|_| {
                    warn!("PAGERDUTY_BASE_URL not set, using default");
                    defaults.pagerduty_base_url
                }),
            pagerduty_timeout_secs: env::var("PAGERDUTY_TIMEOUT_SECS")
                .ok()
                .and_then(|value| value.parse().ok())
                .filter(|secs| *secs > 0)
                .unwrap_or(defaults.pagerduty_timeout_secs),
            configurations_path: env::var("CONFIGURATIONS_PATH").ok(),
            update_channel: env::var("UPDATE_CHANNEL")
                .unwrap_or(defaults.update_channel),
            broadcast_interval_secs: env::var("BROADCAST_INTERVAL_SECS")
                .ok()
                .and_then(|value| value.parse().ok())
                .unwrap_or(defaults.broadcast_interval_secs),
            broadcast_policy: env::var("BROADCAST_POLICY")
                .unwrap_or(defaults.broadcast_policy),
        };

        if config.configurations_path.is_none() {
            warn!("CONFIGURATIONS_PATH not set, no configurations will be monitored");
        }

        config
    }

    pub fn is_pagerduty_configured(&self) -> bool {
        !self.pagerduty_api_key.is_empty() && !self.pagerduty_base_url.is_empty()
    }

    pub fn is_redis_configured(&self) -> bool {
        self.redis_url.is_some()
    }
}
