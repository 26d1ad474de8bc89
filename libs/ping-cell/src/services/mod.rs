pub mod broadcast;
pub mod cache;
pub mod enricher;
pub mod fetch;
pub mod hub;
pub mod redis_cache;
pub mod registry;
pub mod scheduler;

pub use broadcast::{serialize_payload, BroadcastDispatcher, BroadcastPolicy};
pub use cache::{InMemoryPingCache, PingCache};
pub use enricher::{EventEnricher, NoopEventEnricher, PagerDutyEventEnricher};
pub use fetch::PingFetchService;
pub use hub::{SubscriberBroadcast, SubscriberHub, SubscriberReceiver};
pub use redis_cache::RedisPingCache;
pub use registry::{ConfigurationRegistry, StaticConfigurationRegistry};
pub use scheduler::spawn_broadcast_scheduler;
