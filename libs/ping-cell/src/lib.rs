// =====================================================================================
// PING CELL - CACHED SERVICE PINGS & SUBSCRIBER BROADCAST
// =====================================================================================
//
// This cell provides:
// - Cached per-configuration ping lookup enriched with PagerDuty incidents
// - Batch fetch with per-configuration error reporting
// - Full-dataset broadcast of every ping to WebSocket subscribers
//
// =====================================================================================

pub mod error;
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use error::PingError;
pub use models::{
    BroadcastOutcome, ChannelId, ConfigurationId, ConfigurationPing, FetchResult,
    PagerDutyEvent, PingSnapshot, ServiceConfiguration,
};
pub use services::{
    BroadcastDispatcher, BroadcastPolicy, PingFetchService, SubscriberHub,
};

pub use handlers::PingHandlers;
pub use router::create_ping_router;
