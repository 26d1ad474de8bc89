// =====================================================================================
// PING CELL HANDLERS
// =====================================================================================

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        Path, State, WebSocketUpgrade,
    },
    response::IntoResponse,
    Json,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::AppError;

use crate::error::PingError;
use crate::models::{
    BroadcastResponse, ChannelId, ConfigurationId, ConfigurationPing, PingQueryRequest,
    PingsResponse,
};
use crate::services::{
    BroadcastDispatcher, BroadcastPolicy, ConfigurationRegistry, EventEnricher,
    InMemoryPingCache, NoopEventEnricher, PagerDutyEventEnricher, PingCache, PingFetchService,
    RedisPingCache, StaticConfigurationRegistry, SubscriberHub,
};

pub struct PingHandlers {
    fetcher: PingFetchService,
    dispatcher: Arc<BroadcastDispatcher>,
    hub: SubscriberHub,
}

impl PingHandlers {
    pub fn new(fetcher: PingFetchService, dispatcher: Arc<BroadcastDispatcher>, hub: SubscriberHub) -> Self {
        Self {
            fetcher,
            dispatcher,
            hub,
        }
    }

    /// Wires the cache, enricher, registry and hub selected by the configuration.
    pub async fn from_config(config: &AppConfig) -> Result<Self, PingError> {
        let registry: Arc<dyn ConfigurationRegistry> = match &config.configurations_path {
            Some(path) => Arc::new(StaticConfigurationRegistry::from_json_file(path)?),
            None => Arc::new(StaticConfigurationRegistry::default()),
        };

        let cache: Arc<dyn PingCache> = match &config.redis_url {
            Some(url) => Arc::new(RedisPingCache::connect(url, &config.ping_cache_key_prefix).await?),
            // Nothing populates the in-memory cache, so monitored configurations would never resolve.
            None if !registry.configuration_ids().is_empty() => {
                return Err(PingError::CacheUnavailable(
                    "REDIS_URL must be set when CONFIGURATIONS_PATH lists configurations".to_string(),
                ));
            }
            None => {
                warn!("REDIS_URL not set, using an empty in-memory ping cache");
                Arc::new(InMemoryPingCache::new())
            }
        };

        let enricher: Arc<dyn EventEnricher> = if config.is_pagerduty_configured() {
            Arc::new(PagerDutyEventEnricher::new(config, registry.clone()))
        } else {
            Arc::new(NoopEventEnricher)
        };

        let policy = config.broadcast_policy.parse::<BroadcastPolicy>().unwrap_or_else(|e| {
            warn!("{}, falling back to require_complete", e);
            BroadcastPolicy::RequireComplete
        });

        let hub = SubscriberHub::new();
        let fetcher = PingFetchService::new(cache, enricher, registry);
        let dispatcher = BroadcastDispatcher::new(
            fetcher.clone(),
            Arc::new(hub.clone()),
            ChannelId::new(config.update_channel.clone()),
        )
        .with_policy(policy);

        Ok(Self::new(fetcher, Arc::new(dispatcher), hub))
    }

    pub fn dispatcher(&self) -> Arc<BroadcastDispatcher> {
        self.dispatcher.clone()
    }

    pub fn hub(&self) -> &SubscriberHub {
        &self.hub
    }
}

// =====================================================================================
// FETCH ENDPOINTS
// =====================================================================================

#[instrument(skip(handlers))]
pub async fn get_all_pings(
    State(handlers): State<Arc<PingHandlers>>,
) -> Json<PingsResponse> {
    let result = handlers.fetcher.fetch_all(true).await;
    Json(result.into())
}

#[instrument(skip(handlers))]
pub async fn get_ping(
    State(handlers): State<Arc<PingHandlers>>,
    Path(configuration_id): Path<String>,
) -> Result<Json<ConfigurationPing>, AppError> {
    let id = ConfigurationId::from(configuration_id);
    let ping = handlers.fetcher.fetch_one(&id, true).await?;
    Ok(Json(ping))
}

#[instrument(skip(handlers, request))]
pub async fn query_pings(
    State(handlers): State<Arc<PingHandlers>>,
    Json(request): Json<PingQueryRequest>,
) -> Result<Json<PingsResponse>, AppError> {
    if request.configuration_ids.is_empty() {
        return Err(AppError::BadRequest("configuration_ids must not be empty".to_string()));
    }

    let result = handlers
        .fetcher
        .fetch_many(&request.configuration_ids, request.use_cache.unwrap_or(true))
        .await;
    Ok(Json(result.into()))
}

// =====================================================================================
// BROADCAST ENDPOINTS
// =====================================================================================

#[instrument(skip(handlers))]
pub async fn trigger_broadcast(
    State(handlers): State<Arc<PingHandlers>>,
) -> Json<BroadcastResponse> {
    let outcome = handlers.dispatcher.broadcast_all().await;
    Json(BroadcastResponse::from_outcome(&outcome, handlers.dispatcher.update_channel()))
}

/// Upgrades to a WebSocket that receives every update broadcast.
pub async fn subscribe_updates(
    ws: WebSocketUpgrade,
    State(handlers): State<Arc<PingHandlers>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| run_subscriber(socket, handlers))
}

async fn run_subscriber(socket: WebSocket, handlers: Arc<PingHandlers>) {
    let conn_id = Uuid::new_v4();
    let channel = handlers.dispatcher.update_channel().clone();
    let mut updates = handlers.hub.subscribe(&channel).await;
    let (mut tx, mut rx) = socket.split();

    info!(conn_id = %conn_id, channel = %channel, "Ping subscriber connected");

    loop {
        tokio::select! {
            msg = rx.next() => {
                match msg {
                    Some(Ok(Message::Ping(data))) => {
                        if tx.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                    _ => {}
                }
            }

            update = updates.recv() => {
                match update {
                    Ok(payload) => {
                        if tx.send(Message::Text(payload.into())).await.is_err() {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        debug!(conn_id = %conn_id, skipped, "Subscriber lagged, skipping stale updates");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        }
    }

    info!(conn_id = %conn_id, "Ping subscriber disconnected");
}
