// =====================================================================================
// PING CELL ROUTER
// =====================================================================================

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::handlers::{
    get_all_pings, get_ping, query_pings, subscribe_updates, trigger_broadcast, PingHandlers,
};

pub fn create_ping_router(handlers: Arc<PingHandlers>) -> Router {
    Router::new()
        .route("/", get(get_all_pings))
        .route("/query", post(query_pings))
        .route("/broadcast", post(trigger_broadcast))
        .route("/updates", get(subscribe_updates))
        .route("/config/{configuration_id}", get(get_ping))
        .layer(CorsLayer::permissive())
        .with_state(handlers)
}
