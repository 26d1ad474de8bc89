use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use ping_cell::{create_ping_router, PingHandlers};

pub fn create_router(handlers: Arc<PingHandlers>) -> Router {
    Router::new()
        .route("/", get(|| async { "Executive dashboard ping server is running!" }))
        .nest("/pings", create_ping_router(handlers))
}
