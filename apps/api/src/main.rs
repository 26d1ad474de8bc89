use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use dotenv::dotenv;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{self, TraceLayer};
use tracing::{info, warn, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod router;

use ping_cell::{services::spawn_broadcast_scheduler, PingHandlers};
use shared_config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Loading Env Vars
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting executive dashboard ping server");

    // Load configuration
    let config = AppConfig::from_env();

    let handlers = Arc::new(
        PingHandlers::from_config(&config)
            .await
            .context("Failed to initialise ping services")?,
    );

    // Periodic full-dataset broadcast
    let scheduler = if config.broadcast_interval_secs > 0 {
        Some(spawn_broadcast_scheduler(
            handlers.dispatcher(),
            Duration::from_secs(config.broadcast_interval_secs),
        ))
    } else {
        warn!("BROADCAST_INTERVAL_SECS is 0, periodic broadcasts disabled");
        None
    };

    // Set up CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the application router
    let app = router::create_router(handlers)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::DefaultMakeSpan::new()
                    .level(Level::INFO))
                .on_response(trace::DefaultOnResponse::new()
                    .level(Level::INFO)),
        )
        .layer(cors);

    // Run the server
    info!("Listening on {}", config.bind_address);

    let listener = TcpListener::bind(config.bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_address))?;
    axum::serve(listener, app)
        .await
        .context("Server error")?;

    if let Some(handle) = scheduler {
        handle.abort();
    }

    Ok(())
}
