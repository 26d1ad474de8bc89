use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::services::broadcast::BroadcastDispatcher;

/// Runs a broadcast cycle every `interval` until the handle is aborted.
pub fn spawn_broadcast_scheduler(
    dispatcher: Arc<BroadcastDispatcher>,
    interval: Duration,
) -> JoinHandle<()> {
    info!("Starting ping broadcast scheduler every {:?}", interval);

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            let outcome = dispatcher.broadcast_all().await;
            debug!("Scheduled broadcast cycle finished: {:?}", outcome);
        }
    })
}
