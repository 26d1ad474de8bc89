use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{broadcast, RwLock};
use tracing::debug;

use crate::models::ChannelId;

pub type SubscriberSender = broadcast::Sender<String>;
pub type SubscriberReceiver = broadcast::Receiver<String>;

const CHANNEL_CAPACITY: usize = 64;

/// Pushes a payload to every subscriber currently attached to a channel.
#[async_trait]
pub trait SubscriberBroadcast: Send + Sync {
    /// Returns how many subscribers received the payload.
    async fn broadcast_client_update(&self, payload: String, channel: &ChannelId) -> usize;
}

/// In-process channel registry backing the WebSocket subscribers.
pub struct SubscriberHub {
    channels: Arc<RwLock<HashMap<ChannelId, SubscriberSender>>>,
    capacity: usize,
}

impl SubscriberHub {
    pub fn new() -> Self {
        Self::with_capacity(CHANNEL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            channels: Arc::new(RwLock::new(HashMap::new())),
            capacity,
        }
    }

    pub async fn subscribe(&self, channel: &ChannelId) -> SubscriberReceiver {
        {
            let channels = self.channels.read().await;
            if let Some(sender) = channels.get(channel) {
                return sender.subscribe();
            }
        }

        let mut channels = self.channels.write().await;
        let sender = channels
            .entry(channel.clone())
            .or_insert_with(|| {
                debug!("Created subscriber channel {}", channel);
                broadcast::channel(self.capacity).0
            });
        sender.subscribe()
    }

    pub async fn subscriber_count(&self, channel: &ChannelId) -> usize {
        let channels = self.channels.read().await;
        channels
            .get(channel)
            .map(|sender| sender.receiver_count())
            .unwrap_or(0)
    }

    pub async fn active_channels(&self) -> Vec<ChannelId> {
        let channels = self.channels.read().await;
        channels.keys().cloned().collect()
    }

    pub async fn remove_channel(&self, channel: &ChannelId) {
        let mut channels = self.channels.write().await;
        channels.remove(channel);
        debug!("Removed subscriber channel {}", channel);
    }
}

#[async_trait]
impl SubscriberBroadcast for SubscriberHub {
    async fn broadcast_client_update(&self, payload: String, channel: &ChannelId) -> usize {
        let channels = self.channels.read().await;
        match channels.get(channel) {
            // send only fails when nobody is listening
            Some(sender) => sender.send(payload).unwrap_or(0),
            None => {
                debug!("No subscribers on channel {}, dropping update", channel);
                0
            }
        }
    }
}

impl Default for SubscriberHub {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for SubscriberHub {
    fn clone(&self) -> Self {
        Self {
            channels: Arc::clone(&self.channels),
            capacity: self.capacity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_broadcast_without_subscribers_delivers_nothing() {
        let hub = SubscriberHub::new();
        let delivered = hub
            .broadcast_client_update("[]".to_string(), &ChannelId::new("updates"))
            .await;
        assert_eq!(delivered, 0);
    }

    #[tokio::test]
    async fn test_every_subscriber_receives_payload() {
        let hub = SubscriberHub::new();
        let channel = ChannelId::new("updates");
        let mut first = hub.subscribe(&channel).await;
        let mut second = hub.subscribe(&channel).await;

        assert_eq!(hub.subscriber_count(&channel).await, 2);

        let delivered = hub.broadcast_client_update("payload".to_string(), &channel).await;
        assert_eq!(delivered, 2);
        assert_eq!(first.recv().await.unwrap(), "payload");
        assert_eq!(second.recv().await.unwrap(), "payload");
    }

    #[tokio::test]
    async fn test_channels_are_isolated() {
        let hub = SubscriberHub::new();
        let mut updates = hub.subscribe(&ChannelId::new("updates")).await;
        let _other = hub.subscribe(&ChannelId::new("other")).await;

        hub.broadcast_client_update("only-other".to_string(), &ChannelId::new("other"))
            .await;
        assert!(updates.try_recv().is_err());
        assert_eq!(hub.active_channels().await.len(), 2);
    }

    #[tokio::test]
    async fn test_clone_shares_channels() {
        let hub = SubscriberHub::new();
        let clone = hub.clone();
        let channel = ChannelId::new("updates");
        let mut receiver = clone.subscribe(&channel).await;

        hub.broadcast_client_update("shared".to_string(), &channel).await;
        assert_eq!(receiver.recv().await.unwrap(), "shared");

        hub.remove_channel(&channel).await;
        assert!(clone.active_channels().await.is_empty());
    }
}
