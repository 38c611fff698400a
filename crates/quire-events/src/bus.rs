//! Event bus implementation
//!
//! Publish/subscribe over topic patterns. The engine publishes after a
//! mutation has been committed; subscribers never influence the outcome.

use crate::types::Event;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{broadcast, RwLock};

/// Event bus error types.
#[derive(Debug, Error)]
pub enum EventBusError {
    /// Failed to publish event
    #[error("Failed to publish event: {0}")]
    PublishError(String),

    /// Failed to subscribe
    #[error("Failed to subscribe: {0}")]
    SubscribeError(String),

    /// Unknown subscription ID
    #[error("Unknown subscription: {0}")]
    UnknownSubscription(String),

    /// Channel closed
    #[error("Channel closed")]
    ChannelClosed,
}

/// Result type for event bus operations.
pub type EventBusResult<T> = Result<T, EventBusError>;

/// Subscription handle for receiving events.
pub struct Subscription {
    /// Subscription ID
    pub id: String,
    /// Topic pattern
    pub topic: String,
    /// Event receiver
    pub receiver: broadcast::Receiver<Event>,
}

impl Subscription {
    /// Receive the next event.
    pub async fn recv(&mut self) -> EventBusResult<Event> {
        self.receiver
            .recv()
            .await
            .map_err(|_| EventBusError::ChannelClosed)
    }

    /// Receive an event if one is already queued.
    pub fn try_recv(&mut self) -> Option<Event> {
        self.receiver.try_recv().ok()
    }
}

/// Event handler trait for processing events.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Handle an event.
    async fn handle(&self, event: Event) -> EventBusResult<()>;

    /// Get the topic patterns this handler is interested in.
    fn topics(&self) -> Vec<String>;
}

/// Event bus trait for publish/subscribe operations.
#[async_trait]
pub trait EventBus: Send + Sync {
    /// Publish an event.
    async fn publish(&self, event: Event) -> EventBusResult<()>;

    /// Subscribe to a topic pattern.
    ///
    /// Topic patterns support wildcards:
    /// - `*` matches any single segment
    /// - `#` matches zero or more segments
    ///
    /// Examples:
    /// - `post.*` matches `post.published`, `post.deleted`
    /// - `#` matches everything
    async fn subscribe(&self, topic: &str) -> EventBusResult<Subscription>;

    /// Register an event handler.
    async fn register_handler(&self, handler: Arc<dyn EventHandler>) -> EventBusResult<()>;

    /// Unsubscribe.
    async fn unsubscribe(&self, subscription_id: &str) -> EventBusResult<()>;

    /// Get event bus stats.
    async fn stats(&self) -> EventBusStats;
}

/// Event bus statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventBusStats {
    /// Total events published
    pub events_published: u64,
    /// Total deliveries to subscribers
    pub events_delivered: u64,
    /// Active subscriptions
    pub active_subscriptions: usize,
    /// Registered handlers
    pub registered_handlers: usize,
}

/// Check if a topic matches a pattern.
pub fn topic_matches(pattern: &str, topic: &str) -> bool {
    let pattern_parts: Vec<&str> = pattern.split('.').collect();
    let topic_parts: Vec<&str> = topic.split('.').collect();
    segments_match(&pattern_parts, &topic_parts)
}

fn segments_match(pattern: &[&str], topic: &[&str]) -> bool {
    match pattern.split_first() {
        None => topic.is_empty(),
        // # matches zero or more segments
        Some((&"#", rest)) => {
            (0..=topic.len()).any(|skip| segments_match(rest, &topic[skip..]))
        }
        Some((&segment, rest)) => match topic.split_first() {
            Some((head, tail)) => {
                (segment == "*" || segment == *head) && segments_match(rest, tail)
            }
            None => false,
        },
    }
}

/// In-memory event bus.
///
/// Suitable for a single process and for tests.
pub struct MemoryEventBus {
    /// One broadcast channel per subscribed pattern
    channels: RwLock<HashMap<String, broadcast::Sender<Event>>>,
    /// Subscription ID -> pattern
    subscriptions: RwLock<HashMap<String, String>>,
    /// Registered handlers
    handlers: RwLock<Vec<Arc<dyn EventHandler>>>,
    events_published: AtomicU64,
    events_delivered: AtomicU64,
    /// Channel capacity for new patterns
    channel_capacity: usize,
}

impl std::fmt::Debug for MemoryEventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryEventBus")
            .field("channel_capacity", &self.channel_capacity)
            .field("events_published", &self.events_published.load(Ordering::Relaxed))
            .finish()
    }
}

impl MemoryEventBus {
    /// Create a new in-memory event bus.
    pub fn new() -> Self {
        Self::with_capacity(1024)
    }

    /// Create with custom channel capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            channels: RwLock::new(HashMap::new()),
            subscriptions: RwLock::new(HashMap::new()),
            handlers: RwLock::new(Vec::new()),
            events_published: AtomicU64::new(0),
            events_delivered: AtomicU64::new(0),
            channel_capacity: capacity.max(1),
        }
    }
}

impl Default for MemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventBus for MemoryEventBus {
    async fn publish(&self, event: Event) -> EventBusResult<()> {
        self.events_published.fetch_add(1, Ordering::Relaxed);

        {
            let channels = self.channels.read().await;
            for (pattern, sender) in channels.iter() {
                if topic_matches(pattern, event.topic()) {
                    // Err only means every receiver for the pattern is gone
                    if let Ok(receivers) = sender.send(event.clone()) {
                        self.events_delivered
                            .fetch_add(receivers as u64, Ordering::Relaxed);
                    }
                }
            }
        }

        let handlers = self.handlers.read().await;
        for handler in handlers.iter() {
            if handler
                .topics()
                .iter()
                .any(|pattern| topic_matches(pattern, event.topic()))
            {
                let handler = handler.clone();
                let event = event.clone();
                tokio::spawn(async move {
                    if let Err(e) = handler.handle(event).await {
                        tracing::error!(error = %e, "Event handler failed");
                    }
                });
            }
        }

        Ok(())
    }

    async fn subscribe(&self, topic: &str) -> EventBusResult<Subscription> {
        if topic.is_empty() {
            return Err(EventBusError::SubscribeError(
                "topic pattern is empty".to_string(),
            ));
        }
        let id = uuid::Uuid::now_v7().to_string();

        let receiver = {
            let mut channels = self.channels.write().await;
            match channels.get(topic) {
                Some(sender) => sender.subscribe(),
                None => {
                    let (sender, receiver) = broadcast::channel(self.channel_capacity);
                    channels.insert(topic.to_string(), sender);
                    receiver
                }
            }
        };

        self.subscriptions
            .write()
            .await
            .insert(id.clone(), topic.to_string());

        Ok(Subscription {
            id,
            topic: topic.to_string(),
            receiver,
        })
    }

    async fn register_handler(&self, handler: Arc<dyn EventHandler>) -> EventBusResult<()> {
        self.handlers.write().await.push(handler);
        Ok(())
    }

    async fn unsubscribe(&self, subscription_id: &str) -> EventBusResult<()> {
        let mut subscriptions = self.subscriptions.write().await;
        let topic = subscriptions
            .remove(subscription_id)
            .ok_or_else(|| EventBusError::UnknownSubscription(subscription_id.to_string()))?;

        // Drop the channel once no subscription references the pattern
        if !subscriptions.values().any(|t| *t == topic) {
            self.channels.write().await.remove(&topic);
        }
        Ok(())
    }

    async fn stats(&self) -> EventBusStats {
        EventBusStats {
            events_published: self.events_published.load(Ordering::Relaxed),
            events_delivered: self.events_delivered.load(Ordering::Relaxed),
            active_subscriptions: self.subscriptions.read().await.len(),
            registered_handlers: self.handlers.read().await.len(),
        }
    }
}
