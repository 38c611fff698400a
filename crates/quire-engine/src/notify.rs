//! Best-effort publication of lifecycle events.

use quire_events::{DomainEvent, EventBus};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Wraps the bus so that a publish failure can never fail the operation
/// that already committed.
#[derive(Clone)]
pub(crate) struct Notifier {
    bus: Arc<dyn EventBus>,
}

impl Notifier {
    pub(crate) fn new(bus: Arc<dyn EventBus>) -> Self {
        Self { bus }
    }

    /// Publish `event` on behalf of `actor`, logging and swallowing failures.
    pub(crate) async fn emit<E>(&self, actor: Uuid, event: &E)
    where
        E: DomainEvent + Serialize,
    {
        let topic = event.event_type();
        let envelope = match event.to_event() {
            Ok(envelope) => envelope.with_actor(actor),
            Err(e) => {
                warn!(topic, error = %e, "Failed to encode event");
                return;
            }
        };

        match self.bus.publish(envelope).await {
            Ok(()) => debug!(topic, "Event published"),
            Err(e) => warn!(topic, error = %e, "Failed to publish event"),
        }
    }
}
