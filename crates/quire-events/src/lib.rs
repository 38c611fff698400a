//! # Quire Events
//!
//! Notifications for the content lifecycle. The engine announces every
//! committed mutation on an [`EventBus`]; delivery is best-effort and a
//! failed publish never changes the outcome of the operation that caused it.
//!
//! ## Event Types
//!
//! - `PostEvent`: draft creation, edits, publish/retract, transfer, delete
//! - `ReactionEvent`: reactions attached, comment edits, removals
//! - `UserEvent`: registration, profile edits, role assignment, removal
//!
//! Each implements [`DomainEvent`] to be wrapped in the [`Event`] envelope.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use quire_events::{DomainEvent, EventBus, MemoryEventBus, PostEvent};
//! use quire_model::PostKind;
//! use uuid::Uuid;
//!
//! async fn publish_example() {
//!     let bus = MemoryEventBus::new();
//!     let mut sub = bus.subscribe("post.*").await.unwrap();
//!
//!     let event = PostEvent::Published {
//!         post_id: Uuid::now_v7(),
//!         kind: PostKind::Article,
//!     };
//!     bus.publish(event.to_event().unwrap()).await.unwrap();
//!
//!     let received = sub.recv().await.unwrap();
//!     assert_eq!(received.topic(), "post.published");
//! }
//! ```
//!
//! ## Topic Patterns
//!
//! Topics are `{record}.{change}`:
//! - `post.published` - Specific event
//! - `post.*` - Every post event
//! - `#` - All events
//!
//! Wildcards:
//! - `*` matches exactly one segment
//! - `#` matches zero or more segments

pub mod bus;
pub mod types;

// Re-export main types
pub use bus::{
    topic_matches, EventBus, EventBusError, EventBusResult, EventBusStats, EventHandler,
    MemoryEventBus, Subscription,
};
pub use types::{DomainEvent, Event, EventCategory, PostEvent, ReactionEvent, UserEvent};
