//! Event types for content lifecycle notifications
//!
//! Every committed mutation in the engine is announced as an [`Event`].
//! Typed enums per record family convert into the generic envelope.

use chrono::{DateTime, Utc};
use quire_model::{PostKind, ReactionKind};
use quire_rbac::Role;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Event envelope.
///
/// All events are wrapped in this envelope, which carries what routing
/// and auditing need.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Unique event ID
    pub id: Uuid,

    /// Event type, which is also the topic (e.g., "post.published")
    pub event_type: String,

    /// Timestamp when event was created
    pub timestamp: DateTime<Utc>,

    /// User who triggered the event
    pub actor_id: Option<Uuid>,

    /// Event payload
    pub payload: serde_json::Value,
}

impl Event {
    /// Create a new event.
    pub fn new(event_type: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            id: Uuid::now_v7(),
            event_type: event_type.into(),
            timestamp: Utc::now(),
            actor_id: None,
            payload,
        }
    }

    /// Set the acting user.
    pub fn with_actor(mut self, actor_id: Uuid) -> Self {
        self.actor_id = Some(actor_id);
        self
    }

    /// Get the topic for this event.
    pub fn topic(&self) -> &str {
        &self.event_type
    }

    /// Category derived from the topic prefix.
    pub fn category(&self) -> Option<EventCategory> {
        EventCategory::from_event_type(&self.event_type)
    }

    /// Parse the payload into a specific type.
    pub fn parse_payload<T: for<'de> Deserialize<'de>>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.payload.clone())
    }
}

/// Event categories for filtering.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    /// Post lifecycle events
    Post,
    /// Reaction events
    Reaction,
    /// User directory events
    User,
}

impl EventCategory {
    /// Parse from event type string.
    pub fn from_event_type(event_type: &str) -> Option<Self> {
        match event_type.split('.').next()? {
            "post" => Some(EventCategory::Post),
            "reaction" => Some(EventCategory::Reaction),
            "user" => Some(EventCategory::User),
            _ => None,
        }
    }
}

/// A typed event that can be wrapped in the generic [`Event`] envelope.
pub trait DomainEvent {
    /// The topic this event is published under.
    fn event_type(&self) -> &'static str;

    /// Convert to generic event.
    fn to_event(&self) -> Result<Event, serde_json::Error>
    where
        Self: Serialize,
    {
        Ok(Event::new(self.event_type(), serde_json::to_value(self)?))
    }
}

/// Post lifecycle events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PostEvent {
    /// Draft was created
    Created {
        post_id: Uuid,
        kind: PostKind,
        creator: Uuid,
    },
    /// Metadata or payload changed
    Updated { post_id: Uuid, kind: PostKind },
    /// Post became public
    Published { post_id: Uuid, kind: PostKind },
    /// Post went back to draft
    Retracted { post_id: Uuid, kind: PostKind },
    /// Ownership moved to another user
    Transferred {
        post_id: Uuid,
        from: Uuid,
        to: Uuid,
    },
    /// Post was removed
    Deleted { post_id: Uuid },
}

impl DomainEvent for PostEvent {
    fn event_type(&self) -> &'static str {
        match self {
            PostEvent::Created { .. } => "post.created",
            PostEvent::Updated { .. } => "post.updated",
            PostEvent::Published { .. } => "post.published",
            PostEvent::Retracted { .. } => "post.retracted",
            PostEvent::Transferred { .. } => "post.transferred",
            PostEvent::Deleted { .. } => "post.deleted",
        }
    }
}

/// Reaction events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReactionEvent {
    /// Reaction was attached to a post
    Created {
        reaction_id: Uuid,
        post_id: Uuid,
        kind: ReactionKind,
    },
    /// Comment text was edited
    Updated { reaction_id: Uuid, post_id: Uuid },
    /// Reaction was removed
    Deleted {
        reaction_id: Uuid,
        post_id: Uuid,
        moderated: bool,
    },
}

impl DomainEvent for ReactionEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ReactionEvent::Created { .. } => "reaction.created",
            ReactionEvent::Updated { .. } => "reaction.updated",
            ReactionEvent::Deleted { .. } => "reaction.deleted",
        }
    }
}

/// User directory events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UserEvent {
    /// User registered
    Registered { user_id: Uuid, role: Role },
    /// Profile changed
    Updated { user_id: Uuid },
    /// Role changed
    Assigned { user_id: Uuid, from: Role, to: Role },
    /// User was removed
    Deleted { user_id: Uuid },
}

impl DomainEvent for UserEvent {
    fn event_type(&self) -> &'static str {
        match self {
            UserEvent::Registered { .. } => "user.registered",
            UserEvent::Updated { .. } => "user.updated",
            UserEvent::Assigned { .. } => "user.assigned",
            UserEvent::Deleted { .. } => "user.deleted",
        }
    }
}
