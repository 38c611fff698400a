//! Reaction domain model
//!
//! A reaction is one user's response to a post. Only comments carry text,
//! and that text is the only mutable field of a reaction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ModelError, ModelResult};

/// Kind of reaction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ReactionKind {
    /// Approval ("like")
    Approve,
    /// Sticker
    Sticker,
    /// Free-text comment
    Comment,
}

impl ReactionKind {
    /// Whether reactions of this kind carry text.
    pub fn carries_text(&self) -> bool {
        matches!(self, ReactionKind::Comment)
    }

    /// Get string representation of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReactionKind::Approve => "approve",
            ReactionKind::Sticker => "sticker",
            ReactionKind::Comment => "comment",
        }
    }

    /// Parse kind from string representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "approve" | "approval" | "like" => Some(ReactionKind::Approve),
            "sticker" => Some(ReactionKind::Sticker),
            "comment" => Some(ReactionKind::Comment),
            _ => None,
        }
    }

    /// All reaction kinds.
    pub fn all() -> [ReactionKind; 3] {
        [ReactionKind::Approve, ReactionKind::Sticker, ReactionKind::Comment]
    }
}

impl std::fmt::Display for ReactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user's reaction to a post.
///
/// # Examples
///
/// ```
/// use quire_model::{Reaction, ReactionKind};
/// use uuid::Uuid;
///
/// let (post, user) = (Uuid::now_v7(), Uuid::now_v7());
/// let sticker = Reaction::new(post, user, "blog", ReactionKind::Sticker, "ignored");
/// assert!(sticker.text.is_empty());
///
/// let comment = Reaction::new(post, user, "blog", ReactionKind::Comment, "nice");
/// assert_eq!(comment.text, "nice");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reaction {
    /// Unique identifier for the reaction
    pub id: Uuid,

    /// Author of the reaction
    pub user: Uuid,

    /// Post the reaction is attached to
    pub post: Uuid,

    /// Namespace the reaction belongs to (e.g. "blog")
    pub site: String,

    /// Kind of reaction
    pub kind: ReactionKind,

    /// Comment text; always empty for other kinds
    #[serde(default)]
    pub text: String,

    /// When the reaction was created
    pub created_at: DateTime<Utc>,

    /// When the reaction was last updated
    pub updated_at: DateTime<Utc>,

    /// Soft-delete marker
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Reaction {
    /// Creates a new reaction.
    ///
    /// Text is discarded unless the kind is [`ReactionKind::Comment`].
    pub fn new(
        post: Uuid,
        user: Uuid,
        site: impl Into<String>,
        kind: ReactionKind,
        text: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        let text = if kind.carries_text() {
            text.into()
        } else {
            String::new()
        };
        Self {
            id: Uuid::now_v7(),
            user,
            post,
            site: site.into(),
            kind,
            text,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Check whether the reaction was written by `user_id`.
    pub fn is_authored_by(&self, user_id: Uuid) -> bool {
        self.user == user_id
    }

    /// Replace the text of a comment.
    ///
    /// Fails for every other kind; the reaction is left untouched.
    pub fn edit_text(&mut self, text: impl Into<String>) -> ModelResult<()> {
        if !self.kind.carries_text() {
            return Err(ModelError::TextNotEditable(self.kind));
        }
        self.text = text.into();
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Check whether the reaction has been soft-deleted.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Soft-delete the reaction.
    pub fn mark_deleted(&mut self) {
        let now = Utc::now();
        self.deleted_at = Some(now);
        self.updated_at = now;
    }
}
