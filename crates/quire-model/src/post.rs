//! Post domain model
//!
//! A post is a shared base record (ownership, metadata, visibility, view
//! counter) plus one variant payload. The publish/retract/transfer
//! transitions live here so they are implemented exactly once for every
//! variant.

use chrono::{DateTime, Utc};
use quire_rbac::Governed;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ModelError, ModelResult};
use crate::payload::{Limits, PayloadRules, PostPayload};

/// Content variant of a post.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PostKind {
    /// Prose post
    Article,
    /// Image set
    Gallery,
    /// Short clip
    Flicker,
}

impl PostKind {
    /// Get string representation of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            PostKind::Article => "article",
            PostKind::Gallery => "gallery",
            PostKind::Flicker => "flicker",
        }
    }

    /// Parse kind from string representation (singular or plural).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "article" | "articles" => Some(PostKind::Article),
            "gallery" | "galleries" => Some(PostKind::Gallery),
            "flicker" | "flickers" => Some(PostKind::Flicker),
            _ => None,
        }
    }

    /// All post kinds.
    pub fn all() -> [PostKind; 3] {
        [PostKind::Article, PostKind::Gallery, PostKind::Flicker]
    }
}

impl std::fmt::Display for PostKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The record changed and must be persisted
    Changed,
    /// The record was already in the requested state
    Unchanged,
}

impl Transition {
    /// Whether the record changed.
    pub fn is_changed(&self) -> bool {
        matches!(self, Transition::Changed)
    }
}

/// Textual metadata shared by every variant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostMeta {
    /// Headline
    #[serde(default)]
    pub subject: String,

    /// Short teaser
    #[serde(default)]
    pub summary: String,

    /// Cover image reference
    #[serde(default)]
    pub overlay: String,

    /// Site section the post is filed under
    #[serde(default)]
    pub section: String,

    /// Tags for categorization and filtering
    #[serde(default)]
    pub tags: Vec<String>,
}

impl PostMeta {
    /// Metadata with only a subject set.
    pub fn titled(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            ..Self::default()
        }
    }

    /// Set the summary.
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    /// Set the section.
    pub fn with_section(mut self, section: impl Into<String>) -> Self {
        self.section = section.into();
        self
    }

    /// Set the tags.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Trim tags, drop blanks and duplicates (first occurrence wins), then
    /// check the tag limit.
    pub fn normalize(&mut self, limits: &Limits) -> ModelResult<()> {
        self.tags = normalize_tags(std::mem::take(&mut self.tags));
        if self.tags.len() > limits.max_tags {
            return Err(ModelError::InvalidPayload(format!(
                "{} tags given, limit is {}",
                self.tags.len(),
                limits.max_tags
            )));
        }
        Ok(())
    }
}

fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    tags.into_iter()
        .map(|tag| tag.trim().to_string())
        .filter(|tag| !tag.is_empty() && seen.insert(tag.clone()))
        .collect()
}

/// Input for creating a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPost {
    /// Metadata
    #[serde(flatten)]
    pub meta: PostMeta,

    /// Variant payload
    pub payload: PostPayload,
}

impl NewPost {
    /// Create the input for a new post.
    pub fn new(meta: PostMeta, payload: PostPayload) -> Self {
        Self { meta, payload }
    }

    /// Normalize metadata and validate the payload.
    pub fn validate(&mut self, limits: &Limits) -> ModelResult<()> {
        self.meta.normalize(limits)?;
        self.payload.validate(limits)
    }
}

/// Partial update of a post's mutable fields.
///
/// `None` leaves the stored value untouched. Ownership and visibility are
/// not part of an update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostUpdate {
    /// New headline
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,

    /// New teaser
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    /// New cover image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overlay: Option<String>,

    /// New section
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,

    /// Replacement tag set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,

    /// Replacement payload; must be the same variant as the post
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<PostPayload>,
}

impl PostUpdate {
    /// Check whether the update changes nothing.
    pub fn is_empty(&self) -> bool {
        self.subject.is_none()
            && self.summary.is_none()
            && self.overlay.is_none()
            && self.section.is_none()
            && self.tags.is_none()
            && self.payload.is_none()
    }
}

/// A post of any variant.
///
/// # Examples
///
/// ```
/// use quire_model::{Gallery, NewPost, Post, PostKind, PostMeta};
/// use uuid::Uuid;
///
/// let post = Post::draft(
///     NewPost::new(PostMeta::titled("Shore"), Gallery::new(vec!["a.jpg".into()], vec![]).into()),
///     Uuid::now_v7(),
/// );
/// assert_eq!(post.kind(), PostKind::Gallery);
/// assert_eq!(post.summons, 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Unique identifier for the post
    pub id: Uuid,

    /// Current owner
    pub creator: Uuid,

    /// Textual metadata
    #[serde(flatten)]
    pub meta: PostMeta,

    /// Views counted since the last publish or retract
    pub summons: u64,

    /// Visibility flag; `false` means draft
    pub released: bool,

    /// Variant payload
    pub payload: PostPayload,

    /// When the post was created
    pub created_at: DateTime<Utc>,

    /// When the post was last updated
    pub updated_at: DateTime<Utc>,

    /// Soft-delete marker
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Post {
    /// Construct a new unreleased post owned by `creator`.
    pub fn draft(new: NewPost, creator: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            creator,
            meta: new.meta,
            summons: 0,
            released: false,
            payload: new.payload,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Variant of this post.
    pub fn kind(&self) -> PostKind {
        self.payload.kind()
    }

    /// Check whether the post has been soft-deleted.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Make the post public. Resets the view counter.
    pub fn publish(&mut self) -> Transition {
        self.set_released(true)
    }

    /// Make the post a draft again. Resets the view counter.
    pub fn retract(&mut self) -> Transition {
        self.set_released(false)
    }

    fn set_released(&mut self, released: bool) -> Transition {
        if self.released == released {
            return Transition::Unchanged;
        }
        self.released = released;
        self.summons = 0;
        self.touch();
        Transition::Changed
    }

    /// Hand ownership to another user. Visibility and views are untouched.
    pub fn transfer(&mut self, new_creator: Uuid) -> Transition {
        if self.creator == new_creator {
            return Transition::Unchanged;
        }
        self.creator = new_creator;
        self.touch();
        Transition::Changed
    }

    /// Count one view.
    pub fn record_view(&mut self) {
        self.summons = self.summons.saturating_add(1);
    }

    /// Apply a partial update after validating it as a whole.
    ///
    /// Nothing is written to `self` unless every field passes validation.
    pub fn apply(&mut self, update: PostUpdate, limits: &Limits) -> ModelResult<()> {
        let mut meta = self.meta.clone();
        if let Some(subject) = update.subject {
            meta.subject = subject;
        }
        if let Some(summary) = update.summary {
            meta.summary = summary;
        }
        if let Some(overlay) = update.overlay {
            meta.overlay = overlay;
        }
        if let Some(section) = update.section {
            meta.section = section;
        }
        if let Some(tags) = update.tags {
            meta.tags = tags;
        }
        meta.normalize(limits)?;

        let payload = match update.payload {
            Some(payload) => {
                if payload.kind() != self.kind() {
                    return Err(ModelError::KindMismatch {
                        expected: self.kind(),
                        found: payload.kind(),
                    });
                }
                payload.validate(limits)?;
                payload
            }
            None => self.payload.clone(),
        };

        self.replace_content(meta, payload);
        Ok(())
    }

    /// Swap metadata and payload without validation.
    ///
    /// Used by stores writing content that [`Post::apply`] already checked.
    /// Ownership, visibility and views are untouched.
    pub fn replace_content(&mut self, meta: PostMeta, payload: PostPayload) {
        self.meta = meta;
        self.payload = payload;
        self.touch();
    }

    /// Soft-delete the post.
    pub fn mark_deleted(&mut self) {
        let now = Utc::now();
        self.deleted_at = Some(now);
        self.updated_at = now;
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Governed for Post {
    fn creator(&self) -> Uuid {
        self.creator
    }

    fn is_released(&self) -> bool {
        self.released
    }
}
