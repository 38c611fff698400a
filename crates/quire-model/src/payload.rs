//! Variant payloads
//!
//! Each post carries exactly one payload. The lifecycle treats all three the
//! same way; only the shape rules below differ per variant.

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};
use crate::post::PostKind;

/// Shape limits applied when a payload is created or replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limits {
    /// Maximum number of tags on a post
    pub max_tags: usize,

    /// Maximum number of media references in a gallery
    pub max_gallery_items: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_tags: 32,
            max_gallery_items: 64,
        }
    }
}

/// Per-variant validation.
pub trait PayloadRules {
    /// The variant this payload belongs to.
    fn kind(&self) -> PostKind;

    /// Check the payload shape against the configured limits.
    fn validate(&self, limits: &Limits) -> ModelResult<()>;
}

/// Prose post body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    /// Prose body (may be empty while drafting)
    #[serde(default)]
    pub body: String,
}

impl Article {
    /// Create an article payload.
    pub fn new(body: impl Into<String>) -> Self {
        Self { body: body.into() }
    }
}

impl PayloadRules for Article {
    fn kind(&self) -> PostKind {
        PostKind::Article
    }

    fn validate(&self, _limits: &Limits) -> ModelResult<()> {
        Ok(())
    }
}

/// Ordered image set with optional per-image captions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gallery {
    /// Media references, in display order
    #[serde(default)]
    pub content: Vec<String>,

    /// Captions aligned with `content`; may be shorter
    #[serde(default)]
    pub caption: Vec<String>,
}

impl Gallery {
    /// Create a gallery payload.
    pub fn new(content: Vec<String>, caption: Vec<String>) -> Self {
        Self { content, caption }
    }
}

impl PayloadRules for Gallery {
    fn kind(&self) -> PostKind {
        PostKind::Gallery
    }

    fn validate(&self, limits: &Limits) -> ModelResult<()> {
        if self.content.len() > limits.max_gallery_items {
            return Err(ModelError::InvalidPayload(format!(
                "gallery holds {} items, limit is {}",
                self.content.len(),
                limits.max_gallery_items
            )));
        }
        if self.caption.len() > self.content.len() {
            return Err(ModelError::InvalidPayload(
                "gallery has more captions than images".to_string(),
            ));
        }
        if self.content.iter().any(|media| media.trim().is_empty()) {
            return Err(ModelError::InvalidPayload(
                "gallery contains a blank media reference".to_string(),
            ));
        }
        Ok(())
    }
}

/// Single short clip.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flicker {
    /// Media reference of the clip
    pub content: String,

    /// Clip caption
    #[serde(default)]
    pub caption: String,
}

impl Flicker {
    /// Create a flicker payload.
    pub fn new(content: impl Into<String>, caption: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            caption: caption.into(),
        }
    }
}

impl PayloadRules for Flicker {
    fn kind(&self) -> PostKind {
        PostKind::Flicker
    }

    fn validate(&self, _limits: &Limits) -> ModelResult<()> {
        if self.content.trim().is_empty() {
            return Err(ModelError::InvalidPayload(
                "flicker needs a media reference".to_string(),
            ));
        }
        Ok(())
    }
}

/// One of the three payload variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PostPayload {
    /// Prose
    Article(Article),
    /// Image set
    Gallery(Gallery),
    /// Clip
    Flicker(Flicker),
}

impl PostPayload {
    fn rules(&self) -> &dyn PayloadRules {
        match self {
            PostPayload::Article(a) => a,
            PostPayload::Gallery(g) => g,
            PostPayload::Flicker(f) => f,
        }
    }
}

impl PayloadRules for PostPayload {
    fn kind(&self) -> PostKind {
        self.rules().kind()
    }

    fn validate(&self, limits: &Limits) -> ModelResult<()> {
        self.rules().validate(limits)
    }
}

impl From<Article> for PostPayload {
    fn from(value: Article) -> Self {
        PostPayload::Article(value)
    }
}

impl From<Gallery> for PostPayload {
    fn from(value: Gallery) -> Self {
        PostPayload::Gallery(value)
    }
}

impl From<Flicker> for PostPayload {
    fn from(value: Flicker) -> Self {
        PostPayload::Flicker(value)
    }
}
