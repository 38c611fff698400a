//! Engine configuration.
//!
//! Loaded from environment variables with defaults suitable for a single
//! blog deployment.

use quire_model::Limits;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid configuration value.
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue {
        /// Configuration key.
        key: String,
        /// Error message.
        message: String,
    },
}

/// Settings shared by every engine service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Namespace stamped on every reaction.
    pub reaction_site: String,

    /// Maximum number of tags on a post.
    pub max_tags: usize,

    /// Maximum number of media references in a gallery.
    pub max_gallery_items: usize,

    /// Capacity of each event bus channel.
    pub event_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let limits = Limits::default();
        Self {
            reaction_site: "blog".to_string(),
            max_tags: limits.max_tags,
            max_gallery_items: limits.max_gallery_items,
            event_capacity: 1024,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `QUIRE_REACTION_SITE`: reaction namespace (default: blog)
    /// - `QUIRE_MAX_TAGS`: tag limit per post (default: 32)
    /// - `QUIRE_MAX_GALLERY_ITEMS`: media limit per gallery (default: 64)
    /// - `QUIRE_EVENT_CAPACITY`: event channel capacity (default: 1024)
    ///
    /// Unparseable numbers fall back to the default; call
    /// [`validate`](Self::validate) before use.
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            reaction_site: std::env::var("QUIRE_REACTION_SITE").unwrap_or(default.reaction_site),
            max_tags: std::env::var("QUIRE_MAX_TAGS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(default.max_tags),
            max_gallery_items: std::env::var("QUIRE_MAX_GALLERY_ITEMS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(default.max_gallery_items),
            event_capacity: std::env::var("QUIRE_EVENT_CAPACITY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(default.event_capacity),
        }
    }

    /// Set the reaction namespace.
    pub fn with_reaction_site(mut self, site: impl Into<String>) -> Self {
        self.reaction_site = site.into();
        self
    }

    /// Set the payload limits.
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.max_tags = limits.max_tags;
        self.max_gallery_items = limits.max_gallery_items;
        self
    }

    /// Payload limits for validation.
    pub fn limits(&self) -> Limits {
        Limits {
            max_tags: self.max_tags,
            max_gallery_items: self.max_gallery_items,
        }
    }

    /// Reject values the services cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reaction_site.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "QUIRE_REACTION_SITE".to_string(),
                message: "must not be blank".to_string(),
            });
        }
        for (key, value) in [
            ("QUIRE_MAX_TAGS", self.max_tags),
            ("QUIRE_MAX_GALLERY_ITEMS", self.max_gallery_items),
            ("QUIRE_EVENT_CAPACITY", self.event_capacity),
        ] {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: "must be greater than zero".to_string(),
                });
            }
        }
        Ok(())
    }
}
