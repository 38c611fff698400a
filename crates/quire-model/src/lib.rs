//! # Quire Content Model
//!
//! Records handled by the Quire engine and the pure state transitions on
//! them. Nothing in this crate performs I/O: storage and authorization are
//! layered on top by `quire-engine`.
//!
//! ## Overview
//!
//! - **Users**: identity, role and profile; credentials are opaque
//! - **Posts**: a shared base record with one of three payload variants
//! - **Reactions**: approvals, stickers and comments attached to a post
//!
//! ## Architecture
//!
//! ```text
//! User ── creator ──→ Post { meta, payload: Article | Gallery | Flicker }
//!   │                   ▲
//!   └── author ──→ Reaction ── post
//! ```
//!
//! ## Post lifecycle
//!
//! ```text
//! Draft ──publish──→ Published ──retract──→ Draft
//!   └──────────── delete ───────────┴──→ Deleted
//! ```
//!
//! `summons` (views) resets to zero on every publish or retract.
//!
//! ## Usage
//!
//! ```
//! use quire_model::{Article, NewPost, Post, PostMeta, Transition};
//! use uuid::Uuid;
//!
//! let creator = Uuid::now_v7();
//! let mut post = Post::draft(
//!     NewPost::new(PostMeta::titled("Hello"), Article::new("First words").into()),
//!     creator,
//! );
//!
//! assert!(!post.released);
//! assert_eq!(post.publish(), Transition::Changed);
//! assert_eq!(post.publish(), Transition::Unchanged);
//! ```

pub mod error;
pub mod payload;
pub mod post;
pub mod reaction;
pub mod user;

// Re-export main types for convenience
pub use error::{ModelError, ModelResult};
pub use payload::{Article, Flicker, Gallery, Limits, PayloadRules, PostPayload};
pub use post::{NewPost, Post, PostKind, PostMeta, PostUpdate, Transition};
pub use reaction::{Reaction, ReactionKind};
pub use user::{ProfileUpdate, User, UserProfile};
