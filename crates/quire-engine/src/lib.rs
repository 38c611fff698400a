//! # Quire Engine
//!
//! Authorization and content-lifecycle services for the Quire publishing
//! backend. The engine sits between an (external) request layer and an
//! (external) persistence layer:
//!
//! ```text
//! request ──(user_id, role)──→ Actor
//!                                │
//!          PostLifecycle / ReactionPolicy / UserDirectory ──→ Authorizer
//!                                │
//!          PostStore / ReactionStore / UserStore
//!                                │
//!                     EventBus (best-effort)
//! ```
//!
//! ## Outcomes
//!
//! Every single-record operation returns `Result<Outcome<T>, ContentError>`:
//!
//! | Result | Status |
//! |--------|--------|
//! | `Outcome::Created` | 201 |
//! | `Outcome::Found` | 200 |
//! | `Outcome::Accepted` | 202 |
//! | `Outcome::NotModified` | 304 |
//! | `ContentError::NotFound` | 404 |
//! | `ContentError::Forbidden` | 403 |
//! | `ContentError::MethodNotAllowed` | 405 |
//! | `ContentError::SoleKeeper` | 304 |
//! | `ContentError::InvalidPayload` | 400 |
//! | `ContentError::Storage` | 500 |
//!
//! ## Usage
//!
//! ```rust,no_run
//! use quire_engine::{Actor, Engine, EngineConfig};
//! use quire_model::{Article, NewPost, PostMeta, UserProfile};
//!
//! async fn example() {
//!     let engine = Engine::in_memory(&EngineConfig::from_env()).unwrap();
//!
//!     // The first registered user is the keeper
//!     let keeper = engine
//!         .users()
//!         .register(UserProfile::new("Ada", "ada@example.com"), "$argon2id$...")
//!         .await
//!         .unwrap()
//!         .into_inner();
//!     let actor = Actor::from(&keeper);
//!
//!     let draft = engine
//!         .posts()
//!         .create(&actor, NewPost::new(PostMeta::titled("Hello"), Article::new("...").into()))
//!         .await
//!         .unwrap()
//!         .into_inner();
//!
//!     let published = engine.posts().publish(&actor, draft.id).await.unwrap();
//!     assert_eq!(published.status_code(), 202);
//! }
//! ```

pub mod actor;
pub mod config;
pub mod engine;
pub mod error;
pub mod lifecycle;
pub mod memory;
pub mod reactions;
pub mod store;
pub mod users;

mod notify;

// Re-export main types
pub use actor::Actor;
pub use config::{ConfigError, EngineConfig};
pub use engine::Engine;
pub use error::{ContentError, ContentResult, Outcome, StoreError, StoreResult};
pub use lifecycle::PostLifecycle;
pub use memory::MemoryStore;
pub use reactions::ReactionPolicy;
pub use store::{PostFilter, PostStore, ReactionFilter, ReactionStore, UserStore};
pub use users::UserDirectory;
