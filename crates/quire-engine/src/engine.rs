//! Service bundle wired from one configuration.

use quire_events::{EventBus, MemoryEventBus};
use quire_rbac::Authorizer;
use std::sync::Arc;
use tracing::info;

use crate::config::{ConfigError, EngineConfig};
use crate::lifecycle::PostLifecycle;
use crate::memory::MemoryStore;
use crate::reactions::ReactionPolicy;
use crate::store::{PostStore, ReactionStore, UserStore};
use crate::users::UserDirectory;

/// The three engine services sharing one authorizer and one event bus.
#[derive(Clone)]
pub struct Engine {
    posts: PostLifecycle,
    reactions: ReactionPolicy,
    users: UserDirectory,
    bus: Arc<dyn EventBus>,
}

impl Engine {
    /// Build the services over the given collaborators.
    pub fn new(
        config: &EngineConfig,
        users: Arc<dyn UserStore>,
        posts: Arc<dyn PostStore>,
        reactions: Arc<dyn ReactionStore>,
        bus: Arc<dyn EventBus>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let authorizer = Arc::new(Authorizer::standard());

        Ok(Self {
            posts: PostLifecycle::new(
                posts.clone(),
                users.clone(),
                authorizer.clone(),
                bus.clone(),
                config.limits(),
            ),
            reactions: ReactionPolicy::new(
                reactions,
                posts,
                authorizer.clone(),
                bus.clone(),
                config.reaction_site.clone(),
            ),
            users: UserDirectory::new(users, authorizer, bus.clone()),
            bus,
        })
    }

    /// Build the services over a fresh [`MemoryStore`] and [`MemoryEventBus`].
    pub fn in_memory(config: &EngineConfig) -> Result<Self, ConfigError> {
        let store = Arc::new(MemoryStore::new());
        let bus = Arc::new(MemoryEventBus::with_capacity(config.event_capacity));
        let engine = Self::new(config, store.clone(), store.clone(), store, bus)?;
        info!(site = %config.reaction_site, "In-memory engine ready");
        Ok(engine)
    }

    /// Post lifecycle service.
    pub fn posts(&self) -> &PostLifecycle {
        &self.posts
    }

    /// Reaction service.
    pub fn reactions(&self) -> &ReactionPolicy {
        &self.reactions
    }

    /// User directory service.
    pub fn users(&self) -> &UserDirectory {
        &self.users
    }

    /// Bus the services publish on.
    pub fn bus(&self) -> &Arc<dyn EventBus> {
        &self.bus
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_invalid_config() {
        let config = EngineConfig {
            event_capacity: 0,
            ..EngineConfig::default()
        };
        assert!(Engine::in_memory(&config).is_err());
    }

    #[tokio::test]
    async fn test_services_share_store() {
        let engine = Engine::in_memory(&EngineConfig::default()).unwrap();
        let keeper = engine
            .users()
            .register(quire_model::UserProfile::new("ada", "ada@example.com"), "h")
            .await
            .unwrap()
            .into_inner();

        let actor = crate::Actor::from(&keeper);
        let post = engine
            .posts()
            .create(
                &actor,
                quire_model::NewPost::new(
                    quire_model::PostMeta::titled("hello"),
                    quire_model::Article::new("").into(),
                ),
            )
            .await
            .unwrap()
            .into_inner();

        // Transfer resolves the new owner through the user store
        let outcome = engine.posts().transfer(&actor, post.id, keeper.id).await.unwrap();
        assert_eq!(outcome.status_code(), 304);
    }
}
