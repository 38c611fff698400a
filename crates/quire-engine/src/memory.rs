//! In-memory persistence.
//!
//! One [`MemoryStore`] implements all three store traits so a single
//! instance can back every service. Suitable for tests and single-process
//! deployments; nothing survives a restart.

use async_trait::async_trait;
use quire_model::{Post, PostMeta, PostPayload, Reaction, User};
use quire_rbac::Role;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::store::{PostFilter, PostStore, ReactionFilter, ReactionStore, UserStore};

/// Store backed by `HashMap`s behind async read/write locks.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<Uuid, User>>,
    posts: RwLock<HashMap<Uuid, Post>>,
    reactions: RwLock<HashMap<Uuid, Reaction>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `write` on a live post under the write lock. Returns rows affected.
    async fn with_live_post<F>(&self, id: Uuid, write: F) -> u64
    where
        F: FnOnce(&mut Post),
    {
        let mut posts = self.posts.write().await;
        match posts.get_mut(&id) {
            Some(post) if !post.is_deleted() => {
                write(post);
                1
            }
            _ => 0,
        }
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, user: User) -> StoreResult<User> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.id) {
            return Err(StoreError::Duplicate {
                entity: "user",
                id: user.id,
            });
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&id).filter(|u| !u.is_deleted()).cloned())
    }

    async fn save_user(&self, user: &User) -> StoreResult<bool> {
        let mut users = self.users.write().await;
        match users.get_mut(&user.id) {
            Some(stored) if !stored.is_deleted() => {
                *stored = user.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_user(&self, id: Uuid) -> StoreResult<u64> {
        let mut users = self.users.write().await;
        match users.get_mut(&id) {
            Some(user) if !user.is_deleted() => {
                user.mark_deleted();
                Ok(1)
            }
            _ => Ok(0),
        }
    }

    async fn count_users(&self) -> StoreResult<u64> {
        let users = self.users.read().await;
        Ok(users.values().filter(|u| !u.is_deleted()).count() as u64)
    }

    async fn count_by_role(&self, role: Role) -> StoreResult<u64> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .filter(|u| !u.is_deleted() && u.role == role)
            .count() as u64)
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let users = self.users.read().await;
        let mut live: Vec<User> = users.values().filter(|u| !u.is_deleted()).cloned().collect();
        live.sort_by_key(|u| (u.created_at, u.id));
        Ok(live)
    }
}

#[async_trait]
impl PostStore for MemoryStore {
    async fn insert_post(&self, post: Post) -> StoreResult<Post> {
        let mut posts = self.posts.write().await;
        if posts.contains_key(&post.id) {
            return Err(StoreError::Duplicate {
                entity: "post",
                id: post.id,
            });
        }
        posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn find_post(&self, id: Uuid) -> StoreResult<Option<Post>> {
        let posts = self.posts.read().await;
        Ok(posts.get(&id).filter(|p| !p.is_deleted()).cloned())
    }

    async fn update_content(
        &self,
        id: Uuid,
        meta: &PostMeta,
        payload: &PostPayload,
    ) -> StoreResult<u64> {
        Ok(self
            .with_live_post(id, |post| {
                post.replace_content(meta.clone(), payload.clone())
            })
            .await)
    }

    async fn set_released(&self, id: Uuid, released: bool) -> StoreResult<u64> {
        Ok(self
            .with_live_post(id, |post| {
                if released {
                    post.publish();
                } else {
                    post.retract();
                }
            })
            .await)
    }

    async fn set_creator(&self, id: Uuid, creator: Uuid) -> StoreResult<u64> {
        Ok(self
            .with_live_post(id, |post| {
                post.transfer(creator);
            })
            .await)
    }

    async fn record_view(&self, id: Uuid, filter: &PostFilter) -> StoreResult<Option<Post>> {
        let mut posts = self.posts.write().await;
        match posts.get_mut(&id) {
            Some(post) if filter.matches(post) => {
                post.record_view();
                Ok(Some(post.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn delete_post(&self, id: Uuid) -> StoreResult<u64> {
        let mut posts = self.posts.write().await;
        match posts.get_mut(&id) {
            Some(post) if !post.is_deleted() => {
                post.mark_deleted();
                Ok(1)
            }
            _ => Ok(0),
        }
    }

    async fn list_posts(&self, filter: &PostFilter) -> StoreResult<Vec<Post>> {
        let posts = self.posts.read().await;
        let mut matched: Vec<Post> = posts
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        matched.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(matched)
    }
}

#[async_trait]
impl ReactionStore for MemoryStore {
    async fn insert_reaction(&self, reaction: Reaction) -> StoreResult<Reaction> {
        let mut reactions = self.reactions.write().await;
        if reactions.contains_key(&reaction.id) {
            return Err(StoreError::Duplicate {
                entity: "reaction",
                id: reaction.id,
            });
        }
        reactions.insert(reaction.id, reaction.clone());
        Ok(reaction)
    }

    async fn find_reaction(&self, id: Uuid) -> StoreResult<Option<Reaction>> {
        let reactions = self.reactions.read().await;
        Ok(reactions.get(&id).filter(|r| !r.is_deleted()).cloned())
    }

    async fn save_reaction(&self, reaction: &Reaction) -> StoreResult<bool> {
        let mut reactions = self.reactions.write().await;
        match reactions.get_mut(&reaction.id) {
            Some(stored) if !stored.is_deleted() => {
                *stored = reaction.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_reaction(&self, id: Uuid) -> StoreResult<u64> {
        let mut reactions = self.reactions.write().await;
        match reactions.get_mut(&id) {
            Some(reaction) if !reaction.is_deleted() => {
                reaction.mark_deleted();
                Ok(1)
            }
            _ => Ok(0),
        }
    }

    async fn list_reactions(&self, filter: &ReactionFilter) -> StoreResult<Vec<Reaction>> {
        let reactions = self.reactions.read().await;
        let mut matched: Vec<Reaction> = reactions
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        matched.sort_by_key(|r| (r.created_at, r.id));
        Ok(matched)
    }
}
