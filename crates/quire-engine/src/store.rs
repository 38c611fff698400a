//! Persistence collaborator interfaces.
//!
//! Each record family has its own store trait. Implementations report
//! absence through `Option`/row counts and reserve [`StoreError`] for real
//! backend failures. Soft-deleted records are invisible to every lookup.
//!
//! [`StoreError`]: crate::error::StoreError

use async_trait::async_trait;
use quire_model::{Post, PostKind, PostMeta, PostPayload, Reaction, ReactionKind, User};
use quire_rbac::Role;
use uuid::Uuid;

use crate::error::StoreResult;

/// Predicate over posts for listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostFilter {
    /// Only this variant
    pub kind: Option<PostKind>,
    /// Only this visibility
    pub released: Option<bool>,
    /// Only this owner
    pub creator: Option<Uuid>,
}

impl PostFilter {
    /// Every live post of a variant.
    pub fn of_kind(kind: PostKind) -> Self {
        Self {
            kind: Some(kind),
            ..Self::default()
        }
    }

    /// Restrict to released posts.
    pub fn released(mut self) -> Self {
        self.released = Some(true);
        self
    }

    /// Restrict to one owner.
    pub fn by_creator(mut self, creator: Uuid) -> Self {
        self.creator = Some(creator);
        self
    }

    /// Check a post against the filter.
    pub fn matches(&self, post: &Post) -> bool {
        !post.is_deleted()
            && self.kind.map_or(true, |kind| post.kind() == kind)
            && self.released.map_or(true, |released| post.released == released)
            && self.creator.map_or(true, |creator| post.creator == creator)
    }
}

/// Predicate over reactions for listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReactionFilter {
    /// Only reactions on this post
    pub post: Option<Uuid>,
    /// Only reactions by this user
    pub user: Option<Uuid>,
    /// Only these kinds; `None` means every kind
    pub kinds: Option<Vec<ReactionKind>>,
    /// Only reactions stamped with this site
    pub site: Option<String>,
}

impl ReactionFilter {
    /// Reactions attached to a post.
    pub fn on_post(post: Uuid) -> Self {
        Self {
            post: Some(post),
            ..Self::default()
        }
    }

    /// Reactions written by a user.
    pub fn by_user(user: Uuid) -> Self {
        Self {
            user: Some(user),
            ..Self::default()
        }
    }

    /// Restrict to a set of kinds.
    pub fn of_kinds(mut self, kinds: &[ReactionKind]) -> Self {
        self.kinds = Some(kinds.to_vec());
        self
    }

    /// Restrict to one site namespace.
    pub fn in_site(mut self, site: impl Into<String>) -> Self {
        self.site = Some(site.into());
        self
    }

    /// Check a reaction against the filter.
    pub fn matches(&self, reaction: &Reaction) -> bool {
        !reaction.is_deleted()
            && self.post.map_or(true, |post| reaction.post == post)
            && self.user.map_or(true, |user| reaction.user == user)
            && self.site.as_ref().map_or(true, |site| reaction.site == *site)
            && self
                .kinds
                .as_ref()
                .map_or(true, |kinds| kinds.contains(&reaction.kind))
    }
}

/// Storage for user records.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Store a new user.
    async fn insert_user(&self, user: User) -> StoreResult<User>;

    /// Load a live user.
    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>>;

    /// Overwrite a live user. Returns `false` if there was nothing to update.
    async fn save_user(&self, user: &User) -> StoreResult<bool>;

    /// Soft-delete a user. Returns the number of rows affected.
    async fn delete_user(&self, id: Uuid) -> StoreResult<u64>;

    /// Number of live users.
    async fn count_users(&self) -> StoreResult<u64>;

    /// Number of live users holding a role.
    async fn count_by_role(&self, role: Role) -> StoreResult<u64>;

    /// Every live user, oldest first.
    async fn list_users(&self) -> StoreResult<Vec<User>>;
}

/// Storage for posts of every variant.
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Store a new post.
    async fn insert_post(&self, post: Post) -> StoreResult<Post>;

    /// Load a live post.
    async fn find_post(&self, id: Uuid) -> StoreResult<Option<Post>>;

    /// Replace metadata and payload of a live post, leaving ownership,
    /// visibility and views alone. Returns the number of rows affected.
    async fn update_content(
        &self,
        id: Uuid,
        meta: &PostMeta,
        payload: &PostPayload,
    ) -> StoreResult<u64>;

    /// Set the visibility flag of a live post. A change of visibility resets
    /// the view counter. Returns the number of rows affected.
    async fn set_released(&self, id: Uuid, released: bool) -> StoreResult<u64>;

    /// Hand a live post to a new owner. Returns the number of rows affected.
    async fn set_creator(&self, id: Uuid, creator: Uuid) -> StoreResult<u64>;

    /// Count one view if the post matches `filter`, and return the post as
    /// stored afterwards. A live post outside the filter is left untouched
    /// and reported as absent.
    async fn record_view(&self, id: Uuid, filter: &PostFilter) -> StoreResult<Option<Post>>;

    /// Soft-delete a post. Returns the number of rows affected.
    async fn delete_post(&self, id: Uuid) -> StoreResult<u64>;

    /// Live posts matching a filter, newest first.
    async fn list_posts(&self, filter: &PostFilter) -> StoreResult<Vec<Post>>;
}

/// Storage for reactions.
#[async_trait]
pub trait ReactionStore: Send + Sync {
    /// Store a new reaction.
    async fn insert_reaction(&self, reaction: Reaction) -> StoreResult<Reaction>;

    /// Load a live reaction.
    async fn find_reaction(&self, id: Uuid) -> StoreResult<Option<Reaction>>;

    /// Overwrite a live reaction. Returns `false` if there was nothing to update.
    async fn save_reaction(&self, reaction: &Reaction) -> StoreResult<bool>;

    /// Soft-delete a reaction. Returns the number of rows affected.
    async fn delete_reaction(&self, id: Uuid) -> StoreResult<u64>;

    /// Live reactions matching a filter, oldest first.
    async fn list_reactions(&self, filter: &ReactionFilter) -> StoreResult<Vec<Reaction>>;
}
