//! # Post lifecycle
//!
//! Create, read, update, publish, retract, transfer and delete for every
//! post variant. The variant never influences a decision here: ownership and
//! the `released` flag are the only inputs to authorization, and payload
//! shape checks are delegated to the payload itself.
//!
//! Every mutation reads a fresh record, decides, then issues exactly one
//! write scoped to the fields it changes. Concurrent writers are
//! last-writer-wins per field: an update never reverts a transfer or a
//! publish committed after its read.

use quire_events::PostEvent;
use quire_model::{Limits, NewPost, Post, PostKind, PostUpdate};
use quire_rbac::{Authorizer, Permission};
use std::sync::Arc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::actor::Actor;
use crate::error::{denied, ContentError, ContentResult, Outcome};
use crate::notify::Notifier;
use crate::store::{PostFilter, PostStore, UserStore};

const POST: &str = "post";

/// Post operations for authenticated and public callers.
#[derive(Clone)]
pub struct PostLifecycle {
    posts: Arc<dyn PostStore>,
    users: Arc<dyn UserStore>,
    authorizer: Arc<Authorizer>,
    notifier: Notifier,
    limits: Limits,
}

impl PostLifecycle {
    /// Wire the lifecycle to its collaborators.
    pub fn new(
        posts: Arc<dyn PostStore>,
        users: Arc<dyn UserStore>,
        authorizer: Arc<Authorizer>,
        bus: Arc<dyn quire_events::EventBus>,
        limits: Limits,
    ) -> Self {
        Self {
            posts,
            users,
            authorizer,
            notifier: Notifier::new(bus),
            limits,
        }
    }

    async fn load(&self, id: Uuid) -> ContentResult<Post> {
        self.posts
            .find_post(id)
            .await?
            .ok_or_else(|| ContentError::not_found(POST, id))
    }

    /// Create a draft owned by the actor. Requires `draftOps`.
    #[instrument(skip(self, actor, new), fields(actor = %actor.user_id))]
    pub async fn create(&self, actor: &Actor, mut new: NewPost) -> ContentResult<Outcome<Post>> {
        self.authorizer
            .require(actor.role, Permission::DraftOps)
            .map_err(|e| denied(actor, "post.create", e))?;
        new.validate(&self.limits)?;

        let post = self.posts.insert_post(Post::draft(new, actor.user_id)).await?;
        info!(post_id = %post.id, kind = %post.kind(), "Draft created");

        self.notifier
            .emit(
                actor.user_id,
                &PostEvent::Created {
                    post_id: post.id,
                    kind: post.kind(),
                    creator: post.creator,
                },
            )
            .await;
        Ok(Outcome::Created(post))
    }

    async fn serve(&self, id: Uuid, filter: &PostFilter) -> ContentResult<Outcome<Post>> {
        let post = self
            .posts
            .record_view(id, filter)
            .await?
            .ok_or_else(|| ContentError::not_found(POST, id))?;
        debug!(summons = post.summons, "Post served");
        Ok(Outcome::Found(post))
    }

    /// Serve a post to an authenticated caller, counting the view.
    #[instrument(skip(self))]
    pub async fn read(&self, id: Uuid) -> ContentResult<Outcome<Post>> {
        self.serve(id, &PostFilter::default()).await
    }

    /// Serve a released post to an anonymous caller.
    ///
    /// Drafts are reported as missing and their view counter is left alone.
    /// The visibility check and the view count are a single store call.
    #[instrument(skip(self))]
    pub async fn read_public(&self, id: Uuid) -> ContentResult<Outcome<Post>> {
        self.serve(id, &PostFilter::default().released()).await
    }

    /// Apply a partial update.
    ///
    /// The creator may always update; anyone else needs `draftOps` for a
    /// draft and `postOps` for a released post. Ownership and visibility are
    /// never changed here.
    #[instrument(skip(self, actor, update), fields(actor = %actor.user_id))]
    pub async fn update(
        &self,
        actor: &Actor,
        id: Uuid,
        update: PostUpdate,
    ) -> ContentResult<Outcome<Post>> {
        let mut post = self.load(id).await?;
        self.authorizer
            .check_post(actor.user_id, actor.role, &post)
            .map_err(|e| denied(actor, "post.update", e))?;

        if update.is_empty() {
            debug!("Empty update");
            return Ok(Outcome::NotModified(post));
        }

        post.apply(update, &self.limits)?;
        if self
            .posts
            .update_content(id, &post.meta, &post.payload)
            .await?
            == 0
        {
            return Err(ContentError::not_found(POST, id));
        }
        let refreshed = self.load(id).await?;
        debug!(post_id = %id, "Post updated");

        self.notifier
            .emit(
                actor.user_id,
                &PostEvent::Updated {
                    post_id: id,
                    kind: refreshed.kind(),
                },
            )
            .await;
        Ok(Outcome::Accepted(refreshed))
    }

    /// Make a post public. Requires `postOps`; a released post is left as is.
    #[instrument(skip(self, actor), fields(actor = %actor.user_id))]
    pub async fn publish(&self, actor: &Actor, id: Uuid) -> ContentResult<Outcome<Post>> {
        self.set_released(actor, id, true).await
    }

    /// Return a post to draft. Requires `postOps`; a draft is left as is.
    #[instrument(skip(self, actor), fields(actor = %actor.user_id))]
    pub async fn retract(&self, actor: &Actor, id: Uuid) -> ContentResult<Outcome<Post>> {
        self.set_released(actor, id, false).await
    }

    async fn set_released(
        &self,
        actor: &Actor,
        id: Uuid,
        released: bool,
    ) -> ContentResult<Outcome<Post>> {
        let operation = if released { "post.publish" } else { "post.retract" };
        self.authorizer
            .require(actor.role, Permission::PostOps)
            .map_err(|e| denied(actor, operation, e))?;

        let post = self.load(id).await?;
        if post.released == released {
            debug!(released, "Visibility unchanged");
            return Ok(Outcome::NotModified(post));
        }

        if self.posts.set_released(id, released).await? == 0 {
            return Err(ContentError::not_found(POST, id));
        }
        let post = self.load(id).await?;
        info!(post_id = %id, released, "Visibility changed");

        let event = if released {
            PostEvent::Published {
                post_id: id,
                kind: post.kind(),
            }
        } else {
            PostEvent::Retracted {
                post_id: id,
                kind: post.kind(),
            }
        };
        self.notifier.emit(actor.user_id, &event).await;
        Ok(Outcome::Accepted(post))
    }

    /// Hand a post to another user.
    ///
    /// Transferring to the current owner is a no-op. Otherwise the actor
    /// needs the same rights as for an update, and the new owner must be a
    /// registered user.
    #[instrument(skip(self, actor), fields(actor = %actor.user_id))]
    pub async fn transfer(
        &self,
        actor: &Actor,
        id: Uuid,
        new_creator: Uuid,
    ) -> ContentResult<Outcome<Post>> {
        let post = self.load(id).await?;
        if post.creator == new_creator {
            debug!("Transfer to current owner");
            return Ok(Outcome::NotModified(post));
        }

        self.authorizer
            .check_post(actor.user_id, actor.role, &post)
            .map_err(|e| denied(actor, "post.transfer", e))?;
        if self.users.find_user(new_creator).await?.is_none() {
            return Err(ContentError::not_found("user", new_creator));
        }

        let from = post.creator;
        if self.posts.set_creator(id, new_creator).await? == 0 {
            return Err(ContentError::not_found(POST, id));
        }
        let post = self.load(id).await?;
        info!(post_id = %id, %from, to = %new_creator, "Post transferred");

        self.notifier
            .emit(
                actor.user_id,
                &PostEvent::Transferred {
                    post_id: id,
                    from,
                    to: new_creator,
                },
            )
            .await;
        Ok(Outcome::Accepted(post))
    }

    /// Soft-delete a post under the same rules as an update.
    #[instrument(skip(self, actor), fields(actor = %actor.user_id))]
    pub async fn delete(&self, actor: &Actor, id: Uuid) -> ContentResult<Outcome<()>> {
        let post = self.load(id).await?;
        self.authorizer
            .check_post(actor.user_id, actor.role, &post)
            .map_err(|e| denied(actor, "post.delete", e))?;

        if self.posts.delete_post(id).await? == 0 {
            return Err(ContentError::not_found(POST, id));
        }
        info!(post_id = %id, kind = %post.kind(), "Post deleted");

        self.notifier
            .emit(actor.user_id, &PostEvent::Deleted { post_id: id })
            .await;
        Ok(Outcome::Accepted(()))
    }

    /// Every live post of a variant, drafts included.
    pub async fn list(&self, kind: PostKind) -> ContentResult<Vec<Post>> {
        Ok(self.posts.list_posts(&PostFilter::of_kind(kind)).await?)
    }

    /// Released posts of a variant.
    pub async fn list_public(&self, kind: PostKind) -> ContentResult<Vec<Post>> {
        Ok(self
            .posts
            .list_posts(&PostFilter::of_kind(kind).released())
            .await?)
    }

    /// Released posts of a variant owned by one user.
    pub async fn list_public_by_creator(
        &self,
        kind: PostKind,
        creator: Uuid,
    ) -> ContentResult<Vec<Post>> {
        Ok(self
            .posts
            .list_posts(&PostFilter::of_kind(kind).released().by_creator(creator))
            .await?)
    }
}
