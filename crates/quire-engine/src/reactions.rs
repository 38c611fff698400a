//! # Reaction policy
//!
//! Reactions are owned by their author. Only comments carry text, so only
//! comments can be updated; any reaction can be removed by its author or by
//! a role holding `reactionOps`.

use quire_events::ReactionEvent;
use quire_model::{Reaction, ReactionKind};
use quire_rbac::{Authorizer, Permission};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::actor::Actor;
use crate::error::{denied, ContentError, ContentResult, Outcome};
use crate::notify::Notifier;
use crate::store::{PostStore, ReactionFilter, ReactionStore};

const REACTION: &str = "reaction";

/// Reaction operations.
#[derive(Clone)]
pub struct ReactionPolicy {
    reactions: Arc<dyn ReactionStore>,
    posts: Arc<dyn PostStore>,
    authorizer: Arc<Authorizer>,
    notifier: Notifier,
    site: String,
}

impl ReactionPolicy {
    /// Wire the policy to its collaborators. `site` is stamped on every new
    /// reaction.
    pub fn new(
        reactions: Arc<dyn ReactionStore>,
        posts: Arc<dyn PostStore>,
        authorizer: Arc<Authorizer>,
        bus: Arc<dyn quire_events::EventBus>,
        site: impl Into<String>,
    ) -> Self {
        Self {
            reactions,
            posts,
            authorizer,
            notifier: Notifier::new(bus),
            site: site.into(),
        }
    }

    async fn load(&self, id: Uuid) -> ContentResult<Reaction> {
        self.reactions
            .find_reaction(id)
            .await?
            .ok_or_else(|| ContentError::not_found(REACTION, id))
    }

    /// Attach a reaction by the actor to an existing post.
    ///
    /// The author is always the actor. Text is kept only for comments.
    #[instrument(skip(self, actor, text), fields(actor = %actor.user_id))]
    pub async fn create(
        &self,
        actor: &Actor,
        post_id: Uuid,
        kind: ReactionKind,
        text: impl Into<String> + Send,
    ) -> ContentResult<Outcome<Reaction>> {
        self.authorizer
            .require(actor.role, Permission::ReactionOps)
            .map_err(|e| denied(actor, "reaction.create", e))?;
        if self.posts.find_post(post_id).await?.is_none() {
            return Err(ContentError::not_found("post", post_id));
        }

        let reaction = self
            .reactions
            .insert_reaction(Reaction::new(post_id, actor.user_id, &*self.site, kind, text))
            .await?;
        debug!(reaction_id = %reaction.id, %kind, "Reaction created");

        self.notifier
            .emit(
                actor.user_id,
                &ReactionEvent::Created {
                    reaction_id: reaction.id,
                    post_id,
                    kind,
                },
            )
            .await;
        Ok(Outcome::Created(reaction))
    }

    /// Load a reaction.
    #[instrument(skip(self))]
    pub async fn read(&self, id: Uuid) -> ContentResult<Outcome<Reaction>> {
        Ok(Outcome::Found(self.load(id).await?))
    }

    /// Replace the text of the actor's own comment.
    ///
    /// Non-comments are rejected with `MethodNotAllowed` before authorship
    /// is considered.
    #[instrument(skip(self, actor, text), fields(actor = %actor.user_id))]
    pub async fn update(
        &self,
        actor: &Actor,
        id: Uuid,
        text: impl Into<String> + Send,
    ) -> ContentResult<Outcome<Reaction>> {
        let mut reaction = self.load(id).await?;
        if !reaction.kind.carries_text() {
            return Err(ContentError::MethodNotAllowed(format!(
                "{} reactions carry no text",
                reaction.kind
            )));
        }
        if !reaction.is_authored_by(actor.user_id) {
            warn!(
                actor = %actor.user_id,
                reaction_id = %id,
                "Comment edit by non-author"
            );
            return Err(ContentError::Forbidden { permission: None });
        }

        let text = text.into();
        if reaction.text == text {
            return Ok(Outcome::NotModified(reaction));
        }
        reaction.edit_text(text)?;
        if !self.reactions.save_reaction(&reaction).await? {
            return Err(ContentError::not_found(REACTION, id));
        }

        self.notifier
            .emit(
                actor.user_id,
                &ReactionEvent::Updated {
                    reaction_id: id,
                    post_id: reaction.post,
                },
            )
            .await;
        Ok(Outcome::Accepted(reaction))
    }

    /// Remove a reaction. Allowed for the author or a holder of `reactionOps`.
    #[instrument(skip(self, actor), fields(actor = %actor.user_id))]
    pub async fn delete(&self, actor: &Actor, id: Uuid) -> ContentResult<Outcome<()>> {
        let reaction = self.load(id).await?;
        let moderated = !reaction.is_authored_by(actor.user_id);
        if moderated {
            self.authorizer
                .require(actor.role, Permission::ReactionOps)
                .map_err(|e| denied(actor, "reaction.delete", e))?;
        }

        if self.reactions.delete_reaction(id).await? == 0 {
            return Err(ContentError::not_found(REACTION, id));
        }
        info!(reaction_id = %id, moderated, "Reaction deleted");

        self.notifier
            .emit(
                actor.user_id,
                &ReactionEvent::Deleted {
                    reaction_id: id,
                    post_id: reaction.post,
                    moderated,
                },
            )
            .await;
        Ok(Outcome::Accepted(()))
    }

    /// Every reaction on a post within this policy's site.
    pub async fn for_post(&self, post_id: Uuid) -> ContentResult<Vec<Reaction>> {
        Ok(self
            .reactions
            .list_reactions(&ReactionFilter::on_post(post_id).in_site(&*self.site))
            .await?)
    }

    /// Every reaction written by a user within this policy's site.
    pub async fn by_user(&self, user_id: Uuid) -> ContentResult<Vec<Reaction>> {
        Ok(self
            .reactions
            .list_reactions(&ReactionFilter::by_user(user_id).in_site(&*self.site))
            .await?)
    }

    /// Reactions on a post restricted to some kinds. Each matching reaction
    /// appears once.
    pub async fn for_post_by_kinds(
        &self,
        post_id: Uuid,
        kinds: &[ReactionKind],
    ) -> ContentResult<Vec<Reaction>> {
        Ok(self
            .reactions
            .list_reactions(
                &ReactionFilter::on_post(post_id)
                    .of_kinds(kinds)
                    .in_site(&*self.site),
            )
            .await?)
    }
}
