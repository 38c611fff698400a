//! # User directory
//!
//! Registration, profile edits, role assignment and removal. The directory
//! guards the sole-keeper invariant: at least one live user must hold the
//! keeper role.
//!
//! The guard counts keepers immediately before the write. Two concurrent
//! demotions of the last two keepers can both pass the count; the store
//! offers no transaction to close that window.

use quire_events::UserEvent;
use quire_model::{ProfileUpdate, User, UserProfile};
use quire_rbac::{Authorizer, Permission, Role};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::actor::Actor;
use crate::error::{denied, ContentError, ContentResult, Outcome};
use crate::notify::Notifier;
use crate::store::UserStore;

const USER: &str = "user";

/// User operations.
#[derive(Clone)]
pub struct UserDirectory {
    users: Arc<dyn UserStore>,
    authorizer: Arc<Authorizer>,
    notifier: Notifier,
}

impl UserDirectory {
    /// Wire the directory to its collaborators.
    pub fn new(
        users: Arc<dyn UserStore>,
        authorizer: Arc<Authorizer>,
        bus: Arc<dyn quire_events::EventBus>,
    ) -> Self {
        Self {
            users,
            authorizer,
            notifier: Notifier::new(bus),
        }
    }

    async fn load(&self, id: Uuid) -> ContentResult<User> {
        self.users
            .find_user(id)
            .await?
            .ok_or_else(|| ContentError::not_found(USER, id))
    }

    /// Self-service or `userOps`.
    fn require_self_or_admin(
        &self,
        actor: &Actor,
        target: Uuid,
        operation: &'static str,
    ) -> ContentResult<()> {
        if actor.is(target) {
            return Ok(());
        }
        self.authorizer
            .require(actor.role, Permission::UserOps)
            .map_err(|e| denied(actor, operation, e))
    }

    /// Fail with [`ContentError::SoleKeeper`] if `user` is the last keeper.
    async fn guard_sole_keeper(&self, user: &User) -> ContentResult<()> {
        if user.is_keeper() && self.users.count_by_role(Role::Keeper).await? <= 1 {
            warn!(user_id = %user.id, "Refusing to remove the sole keeper");
            return Err(ContentError::SoleKeeper);
        }
        Ok(())
    }

    /// Register a new user.
    ///
    /// The very first user becomes keeper; everyone after starts as reader.
    #[instrument(skip(self, profile, credential_hash))]
    pub async fn register(
        &self,
        profile: UserProfile,
        credential_hash: impl Into<String> + Send,
    ) -> ContentResult<Outcome<User>> {
        let role = if self.users.count_users().await? == 0 {
            Role::Keeper
        } else {
            Role::Reader
        };

        let user = self
            .users
            .insert_user(User::new(profile, credential_hash, role))
            .await?;
        info!(user_id = %user.id, %role, "User registered");

        self.notifier
            .emit(
                user.id,
                &UserEvent::Registered {
                    user_id: user.id,
                    role,
                },
            )
            .await;
        Ok(Outcome::Created(user))
    }

    /// Load a user.
    #[instrument(skip(self))]
    pub async fn read(&self, id: Uuid) -> ContentResult<Outcome<User>> {
        Ok(Outcome::Found(self.load(id).await?))
    }

    /// Every live user.
    pub async fn list(&self) -> ContentResult<Vec<User>> {
        Ok(self.users.list_users().await?)
    }

    /// Edit profile fields. Allowed for the user themself or `userOps`.
    #[instrument(skip(self, actor, update), fields(actor = %actor.user_id))]
    pub async fn update_profile(
        &self,
        actor: &Actor,
        id: Uuid,
        update: ProfileUpdate,
    ) -> ContentResult<Outcome<User>> {
        self.require_self_or_admin(actor, id, "user.update")?;
        let mut user = self.load(id).await?;

        user.apply(update);
        if !self.users.save_user(&user).await? {
            return Err(ContentError::not_found(USER, id));
        }
        debug!(user_id = %id, "Profile updated");

        self.notifier
            .emit(actor.user_id, &UserEvent::Updated { user_id: id })
            .await;
        Ok(Outcome::Accepted(user))
    }

    /// Change a user's role. Requires `userOps`.
    #[instrument(skip(self, actor), fields(actor = %actor.user_id))]
    pub async fn assign_role(
        &self,
        actor: &Actor,
        id: Uuid,
        role: Role,
    ) -> ContentResult<Outcome<User>> {
        self.authorizer
            .require(actor.role, Permission::UserOps)
            .map_err(|e| denied(actor, "user.assign", e))?;
        let mut user = self.load(id).await?;

        if user.role == role {
            debug!("Role unchanged");
            return Ok(Outcome::NotModified(user));
        }
        if !role.is_keeper() {
            self.guard_sole_keeper(&user).await?;
        }

        let from = user.role;
        user.assign(role);
        if !self.users.save_user(&user).await? {
            return Err(ContentError::not_found(USER, id));
        }
        info!(user_id = %id, %from, to = %role, "Role assigned");

        self.notifier
            .emit(
                actor.user_id,
                &UserEvent::Assigned {
                    user_id: id,
                    from,
                    to: role,
                },
            )
            .await;
        Ok(Outcome::Accepted(user))
    }

    /// Soft-delete a user. Allowed for the user themself or `userOps`.
    #[instrument(skip(self, actor), fields(actor = %actor.user_id))]
    pub async fn delete(&self, actor: &Actor, id: Uuid) -> ContentResult<Outcome<()>> {
        self.require_self_or_admin(actor, id, "user.delete")?;
        let user = self.load(id).await?;
        self.guard_sole_keeper(&user).await?;

        if self.users.delete_user(id).await? == 0 {
            return Err(ContentError::not_found(USER, id));
        }
        info!(user_id = %id, "User deleted");

        self.notifier
            .emit(actor.user_id, &UserEvent::Deleted { user_id: id })
            .await;
        Ok(Outcome::Accepted(()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use quire_events::MemoryEventBus;

    fn directory() -> UserDirectory {
        UserDirectory::new(
            Arc::new(MemoryStore::new()),
            Arc::new(Authorizer::standard()),
            Arc::new(MemoryEventBus::new()),
        )
    }

    async fn register(dir: &UserDirectory, name: &str) -> User {
        dir.register(UserProfile::new(name, format!("{name}@example.com")), "hash")
            .await
            .unwrap()
            .into_inner()
    }

    #[tokio::test]
    async fn test_first_user_is_keeper() {
        let dir = directory();
        let first = register(&dir, "ada").await;
        let second = register(&dir, "bob").await;

        assert_eq!(first.role, Role::Keeper);
        assert_eq!(second.role, Role::Reader);
        assert_eq!(dir.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_sole_keeper_cannot_delete_self() {
        let dir = directory();
        let keeper = register(&dir, "ada").await;
        let actor = Actor::from(&keeper);

        let err = dir.delete(&actor, keeper.id).await.unwrap_err();
        assert_eq!(err, ContentError::SoleKeeper);
        assert_eq!(err.status_code(), 304);
        assert!(dir.read(keeper.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_sole_keeper_cannot_be_demoted() {
        let dir = directory();
        let keeper = register(&dir, "ada").await;
        let actor = Actor::from(&keeper);

        let err = dir
            .assign_role(&actor, keeper.id, Role::Editor)
            .await
            .unwrap_err();
        assert_eq!(err, ContentError::SoleKeeper);

        let kept = dir.read(keeper.id).await.unwrap().into_inner();
        assert_eq!(kept.role, Role::Keeper);
    }

    #[tokio::test]
    async fn test_demotion_allowed_with_second_keeper() {
        let dir = directory();
        let keeper = register(&dir, "ada").await;
        let other = register(&dir, "bob").await;
        let actor = Actor::from(&keeper);

        let promoted = dir.assign_role(&actor, other.id, Role::Keeper).await.unwrap();
        assert!(promoted.is_modified());
        let again = dir.assign_role(&actor, other.id, Role::Keeper).await.unwrap();
        assert_eq!(again.status_code(), 304);

        let demoted = dir
            .assign_role(&actor, keeper.id, Role::Reader)
            .await
            .unwrap()
            .into_inner();
        assert_eq!(demoted.role, Role::Reader);
    }

    #[tokio::test]
    async fn test_assign_requires_user_ops() {
        let dir = directory();
        let _keeper = register(&dir, "ada").await;
        let reader = register(&dir, "bob").await;

        let err = dir
            .assign_role(&Actor::from(&reader), reader.id, Role::Keeper)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ContentError::Forbidden {
                permission: Some(Permission::UserOps)
            }
        );
    }

    #[tokio::test]
    async fn test_profile_update_self_or_admin() {
        let dir = directory();
        let keeper = register(&dir, "ada").await;
        let bob = register(&dir, "bob").await;
        let carol = register(&dir, "carol").await;
        let bio = ProfileUpdate {
            bio: Some("hello".into()),
            ..ProfileUpdate::default()
        };

        assert!(dir
            .update_profile(&Actor::from(&carol), bob.id, bio.clone())
            .await
            .is_err());
        let own = dir
            .update_profile(&Actor::from(&bob), bob.id, bio.clone())
            .await
            .unwrap();
        assert_eq!(own.value().profile.bio, "hello");
        assert!(dir
            .update_profile(&Actor::from(&keeper), carol.id, bio)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_delete_other_requires_user_ops() {
        let dir = directory();
        let keeper = register(&dir, "ada").await;
        let bob = register(&dir, "bob").await;
        let carol = register(&dir, "carol").await;

        let err = dir.delete(&Actor::from(&bob), carol.id).await.unwrap_err();
        assert_eq!(
            err,
            ContentError::Forbidden {
                permission: Some(Permission::UserOps)
            }
        );
        assert!(dir.read(carol.id).await.is_ok());

        dir.delete(&Actor::from(&keeper), carol.id).await.unwrap();
        assert!(dir.read(carol.id).await.is_err());
    }

    #[tokio::test]
    async fn test_reader_deletes_self() {
        let dir = directory();
        let _keeper = register(&dir, "ada").await;
        let bob = register(&dir, "bob").await;

        dir.delete(&Actor::from(&bob), bob.id).await.unwrap();
        assert!(matches!(
            dir.read(bob.id).await,
            Err(ContentError::NotFound { entity: "user", .. })
        ));
    }
}
