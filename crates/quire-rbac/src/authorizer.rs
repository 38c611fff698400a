//! # Authorizer
//!
//! Pure decision functions over the permission table. Nothing here performs
//! I/O or logs; callers translate a denial into their own outcome.

use thiserror::Error;
use uuid::Uuid;

use crate::permissions::{Permission, PermissionTable};
use crate::roles::Role;

/// A resource carrying ownership and visibility.
///
/// Every post variant implements this, which is all the decision procedure
/// needs to know about content.
pub trait Governed {
    /// The user currently owning the resource.
    fn creator(&self) -> Uuid;

    /// Whether the resource is released (published).
    fn is_released(&self) -> bool;
}

/// Denial with the permission that was missing.
///
/// # Example
///
/// ```
/// use quire_rbac::{AccessDenied, Permission, Role};
///
/// let err = AccessDenied { role: Some(Role::Reader), required: Permission::DraftOps };
/// assert!(err.to_string().contains("draftOps"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("access denied: {} lacks {required}", .role.map(|r| r.as_str()).unwrap_or("unknown role"))]
pub struct AccessDenied {
    /// The role that was checked, `None` when the role name was not recognised.
    pub role: Option<Role>,
    /// The permission that would have allowed the operation.
    pub required: Permission,
}

/// Decision procedure over an immutable [`PermissionTable`].
///
/// Cheap to clone and safe to share between tasks.
///
/// # Example
///
/// ```
/// use quire_rbac::{Authorizer, Governed, Permission, Role};
/// use uuid::Uuid;
///
/// struct Draft { owner: Uuid }
///
/// impl Governed for Draft {
///     fn creator(&self) -> Uuid { self.owner }
///     fn is_released(&self) -> bool { false }
/// }
///
/// let authorizer = Authorizer::standard();
/// let draft = Draft { owner: Uuid::now_v7() };
///
/// assert!(authorizer.can_act_on_post(draft.owner, Role::Reader, &draft));
/// assert!(authorizer.can_act_on_post(Uuid::now_v7(), Role::Editor, &draft));
/// assert!(!authorizer.can_act_on_post(Uuid::now_v7(), Role::Reader, &draft));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Authorizer {
    table: PermissionTable,
}

impl Authorizer {
    /// Build an authorizer over a permission table.
    pub fn new(table: PermissionTable) -> Self {
        Self { table }
    }

    /// Authorizer over the standard Quire table.
    pub fn standard() -> Self {
        Self::new(PermissionTable::standard())
    }

    /// The underlying table.
    pub fn table(&self) -> &PermissionTable {
        &self.table
    }

    /// Check whether a role (or any role it inherits from) holds a permission.
    pub fn is_granted(&self, role: Role, permission: Permission) -> bool {
        self.table.grants(role, permission)
    }

    /// Same as [`is_granted`](Self::is_granted) for a role given by name.
    ///
    /// Unknown role names hold no permissions.
    pub fn is_granted_named(&self, role: &str, permission: Permission) -> bool {
        Role::parse(role).is_some_and(|role| self.is_granted(role, permission))
    }

    /// Like [`is_granted`](Self::is_granted) but reports what was missing.
    pub fn require(&self, role: Role, permission: Permission) -> Result<(), AccessDenied> {
        if self.is_granted(role, permission) {
            Ok(())
        } else {
            Err(AccessDenied {
                role: Some(role),
                required: permission,
            })
        }
    }

    /// The permission a non-owner needs to mutate a resource in its current
    /// visibility state.
    pub fn required_for<R: Governed + ?Sized>(&self, resource: &R) -> Permission {
        if resource.is_released() {
            Permission::PostOps
        } else {
            Permission::DraftOps
        }
    }

    /// Decide whether an actor may mutate a post.
    ///
    /// - the creator always may, regardless of role
    /// - otherwise an unreleased post needs `draftOps`
    /// - otherwise a released post needs `postOps`
    ///
    /// The content variant never matters.
    pub fn can_act_on_post<R: Governed + ?Sized>(
        &self,
        actor_id: Uuid,
        actor_role: Role,
        post: &R,
    ) -> bool {
        self.check_post(actor_id, actor_role, post).is_ok()
    }

    /// [`can_act_on_post`](Self::can_act_on_post) with the missing permission
    /// on denial.
    pub fn check_post<R: Governed + ?Sized>(
        &self,
        actor_id: Uuid,
        actor_role: Role,
        post: &R,
    ) -> Result<(), AccessDenied> {
        if actor_id == post.creator() {
            return Ok(());
        }
        self.require(actor_role, self.required_for(post))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        creator: Uuid,
        released: bool,
    }

    impl Governed for Fixture {
        fn creator(&self) -> Uuid {
            self.creator
        }

        fn is_released(&self) -> bool {
            self.released
        }
    }

    fn post(released: bool) -> Fixture {
        Fixture {
            creator: Uuid::now_v7(),
            released,
        }
    }

    #[test]
    fn test_is_granted_table() {
        let auth = Authorizer::standard();

        assert!(auth.is_granted(Role::Reader, Permission::ReactionOps));
        assert!(!auth.is_granted(Role::Reader, Permission::DraftOps));
        assert!(!auth.is_granted(Role::Reader, Permission::PostOps));
        assert!(!auth.is_granted(Role::Reader, Permission::UserOps));

        assert!(auth.is_granted(Role::Editor, Permission::ReactionOps));
        assert!(auth.is_granted(Role::Editor, Permission::DraftOps));
        assert!(!auth.is_granted(Role::Editor, Permission::PostOps));
        assert!(!auth.is_granted(Role::Editor, Permission::UserOps));

        for permission in Permission::all() {
            assert!(auth.is_granted(Role::Keeper, permission));
        }
    }

    #[test]
    fn test_unknown_role_fails_closed() {
        let auth = Authorizer::standard();
        for permission in Permission::all() {
            assert!(!auth.is_granted_named("admin", permission));
            assert!(!auth.is_granted_named("", permission));
        }
        assert!(auth.is_granted_named("Keeper", Permission::UserOps));
    }

    #[test]
    fn test_creator_always_allowed() {
        let auth = Authorizer::standard();
        for released in [false, true] {
            let p = post(released);
            for role in Role::all() {
                assert!(auth.can_act_on_post(p.creator, role, &p));
            }
        }
    }

    #[test]
    fn test_non_creator_on_draft() {
        let auth = Authorizer::standard();
        let p = post(false);
        let other = Uuid::now_v7();

        assert!(!auth.can_act_on_post(other, Role::Reader, &p));
        assert!(auth.can_act_on_post(other, Role::Editor, &p));
        assert!(auth.can_act_on_post(other, Role::Keeper, &p));
    }

    #[test]
    fn test_non_creator_on_released() {
        let auth = Authorizer::standard();
        let p = post(true);
        let other = Uuid::now_v7();

        assert!(!auth.can_act_on_post(other, Role::Reader, &p));
        assert!(!auth.can_act_on_post(other, Role::Editor, &p));
        assert!(auth.can_act_on_post(other, Role::Keeper, &p));
    }

    #[test]
    fn test_check_post_reports_missing_permission() {
        let auth = Authorizer::standard();
        let other = Uuid::now_v7();

        let err = auth.check_post(other, Role::Reader, &post(false)).unwrap_err();
        assert_eq!(err.required, Permission::DraftOps);

        let err = auth.check_post(other, Role::Editor, &post(true)).unwrap_err();
        assert_eq!(err.required, Permission::PostOps);
        assert_eq!(err.role, Some(Role::Editor));
    }

    #[test]
    fn test_require() {
        let auth = Authorizer::standard();
        assert!(auth.require(Role::Keeper, Permission::PostOps).is_ok());
        let err = auth.require(Role::Editor, Permission::UserOps).unwrap_err();
        assert!(err.to_string().contains("editor"));
        assert!(err.to_string().contains("userOps"));
    }
}
