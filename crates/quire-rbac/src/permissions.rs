//! # Permissions
//!
//! The fixed permission buckets and their assignment to role tiers.
//! Permissions are not registered at runtime; the table is built once.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::roles::Role;

/// A named capability bucket.
///
/// Each bucket covers a category of operations:
/// - **DraftOps**: create, edit and delete unreleased posts
/// - **PostOps**: publish, retract, edit and delete released posts
/// - **UserOps**: delete users and assign roles
/// - **ReactionOps**: delete another user's reaction
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum Permission {
    /// Draft operations.
    DraftOps,
    /// Released-post operations.
    PostOps,
    /// User administration.
    UserOps,
    /// Reaction moderation.
    ReactionOps,
}

impl Permission {
    /// Get the string representation of the permission.
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::DraftOps => "draftOps",
            Permission::PostOps => "postOps",
            Permission::UserOps => "userOps",
            Permission::ReactionOps => "reactionOps",
        }
    }

    /// Parse a permission from its name.
    ///
    /// Accepts both the camelCase and snake_case spelling.
    ///
    /// # Example
    ///
    /// ```
    /// use quire_rbac::Permission;
    ///
    /// assert_eq!(Permission::parse("postOps"), Some(Permission::PostOps));
    /// assert_eq!(Permission::parse("post_ops"), Some(Permission::PostOps));
    /// assert_eq!(Permission::parse("everything"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('_', "").as_str() {
            "draftops" => Some(Permission::DraftOps),
            "postops" => Some(Permission::PostOps),
            "userops" => Some(Permission::UserOps),
            "reactionops" => Some(Permission::ReactionOps),
            _ => None,
        }
    }

    /// Get all permissions.
    pub fn all() -> [Permission; 4] {
        [
            Permission::DraftOps,
            Permission::PostOps,
            Permission::UserOps,
            Permission::ReactionOps,
        ]
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A set of permissions held by one role tier.
///
/// # Example
///
/// ```
/// use quire_rbac::{Permission, PermissionSet};
///
/// let mut set = PermissionSet::new();
/// set.add(Permission::PostOps);
/// set.add(Permission::UserOps);
///
/// assert!(set.has(Permission::PostOps));
/// assert!(!set.has(Permission::DraftOps));
/// assert_eq!(set.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionSet {
    permissions: HashSet<Permission>,
}

impl PermissionSet {
    /// Create a new empty permission set.
    pub fn new() -> Self {
        Self {
            permissions: HashSet::new(),
        }
    }

    /// Add a permission to the set.
    pub fn add(&mut self, permission: Permission) {
        self.permissions.insert(permission);
    }

    /// Check if the set contains a permission.
    pub fn has(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }

    /// Merge another permission set into this one.
    pub fn merge(&mut self, other: &PermissionSet) {
        self.permissions.extend(other.permissions.iter().copied());
    }

    /// Iterate over the permissions in the set.
    pub fn iter(&self) -> impl Iterator<Item = Permission> + '_ {
        self.permissions.iter().copied()
    }

    /// Get the count of permissions.
    pub fn len(&self) -> usize {
        self.permissions.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.permissions.is_empty()
    }

    /// Check if this set contains all permissions from another set.
    pub fn contains_all(&self, other: &PermissionSet) -> bool {
        other.iter().all(|perm| self.has(perm))
    }
}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<T: IntoIterator<Item = Permission>>(iter: T) -> Self {
        Self {
            permissions: iter.into_iter().collect(),
        }
    }
}

/// Static assignment of permission sets to role tiers.
///
/// The table is immutable once built. Share it behind an `Arc` (or inside an
/// [`Authorizer`](crate::Authorizer)) instead of rebuilding it per request.
#[derive(Debug, Clone)]
pub struct PermissionTable {
    tiers: HashMap<Role, PermissionSet>,
}

impl PermissionTable {
    /// The standard Quire assignment.
    ///
    /// - reader → reactionOps
    /// - editor → draftOps
    /// - keeper → postOps, userOps
    pub fn standard() -> Self {
        let mut tiers = HashMap::new();
        tiers.insert(Role::Reader, PermissionSet::from_iter([Permission::ReactionOps]));
        tiers.insert(Role::Editor, PermissionSet::from_iter([Permission::DraftOps]));
        tiers.insert(
            Role::Keeper,
            PermissionSet::from_iter([Permission::PostOps, Permission::UserOps]),
        );
        Self { tiers }
    }

    /// Permissions assigned directly to a tier, without inheritance.
    pub fn assigned(&self, role: Role) -> Option<&PermissionSet> {
        self.tiers.get(&role)
    }

    /// The tier a permission is assigned to.
    pub fn owner_of(&self, permission: Permission) -> Option<Role> {
        Role::all()
            .into_iter()
            .find(|role| self.assigned(*role).is_some_and(|set| set.has(permission)))
    }

    /// Everything a role holds, inherited tiers included.
    pub fn effective(&self, role: Role) -> PermissionSet {
        let mut effective = PermissionSet::new();
        for tier in role.lineage() {
            if let Some(set) = self.assigned(tier) {
                effective.merge(set);
            }
        }
        effective
    }

    /// Check whether `role` or any role it inherits from holds `permission`.
    pub fn grants(&self, role: Role, permission: Permission) -> bool {
        role.lineage()
            .any(|tier| self.assigned(tier).is_some_and(|set| set.has(permission)))
    }
}

impl Default for PermissionTable {
    fn default() -> Self {
        Self::standard()
    }
}
