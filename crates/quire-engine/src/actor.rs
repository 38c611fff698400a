//! The authenticated caller of an operation.
//!
//! Token verification happens before the engine is reached; services only
//! ever see the resulting `(user_id, role)` pair.

use quire_model::User;
use quire_rbac::Role;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity of the user performing an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Authenticated user ID
    pub user_id: Uuid,
    /// Role carried by the credential
    pub role: Role,
}

impl Actor {
    /// Create an actor from an authenticated pair.
    pub fn new(user_id: Uuid, role: Role) -> Self {
        Self { user_id, role }
    }

    /// Check whether the actor is the given user.
    pub fn is(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }
}

impl From<&User> for Actor {
    fn from(user: &User) -> Self {
        Self::new(user.id, user.role)
    }
}
