//! User domain model
//!
//! The identity record consumed by authorization and ownership checks.
//! Credentials arrive already hashed and are never serialized outward.

use chrono::{DateTime, Utc};
use quire_rbac::Role;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Mutable profile fields supplied at registration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Display name
    #[serde(default)]
    pub name: String,

    /// Contact address
    #[serde(default)]
    pub mail: String,

    /// Short biography
    #[serde(default)]
    pub bio: String,
}

impl UserProfile {
    /// Profile with a name and address.
    pub fn new(name: impl Into<String>, mail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mail: mail.into(),
            bio: String::new(),
        }
    }
}

/// Partial profile update. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    /// New display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// New contact address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mail: Option<String>,

    /// New biography
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,

    /// New credential hash, already computed by the credential layer
    #[serde(default, skip_serializing)]
    pub credential_hash: Option<String>,
}

/// A registered user.
///
/// # Examples
///
/// ```
/// use quire_model::{User, UserProfile};
/// use quire_rbac::Role;
///
/// let user = User::new(UserProfile::new("Ada", "ada@example.com"), "$hash", Role::Reader);
/// let json = serde_json::to_value(&user).unwrap();
/// assert!(json.get("credential_hash").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier for the user
    pub id: Uuid,

    /// Profile fields
    #[serde(flatten)]
    pub profile: UserProfile,

    /// Role in the hierarchy
    pub role: Role,

    /// Opaque credential hash
    #[serde(default, skip_serializing)]
    pub credential_hash: String,

    /// When the user registered
    pub created_at: DateTime<Utc>,

    /// When the user was last updated
    pub updated_at: DateTime<Utc>,

    /// Soft-delete marker
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl User {
    /// Creates a new user record.
    pub fn new(profile: UserProfile, credential_hash: impl Into<String>, role: Role) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            profile,
            role,
            credential_hash: credential_hash.into(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Check if the user holds the keeper role.
    pub fn is_keeper(&self) -> bool {
        self.role.is_keeper()
    }

    /// Apply a profile update. The role is never touched here.
    pub fn apply(&mut self, update: ProfileUpdate) {
        if let Some(name) = update.name {
            self.profile.name = name;
        }
        if let Some(mail) = update.mail {
            self.profile.mail = mail;
        }
        if let Some(bio) = update.bio {
            self.profile.bio = bio;
        }
        if let Some(hash) = update.credential_hash {
            self.credential_hash = hash;
        }
        self.updated_at = Utc::now();
    }

    /// Change the user's role.
    pub fn assign(&mut self, role: Role) {
        self.role = role;
        self.updated_at = Utc::now();
    }

    /// Check whether the user has been soft-deleted.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Soft-delete the user.
    pub fn mark_deleted(&mut self) {
        let now = Utc::now();
        self.deleted_at = Some(now);
        self.updated_at = now;
    }
}
