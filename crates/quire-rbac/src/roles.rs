//! Role hierarchy
//!
//! Quire has three roles in a strict linear order. Each role inherits every
//! permission of the roles below it.

use serde::{Deserialize, Serialize};

/// User role within Quire.
///
/// The hierarchy is: Reader < Editor < Keeper
///
/// # Permission Model
///
/// - **Reader**: Can react to posts and moderate reactions
/// - **Editor**: Can create and manage drafts
/// - **Keeper**: Can publish, retract and manage users
///
/// # Examples
///
/// ```
/// use quire_rbac::Role;
///
/// assert!(Role::Keeper.implies(Role::Editor));
/// assert!(Role::Editor.implies(Role::Editor));
/// assert!(!Role::Reader.implies(Role::Editor));
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Can react to content
    Reader = 0,

    /// Can author drafts
    Editor = 1,

    /// Full control over content and users
    Keeper = 2,
}

impl Role {
    /// Check whether this role is `other` or strictly senior to it.
    ///
    /// This is the inheritance relation of the hierarchy: a keeper implies
    /// editor and reader, an editor implies reader.
    pub fn implies(&self, other: Role) -> bool {
        *self >= other
    }

    /// Roles this role inherits from, itself included, most senior first.
    pub fn lineage(&self) -> impl Iterator<Item = Role> + '_ {
        Self::all().into_iter().rev().filter(move |r| self.implies(*r))
    }

    /// Check if this role is the top of the hierarchy.
    pub fn is_keeper(&self) -> bool {
        *self == Role::Keeper
    }

    /// Parse role from string representation.
    ///
    /// # Arguments
    ///
    /// * `s` - String to parse (case-insensitive)
    ///
    /// # Returns
    ///
    /// `Some(Role)` if valid, `None` otherwise
    ///
    /// # Examples
    ///
    /// ```
    /// use quire_rbac::Role;
    ///
    /// assert_eq!(Role::parse("keeper"), Some(Role::Keeper));
    /// assert_eq!(Role::parse("EDITOR"), Some(Role::Editor));
    /// assert_eq!(Role::parse("admin"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "reader" => Some(Self::Reader),
            "editor" => Some(Self::Editor),
            "keeper" => Some(Self::Keeper),
            _ => None,
        }
    }

    /// Get string representation of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reader => "reader",
            Self::Editor => "editor",
            Self::Keeper => "keeper",
        }
    }

    /// Get a human-readable display name for the role.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Reader => "Reader",
            Self::Editor => "Editor",
            Self::Keeper => "Keeper",
        }
    }

    /// All roles, most junior first.
    pub fn all() -> [Role; 3] {
        [Role::Reader, Role::Editor, Role::Keeper]
    }
}

impl Default for Role {
    fn default() -> Self {
        Self::Reader
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_hierarchy() {
        assert!(Role::Keeper > Role::Editor);
        assert!(Role::Editor > Role::Reader);
    }

    #[test]
    fn test_implies_is_reflexive_and_transitive() {
        for role in Role::all() {
            assert!(role.implies(role));
        }
        assert!(Role::Keeper.implies(Role::Reader));
        assert!(!Role::Reader.implies(Role::Keeper));
        assert!(!Role::Editor.implies(Role::Keeper));
    }

    #[test]
    fn test_lineage() {
        let lineage: Vec<Role> = Role::Editor.lineage().collect();
        assert_eq!(lineage, vec![Role::Editor, Role::Reader]);

        let lineage: Vec<Role> = Role::Reader.lineage().collect();
        assert_eq!(lineage, vec![Role::Reader]);
    }

    #[test]
    fn test_role_parse() {
        assert_eq!(Role::parse("reader"), Some(Role::Reader));
        assert_eq!(Role::parse(" Keeper "), Some(Role::Keeper));
        assert_eq!(Role::parse(""), None);
        assert_eq!(Role::parse("owner"), None);
    }

    #[test]
    fn test_role_serde() {
        let json = serde_json::to_string(&Role::Keeper).unwrap();
        assert_eq!(json, "\"keeper\"");
        let role: Role = serde_json::from_str("\"editor\"").unwrap();
        assert_eq!(role, Role::Editor);
    }

    #[test]
    fn test_default_role() {
        assert_eq!(Role::default(), Role::Reader);
    }
}
