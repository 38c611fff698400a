//! # Quire RBAC (Role-Based Access Control)
//!
//! This crate holds the authorization core shared by every content type in
//! Quire: the role hierarchy, the fixed permission buckets, and the decision
//! procedure that turns an actor and a resource into allow/deny.
//!
//! ## Overview
//!
//! - **Roles**: `reader < editor < keeper`, a strict linear order
//! - **Permissions**: `draftOps`, `postOps`, `userOps`, `reactionOps`
//! - **Permission Table**: each permission owned by exactly one role tier
//! - **Authorizer**: pure, shareable decision functions
//!
//! ## Architecture
//!
//! ```text
//! keeper ── postOps, userOps
//!   │
//! editor ── draftOps
//!   │
//! reader ── reactionOps
//! ```
//!
//! A role holds its own permissions plus those of every role beneath it.
//!
//! ## Usage
//!
//! ```
//! use quire_rbac::{Authorizer, Permission, Role};
//!
//! let authorizer = Authorizer::standard();
//!
//! assert!(authorizer.is_granted(Role::Keeper, Permission::DraftOps));
//! assert!(!authorizer.is_granted(Role::Reader, Permission::DraftOps));
//! assert!(!authorizer.is_granted_named("moderator", Permission::ReactionOps));
//! ```
//!
//! ## Ownership and Visibility
//!
//! Content mutations are decided by [`Authorizer::can_act_on_post`]:
//! creators always act on their own content, everyone else needs `draftOps`
//! while the resource is unreleased and `postOps` once it is released.

pub mod authorizer;
pub mod permissions;
pub mod roles;

// Re-export main types for convenience
pub use authorizer::{AccessDenied, Authorizer, Governed};
pub use permissions::{Permission, PermissionSet, PermissionTable};
pub use roles::Role;
