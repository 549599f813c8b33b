//! `nexus_acl` — hierarchical allow/deny permission resolver for Nexus.
//!
//! Given a subject (user) and a node in a file tree, the resolver walks from
//! the node up through its ancestors and applies each node's allow/deny rules
//! in priority order to compute the effective access level.
//!
//! The crate is pure computation: rule persistence, authentication and group
//! storage live elsewhere and are consumed through the [`types::Subject`] and
//! [`types::FileNode`] traits.
//!
//! Modules:
//! - `types` — domain types (PermissionKind, Rule, Scope, Subject, FileNode)
//! - `acl`   — scope evaluation, rule enumeration and propagation
//! - `error` — errors raised while loading rules or configuration

pub mod acl;
pub mod error;
pub mod types;

pub use acl::{
    explain_perm, get_perms, get_perms_with, has_perm, has_perm_with, is_in_scope, iter_perms,
    optimized_get_perms, Decision,
};
pub use error::{AclError, Result};
pub use types::{
    Effect, FileNode, FileObject, PermissionKind, PermissionType, Rule, Scope, Subject, User,
};
