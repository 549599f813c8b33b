//! Batch resolution for the children of one directory.
//!
//! Listing a directory asks the same question for every child, and every
//! child shares the parent's ancestor chain. That chain is walked once into a
//! [`PrecomputedSuffix`]; each child then only sorts its own rules.

use rayon::prelude::*;
use tracing::debug;

use super::config::AclConfig;
use super::walk::PrecomputedSuffix;
use super::{get_perms_with, has_perm_with};
use crate::types::{FileNode, PermissionKind, Subject};

fn check_parent<N: FileNode + ?Sized>(parent: &N, children: &[&N]) {
    debug_assert!(
        children
            .iter()
            .all(|child| child.parent().is_some_and(|p| std::ptr::eq(p, parent))),
        "every child must be a direct child of `parent`"
    );
}

/// Effective permissions for each child of `parent`, in input order.
///
/// Every entry of `children` must have `parent` as its direct parent.
pub fn resolve_children<U, N>(
    user: &U,
    parent: &N,
    children: &[&N],
    config: &AclConfig,
) -> Vec<&'static [PermissionKind]>
where
    U: Subject + Sync + ?Sized,
    N: FileNode + Sync + ?Sized,
{
    check_parent(parent, children);
    let suffix = PrecomputedSuffix::for_parent(parent);

    let resolved: Vec<_> = if children.len() > config.parallel_threshold {
        children
            .par_iter()
            .map(|child| get_perms_with(user, *child, &suffix))
            .collect()
    } else {
        children
            .iter()
            .map(|child| get_perms_with(user, *child, &suffix))
            .collect()
    };

    debug!(
        children = children.len(),
        inherited = suffix.inherited().len(),
        "resolved children"
    );
    resolved
}

/// Children of `parent` that `user` may view, in input order.
pub fn filter_viewable<'c, U, N>(
    user: &U,
    parent: &N,
    children: &[&'c N],
    config: &AclConfig,
) -> Vec<&'c N>
where
    U: Subject + Sync + ?Sized,
    N: FileNode + Sync + ?Sized,
{
    check_parent(parent, children);
    let suffix = PrecomputedSuffix::for_parent(parent);
    let viewable = |child: &&'c N| has_perm_with(user, *child, PermissionKind::View, &suffix);

    let visible: Vec<&'c N> = if children.len() > config.parallel_threshold {
        children.par_iter().copied().filter(viewable).collect()
    } else {
        children.iter().copied().filter(viewable).collect()
    };

    debug!(
        children = children.len(),
        visible = visible.len(),
        "filtered children"
    );
    visible
}
