//! Rule enumeration — the ordered, lazy rule stream the propagation engine consumes.
//!
//! Two strategies implement [`RuleSource`]:
//! - [`AncestorWalk`] sorts each node's rules and walks `parent` links to the root.
//! - [`PrecomputedSuffix`] sorts only the target node's rules and appends an
//!   already-resolved ancestor stream, so siblings sharing a parent don't
//!   re-walk the same chain.

use std::cmp::Reverse;

use crate::types::{FileNode, Rule};

/// Produces the priority-ordered rule stream for a node.
pub trait RuleSource<N: FileNode + ?Sized> {
    fn rules<'a>(&'a self, node: &'a N) -> Box<dyn Iterator<Item = &'a Rule> + 'a>;
}

/// A node's own rules, highest key first. Equal keys keep their source order.
pub fn sorted_rules<N: FileNode + ?Sized>(node: &N) -> Vec<&Rule> {
    let mut rules: Vec<&Rule> = node.rules().iter().collect();
    rules.sort_by_key(|rule| Reverse(rule.key()));
    rules
}

/// Lazily enumerate rules from `node` up to the root.
///
/// Each node's rule set is read and sorted only once the stream reaches it.
pub fn iter_perms<N: FileNode + ?Sized>(node: &N) -> AncestorRules<'_, N> {
    AncestorRules {
        next_node: Some(node),
        current: Vec::new().into_iter(),
    }
}

/// Iterator returned by [`iter_perms`].
pub struct AncestorRules<'a, N: ?Sized> {
    next_node: Option<&'a N>,
    current: std::vec::IntoIter<&'a Rule>,
}

impl<'a, N: FileNode + ?Sized> Iterator for AncestorRules<'a, N> {
    type Item = &'a Rule;

    fn next(&mut self) -> Option<&'a Rule> {
        loop {
            if let Some(rule) = self.current.next() {
                return Some(rule);
            }
            let node = self.next_node?;
            self.current = sorted_rules(node).into_iter();
            self.next_node = node.parent();
        }
    }
}

/// Default strategy: walk the full ancestor chain on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct AncestorWalk;

impl<N: FileNode + ?Sized> RuleSource<N> for AncestorWalk {
    fn rules<'a>(&'a self, node: &'a N) -> Box<dyn Iterator<Item = &'a Rule> + 'a> {
        Box::new(iter_perms(node))
    }
}

/// Batch strategy: the node's own rules followed by a pre-resolved inherited stream.
///
/// The inherited stream is normally `iter_perms(parent)`, collected once and
/// shared by every child of `parent`.
#[derive(Debug, Clone, Default)]
pub struct PrecomputedSuffix<'r> {
    inherited: Vec<&'r Rule>,
}

impl<'r> PrecomputedSuffix<'r> {
    pub fn new(inherited: impl IntoIterator<Item = &'r Rule>) -> Self {
        PrecomputedSuffix {
            inherited: inherited.into_iter().collect(),
        }
    }

    /// Resolve `parent`'s ancestor chain once for reuse across its children.
    pub fn for_parent<N: FileNode + ?Sized>(parent: &'r N) -> Self {
        PrecomputedSuffix::new(iter_perms(parent))
    }

    pub fn inherited(&self) -> &[&'r Rule] {
        &self.inherited
    }
}

impl<N: FileNode + ?Sized> RuleSource<N> for PrecomputedSuffix<'_> {
    fn rules<'a>(&'a self, node: &'a N) -> Box<dyn Iterator<Item = &'a Rule> + 'a> {
        let own = sorted_rules(node).into_iter();
        Box::new(own.chain(self.inherited.iter().copied()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FileObject, PermissionKind, Scope};

    #[test]
    fn own_rules_sorted_most_specific_first() {
        let node = FileObject::root(
            "doc",
            vec![
                Rule::allow(PermissionKind::View, Scope::Public),
                Rule::allow(PermissionKind::Edit, Scope::PerUser).with_target(1),
                Rule::deny(PermissionKind::Comment, Scope::Internal),
                Rule::allow(PermissionKind::Comment, Scope::Internal),
            ],
        );

        let order: Vec<_> = iter_perms(&node).collect();
        assert_eq!(order[0].scope, Scope::PerUser);
        assert_eq!(order[1], &Rule::deny(PermissionKind::Comment, Scope::Internal));
        assert_eq!(order[2], &Rule::allow(PermissionKind::Comment, Scope::Internal));
        assert_eq!(order[3].scope, Scope::Public);
    }

    #[test]
    fn equal_keys_keep_source_order() {
        let node = FileObject::root(
            "doc",
            vec![
                Rule::allow("share", Scope::Public),
                Rule::allow("share", Scope::Public),
            ],
        );

        let sorted = sorted_rules(&node);
        assert!(std::ptr::eq(sorted[0], &node.rules[0]));
        assert!(std::ptr::eq(sorted[1], &node.rules[1]));
    }

    #[test]
    fn walk_yields_node_before_ancestors() {
        let root = FileObject::root("root", vec![Rule::allow(PermissionKind::View, Scope::Public)]);
        let mid = FileObject::child(&root, "mid", vec![]);
        let leaf = FileObject::child(
            &mid,
            "leaf",
            vec![Rule::deny(PermissionKind::Edit, Scope::Public)],
        );

        let rules: Vec<_> = iter_perms(&leaf).collect();
        assert_eq!(rules.len(), 2);
        assert!(std::ptr::eq(rules[0], &leaf.rules[0]));
        assert!(std::ptr::eq(rules[1], &root.rules[0]));
    }

    #[test]
    fn walk_reads_ancestors_lazily() {
        let root = FileObject::root("root", vec![Rule::allow(PermissionKind::View, Scope::Public)]);
        let leaf = FileObject::child(
            &root,
            "leaf",
            vec![Rule::deny(PermissionKind::View, Scope::Public)],
        );

        let mut walk = iter_perms(&leaf);
        assert!(walk.next().is_some());
        // Root not visited yet.
        assert!(walk.next_node.is_some());
        assert!(walk.next().is_some());
        assert!(walk.next().is_none());
        assert!(walk.next().is_none());
    }

    #[test]
    fn empty_root_yields_nothing() {
        let root = FileObject::root("root", vec![]);
        assert_eq!(iter_perms(&root).count(), 0);
    }

    #[test]
    fn suffix_matches_full_walk() {
        let a = FileObject::root("a", vec![Rule::allow(PermissionKind::Edit, Scope::Internal)]);
        let b = FileObject::child(&a, "b", vec![Rule::deny(PermissionKind::Edit, Scope::Public)]);
        let c = FileObject::child(
            &b,
            "c",
            vec![Rule::allow(PermissionKind::Comment, Scope::PerGroup).with_target(2)],
        );

        let suffix = PrecomputedSuffix::for_parent(&b);
        assert_eq!(suffix.inherited().len(), 2);

        let walked: Vec<_> = AncestorWalk.rules(&c).collect();
        let batched: Vec<_> = suffix.rules(&c).collect();
        assert_eq!(walked, batched);
    }
}
