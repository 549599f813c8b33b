//! Hierarchical allow/deny propagation engine.
//!
//! Rules are consumed in priority order (node first, then ancestors) from a
//! [`RuleSource`]. Two entry points share that stream:
//!
//! - [`get_perms`] computes the full granted set with a ratcheting ceiling:
//!   a DENY lowers the ceiling for the rest of the walk, so an ALLOW found
//!   further up the tree can never resurrect a kind a closer node denied.
//! - [`has_perm`] answers for one kind and stops at the first decisive rule.
//!
//! The two are intentionally not unified. `has_perm` treats an ALLOW as
//! covering every weaker kind outright, while `get_perms` clamps ALLOWs to the
//! current ceiling; crafted chains can make them disagree.

pub mod batch;
pub mod config;
pub mod scope;
pub mod walk;

use tracing::{debug, trace};

use crate::types::{
    Effect, FileNode, PermissionKind, PermissionType, Rule, Subject, PRIORITY, PRIORITY_COUNT,
};

pub use batch::{filter_viewable, resolve_children};
pub use config::{parse_acl_config, parse_rules, AclConfig};
pub use scope::is_in_scope;
pub use walk::{
    iter_perms, sorted_rules, AncestorRules, AncestorWalk, PrecomputedSuffix, RuleSource,
};

/// Running bounds of a [`get_perms`] walk.
///
/// Indices are priority indices into [`PRIORITY`]; `-1` means "nothing".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Propagation {
    /// Highest index still allowable. Only ever decreases.
    pub ceiling: isize,
    /// Highest index granted so far.
    pub granted: isize,
}

impl Default for Propagation {
    fn default() -> Self {
        Propagation {
            ceiling: PRIORITY_COUNT as isize - 1,
            granted: -1,
        }
    }
}

impl Propagation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one rule into the bounds. Returns `false` if the rule was skipped
    /// (unrecognized kind or out of scope for `user`).
    pub fn apply<U: Subject + ?Sized>(&mut self, user: &U, rule: &Rule) -> bool {
        let Some(priority) = rule.kind.priority() else {
            return false;
        };
        if !is_in_scope(user, rule) {
            return false;
        }

        let index = priority as isize;
        match rule.effect {
            // Not `clamp`: once the ceiling drops below `granted` the ceiling wins.
            Effect::Allow => self.granted = index.max(self.granted).min(self.ceiling),
            Effect::Deny => self.ceiling = self.ceiling.min(index - 1),
        }
        trace!(
            kind = %PRIORITY[priority],
            effect = ?rule.effect,
            scope = %rule.scope,
            ceiling = self.ceiling,
            granted = self.granted,
            "applied rule"
        );
        true
    }

    /// Granted kinds: always a prefix of the canonical ordering.
    pub fn perms(&self) -> &'static [PermissionKind] {
        let len = (self.granted + 1).max(0) as usize;
        &PRIORITY[..len]
    }
}

/// Effective permissions of `user` on `node`, walking the full ancestor chain.
pub fn get_perms<U, N>(user: &U, node: &N) -> &'static [PermissionKind]
where
    U: Subject + ?Sized,
    N: FileNode + ?Sized,
{
    get_perms_with(user, node, &AncestorWalk)
}

/// [`get_perms`] over an arbitrary rule source.
pub fn get_perms_with<U, N, S>(user: &U, node: &N, source: &S) -> &'static [PermissionKind]
where
    U: Subject + ?Sized,
    N: FileNode + ?Sized,
    S: RuleSource<N> + ?Sized,
{
    let mut state = Propagation::new();
    for rule in source.rules(node) {
        state.apply(user, rule);
    }
    let perms = state.perms();
    debug!(granted = perms.len(), ceiling = state.ceiling, "resolved permissions");
    perms
}

/// Resolve `node` using its own rules plus an already-resolved inherited stream.
///
/// `inherited` is typically `iter_perms(parent)`; the result equals
/// `get_perms(user, node)` when it is.
pub fn optimized_get_perms<'r, U, N>(
    user: &U,
    node: &N,
    inherited: impl IntoIterator<Item = &'r Rule>,
) -> &'static [PermissionKind]
where
    U: Subject + ?Sized,
    N: FileNode + ?Sized,
{
    get_perms_with(user, node, &PrecomputedSuffix::new(inherited))
}

/// Outcome of a single-kind check, with the rule that settled it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision<'a> {
    pub granted: bool,
    /// `None` when no rule addressed the request (default deny) or the kind is unrecognized.
    pub rule: Option<&'a Rule>,
}

impl Decision<'static> {
    const DEFAULT_DENY: Self = Decision {
        granted: false,
        rule: None,
    };
}

/// Does `user` hold `kind` on `node`? Walks the full ancestor chain.
pub fn has_perm<U, N>(user: &U, node: &N, kind: impl Into<PermissionType>) -> bool
where
    U: Subject + ?Sized,
    N: FileNode + ?Sized,
{
    has_perm_with(user, node, kind, &AncestorWalk)
}

/// [`has_perm`] over an arbitrary rule source.
pub fn has_perm_with<U, N, S>(
    user: &U,
    node: &N,
    kind: impl Into<PermissionType>,
    source: &S,
) -> bool
where
    U: Subject + ?Sized,
    N: FileNode + ?Sized,
    S: RuleSource<N> + ?Sized,
{
    explain_perm(user, node, kind, source).granted
}

/// Run the [`has_perm`] check and report which rule decided it.
///
/// The stream is consumed only up to the decisive rule.
pub fn explain_perm<'a, U, N, S>(
    user: &U,
    node: &'a N,
    kind: impl Into<PermissionType>,
    source: &'a S,
) -> Decision<'a>
where
    U: Subject + ?Sized,
    N: FileNode + ?Sized,
    S: RuleSource<N> + ?Sized,
{
    let kind = kind.into();
    // Only built-in kinds can be granted.
    let Some(wanted) = kind.priority() else {
        return Decision::DEFAULT_DENY;
    };

    for rule in source.rules(node) {
        if !is_in_scope(user, rule) {
            continue;
        }
        let decided = match (rule.effect, rule.kind.priority()) {
            (Effect::Allow, Some(priority)) if wanted <= priority => true,
            (Effect::Deny, Some(priority)) if wanted >= priority => false,
            _ => continue,
        };
        debug!(
            kind = %PRIORITY[wanted],
            granted = decided,
            scope = %rule.scope,
            "permission decided"
        );
        return Decision {
            granted: decided,
            rule: Some(rule),
        };
    }

    debug!(kind = %PRIORITY[wanted], "no rule matched, denying");
    Decision::DEFAULT_DENY
}
