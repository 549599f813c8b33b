//! Domain types shared across nexus_acl modules.

use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Built-in permission levels, weakest first.
///
/// The discriminant is the priority index used by the propagation engine.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionKind {
    View = 0,
    Comment = 1,
    Edit = 2,
}

/// Number of built-in kinds.
pub const PRIORITY_COUNT: usize = 3;

/// Canonical ordering of the built-in kinds. `get_perms` returns prefixes of this table.
pub static PRIORITY: [PermissionKind; PRIORITY_COUNT] = [
    PermissionKind::View,
    PermissionKind::Comment,
    PermissionKind::Edit,
];

impl PermissionKind {
    /// Priority index (0 = View).
    #[inline]
    pub fn priority(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PermissionKind::View => "view",
            PermissionKind::Comment => "comment",
            PermissionKind::Edit => "edit",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "view" => Some(PermissionKind::View),
            "comment" => Some(PermissionKind::Comment),
            "edit" => Some(PermissionKind::Edit),
            _ => None,
        }
    }
}

impl fmt::Display for PermissionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Permission type as stored on a rule.
///
/// Rule data may carry kinds outside the built-in ordering (e.g. "share").
/// Those are kept verbatim so they survive a load/store round trip, but the
/// resolver treats them as inert.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PermissionType {
    Builtin(PermissionKind),
    Other(String),
}

impl PermissionType {
    /// Priority index, or `None` for kinds outside the built-in ordering.
    #[inline]
    pub fn priority(&self) -> Option<usize> {
        match self {
            PermissionType::Builtin(kind) => Some(kind.priority()),
            PermissionType::Other(_) => None,
        }
    }
}

impl From<PermissionKind> for PermissionType {
    fn from(kind: PermissionKind) -> Self {
        PermissionType::Builtin(kind)
    }
}

impl From<String> for PermissionType {
    fn from(name: String) -> Self {
        match PermissionKind::from_name(&name) {
            Some(kind) => PermissionType::Builtin(kind),
            None => PermissionType::Other(name),
        }
    }
}

impl From<&str> for PermissionType {
    fn from(name: &str) -> Self {
        PermissionType::from(name.to_string())
    }
}

impl From<PermissionType> for String {
    fn from(ty: PermissionType) -> Self {
        match ty {
            PermissionType::Builtin(kind) => kind.as_str().to_string(),
            PermissionType::Other(name) => name,
        }
    }
}

/// Whether a rule grants or vetoes its kind.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Effect {
    Allow,
    Deny,
}

/// Audience a rule applies to.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Scope {
    /// Everyone, including anonymous users.
    Public,
    /// Any authenticated user.
    Internal,
    /// Staff only.
    Protected,
    /// Members of the group named by the rule's `target`.
    PerGroup,
    /// The user whose id equals the rule's `target`.
    PerUser,
    /// Unknown tag. Evaluated as `Public`.
    Other(String),
}

impl Scope {
    pub fn as_str(&self) -> &str {
        match self {
            Scope::Public => "public",
            Scope::Internal => "internal",
            Scope::Protected => "protected",
            Scope::PerGroup => "per_group",
            Scope::PerUser => "per_user",
            Scope::Other(name) => name,
        }
    }

    /// Rank used by the rule ordering key; narrower audiences rank higher.
    fn specificity(&self) -> u8 {
        match self {
            Scope::Public | Scope::Other(_) => 0,
            Scope::Internal => 1,
            Scope::Protected => 2,
            Scope::PerGroup => 3,
            Scope::PerUser => 4,
        }
    }

    /// True for scopes that are meaningless without a `target`.
    pub fn needs_target(&self) -> bool {
        matches!(self, Scope::PerGroup | Scope::PerUser)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Scope {
    fn from(name: String) -> Self {
        match name.as_str() {
            "public" => Scope::Public,
            "internal" => Scope::Internal,
            "protected" => Scope::Protected,
            "per_group" => Scope::PerGroup,
            "per_user" => Scope::PerUser,
            _ => Scope::Other(name),
        }
    }
}

impl From<Scope> for String {
    fn from(scope: Scope) -> Self {
        match scope {
            Scope::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

/// A single allow/deny statement attached to a node.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    #[serde(rename = "type")]
    pub kind: PermissionType,
    pub effect: Effect,
    pub scope: Scope,
    /// Group id for `PerGroup`, user id for `PerUser`; ignored otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<u64>,
}

/// Ordering key for rules within one node. Rules are evaluated in descending key order.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct RuleKey {
    pub specificity: u8,
    pub effect: Effect,
    pub priority: Option<usize>,
    pub target: Option<u64>,
}

impl Rule {
    pub fn new(kind: impl Into<PermissionType>, effect: Effect, scope: Scope) -> Self {
        Rule {
            kind: kind.into(),
            effect,
            scope,
            target: None,
        }
    }

    pub fn allow(kind: impl Into<PermissionType>, scope: Scope) -> Self {
        Rule::new(kind, Effect::Allow, scope)
    }

    pub fn deny(kind: impl Into<PermissionType>, scope: Scope) -> Self {
        Rule::new(kind, Effect::Deny, scope)
    }

    pub fn with_target(mut self, target: u64) -> Self {
        self.target = Some(target);
        self
    }

    pub fn key(&self) -> RuleKey {
        RuleKey {
            specificity: self.scope.specificity(),
            effect: self.effect,
            priority: self.kind.priority(),
            target: self.target,
        }
    }
}

// ============================================================================
// Collaborator traits
// ============================================================================

/// Facts about the acting user. Authentication and group storage are resolved
/// by the caller; the resolver only queries them.
pub trait Subject {
    fn is_authenticated(&self) -> bool;
    fn is_staff(&self) -> bool;
    /// `None` for anonymous users.
    fn id(&self) -> Option<u64>;
    fn is_member_of(&self, group: u64) -> bool;
}

/// A file-like node in the permission tree.
///
/// The parent chain must be acyclic; the resolver walks it until `parent`
/// returns `None`.
pub trait FileNode {
    fn parent(&self) -> Option<&Self>;
    /// Rules attached to this node, in any order.
    fn rules(&self) -> &[Rule];
}

// ============================================================================
// In-memory implementations
// ============================================================================

/// Plain user record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct User {
    pub id: Option<u64>,
    pub authenticated: bool,
    pub staff: bool,
    pub groups: AHashSet<u64>,
}

impl User {
    /// Unauthenticated visitor with no id.
    pub fn anonymous() -> Self {
        User::default()
    }

    /// Authenticated, non-staff user.
    pub fn new(id: u64) -> Self {
        User {
            id: Some(id),
            authenticated: true,
            ..User::default()
        }
    }

    pub fn with_staff(mut self, staff: bool) -> Self {
        self.staff = staff;
        self
    }

    pub fn with_groups(mut self, groups: impl IntoIterator<Item = u64>) -> Self {
        self.groups.extend(groups);
        self
    }
}

impl Subject for User {
    fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    fn is_staff(&self) -> bool {
        self.staff
    }

    fn id(&self) -> Option<u64> {
        self.id
    }

    fn is_member_of(&self, group: u64) -> bool {
        self.groups.contains(&group)
    }
}

/// Borrowed in-memory tree node: owns its rules, borrows its parent.
#[derive(Debug, Clone)]
pub struct FileObject<'p> {
    pub name: String,
    pub parent: Option<&'p FileObject<'p>>,
    pub rules: Vec<Rule>,
}

impl<'p> FileObject<'p> {
    pub fn root(name: impl Into<String>, rules: Vec<Rule>) -> Self {
        FileObject {
            name: name.into(),
            parent: None,
            rules,
        }
    }

    pub fn child(parent: &'p FileObject<'p>, name: impl Into<String>, rules: Vec<Rule>) -> Self {
        FileObject {
            name: name.into(),
            parent: Some(parent),
            rules,
        }
    }
}

impl FileNode for FileObject<'_> {
    fn parent(&self) -> Option<&Self> {
        self.parent
    }

    fn rules(&self) -> &[Rule] {
        &self.rules
    }
}
