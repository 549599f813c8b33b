//! Scope evaluation: does a rule's audience include the user?

use crate::types::{Rule, Scope, Subject};

/// Check whether `rule` applies to `user`.
///
/// Unrecognized scopes fall through to the public behavior and always match.
pub fn is_in_scope<U: Subject + ?Sized>(user: &U, rule: &Rule) -> bool {
    match rule.scope {
        Scope::Internal => user.is_authenticated(),
        Scope::Protected => user.is_staff(),
        // A group rule without a target names no group, so no one is a member.
        Scope::PerGroup => rule.target.is_some_and(|group| user.is_member_of(group)),
        Scope::PerUser => user.id() == rule.target,
        Scope::Public | Scope::Other(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PermissionKind, User};

    fn rule(scope: Scope) -> Rule {
        Rule::allow(PermissionKind::View, scope)
    }

    #[test]
    fn public_matches_everyone() {
        assert!(is_in_scope(&User::anonymous(), &rule(Scope::Public)));
        assert!(is_in_scope(&User::new(1), &rule(Scope::Public)));
    }

    #[test]
    fn internal_requires_authentication() {
        assert!(!is_in_scope(&User::anonymous(), &rule(Scope::Internal)));
        assert!(is_in_scope(&User::new(1), &rule(Scope::Internal)));
    }

    #[test]
    fn protected_requires_staff() {
        assert!(!is_in_scope(&User::new(1), &rule(Scope::Protected)));
        assert!(is_in_scope(
            &User::new(1).with_staff(true),
            &rule(Scope::Protected)
        ));
    }

    #[test]
    fn per_group_checks_membership() {
        let r = rule(Scope::PerGroup).with_target(7);
        assert!(is_in_scope(&User::new(1).with_groups([3, 7]), &r));
        assert!(!is_in_scope(&User::new(1).with_groups([3]), &r));
        assert!(!is_in_scope(&User::anonymous(), &r));
    }

    #[test]
    fn per_user_compares_id() {
        let r = rule(Scope::PerUser).with_target(42);
        assert!(is_in_scope(&User::new(42), &r));
        assert!(!is_in_scope(&User::new(41), &r));
        assert!(!is_in_scope(&User::anonymous(), &r));
    }

    #[test]
    fn unknown_scope_behaves_as_public() {
        let r = rule(Scope::from("friends_of_friends".to_string()));
        assert!(matches!(r.scope, Scope::Other(_)));
        assert!(is_in_scope(&User::anonymous(), &r));
    }
}
