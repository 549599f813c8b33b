//! Rule list and resolver configuration loading.
//!
//! Rules arrive from the persistence layer as JSON:
//!
//! ```json
//! [{"type": "view", "effect": "allow", "scope": "public"},
//!  {"type": "edit", "effect": "deny", "scope": "per_group", "target": 7}]
//! ```
//!
//! Unknown `type` and `scope` strings are kept as-is; the resolver decides
//! what they mean.

use serde::Deserialize;

use crate::error::{AclError, Result};
use crate::types::Rule;

/// Child count above which batch resolution fans out across rayon workers.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 1000;

/// Resolver tuning knobs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AclConfig {
    pub parallel_threshold: usize,
}

impl Default for AclConfig {
    fn default() -> Self {
        AclConfig {
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

/// Parse a resolver config from a JSON string. Missing fields take defaults.
pub fn parse_acl_config(json: &str) -> Result<AclConfig> {
    Ok(serde_json::from_str(json)?)
}

/// Parse a node's rule list from a JSON array.
///
/// Group and user rules must carry a `target`.
pub fn parse_rules(json: &str) -> Result<Vec<Rule>> {
    let rules: Vec<Rule> = serde_json::from_str(json)?;
    if let Some((index, rule)) = rules
        .iter()
        .enumerate()
        .find(|(_, rule)| rule.scope.needs_target() && rule.target.is_none())
    {
        return Err(AclError::MissingTarget {
            index,
            scope: rule.scope.clone(),
        });
    }
    Ok(rules)
}
