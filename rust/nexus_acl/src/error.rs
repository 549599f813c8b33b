use thiserror::Error;

use crate::types::Scope;

#[derive(Error, Debug)]
pub enum AclError {
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("rule {index} has scope {scope} but no target")]
    MissingTarget { index: usize, scope: Scope },
}

pub type Result<T> = std::result::Result<T, AclError>;
