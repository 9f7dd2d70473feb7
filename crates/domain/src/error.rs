//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`AutotapError`] via `#[from]` where they cross a port boundary.

use crate::id::RuleId;

/// Top-level error for the domain and application layers.
#[derive(Debug, thiserror::Error)]
pub enum AutotapError {
    #[error("validation error")]
    Validation(#[from] ValidationError),

    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// Failure reported by an adapter (selector compiler, host, …).
    #[error("adapter error")]
    Adapter(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// A domain invariant was violated while constructing a value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("a rule needs at least one match selector")]
    EmptyMatches,

    #[error("app id must not be empty")]
    EmptyAppId,

    #[error("rule key {0} is used more than once")]
    DuplicateKey(i32),

    #[error("group key {0} is used more than once")]
    DuplicateGroupKey(i32),

    #[error("rule id {0} is used more than once")]
    DuplicateRuleId(RuleId),

    #[error("rule {rule_key:?} references unknown pre key {pre_key}")]
    UnknownPreKey {
        /// Key of the referencing rule, if it has one.
        rule_key: Option<i32>,
        /// The key that could not be resolved.
        pre_key: i32,
    },

    #[error("pre rule {0} is not part of the rule set")]
    UnknownPreRule(RuleId),
}

/// A lookup by identifier found nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}
