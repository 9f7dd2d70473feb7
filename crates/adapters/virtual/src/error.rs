//! Virtual adapter error types.

use autotap_domain::error::AutotapError;

/// Why a selector string could not be compiled.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorParseError {
    /// Nothing to parse.
    #[error("empty selector")]
    Empty,

    /// A character that does not fit the grammar at this position.
    #[error("unexpected {found:?} at offset {offset}")]
    UnexpectedChar {
        /// Byte offset in the selector source.
        offset: usize,
        found: char,
    },

    /// Input ended in the middle of a predicate.
    #[error("unexpected end of selector")]
    UnexpectedEnd,

    /// Attribute name not supported by the virtual tree.
    #[error("unknown attribute {0:?}")]
    UnknownAttribute(String),

    /// Operator other than `=`, `*=` or `^=`.
    #[error("unknown operator {0:?}")]
    UnknownOperator(String),

    /// `clickable` compared to something other than `true`/`false`.
    #[error("attribute {attribute} expects a boolean, got {value:?}")]
    ExpectedBool {
        attribute: &'static str,
        value: String,
    },
}

impl From<SelectorParseError> for AutotapError {
    fn from(err: SelectorParseError) -> Self {
        AutotapError::Adapter(Box::new(err))
    }
}
