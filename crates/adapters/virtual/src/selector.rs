//! Selector language of the virtual host.
//!
//! ```text
//! selector  := class? predicate*
//! predicate := "[" attribute operator value "]"
//! attribute := "id" | "text" | "clickable"
//! operator  := "=" | "*=" | "^="
//! value     := '"' chars '"' | word
//! ```
//!
//! A class matches either the full class name or its last dotted segment,
//! so `TextView` and `android.widget.TextView` are equivalent. `clickable`
//! only supports `=` with `true` or `false`.

use std::fmt;
use std::iter::Peekable;
use std::str::{CharIndices, FromStr};

use autotap_app::ports::UiNode;
use autotap_domain::selector::SelectorEngine;

use crate::error::SelectorParseError;
use crate::tree::VirtualNode;

/// String comparison applied by a predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Equals,
    Contains,
    StartsWith,
}

impl Operator {
    fn apply(self, actual: &str, expected: &str) -> bool {
        match self {
            Self::Equals => actual == expected,
            Self::Contains => actual.contains(expected),
            Self::StartsWith => actual.starts_with(expected),
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Equals => "=",
            Self::Contains => "*=",
            Self::StartsWith => "^=",
        }
    }
}

/// One bracketed condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    Id(Operator, String),
    Text(Operator, String),
    Clickable(bool),
}

impl Predicate {
    fn matches(&self, node: &VirtualNode) -> bool {
        match self {
            Self::Id(operator, expected) => node.id().is_some_and(|id| operator.apply(id, expected)),
            Self::Text(operator, expected) => node
                .text()
                .is_some_and(|text| operator.apply(text, expected)),
            Self::Clickable(expected) => node.is_clickable() == *expected,
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(operator, value) => write!(f, "[id{}{value:?}]", operator.as_str()),
            Self::Text(operator, value) => write!(f, "[text{}{value:?}]", operator.as_str()),
            Self::Clickable(value) => write!(f, "[clickable={value}]"),
        }
    }
}

/// A compiled selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualSelector {
    class: Option<String>,
    predicates: Vec<Predicate>,
}

impl VirtualSelector {
    #[must_use]
    pub fn class(&self) -> Option<&str> {
        self.class.as_deref()
    }

    #[must_use]
    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// Whether `node` itself satisfies the class and every predicate.
    #[must_use]
    pub fn matches(&self, node: &VirtualNode) -> bool {
        let class_matches = self.class.as_deref().is_none_or(|class| {
            node.class()
                .strip_suffix(class)
                .is_some_and(|prefix| prefix.is_empty() || prefix.ends_with('.'))
        });
        class_matches && self.predicates.iter().all(|p| p.matches(node))
    }

    /// Value of the first `[id="…"]` equality, usable with the id index.
    fn exact_id(&self) -> Option<&str> {
        self.predicates.iter().find_map(|predicate| match predicate {
            Predicate::Id(Operator::Equals, id) => Some(id.as_str()),
            _ => None,
        })
    }
}

impl fmt::Display for VirtualSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(class) = &self.class {
            f.write_str(class)?;
        }
        for predicate in &self.predicates {
            write!(f, "{predicate}")?;
        }
        Ok(())
    }
}

impl FromStr for VirtualSelector {
    type Err = SelectorParseError;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        let mut parser = Parser::new(source);
        parser.skip_whitespace();
        if parser.peek().is_none() {
            return Err(SelectorParseError::Empty);
        }

        let class = parser.take_while(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '$'));
        let class = (!class.is_empty()).then(|| class.to_string());

        let mut predicates = Vec::new();
        loop {
            parser.skip_whitespace();
            match parser.next() {
                None => break,
                Some((_, '[')) => predicates.push(parser.predicate()?),
                Some((offset, found)) => {
                    return Err(SelectorParseError::UnexpectedChar { offset, found });
                }
            }
        }

        Ok(Self { class, predicates })
    }
}

enum Attribute {
    Id,
    Text,
    Clickable,
}

struct Parser<'a> {
    source: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
        }
    }

    fn peek(&mut self) -> Option<(usize, char)> {
        self.chars.peek().copied()
    }

    fn next(&mut self) -> Option<(usize, char)> {
        self.chars.next()
    }

    fn offset(&mut self) -> usize {
        self.peek().map_or(self.source.len(), |(offset, _)| offset)
    }

    fn unexpected(&mut self) -> SelectorParseError {
        match self.peek() {
            Some((offset, found)) => SelectorParseError::UnexpectedChar { offset, found },
            None => SelectorParseError::UnexpectedEnd,
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|(_, c)| c.is_whitespace()) {
            self.chars.next();
        }
    }

    fn take_while(&mut self, accept: impl Fn(char) -> bool) -> &'a str {
        let start = self.offset();
        while self.peek().is_some_and(|(_, c)| accept(c)) {
            self.chars.next();
        }
        let end = self.offset();
        &self.source[start..end]
    }

    fn expect(&mut self, expected: char) -> Result<(), SelectorParseError> {
        match self.next() {
            Some((_, c)) if c == expected => Ok(()),
            Some((offset, found)) => Err(SelectorParseError::UnexpectedChar { offset, found }),
            None => Err(SelectorParseError::UnexpectedEnd),
        }
    }

    /// Parse the rest of a predicate; the opening `[` is already consumed.
    fn predicate(&mut self) -> Result<Predicate, SelectorParseError> {
        self.skip_whitespace();
        let attribute = match self.take_while(|c| c.is_ascii_alphanumeric() || c == '_') {
            "" => return Err(self.unexpected()),
            "id" => Attribute::Id,
            "text" => Attribute::Text,
            "clickable" => Attribute::Clickable,
            other => return Err(SelectorParseError::UnknownAttribute(other.to_string())),
        };

        self.skip_whitespace();
        let operator = match self.take_while(|c| matches!(c, '=' | '*' | '^' | '!' | '$' | '~')) {
            "" => return Err(self.unexpected()),
            "=" => Operator::Equals,
            "*=" => Operator::Contains,
            "^=" => Operator::StartsWith,
            other => return Err(SelectorParseError::UnknownOperator(other.to_string())),
        };

        self.skip_whitespace();
        let value = self.value()?;
        self.skip_whitespace();
        self.expect(']')?;

        match attribute {
            Attribute::Id => Ok(Predicate::Id(operator, value)),
            Attribute::Text => Ok(Predicate::Text(operator, value)),
            Attribute::Clickable if operator != Operator::Equals => Err(
                SelectorParseError::UnknownOperator(operator.as_str().to_string()),
            ),
            Attribute::Clickable => match value.as_str() {
                "true" => Ok(Predicate::Clickable(true)),
                "false" => Ok(Predicate::Clickable(false)),
                _ => Err(SelectorParseError::ExpectedBool {
                    attribute: "clickable",
                    value,
                }),
            },
        }
    }

    fn value(&mut self) -> Result<String, SelectorParseError> {
        if self.peek().is_some_and(|(_, c)| c == '"') {
            self.chars.next();
            return self.quoted();
        }
        match self.take_while(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.')) {
            "" => Err(self.unexpected()),
            word => Ok(word.to_string()),
        }
    }

    /// Quoted string body up to the closing quote; `\` escapes the next char.
    fn quoted(&mut self) -> Result<String, SelectorParseError> {
        let mut value = String::new();
        loop {
            match self.next() {
                None => return Err(SelectorParseError::UnexpectedEnd),
                Some((_, '"')) => return Ok(value),
                Some((_, '\\')) => match self.next() {
                    Some((_, escaped)) => value.push(escaped),
                    None => return Err(SelectorParseError::UnexpectedEnd),
                },
                Some((_, c)) => value.push(c),
            }
        }
    }
}

/// Query engine over [`VirtualTree`](crate::VirtualTree) nodes.
///
/// A query looks at the start node and its descendants, breadth-first, and
/// returns the first hit. With `quick_find` and an `id` equality predicate
/// only the nodes carrying that id are considered.
#[derive(Debug, Clone, Copy, Default)]
pub struct VirtualSelectorEngine;

impl VirtualSelectorEngine {
    /// Compile a selector string.
    ///
    /// # Errors
    ///
    /// Returns a [`SelectorParseError`] describing the first syntax problem.
    pub fn compile(&self, source: &str) -> Result<VirtualSelector, SelectorParseError> {
        source.parse()
    }
}

impl SelectorEngine for VirtualSelectorEngine {
    type Node = VirtualNode;
    type Selector = VirtualSelector;

    fn query(
        &self,
        node: &VirtualNode,
        selector: &VirtualSelector,
        quick_find: bool,
    ) -> Option<VirtualNode> {
        if quick_find {
            if let Some(id) = selector.exact_id() {
                return node
                    .tree()
                    .find_by_id(id)
                    .find(|candidate| candidate.is_within(node) && selector.matches(candidate));
            }
        }
        node.breadth_first()
            .find(|candidate| selector.matches(candidate))
    }
}
