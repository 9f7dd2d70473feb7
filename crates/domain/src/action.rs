//! Action kinds and dispatch results.

use serde::{Deserialize, Serialize};

/// Which interaction primitive a rule dispatches once it matches.
///
/// Resolved once from the raw `action` tag when the rule is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionKind {
    /// Ask the host to activate the node directly.
    ClickNode,
    /// Tap the center of the node's on-screen bounds.
    ClickCenter,
    /// [`ClickNode`](Self::ClickNode) if the node is clickable, otherwise
    /// [`ClickCenter`](Self::ClickCenter).
    #[default]
    Click,
}

impl ActionKind {
    /// Resolve a raw action tag.
    ///
    /// Unknown or absent tags resolve to [`Click`](Self::Click); this is the
    /// documented default, not an error.
    #[must_use]
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag {
            Some("clickNode") => Self::ClickNode,
            Some("clickCenter") => Self::ClickCenter,
            _ => Self::Click,
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ClickNode => f.write_str("clickNode"),
            Self::ClickCenter => f.write_str("clickCenter"),
            Self::Click => f.write_str("click"),
        }
    }
}

/// The primitive that actually ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PerformedAction {
    ClickNode,
    ClickCenter,
}

impl std::fmt::Display for PerformedAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ClickNode => f.write_str("clickNode"),
            Self::ClickCenter => f.write_str("clickCenter"),
        }
    }
}

/// Outcome of dispatching one action. Transient, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResult {
    pub action: PerformedAction,
    #[serde(rename = "result")]
    pub succeeded: bool,
}

impl ActionResult {
    #[must_use]
    pub fn new(action: PerformedAction, succeeded: bool) -> Self {
        Self { action, succeeded }
    }
}

/// A one-off click request: find `selector` from the root and run `action`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickAction {
    pub selector: String,
    #[serde(default)]
    pub quick_find: bool,
    #[serde(default)]
    pub action: Option<String>,
}

impl ClickAction {
    /// The action kind this request resolves to.
    #[must_use]
    pub fn kind(&self) -> ActionKind {
        ActionKind::from_tag(self.action.as_deref())
    }
}
