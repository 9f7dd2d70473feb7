//! # autotap-adapter-virtual
//!
//! Virtual automation host used for scenario replay and testing.
//!
//! ## Provided pieces
//!
//! | Type | Implements | Behaviour |
//! |------|------------|-----------|
//! | [`VirtualTree`] / [`VirtualNode`] | `UiNode` | Immutable tree built from a [`NodeRecord`]; nodes count their clicks |
//! | [`VirtualSelector`] | n/a | `Class[attr="v"][attr*="v"][attr^="v"]` over `id`, `text`, `clickable` |
//! | [`VirtualSelectorEngine`] | `SelectorEngine` | Breadth-first search, id index when `quick_find` is set |
//! | [`VirtualHost`] | `AutomationHost` | Current root, screen size, launcher signal, recorded taps |
//!
//! ## Dependency rule
//!
//! Depends on `autotap-app` (port traits) and `autotap-domain` only.

mod error;
mod host;
mod selector;
mod tree;

pub use error::SelectorParseError;
pub use host::{Tap, VirtualHost};
pub use selector::{Operator, Predicate, VirtualSelector, VirtualSelectorEngine};
pub use tree::{BreadthFirst, NodeRecord, VirtualNode, VirtualTree};
