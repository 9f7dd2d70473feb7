//! Selector capability — the opaque "query a node against a selector" contract.
//!
//! The selector language itself lives outside this crate. A rule only needs
//! to hand a compiled selector and a tree node to an engine and get back the
//! matched node, if any. Node handles are owned values (usually cheap clones
//! of a reference into the host's tree).

/// Evaluates compiled selectors against UI-tree nodes.
pub trait SelectorEngine {
    /// Handle to a node of the UI tree.
    type Node;
    /// A compiled selector.
    type Selector;

    /// Find the node related to `node` that satisfies `selector`.
    ///
    /// `quick_find` is a hint that the engine may terminate traversal early
    /// (e.g. via an id index) at the cost of completeness.
    fn query(
        &self,
        node: &Self::Node,
        selector: &Self::Selector,
        quick_find: bool,
    ) -> Option<Self::Node>;
}

impl<T: SelectorEngine> SelectorEngine for &T {
    type Node = T::Node;
    type Selector = T::Selector;

    fn query(
        &self,
        node: &Self::Node,
        selector: &Self::Selector,
        quick_find: bool,
    ) -> Option<Self::Node> {
        (**self).query(node, selector, quick_find)
    }
}
