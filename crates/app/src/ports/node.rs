//! UI node port — introspection and direct activation of a tree node.

use autotap_domain::geometry::Rect;

/// A node of the host's live UI tree.
pub trait UiNode {
    /// Whether the node declares itself clickable.
    fn is_clickable(&self) -> bool;

    /// The node's bounds in screen coordinates.
    fn bounds_in_screen(&self) -> Rect;

    /// Ask the host to activate the node directly.
    ///
    /// Returns the host's own report of whether the click was performed.
    fn perform_click(&self) -> bool;
}
