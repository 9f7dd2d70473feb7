//! Action primitives — how a matched node gets tapped.
//!
//! Three dispatch functions share one shape: take the host and a node,
//! return an [`ActionResult`]. Nothing here retries; a failed dispatch is
//! reported and left to the caller.

use autotap_domain::action::{ActionKind, ActionResult, ClickAction, PerformedAction};
use autotap_domain::selector::SelectorEngine;

use crate::ports::{AutomationHost, UiNode};

/// Activate `node` through the host's direct click capability.
pub fn click_node<H: AutomationHost>(_host: &H, node: &H::Node) -> ActionResult {
    ActionResult::new(PerformedAction::ClickNode, node.perform_click())
}

/// Tap the center of `node`'s on-screen bounds.
///
/// Fails without dispatching anything when the center lies off-screen.
pub fn click_center<H: AutomationHost>(host: &H, node: &H::Node) -> ActionResult {
    let center = node.bounds_in_screen().center();
    let screen = host.screen_size();
    if !screen.contains(center) {
        tracing::debug!(x = center.x, y = center.y, %screen, "tap target off screen");
        return ActionResult::new(PerformedAction::ClickCenter, false);
    }
    host.dispatch_tap(center, host.tap_timeout());
    ActionResult::new(PerformedAction::ClickCenter, true)
}

/// [`click_node`] when the node is clickable, [`click_center`] otherwise.
pub fn click<H: AutomationHost>(host: &H, node: &H::Node) -> ActionResult {
    if node.is_clickable() {
        click_node(host, node)
    } else {
        click_center(host, node)
    }
}

/// Dispatch the primitive selected by `kind`.
pub fn perform<H: AutomationHost>(kind: ActionKind, host: &H, node: &H::Node) -> ActionResult {
    match kind {
        ActionKind::ClickNode => click_node(host, node),
        ActionKind::ClickCenter => click_center(host, node),
        ActionKind::Click => click(host, node),
    }
}

/// Run a one-off [`ClickAction`] against the host's current root.
///
/// `selector` is the compiled form of `request.selector`. Returns `None`
/// when there is no root or nothing matches.
pub fn perform_click_action<E, H>(
    engine: &E,
    host: &H,
    selector: &E::Selector,
    request: &ClickAction,
) -> Option<ActionResult>
where
    E: SelectorEngine<Node = H::Node>,
    H: AutomationHost,
{
    let root = host.root_node()?;
    let target = engine.query(&root, selector, request.quick_find)?;
    Some(perform(request.kind(), host, &target))
}
