//! Automation host port — the accessibility host the rules act through.

use std::time::Duration;

use autotap_domain::geometry::{Point, ScreenSize};

use super::node::UiNode;

/// Tap gesture duration used when the host does not report its own.
pub const DEFAULT_TAP_TIMEOUT: Duration = Duration::from_millis(100);

/// Capabilities the rule engine needs from the automation host.
///
/// Event subscription, foreground-app detection and permissions stay on the
/// host side; the engine only pulls a root node and dispatches gestures.
pub trait AutomationHost {
    /// Node handle type of the host's UI tree.
    type Node: UiNode;

    /// Root of the current foreground window, if any.
    fn root_node(&self) -> Option<Self::Node>;

    /// Current display bounds.
    fn screen_size(&self) -> ScreenSize;

    /// Activity identity of the home screen, as last reported by the host.
    fn launcher_activity_id(&self) -> Option<String>;

    /// Dispatch a single-point tap gesture.
    ///
    /// Fire-and-forget: completion and cancellation are not reported back.
    fn dispatch_tap(&self, point: Point, duration: Duration);

    /// Duration of a synthesized tap.
    fn tap_timeout(&self) -> Duration {
        DEFAULT_TAP_TIMEOUT
    }
}

impl<T: AutomationHost> AutomationHost for std::sync::Arc<T> {
    type Node = T::Node;

    fn root_node(&self) -> Option<Self::Node> {
        (**self).root_node()
    }

    fn screen_size(&self) -> ScreenSize {
        (**self).screen_size()
    }

    fn launcher_activity_id(&self) -> Option<String> {
        (**self).launcher_activity_id()
    }

    fn dispatch_tap(&self, point: Point, duration: Duration) {
        (**self).dispatch_tap(point, duration);
    }

    fn tap_timeout(&self) -> Duration {
        (**self).tap_timeout()
    }
}
