//! Virtual automation host.
//!
//! Holds the current window tree and the launcher activity in tokio
//! [`watch`] channels so a driver can swap them while the engine keeps a
//! shared reference. Taps are recorded instead of injected.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use autotap_app::ports::AutomationHost;
use autotap_app::ports::host::DEFAULT_TAP_TIMEOUT;
use autotap_domain::geometry::{Point, ScreenSize};
use tokio::sync::watch;

use crate::tree::{VirtualNode, VirtualTree};

/// A tap dispatched through [`AutomationHost::dispatch_tap`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tap {
    pub point: Point,
    pub duration: Duration,
}

/// In-memory [`AutomationHost`].
pub struct VirtualHost {
    screen: ScreenSize,
    tap_timeout: Duration,
    window: watch::Sender<Option<VirtualTree>>,
    launcher: watch::Sender<Option<String>>,
    taps: Mutex<Vec<Tap>>,
}

impl VirtualHost {
    /// Create a host with no window and no known launcher.
    #[must_use]
    pub fn new(screen: ScreenSize) -> Self {
        Self {
            screen,
            tap_timeout: DEFAULT_TAP_TIMEOUT,
            window: watch::Sender::new(None),
            launcher: watch::Sender::new(None),
            taps: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn with_tap_timeout(mut self, tap_timeout: Duration) -> Self {
        self.tap_timeout = tap_timeout;
        self
    }

    /// Replace the foreground window.
    pub fn set_window(&self, tree: Option<VirtualTree>) {
        self.window.send_replace(tree);
    }

    /// Current foreground window.
    #[must_use]
    pub fn window(&self) -> Option<VirtualTree> {
        self.window.borrow().clone()
    }

    pub fn set_launcher_activity_id(&self, activity_id: Option<String>) {
        tracing::debug!(launcher = ?activity_id, "launcher activity changed");
        self.launcher.send_replace(activity_id);
    }

    /// Observe launcher activity changes.
    #[must_use]
    pub fn subscribe_launcher(&self) -> watch::Receiver<Option<String>> {
        self.launcher.subscribe()
    }

    /// Taps dispatched so far, oldest first.
    #[must_use]
    pub fn taps(&self) -> Vec<Tap> {
        self.taps
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Drain the recorded taps.
    pub fn take_taps(&self) -> Vec<Tap> {
        std::mem::take(&mut *self.taps.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl AutomationHost for VirtualHost {
    type Node = VirtualNode;

    fn root_node(&self) -> Option<VirtualNode> {
        self.window.borrow().as_ref().map(VirtualTree::root)
    }

    fn screen_size(&self) -> ScreenSize {
        self.screen
    }

    fn launcher_activity_id(&self) -> Option<String> {
        self.launcher.borrow().clone()
    }

    fn dispatch_tap(&self, point: Point, duration: Duration) {
        tracing::debug!(x = point.x, y = point.y, ?duration, "tap dispatched");
        self.taps
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Tap { point, duration });
    }

    fn tap_timeout(&self) -> Duration {
        self.tap_timeout
    }
}
