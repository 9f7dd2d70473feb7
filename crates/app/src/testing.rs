//! Hand-written fakes shared by the unit tests of this crate.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use autotap_domain::geometry::{Point, Rect, ScreenSize};
use autotap_domain::selector::SelectorEngine;
use autotap_domain::time::Millis;

use crate::ports::{AutomationHost, Clock, UiNode};

// ── Node ───────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct FakeNode {
    pub name: &'static str,
    pub clickable: bool,
    pub bounds: Rect,
    pub clicks: Rc<Cell<u32>>,
}

impl FakeNode {
    pub fn new(name: &'static str, clickable: bool, bounds: Rect) -> Self {
        Self {
            name,
            clickable,
            bounds,
            clicks: Rc::new(Cell::new(0)),
        }
    }
}

impl PartialEq for FakeNode {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl UiNode for FakeNode {
    fn is_clickable(&self) -> bool {
        self.clickable
    }

    fn bounds_in_screen(&self) -> Rect {
        self.bounds
    }

    fn perform_click(&self) -> bool {
        self.clicks.set(self.clicks.get() + 1);
        self.clickable
    }
}

// ── Selector engine ────────────────────────────────────────────────

/// Selectors are node names; a query finds the named node if it is on
/// screen, wherever the query starts.
#[derive(Default)]
pub struct FakeSelectors {
    pub on_screen: HashMap<&'static str, FakeNode>,
    pub quick_finds: RefCell<Vec<bool>>,
}

impl FakeSelectors {
    pub fn with(nodes: &[FakeNode]) -> Self {
        Self {
            on_screen: nodes.iter().map(|n| (n.name, n.clone())).collect(),
            quick_finds: RefCell::new(Vec::new()),
        }
    }
}

impl SelectorEngine for FakeSelectors {
    type Node = FakeNode;
    type Selector = &'static str;

    fn query(&self, _node: &FakeNode, selector: &&'static str, quick_find: bool) -> Option<FakeNode> {
        self.quick_finds.borrow_mut().push(quick_find);
        self.on_screen.get(selector).cloned()
    }
}

// ── Host ───────────────────────────────────────────────────────────

pub struct FakeHost {
    pub root: Option<FakeNode>,
    pub screen: ScreenSize,
    pub launcher: Option<String>,
    pub taps: RefCell<Vec<(Point, Duration)>>,
}

impl Default for FakeHost {
    fn default() -> Self {
        Self {
            root: Some(FakeNode::new("root", false, Rect::new(0, 0, 1080, 1920))),
            screen: ScreenSize::new(1080, 1920),
            launcher: None,
            taps: RefCell::new(Vec::new()),
        }
    }
}

impl AutomationHost for FakeHost {
    type Node = FakeNode;

    fn root_node(&self) -> Option<FakeNode> {
        self.root.clone()
    }

    fn screen_size(&self) -> ScreenSize {
        self.screen
    }

    fn launcher_activity_id(&self) -> Option<String> {
        self.launcher.clone()
    }

    fn dispatch_tap(&self, point: Point, duration: Duration) {
        self.taps.borrow_mut().push((point, duration));
    }
}

// ── Clock ──────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct ManualClock(Rc<Cell<Millis>>);

impl ManualClock {
    pub fn at(now: Millis) -> Self {
        Self(Rc::new(Cell::new(now)))
    }

    pub fn set(&self, now: Millis) {
        self.0.set(now);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> Millis {
        self.0.get()
    }
}
