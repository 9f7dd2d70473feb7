//! In-memory UI tree.
//!
//! A [`VirtualTree`] is built once from a [`NodeRecord`] and never changes,
//! except for per-node click counters. Nodes are stored breadth-first in a
//! shared arena; [`VirtualNode`] handles are an `Arc` plus an index, so
//! cloning one is cheap.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use autotap_app::ports::UiNode;
use autotap_domain::geometry::Rect;
use serde::{Deserialize, Serialize};

/// Serializable description of a node and its subtree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    /// Widget class, e.g. `android.widget.TextView`.
    #[serde(default)]
    pub class: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub clickable: bool,
    #[serde(default)]
    pub bounds: Rect,
    #[serde(default)]
    pub children: Vec<NodeRecord>,
}

#[derive(Debug)]
struct NodeData {
    class: String,
    id: Option<String>,
    text: Option<String>,
    clickable: bool,
    bounds: Rect,
    parent: Option<usize>,
    children: Vec<usize>,
    clicks: AtomicU32,
}

#[derive(Debug)]
struct Arena {
    nodes: Vec<NodeData>,
    by_id: HashMap<String, Vec<usize>>,
}

/// Snapshot of a window's node tree.
#[derive(Debug, Clone)]
pub struct VirtualTree {
    arena: Arc<Arena>,
}

impl VirtualTree {
    /// Flatten `record` into a breadth-first arena and index nodes by id.
    #[must_use]
    pub fn from_record(record: &NodeRecord) -> Self {
        let mut nodes: Vec<NodeData> = Vec::new();
        let mut by_id: HashMap<String, Vec<usize>> = HashMap::new();
        let mut queue: VecDeque<(&NodeRecord, Option<usize>)> = VecDeque::from([(record, None)]);

        while let Some((record, parent)) = queue.pop_front() {
            let index = nodes.len();
            if let Some(parent) = parent {
                nodes[parent].children.push(index);
            }
            if let Some(id) = &record.id {
                by_id.entry(id.clone()).or_default().push(index);
            }
            nodes.push(NodeData {
                class: record.class.clone(),
                id: record.id.clone(),
                text: record.text.clone(),
                clickable: record.clickable,
                bounds: record.bounds,
                parent,
                children: Vec::with_capacity(record.children.len()),
                clicks: AtomicU32::new(0),
            });
            queue.extend(record.children.iter().map(|child| (child, Some(index))));
        }

        Self {
            arena: Arc::new(Arena { nodes, by_id }),
        }
    }

    #[must_use]
    pub fn root(&self) -> VirtualNode {
        self.node(0)
    }

    /// Number of nodes in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.arena.nodes.len()
    }

    /// Always `false`: a tree has at least its root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.arena.nodes.is_empty()
    }

    /// Nodes carrying `id`, in breadth-first order.
    pub fn find_by_id(&self, id: &str) -> impl Iterator<Item = VirtualNode> + '_ {
        self.arena
            .by_id
            .get(id)
            .into_iter()
            .flatten()
            .map(|&index| self.node(index))
    }

    /// Sum of all node click counters.
    #[must_use]
    pub fn total_clicks(&self) -> u32 {
        self.arena
            .nodes
            .iter()
            .map(|node| node.clicks.load(Ordering::Relaxed))
            .sum()
    }

    fn node(&self, index: usize) -> VirtualNode {
        VirtualNode {
            arena: Arc::clone(&self.arena),
            index,
        }
    }
}

/// Handle to one node of a [`VirtualTree`].
#[derive(Clone)]
pub struct VirtualNode {
    arena: Arc<Arena>,
    index: usize,
}

impl VirtualNode {
    fn data(&self) -> &NodeData {
        &self.arena.nodes[self.index]
    }

    fn sibling(&self, index: usize) -> Self {
        Self {
            arena: Arc::clone(&self.arena),
            index,
        }
    }

    /// The tree this node belongs to.
    #[must_use]
    pub fn tree(&self) -> VirtualTree {
        VirtualTree {
            arena: Arc::clone(&self.arena),
        }
    }

    #[must_use]
    pub fn class(&self) -> &str {
        &self.data().class
    }

    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.data().id.as_deref()
    }

    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.data().text.as_deref()
    }

    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        self.data().parent.map(|index| self.sibling(index))
    }

    pub fn children(&self) -> impl Iterator<Item = VirtualNode> + '_ {
        self.data()
            .children
            .iter()
            .map(|&index| self.sibling(index))
    }

    /// How many times this node was clicked through [`UiNode::perform_click`].
    #[must_use]
    pub fn clicks(&self) -> u32 {
        self.data().clicks.load(Ordering::Relaxed)
    }

    /// `true` if `self` is `ancestor` or lies below it.
    #[must_use]
    pub fn is_within(&self, ancestor: &VirtualNode) -> bool {
        if !Arc::ptr_eq(&self.arena, &ancestor.arena) {
            return false;
        }
        let mut current = Some(self.index);
        while let Some(index) = current {
            if index == ancestor.index {
                return true;
            }
            current = self.arena.nodes[index].parent;
        }
        false
    }

    /// This node followed by its descendants, breadth-first.
    #[must_use]
    pub fn breadth_first(&self) -> BreadthFirst {
        BreadthFirst {
            arena: Arc::clone(&self.arena),
            queue: VecDeque::from([self.index]),
        }
    }
}

impl PartialEq for VirtualNode {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.arena, &other.arena) && self.index == other.index
    }
}

impl Eq for VirtualNode {}

impl fmt::Debug for VirtualNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VirtualNode")
            .field("index", &self.index)
            .field("class", &self.class())
            .field("id", &self.id())
            .field("text", &self.text())
            .finish()
    }
}

impl UiNode for VirtualNode {
    fn is_clickable(&self) -> bool {
        self.data().clickable
    }

    fn bounds_in_screen(&self) -> Rect {
        self.data().bounds
    }

    fn perform_click(&self) -> bool {
        let data = self.data();
        data.clicks.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(node = ?self, clickable = data.clickable, "node clicked");
        data.clickable
    }
}

/// Breadth-first walk started from a node, see [`VirtualNode::breadth_first`].
pub struct BreadthFirst {
    arena: Arc<Arena>,
    queue: VecDeque<usize>,
}

impl Iterator for BreadthFirst {
    type Item = VirtualNode;

    fn next(&mut self) -> Option<VirtualNode> {
        let index = self.queue.pop_front()?;
        self.queue.extend(self.arena.nodes[index].children.iter().copied());
        Some(VirtualNode {
            arena: Arc::clone(&self.arena),
            index,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(json: serde_json::Value) -> NodeRecord {
        serde_json::from_value(json).unwrap()
    }

    // FrameLayout ─┬─ LinearLayout(panel) ─┬─ TextView "Skip" (skip)
    //              │                       └─ TextView "5s"
    //              └─ Button "Close" (close)
    fn splash() -> VirtualTree {
        VirtualTree::from_record(&record(serde_json::json!({
            "class": "android.widget.FrameLayout",
            "bounds": { "left": 0, "top": 0, "right": 1080, "bottom": 1920 },
            "children": [
                {
                    "class": "android.widget.LinearLayout",
                    "id": "panel",
                    "children": [
                        { "class": "android.widget.TextView", "id": "skip", "text": "Skip", "clickable": true },
                        { "class": "android.widget.TextView", "text": "5s" }
                    ]
                },
                { "class": "android.widget.Button", "id": "close", "text": "Close", "clickable": true }
            ]
        })))
    }

    #[test]
    fn should_store_nodes_breadth_first() {
        let tree = splash();
        let order: Vec<_> = tree
            .root()
            .breadth_first()
            .map(|n| n.text().unwrap_or(n.class()).to_string())
            .collect();
        assert_eq!(
            order,
            vec![
                "android.widget.FrameLayout",
                "android.widget.LinearLayout",
                "Close",
                "Skip",
                "5s",
            ]
        );
        assert_eq!(tree.len(), 5);
    }

    #[test]
    fn should_link_parents_and_children() {
        let tree = splash();
        let panel = tree.find_by_id("panel").next().unwrap();
        let children: Vec<_> = panel.children().filter_map(|n| n.text().map(str::to_string)).collect();
        assert_eq!(children, vec!["Skip", "5s"]);
        assert_eq!(panel.parent(), Some(tree.root()));
        assert_eq!(tree.root().parent(), None);
    }

    #[test]
    fn should_find_nodes_by_id() {
        let tree = splash();
        assert_eq!(tree.find_by_id("skip").count(), 1);
        assert_eq!(tree.find_by_id("missing").count(), 0);
    }

    #[test]
    fn should_tell_whether_node_is_within_another() {
        let tree = splash();
        let panel = tree.find_by_id("panel").next().unwrap();
        let skip = tree.find_by_id("skip").next().unwrap();
        let close = tree.find_by_id("close").next().unwrap();

        assert!(skip.is_within(&panel));
        assert!(panel.is_within(&panel));
        assert!(!close.is_within(&panel));
        assert!(!skip.is_within(&splash().root()));
    }

    #[test]
    fn should_count_clicks_and_report_clickability() {
        let tree = splash();
        let skip = tree.find_by_id("skip").next().unwrap();
        let panel = tree.find_by_id("panel").next().unwrap();

        assert!(skip.perform_click());
        assert!(!panel.perform_click());
        assert_eq!(skip.clicks(), 1);
        assert_eq!(tree.total_clicks(), 2);
    }

    #[test]
    fn should_default_missing_fields() {
        let node = record(serde_json::json!({}));
        assert_eq!(node, NodeRecord::default());
        assert!(!VirtualTree::from_record(&node).root().is_clickable());
    }
}
