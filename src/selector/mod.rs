//! Selector engine
//!
//! A `Selector` pairs a root view with an ordered list of weight filters and
//! evaluates them over the live subtree:
//! - combined weight is the product of all filter weights (an empty set is 1)
//! - `find` returns the strictly-highest-weight node, first visited wins ties
//! - `find_all` returns every accepted node in pre-order, unranked
//!
//! Depth-first traversal hands filters a 1-based depth; breadth-first hands
//! them none. The external tree is assumed finite.

pub mod filters;
mod walk;

use std::fmt;
use std::str::FromStr;

pub use filters::{ClassMatch, Filter, IdMatch, TextMatch};

use crate::error::ProbeError;
use crate::geom::Rect;
use crate::view::View;

/// Visit order for [`Selector::find_with`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Traversal {
    #[default]
    DepthFirst,
    BreadthFirst,
}

impl FromStr for Traversal {
    type Err = ProbeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dfs" => Ok(Traversal::DepthFirst),
            "bfs" => Ok(Traversal::BreadthFirst),
            other => Err(ProbeError::Console(format!(
                "unknown traversal '{}' (expected dfs or bfs)",
                other
            ))),
        }
    }
}

pub struct Selector {
    root: View,
    filters: Vec<Filter>,
}

impl Selector {
    pub fn new(root: View) -> Self {
        Self {
            root,
            filters: Vec::new(),
        }
    }

    /// Require a text match. See [`filters::text`].
    pub fn text(mut self, spec: impl Into<TextMatch>) -> Self {
        self.filters.push(filters::text(spec));
        self
    }

    /// Require a description match. See [`filters::desc`].
    pub fn desc(mut self, spec: impl Into<TextMatch>) -> Self {
        self.filters.push(filters::desc(spec));
        self
    }

    /// Require an id match. See [`filters::id`].
    pub fn id(mut self, spec: impl Into<IdMatch>) -> Self {
        self.filters.push(filters::id(spec));
        self
    }

    /// Require a class match. See [`filters::class`].
    pub fn class(mut self, spec: impl Into<ClassMatch>) -> Self {
        self.filters.push(filters::class(spec));
        self
    }

    /// Keep only nodes fully inside `reference`. See [`filters::bounds_inside`].
    pub fn bounds_inside(mut self, reference: Rect) -> Self {
        self.filters.push(filters::bounds_inside(reference));
        self
    }

    /// Keep only nodes containing the point, depth-weighted under
    /// depth-first search. See [`filters::bounds_contains`].
    pub fn bounds_contains(mut self, x: i32, y: i32) -> Self {
        self.filters.push(filters::bounds_contains(x, y));
        self
    }

    /// Append an arbitrary filter.
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn filter_count(&self) -> usize {
        self.filters.len()
    }

    pub fn root(&self) -> &View {
        &self.root
    }

    /// Combined weight; `None` when any filter rejects. The product is taken
    /// over every filter regardless of zeros, since filters are pure and
    /// order-independent by contract.
    fn weigh(&self, view: &View, depth: Option<usize>) -> Option<f64> {
        let mut weight = 1.0;
        for filter in &self.filters {
            weight *= filter.weigh(view, depth);
        }
        (weight > 0.0).then_some(weight)
    }

    /// Best match under depth-first traversal.
    pub fn find(&self) -> Option<View> {
        self.find_with(Traversal::default())
    }

    /// Visit the whole subtree in the given order and return the match with
    /// the strictly greatest weight; among equals the first visited wins.
    pub fn find_with(&self, traversal: Traversal) -> Option<View> {
        let mut best: Option<(f64, View)> = None;
        let mut consider = |view: &View, weight: f64| {
            let replace = match &best {
                Some((top, _)) => weight > *top,
                None => true,
            };
            if replace {
                best = Some((weight, view.clone()));
            }
        };
        match traversal {
            Traversal::DepthFirst => walk::dfs(&self.root, &mut |view, depth| {
                if let Some(weight) = self.weigh(view, Some(depth)) {
                    consider(view, weight);
                }
            }),
            Traversal::BreadthFirst => walk::bfs(&self.root, &mut |view, _| {
                if let Some(weight) = self.weigh(view, None) {
                    consider(view, weight);
                }
            }),
        }
        best.map(|(_, view)| view)
    }

    /// Every accepted node in depth-first pre-order, unranked.
    pub fn find_all(&self) -> Vec<View> {
        let mut matches = Vec::new();
        walk::dfs(&self.root, &mut |view, depth| {
            if self.weigh(view, Some(depth)).is_some() {
                matches.push(view.clone());
            }
        });
        matches
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Selector{{ ({} filters...) }}", self.filters.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Rect;
    use crate::host::{NodeId, ViewHost};
    use crate::hosts::mem::{MemHost, Snapshot, SnapshotNode, SnapshotWindow};
    use std::sync::Arc;

    fn node(class: &str, bounds: Rect, children: Option<Vec<SnapshotNode>>) -> SnapshotNode {
        SnapshotNode {
            class: class.to_string(),
            bounds,
            children,
            ..SnapshotNode::default()
        }
    }

    fn host_with(root: SnapshotNode) -> (Arc<MemHost>, View) {
        let snapshot = Snapshot {
            windows: vec![SnapshotWindow {
                root,
                focused: true,
            }],
            ..Snapshot::default()
        };
        let mem = Arc::new(MemHost::from_snapshot(snapshot));
        let root = mem.focused_root_id().unwrap();
        let view = View::from_handle(mem.clone() as Arc<dyn ViewHost>, root).unwrap();
        (mem, view)
    }

    fn demo() -> (Arc<MemHost>, View) {
        let mem = Arc::new(MemHost::demo());
        let root = mem.focused_root_id().unwrap();
        let view = View::from_handle(mem.clone() as Arc<dyn ViewHost>, root).unwrap();
        (mem, view)
    }

    fn ids(views: &[View]) -> Vec<NodeId> {
        views.iter().map(View::node).collect()
    }

    #[test]
    fn test_find_all_idempotent_on_unmodified_tree() {
        let (_, root) = demo();
        let first = root.selector().class("android.widget.EditText").find_all();
        let second = root.selector().class("android.widget.EditText").find_all();
        assert_eq!(ids(&first), ids(&second));
        assert!(!first.is_empty());
    }

    #[test]
    fn test_find_result_is_in_find_all() {
        let (_, root) = demo();
        let best = root.selector().text("Submit").find().unwrap();
        let all = root.selector().text("Submit").find_all();
        assert!(ids(&all).contains(&best.node()));
    }

    #[test]
    fn test_zero_filters_selects_every_node_in_preorder() {
        let (_, root) = demo();
        let all = root.selector().find_all();

        let mut expected = Vec::new();
        fn collect(view: &View, into: &mut Vec<NodeId>) {
            into.push(view.node());
            if let Ok(Some(children)) = view.children() {
                for child in &children {
                    collect(child, into);
                }
            }
        }
        collect(&root, &mut expected);
        assert_eq!(ids(&all), expected);
    }

    #[test]
    fn test_always_zero_filter_empties_both_entry_points() {
        let (_, root) = demo();
        let none = root
            .selector()
            .class("android.widget.Button")
            .filter(filters::custom("never", |_, _| 0.0))
            .find_all();
        assert!(none.is_empty());

        let found = root
            .selector()
            .class("android.widget.Button")
            .filter(filters::custom("never", |_, _| 0.0))
            .find();
        assert!(found.is_none());
    }

    #[test]
    fn test_dfs_depth_weights_beat_bfs_first_visit() {
        // Root and its child both contain (5,5); only depth-first search
        // weighs the deeper node higher.
        let inner = node("android.view.View", Rect::new(0, 0, 10, 10), None);
        let outer = node(
            "android.view.ViewGroup",
            Rect::new(0, 0, 100, 100),
            Some(vec![inner]),
        );
        let (_, root) = host_with(outer);

        let deep = root.selector().bounds_contains(5, 5).find().unwrap();
        assert_eq!(deep.class_name().unwrap(), "android.view.View");

        let shallow = root
            .selector()
            .bounds_contains(5, 5)
            .find_with(Traversal::BreadthFirst)
            .unwrap();
        assert_eq!(shallow.node(), root.node());
    }

    #[test]
    fn test_stale_child_leaves_siblings_matching() {
        let (mem, root) = demo();
        let panel = root
            .selector()
            .class("android.widget.FrameLayout")
            .find()
            .unwrap();
        mem.detach(panel.node());

        let all = root.selector().class("android.widget.EditText").find_all();
        assert_eq!(all.len(), 2);

        let buttons = root.selector().class("android.widget.Button").find_all();
        assert!(buttons.is_empty());
    }

    #[test]
    fn test_equal_weight_first_visited_wins() {
        let leaf = |bounds| node("android.widget.TextView", bounds, None);
        let root = node(
            "android.view.ViewGroup",
            Rect::new(0, 0, 100, 100),
            Some(vec![
                leaf(Rect::new(0, 0, 10, 10)),
                leaf(Rect::new(0, 0, 10, 10)),
            ]),
        );
        let (_, root) = host_with(root);
        let children = root.children().unwrap().unwrap();

        let winner = root
            .selector()
            .class("android.widget.TextView")
            .find()
            .unwrap();
        assert_eq!(winner.node(), children[0].node());
    }

    #[test]
    fn test_weights_multiply_across_filters() {
        // Two accepting filters with weights 2 and 3 rank a node above one
        // matched at 1 by a single filter.
        let (_, root) = demo();
        let boosted = root
            .selector()
            .filter(filters::custom("two", |view, _| {
                match view.text() {
                    Ok(Some(text)) if text == "Submit" => 2.0,
                    _ => 1.0,
                }
            }))
            .filter(filters::custom("three", |view, _| {
                match view.text() {
                    Ok(Some(text)) if text == "Submit" => 3.0,
                    _ => 1.0,
                }
            }))
            .find()
            .unwrap();
        assert_eq!(boosted.text().unwrap().as_deref(), Some("Submit"));
    }

    #[test]
    fn test_traversal_parses() {
        assert_eq!("dfs".parse::<Traversal>().unwrap(), Traversal::DepthFirst);
        assert_eq!("bfs".parse::<Traversal>().unwrap(), Traversal::BreadthFirst);
        assert!("best".parse::<Traversal>().is_err());
    }

    #[test]
    fn test_display_reports_filter_count() {
        let (_, root) = demo();
        let selector = root.selector().text("a").desc("b");
        assert_eq!(selector.to_string(), "Selector{ (2 filters...) }");
    }
}
