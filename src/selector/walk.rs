//! Traversal internals
//!
//! Two walks over a live subtree: depth-first pre-order and breadth-first
//! level order. Both hand the visitor a 1-based depth. A node whose child
//! list cannot be read is dropped together with its whole subtree and the
//! walk continues with the siblings; traversal never propagates errors.

use std::collections::VecDeque;

use log::debug;

use crate::view::View;

/// Depth-first pre-order visit of `root` and its descendants.
pub(super) fn dfs(root: &View, visit: &mut impl FnMut(&View, usize)) {
    dfs_inner(root, 1, visit);
}

fn dfs_inner(view: &View, depth: usize, visit: &mut impl FnMut(&View, usize)) {
    let children = match view.children() {
        Ok(children) => children,
        Err(err) => {
            debug!("walk drops node {} and its subtree: {}", view.node(), err);
            return;
        }
    };
    visit(view, depth);
    if let Some(children) = children {
        for child in &children {
            dfs_inner(child, depth + 1, visit);
        }
    }
}

/// Breadth-first level-order visit of `root` and its descendants.
pub(super) fn bfs(root: &View, visit: &mut impl FnMut(&View, usize)) {
    let mut queue = VecDeque::new();
    queue.push_back((root.clone(), 1usize));
    while let Some((view, depth)) = queue.pop_front() {
        let children = match view.children() {
            Ok(children) => children,
            Err(err) => {
                debug!("walk drops node {} and its subtree: {}", view.node(), err);
                continue;
            }
        };
        visit(&view, depth);
        if let Some(children) = children {
            for child in children {
                queue.push_back((child, depth + 1));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{NodeId, ViewHost};
    use crate::hosts::mem::{MemHost, Snapshot, SnapshotNode, SnapshotWindow};
    use std::sync::Arc;

    fn chip(class: &str, text: Option<&str>, children: Option<Vec<SnapshotNode>>) -> SnapshotNode {
        SnapshotNode {
            class: class.to_string(),
            text: text.map(str::to_string),
            children,
            ..SnapshotNode::default()
        }
    }

    /// root(A) -> [B(leaf text b), C -> [D(leaf text d)], E(leaf text e)]
    fn fixture() -> (Arc<MemHost>, View) {
        let root = chip(
            "android.view.ViewGroup",
            None,
            Some(vec![
                chip("android.widget.TextView", Some("b"), None),
                chip(
                    "android.view.ViewGroup",
                    None,
                    Some(vec![chip("android.widget.TextView", Some("d"), None)]),
                ),
                chip("android.widget.TextView", Some("e"), None),
            ]),
        );
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

    fn texts_of(order: &[(NodeId, usize)], mem: &MemHost) -> Vec<String> {
        order
            .iter()
            .map(|(node, _)| {
                mem.text(*node)
                    .unwrap_or(None)
                    .unwrap_or_else(|| "-".to_string())
            })
            .collect()
    }

    #[test]
    fn test_dfs_is_preorder_with_one_based_depth() {
        let (mem, root) = fixture();
        let mut order = Vec::new();
        dfs(&root, &mut |view, depth| order.push((view.node(), depth)));

        assert_eq!(texts_of(&order, &mem), ["-", "b", "-", "d", "e"]);
        let depths: Vec<usize> = order.iter().map(|(_, d)| *d).collect();
        assert_eq!(depths, [1, 2, 2, 3, 2]);
    }

    #[test]
    fn test_bfs_is_level_order() {
        let (mem, root) = fixture();
        let mut order = Vec::new();
        bfs(&root, &mut |view, depth| order.push((view.node(), depth)));

        assert_eq!(texts_of(&order, &mem), ["-", "b", "-", "e", "d"]);
        let depths: Vec<usize> = order.iter().map(|(_, d)| *d).collect();
        assert_eq!(depths, [1, 2, 2, 2, 3]);
    }

    #[test]
    fn test_unreadable_subtree_is_dropped_not_fatal() {
        let (mem, root) = fixture();
        let inner = root.children().unwrap().unwrap()[1].clone();
        mem.detach(inner.node());

        let mut order = Vec::new();
        dfs(&root, &mut |view, depth| order.push((view.node(), depth)));
        assert_eq!(texts_of(&order, &mem), ["-", "b", "e"]);

        let mut order = Vec::new();
        bfs(&root, &mut |view, depth| order.push((view.node(), depth)));
        assert_eq!(texts_of(&order, &mem), ["-", "b", "e"]);
    }
}
