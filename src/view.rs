//! Node accessor
//!
//! `View` is a thin handle over one externally-owned node. Every read goes
//! straight to the host, so values are as fresh (and as perishable) as the
//! hierarchy itself. Direct reads surface `StaleNode`; traversals absorb it.

use std::fmt;
use std::sync::Arc;

use log::debug;

use crate::config::{MarkConfig, NO_ID};
use crate::error::Result;
use crate::geom::Rect;
use crate::host::{ClassHandle, ListenerSlot, NodeId, ViewHost};
use crate::selector::Selector;

#[derive(Clone)]
pub struct View {
    host: Arc<dyn ViewHost>,
    node: NodeId,
}

impl View {
    /// Wrap a raw handle, verifying it refers to a view. This is the only
    /// constructor that can fail; the error is `TypeMismatch`.
    pub fn from_handle(host: Arc<dyn ViewHost>, node: NodeId) -> Result<Self> {
        host.expect_view(node)?;
        Ok(Self { host, node })
    }

    /// Wrap a handle the host already vouched for (child/parent/root
    /// enumeration only hands out view handles).
    pub(crate) fn trusted(host: Arc<dyn ViewHost>, node: NodeId) -> Self {
        Self { host, node }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Child accessors in external order, `Ok(None)` when this node is not a
    /// container. `Some(vec![])` is a childless container.
    pub fn children(&self) -> Result<Option<Vec<View>>> {
        if !self.host.is_container(self.node)? {
            return Ok(None);
        }
        let count = self.host.child_count(self.node)?;
        let mut children = Vec::with_capacity(count);
        for index in 0..count {
            let child = self.host.child_at(self.node, index)?;
            children.push(View::trusted(Arc::clone(&self.host), child));
        }
        Ok(Some(children))
    }

    /// Parent accessor, `Ok(None)` at a window root.
    pub fn parent(&self) -> Result<Option<View>> {
        Ok(self
            .host
            .parent(self.node)?
            .map(|parent| View::trusted(Arc::clone(&self.host), parent)))
    }

    /// Text content, `Ok(None)` for classes that carry none.
    pub fn text(&self) -> Result<Option<String>> {
        self.host.text(self.node)
    }

    /// Accessibility description, `Ok(None)` when unset.
    pub fn description(&self) -> Result<Option<String>> {
        self.host.description(self.node)
    }

    /// Raw numeric id, `NO_ID` (-1) when unassigned.
    pub fn id(&self) -> Result<i64> {
        self.host.id_value(self.node)
    }

    /// Hex rendering of the id; an unassigned id renders as `-1`.
    pub fn id_hex(&self) -> Result<String> {
        let id = self.id()?;
        if id == NO_ID {
            return Ok(NO_ID.to_string());
        }
        if id < 0 {
            return Ok(format!("-0x{:x}", -id));
        }
        Ok(format!("0x{:x}", id))
    }

    /// Resource entry name behind the id, `Ok(None)` when unresolvable.
    pub fn id_name(&self) -> Result<Option<String>> {
        self.host.id_entry_name(self.node)
    }

    pub fn class_name(&self) -> Result<String> {
        self.host.class_name(self.node)
    }

    pub fn is_instance_of(&self, class: ClassHandle) -> Result<bool> {
        self.host.is_instance_of(self.node, class)
    }

    /// Current screen bounds; degenerate rects are reported as-is.
    pub fn bounds(&self) -> Result<Rect> {
        self.host.bounds(self.node)
    }

    /// One-line runtime description, toString-style.
    pub fn describe(&self) -> Result<String> {
        self.host.describe(self.node)
    }

    /// Selector rooted at this view.
    pub fn selector(&self) -> Selector {
        Selector::new(self.clone())
    }

    /// setEnabled passthrough (revives grayed-out controls).
    pub fn enable(&self, state: bool) -> Result<()> {
        self.host.set_enabled(self.node, state)
    }

    /// Flash the default highlight over this view. See [`View::mark_with`].
    pub fn mark(&self) {
        self.mark_with(&MarkConfig::default());
    }

    /// Swap the node's foreground for a solid highlight on the main context,
    /// then restore the original after `mark.revert_after` on that same
    /// context. Fire-and-forget; failures are logged, not returned.
    pub fn mark_with(&self, mark: &MarkConfig) {
        let host = Arc::clone(&self.host);
        let node = self.node;
        let color = mark.color;
        let revert_after = mark.revert_after;
        self.host.scheduler().run_on_main(Box::new(move || {
            let token = match host.swap_foreground_highlight(node, color) {
                Ok(token) => token,
                Err(err) => {
                    debug!("mark skipped for node {node}: {err}");
                    return;
                }
            };
            if let Err(err) = host.invalidate(node) {
                debug!("invalidate after mark failed for node {node}: {err}");
            }
            let revert = Arc::clone(&host);
            host.scheduler().run_on_main_after(
                revert_after,
                Box::new(move || {
                    let restored = revert
                        .restore_foreground(node, token)
                        .and_then(|()| revert.invalidate(node));
                    if let Err(err) = restored {
                        debug!("mark revert failed for node {node}: {err}");
                    }
                }),
            );
        }));
    }

    /// Event-listener slots installed on this node. `names` filters by slot
    /// name with the first letter case-folded ("click" selects "Click");
    /// empty `names` returns every slot the host can see.
    pub fn listeners(&self, names: &[&str]) -> Result<Vec<ListenerSlot>> {
        let slots = self.host.listener_names(self.node)?;
        if names.is_empty() {
            return Ok(slots);
        }
        let wanted: Vec<String> = names.iter().map(|name| capitalize(name)).collect();
        Ok(slots
            .into_iter()
            .filter(|slot| wanted.iter().any(|name| *name == slot.name))
            .collect())
    }

    /// Render this subtree as one line per node, each prefixed with its
    /// child-index path (`0|2|1| …`). When `limit` cuts the recursion the
    /// hidden children are summarized as `[N children(s) ...]`. Unreadable
    /// nodes are skipped together with their subtrees.
    pub fn render_tree(&self, limit: Option<usize>) -> String {
        let mut out = String::new();
        let mut stack = Vec::new();
        self.render_into(&mut out, &mut stack, limit);
        out
    }

    fn render_into(&self, out: &mut String, stack: &mut Vec<usize>, limit: Option<usize>) {
        let line = match self.describe() {
            Ok(line) => line,
            Err(err) => {
                debug!("tree skips node {}: {}", self.node, err);
                return;
            }
        };
        for index in stack.iter() {
            out.push_str(&index.to_string());
            out.push('|');
        }
        out.push(' ');
        out.push_str(&line);
        out.push('\n');

        let children = match self.children() {
            Ok(Some(children)) => children,
            Ok(None) => return,
            Err(err) => {
                debug!("tree skips children of node {}: {}", self.node, err);
                return;
            }
        };
        match limit {
            Some(limit) if stack.len() >= limit => {
                for _ in 0..stack.len() {
                    out.push_str("  ");
                }
                out.push_str(&format!("  [{} children(s) ...]\n", children.len()));
            }
            _ => {
                for (index, child) in children.iter().enumerate() {
                    stack.push(index);
                    child.render_into(out, stack, limit);
                    stack.pop();
                }
            }
        }
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

impl fmt::Debug for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("View").field("node", &self.node).finish()
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.describe() {
            Ok(line) => write!(f, "View{{ {} }}", line),
            Err(_) => write!(f, "View{{ <node {} unreadable> }}", self.node),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_MARK_COLOR;
    use crate::hosts::mem::MemHost;
    use std::time::Duration;

    fn demo() -> (Arc<MemHost>, View) {
        let mem = Arc::new(MemHost::demo());
        let root = mem.focused_root_id().unwrap();
        let view = View::from_handle(mem.clone() as Arc<dyn ViewHost>, root).unwrap();
        (mem, view)
    }

    #[test]
    fn test_construction_rejects_non_view() {
        let mem = Arc::new(MemHost::demo());
        let intent = mem.intern_opaque("android.content.Intent");
        let err = View::from_handle(mem as Arc<dyn ViewHost>, intent).unwrap_err();
        assert!(matches!(
            err,
            crate::error::ProbeError::TypeMismatch { .. }
        ));
    }

    #[test]
    fn test_children_order_and_leaf() {
        let (_, root) = demo();
        let children = root.children().unwrap().unwrap();
        assert!(!children.is_empty());

        let title = root
            .selector()
            .id("title")
            .find()
            .expect("demo tree has a #title node");
        assert!(title.children().unwrap().is_none());
    }

    #[test]
    fn test_text_absent_on_non_text_nodes() {
        let (_, root) = demo();
        assert_eq!(root.text().unwrap(), None);

        let title = root.selector().id("title").find().unwrap();
        assert!(title.text().unwrap().is_some());
    }

    #[test]
    fn test_id_hex_renders_no_id_as_minus_one() {
        let (_, root) = demo();
        assert_eq!(root.id().unwrap(), NO_ID);
        assert_eq!(root.id_hex().unwrap(), "-1");

        let title = root.selector().id("title").find().unwrap();
        let hex = title.id_hex().unwrap();
        assert!(hex.starts_with("0x7f"), "got {hex}");
    }

    #[test]
    fn test_parent_linkage() {
        let (_, root) = demo();
        assert!(root.parent().unwrap().is_none());

        let title = root.selector().id("title").find().unwrap();
        let parent = title.parent().unwrap().unwrap();
        let children = parent.children().unwrap().unwrap();
        assert!(children.iter().any(|child| child.node() == title.node()));
    }

    #[test]
    fn test_stale_read_is_an_error() {
        let (mem, root) = demo();
        let title = root.selector().id("title").find().unwrap();
        mem.detach(title.node());
        let err = title.text().unwrap_err();
        assert!(err.is_stale());
    }

    #[test]
    fn test_render_tree_prefixes() {
        let (_, root) = demo();
        let dump = root.render_tree(None);
        let lines: Vec<&str> = dump.lines().collect();
        assert!(lines[0].starts_with(' '), "root line: {:?}", lines[0]);
        assert!(lines[1].starts_with("0| "), "first child: {:?}", lines[1]);
        assert!(
            lines.iter().any(|line| line.starts_with("0|0| ")),
            "expected a grandchild line in:\n{dump}"
        );
    }

    #[test]
    fn test_render_tree_elision() {
        let (_, root) = demo();
        let dump = root.render_tree(Some(1));
        assert!(
            dump.contains("children(s) ...]"),
            "expected an elision line in:\n{dump}"
        );
        assert!(!dump.contains("0|0| "), "depth limit ignored:\n{dump}");
    }

    #[test]
    fn test_mark_swaps_then_reverts() {
        let (mem, root) = demo();
        let button = root.selector().id("submit").find().unwrap();
        button.mark();

        mem.run_main_ready();
        assert_eq!(mem.overlay(button.node()), Some(DEFAULT_MARK_COLOR));

        mem.advance_main(Duration::from_secs(3));
        assert_eq!(mem.overlay(button.node()), None);
    }

    #[test]
    fn test_enable_is_immediate() {
        let (mem, root) = demo();
        let button = root.selector().id("submit").find().unwrap();
        button.enable(false).unwrap();
        assert!(!mem.enabled(button.node()));
        button.enable(true).unwrap();
        assert!(mem.enabled(button.node()));
    }

    #[test]
    fn test_listeners_filter_capitalizes() {
        let (_, root) = demo();
        let button = root.selector().id("submit").find().unwrap();

        let all = button.listeners(&[]).unwrap();
        assert!(all.iter().any(|slot| slot.name == "Click"));

        let filtered = button.listeners(&["click"]).unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].name, "Click");
        assert!(filtered[0].handler.is_some());
    }
}
