//! Host boundary
//!
//! Everything the engine knows about a runtime goes through `ViewHost`. The
//! trait is object-safe and consumed as `Arc<dyn ViewHost>`, so the selector
//! machinery works identically over the in-memory host and the live Android
//! host. Attribute reads are fresh queries; nothing at this boundary caches.

use std::fmt;
use std::time::Duration;

use log::warn;

use crate::error::{ProbeError, Result};
use crate::geom::Rect;

/// Opaque handle to an externally-owned view node.
///
/// Handles are only meaningful to the host that issued them. A handle may go
/// stale at any time; reads through a stale handle fail with `StaleNode`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Host-resolved class handle, produced by `resolve_class`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ClassHandle(pub u64);

/// Receipt for a foreground swap; required to restore the original drawable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ForegroundToken(pub u64);

/// One `mOn<Name>Listener` slot on a node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListenerSlot {
    /// Slot name with the `mOn`/`Listener` affixes stripped ("Click", "Touch").
    pub name: String,
    /// Class name of the installed handler, `None` when the slot is empty.
    pub handler: Option<String>,
}

/// One entry of the runtime's activity table.
#[derive(Clone, Debug)]
pub struct ActivityRecord {
    pub class_name: String,
    pub paused: bool,
    /// Decor root of the activity's window, when it has one attached.
    pub root: Option<NodeId>,
    /// Launch intent in URI form.
    pub intent_uri: Option<String>,
}

/// Task submitted to the host's primary (UI) execution context.
pub type MainTask = Box<dyn FnOnce() + Send + 'static>;

/// Scheduler for the host's primary execution context.
///
/// Tasks run in FIFO submission order, or never (process death). There is no
/// cancellation and callers must not depend on completion.
pub trait MainScheduler: Send + Sync {
    fn run_on_main(&self, task: MainTask);
    fn run_on_main_after(&self, delay: Duration, task: MainTask);
}

/// Capability surface a runtime exposes to the engine.
///
/// Required methods cover structure, attributes, classes, windows and the
/// mutators every host has. Optional capabilities default to `Unsupported`
/// so hosts only implement what they can actually do.
pub trait ViewHost: Send + Sync {
    /// Kind check for accessor construction: fails with `TypeMismatch` when
    /// the handle does not refer to a view.
    fn expect_view(&self, node: NodeId) -> Result<()>;

    fn is_container(&self, node: NodeId) -> Result<bool>;
    fn child_count(&self, node: NodeId) -> Result<usize>;
    fn child_at(&self, node: NodeId, index: usize) -> Result<NodeId>;
    /// Parent node, `None` at a window root.
    fn parent(&self, node: NodeId) -> Result<Option<NodeId>>;

    /// Text content, `None` for classes that carry none.
    fn text(&self, node: NodeId) -> Result<Option<String>>;
    fn description(&self, node: NodeId) -> Result<Option<String>>;
    /// Raw numeric id, `config::NO_ID` when unassigned.
    fn id_value(&self, node: NodeId) -> Result<i64>;
    /// Resource entry name for the id, `None` when unresolvable.
    fn id_entry_name(&self, node: NodeId) -> Result<Option<String>>;
    fn class_name(&self, node: NodeId) -> Result<String>;
    /// Screen bounds, passed through as reported (degenerate rects allowed).
    fn bounds(&self, node: NodeId) -> Result<Rect>;
    /// One-line runtime description of the node, toString-style.
    fn describe(&self, node: NodeId) -> Result<String>;

    fn resolve_class(&self, fqcn: &str) -> Result<ClassHandle>;
    fn is_instance_of(&self, node: NodeId, class: ClassHandle) -> Result<bool>;

    fn window_roots(&self) -> Result<Vec<NodeId>>;
    fn has_window_focus(&self, root: NodeId) -> Result<bool>;
    fn activities(&self) -> Result<Vec<ActivityRecord>>;

    fn set_enabled(&self, node: NodeId, state: bool) -> Result<()>;
    /// Replace the node's foreground with a solid highlight; the returned
    /// token restores the original via `restore_foreground`.
    fn swap_foreground_highlight(&self, node: NodeId, color: u32) -> Result<ForegroundToken>;
    fn restore_foreground(&self, node: NodeId, token: ForegroundToken) -> Result<()>;
    fn invalidate(&self, node: NodeId) -> Result<()>;
    /// Redraw request for a whole window, addressed by its root.
    fn invalidate_root(&self, root: NodeId) -> Result<()>;

    fn scheduler(&self) -> &dyn MainScheduler;

    fn set_debug_draw(&self, state: bool) -> Result<()> {
        let _ = state;
        warn!("host cannot toggle layout borders");
        Err(ProbeError::Unsupported("layout border toggling"))
    }

    fn set_web_debugging(&self, state: bool) -> Result<()> {
        let _ = state;
        warn!("host cannot toggle WebView debugging");
        Err(ProbeError::Unsupported("WebView debugging"))
    }

    fn set_click_watch(&self, state: bool) -> Result<()> {
        let _ = state;
        warn!("host cannot watch clicks");
        Err(ProbeError::Unsupported("click watching"))
    }

    fn listener_names(&self, node: NodeId) -> Result<Vec<ListenerSlot>> {
        let _ = node;
        Err(ProbeError::Unsupported("listener reflection"))
    }
}
