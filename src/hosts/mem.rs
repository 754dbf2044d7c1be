//! In-memory host
//!
//! Serves a captured (or hand-built) hierarchy through the full `ViewHost`
//! surface. Three jobs: offline inspection of JSON snapshots, the default
//! demo tree when no snapshot is given, and the test rig for everything the
//! live host makes hard to observe: staleness, foreground swaps, scheduler
//! ordering.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use anyhow::anyhow;
use serde::{Deserialize, Serialize};

use crate::config::NO_ID;
use crate::error::{ProbeError, Result};
use crate::geom::Rect;
use crate::host::{
    ActivityRecord, ClassHandle, ForegroundToken, ListenerSlot, MainScheduler, MainTask, NodeId,
    ViewHost,
};

/// Snapshot document: one captured hierarchy plus the class table and
/// window/activity records needed to answer every host query offline.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Snapshot {
    /// Extra classes on top of the built-in Android table; same-name entries
    /// override built-ins.
    #[serde(default)]
    pub classes: Vec<SnapshotClass>,
    #[serde(default)]
    pub windows: Vec<SnapshotWindow>,
    #[serde(default)]
    pub activities: Vec<SnapshotActivity>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SnapshotClass {
    pub name: String,
    #[serde(default)]
    pub extends: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SnapshotWindow {
    pub root: SnapshotNode,
    #[serde(default)]
    pub focused: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SnapshotActivity {
    pub class: String,
    #[serde(default)]
    pub paused: bool,
    /// Index into `windows` for the activity's own window, if it has one.
    #[serde(default)]
    pub window: Option<usize>,
    #[serde(default)]
    pub intent: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SnapshotNode {
    pub class: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default = "default_id")]
    pub id: i64,
    #[serde(default)]
    pub id_name: Option<String>,
    #[serde(default)]
    pub bounds: Rect,
    /// Absent = not a container; an empty list is a childless container.
    #[serde(default)]
    pub children: Option<Vec<SnapshotNode>>,
    #[serde(default)]
    pub listeners: Vec<SnapshotListener>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SnapshotListener {
    pub name: String,
    #[serde(default)]
    pub handler: Option<String>,
}

fn default_id() -> i64 {
    NO_ID
}

fn default_enabled() -> bool {
    true
}

impl Default for SnapshotNode {
    fn default() -> Self {
        Self {
            class: "android.view.View".to_string(),
            text: None,
            desc: None,
            id: NO_ID,
            id_name: None,
            bounds: Rect::default(),
            children: None,
            listeners: Vec::new(),
            enabled: true,
        }
    }
}

/// Built-in class table: the classes the registry expects plus the common
/// widget hierarchy, with single-inheritance chains for instance-of checks.
fn builtin_classes() -> Vec<SnapshotClass> {
    const TABLE: &[(&str, Option<&str>)] = &[
        ("java.lang.Object", None),
        ("java.lang.Thread", Some("java.lang.Object")),
        ("java.util.WeakHashMap", Some("java.lang.Object")),
        ("android.app.Activity", Some("java.lang.Object")),
        ("android.app.ActivityThread", Some("java.lang.Object")),
        (
            "android.app.ActivityThread$ActivityClientRecord",
            Some("java.lang.Object"),
        ),
        ("android.graphics.Bitmap", Some("java.lang.Object")),
        ("android.graphics.Bitmap$Config", Some("java.lang.Object")),
        ("android.graphics.Canvas", Some("java.lang.Object")),
        ("android.graphics.Rect", Some("java.lang.Object")),
        (
            "android.graphics.drawable.BitmapDrawable",
            Some("java.lang.Object"),
        ),
        ("android.content.res.Resources", Some("java.lang.Object")),
        ("android.view.ViewRootImpl", Some("java.lang.Object")),
        ("android.view.WindowManagerGlobal", Some("java.lang.Object")),
        ("android.view.View", Some("java.lang.Object")),
        ("android.view.ViewGroup", Some("android.view.View")),
        ("android.widget.FrameLayout", Some("android.view.ViewGroup")),
        ("android.widget.LinearLayout", Some("android.view.ViewGroup")),
        ("android.widget.AbsoluteLayout", Some("android.view.ViewGroup")),
        ("android.webkit.WebView", Some("android.widget.AbsoluteLayout")),
        (
            "com.android.internal.policy.DecorView",
            Some("android.widget.FrameLayout"),
        ),
        ("android.widget.TextView", Some("android.view.View")),
        ("android.widget.EditText", Some("android.widget.TextView")),
        ("android.widget.Button", Some("android.widget.TextView")),
        ("android.widget.ImageView", Some("android.view.View")),
    ];
    TABLE
        .iter()
        .map(|(name, extends)| SnapshotClass {
            name: name.to_string(),
            extends: extends.map(str::to_string),
        })
        .collect()
}

struct NodeState {
    class: String,
    text: Option<String>,
    desc: Option<String>,
    id: i64,
    id_name: Option<String>,
    bounds: Rect,
    children: Option<Vec<NodeId>>,
    parent: Option<NodeId>,
    listeners: Vec<ListenerSlot>,
    enabled: bool,
    overlay: Option<u32>,
    invalidations: usize,
    stale: bool,
}

struct HostState {
    nodes: HashMap<NodeId, NodeState>,
    opaques: HashMap<NodeId, String>,
    /// Foreground saved per swap token; restoring puts it back.
    tokens: HashMap<u64, Option<u32>>,
    roots: Vec<NodeId>,
    focused: Option<NodeId>,
    activities: Vec<ActivityRecord>,
    classes: Vec<SnapshotClass>,
    class_index: HashMap<String, usize>,
    next_handle: u64,
    next_token: u64,
    clicks: Vec<String>,
    debug_draw: bool,
    web_debugging: bool,
    click_watch: bool,
}

impl HostState {
    fn insert_class(&mut self, class: SnapshotClass) {
        match self.class_index.get(&class.name) {
            Some(&index) => self.classes[index] = class,
            None => {
                self.class_index.insert(class.name.clone(), self.classes.len());
                self.classes.push(class);
            }
        }
    }

    fn intern(&mut self, node: SnapshotNode, parent: Option<NodeId>) -> NodeId {
        let handle = NodeId(self.next_handle);
        self.next_handle += 1;
        let children = node.children.map(|children| {
            children
                .into_iter()
                .map(|child| self.intern(child, Some(handle)))
                .collect()
        });
        let listeners = node
            .listeners
            .into_iter()
            .map(|slot| ListenerSlot {
                name: slot.name,
                handler: slot.handler,
            })
            .collect();
        self.nodes.insert(
            handle,
            NodeState {
                class: node.class,
                text: node.text,
                desc: node.desc,
                id: node.id,
                id_name: node.id_name,
                bounds: node.bounds,
                children,
                parent,
                listeners,
                enabled: node.enabled,
                overlay: None,
                invalidations: 0,
                stale: false,
            },
        );
        handle
    }
}

fn describe_node(node: NodeId, state: &NodeState) -> String {
    let hash = (node.0.wrapping_mul(0x9e3779b9) & 0xfff_ffff).max(1);
    let mut line = format!("{}{{{:x} {}", state.class, hash, state.bounds);
    if state.id != NO_ID {
        line.push_str(&format!(" #{:x}", state.id));
        if let Some(name) = &state.id_name {
            line.push_str(&format!(" app:id/{}", name));
        }
    }
    line.push('}');
    line
}

/// Deterministic stand-in for the main thread: a virtual clock over an
/// ordered task queue. Nothing runs until the owner drives the clock.
struct VirtualScheduler {
    queue: Mutex<TaskQueue>,
}

struct TaskQueue {
    now: Duration,
    seq: u64,
    tasks: Vec<Scheduled>,
}

struct Scheduled {
    due: Duration,
    seq: u64,
    task: MainTask,
}

impl VirtualScheduler {
    fn new() -> Self {
        Self {
            queue: Mutex::new(TaskQueue {
                now: Duration::ZERO,
                seq: 0,
                tasks: Vec::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, TaskQueue> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn push(&self, delay: Duration, task: MainTask) {
        let mut queue = self.lock();
        let due = queue.now + delay;
        let seq = queue.seq;
        queue.seq += 1;
        queue.tasks.push(Scheduled { due, seq, task });
    }

    fn pop_due(&self) -> Option<MainTask> {
        let mut queue = self.lock();
        let now = queue.now;
        let next = queue
            .tasks
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.due <= now)
            .min_by_key(|(_, entry)| (entry.due, entry.seq))
            .map(|(index, _)| index)?;
        Some(queue.tasks.remove(next).task)
    }

    /// Run every task due at the current virtual time, including tasks they
    /// schedule with no delay.
    fn run_ready(&self) {
        while let Some(task) = self.pop_due() {
            task();
        }
    }

    fn advance(&self, delta: Duration) {
        {
            let mut queue = self.lock();
            queue.now += delta;
        }
        self.run_ready();
    }

    /// Drive the clock forward until the queue is empty.
    fn flush(&self) {
        loop {
            self.run_ready();
            let next = self.lock().tasks.iter().map(|entry| entry.due).min();
            match next {
                Some(due) => {
                    let mut queue = self.lock();
                    if queue.now < due {
                        queue.now = due;
                    }
                }
                None => break,
            }
        }
    }
}

impl MainScheduler for VirtualScheduler {
    fn run_on_main(&self, task: MainTask) {
        self.push(Duration::ZERO, task);
    }

    fn run_on_main_after(&self, delay: Duration, task: MainTask) {
        self.push(delay, task);
    }
}

pub struct MemHost {
    state: Mutex<HostState>,
    scheduler: VirtualScheduler,
}

impl MemHost {
    /// Build a host over a snapshot document.
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let mut state = HostState {
            nodes: HashMap::new(),
            opaques: HashMap::new(),
            tokens: HashMap::new(),
            roots: Vec::new(),
            focused: None,
            activities: Vec::new(),
            classes: Vec::new(),
            class_index: HashMap::new(),
            next_handle: 1,
            next_token: 1,
            clicks: Vec::new(),
            debug_draw: false,
            web_debugging: false,
            click_watch: false,
        };
        for class in builtin_classes() {
            state.insert_class(class);
        }
        for class in snapshot.classes {
            state.insert_class(class);
        }
        for window in snapshot.windows {
            let root = state.intern(window.root, None);
            state.roots.push(root);
            if window.focused && state.focused.is_none() {
                state.focused = Some(root);
            }
        }
        let roots = state.roots.clone();
        state.activities = snapshot
            .activities
            .into_iter()
            .map(|activity| ActivityRecord {
                class_name: activity.class,
                paused: activity.paused,
                root: activity.window.and_then(|index| roots.get(index).copied()),
                intent_uri: activity.intent,
            })
            .collect();
        Self {
            state: Mutex::new(state),
            scheduler: VirtualScheduler::new(),
        }
    }

    /// Load a JSON snapshot from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data =
            fs::read_to_string(path).map_err(|err| ProbeError::from_snapshot_error(path, err))?;
        let snapshot: Snapshot = serde_json::from_str(&data)?;
        Ok(Self::from_snapshot(snapshot))
    }

    /// The built-in demo hierarchy: a sign-in screen plus a toast window.
    pub fn demo() -> Self {
        Self::from_snapshot(demo_snapshot())
    }

    fn state(&self) -> MutexGuard<'_, HostState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn with_node<T>(&self, node: NodeId, read: impl FnOnce(&NodeState) -> T) -> Result<T> {
        let state = self.state();
        let entry = state.nodes.get(&node).ok_or(ProbeError::StaleNode(node))?;
        if entry.stale {
            return Err(ProbeError::StaleNode(node));
        }
        Ok(read(entry))
    }

    fn with_node_mut<T>(&self, node: NodeId, write: impl FnOnce(&mut NodeState) -> T) -> Result<T> {
        let mut state = self.state();
        let entry = state
            .nodes
            .get_mut(&node)
            .ok_or(ProbeError::StaleNode(node))?;
        if entry.stale {
            return Err(ProbeError::StaleNode(node));
        }
        Ok(write(entry))
    }

    // --- test / console rig -------------------------------------------------

    pub fn root_ids(&self) -> Vec<NodeId> {
        self.state().roots.clone()
    }

    pub fn focused_root_id(&self) -> Option<NodeId> {
        self.state().focused
    }

    /// Mark a node and its whole subtree stale; subsequent reads fail with
    /// `StaleNode` while parents keep listing the node as a child.
    pub fn detach(&self, node: NodeId) {
        let mut state = self.state();
        let mut pending = vec![node];
        while let Some(current) = pending.pop() {
            if let Some(entry) = state.nodes.get_mut(&current) {
                entry.stale = true;
                if let Some(children) = &entry.children {
                    pending.extend(children.iter().copied());
                }
            }
        }
    }

    /// Register a non-view object; accessor construction over it fails with
    /// `TypeMismatch`.
    pub fn intern_opaque(&self, class: &str) -> NodeId {
        let mut state = self.state();
        let handle = NodeId(state.next_handle);
        state.next_handle += 1;
        state.opaques.insert(handle, class.to_string());
        handle
    }

    pub fn set_text(&self, node: NodeId, text: Option<&str>) {
        let mut state = self.state();
        if let Some(entry) = state.nodes.get_mut(&node) {
            entry.text = text.map(str::to_string);
        }
    }

    pub fn set_bounds(&self, node: NodeId, bounds: Rect) {
        let mut state = self.state();
        if let Some(entry) = state.nodes.get_mut(&node) {
            entry.bounds = bounds;
        }
    }

    pub fn overlay(&self, node: NodeId) -> Option<u32> {
        self.state().nodes.get(&node).and_then(|entry| entry.overlay)
    }

    pub fn enabled(&self, node: NodeId) -> bool {
        self.state()
            .nodes
            .get(&node)
            .map(|entry| entry.enabled)
            .unwrap_or(false)
    }

    pub fn invalidations(&self, node: NodeId) -> usize {
        self.state()
            .nodes
            .get(&node)
            .map(|entry| entry.invalidations)
            .unwrap_or(0)
    }

    pub fn debug_draw(&self) -> bool {
        self.state().debug_draw
    }

    pub fn web_debugging(&self) -> bool {
        self.state().web_debugging
    }

    pub fn click_watching(&self) -> bool {
        self.state().click_watch
    }

    /// Simulate a click; with click watching on, the node's description is
    /// recorded the way the live hook would log it.
    pub fn click(&self, node: NodeId) -> Result<()> {
        let line = self.with_node(node, |entry| describe_node(node, entry))?;
        let mut state = self.state();
        if state.click_watch {
            state.clicks.push(line);
        }
        Ok(())
    }

    pub fn clicks(&self) -> Vec<String> {
        self.state().clicks.clone()
    }

    /// Run main-context tasks due now (virtual time does not move).
    pub fn run_main_ready(&self) {
        self.scheduler.run_ready();
    }

    /// Move the virtual clock and run everything that becomes due.
    pub fn advance_main(&self, delta: Duration) {
        self.scheduler.advance(delta);
    }

    /// Drain the main-context queue completely.
    pub fn flush_main(&self) {
        self.scheduler.flush();
    }
}

impl ViewHost for MemHost {
    fn expect_view(&self, node: NodeId) -> Result<()> {
        let state = self.state();
        if state.nodes.contains_key(&node) {
            return Ok(());
        }
        if let Some(class) = state.opaques.get(&node) {
            return Err(ProbeError::TypeMismatch {
                expected: "android.view.View".to_string(),
                actual: class.clone(),
            });
        }
        Err(ProbeError::StaleNode(node))
    }

    fn is_container(&self, node: NodeId) -> Result<bool> {
        self.with_node(node, |entry| entry.children.is_some())
    }

    fn child_count(&self, node: NodeId) -> Result<usize> {
        self.with_node(node, |entry| {
            entry.children.as_ref().map(Vec::len).unwrap_or(0)
        })
    }

    fn child_at(&self, node: NodeId, index: usize) -> Result<NodeId> {
        self.with_node(node, |entry| {
            entry
                .children
                .as_ref()
                .and_then(|children| children.get(index).copied())
        })?
        .ok_or_else(|| ProbeError::Other(anyhow!("node {} has no child {}", node, index)))
    }

    fn parent(&self, node: NodeId) -> Result<Option<NodeId>> {
        self.with_node(node, |entry| entry.parent)
    }

    fn text(&self, node: NodeId) -> Result<Option<String>> {
        self.with_node(node, |entry| entry.text.clone())
    }

    fn description(&self, node: NodeId) -> Result<Option<String>> {
        self.with_node(node, |entry| entry.desc.clone())
    }

    fn id_value(&self, node: NodeId) -> Result<i64> {
        self.with_node(node, |entry| entry.id)
    }

    fn id_entry_name(&self, node: NodeId) -> Result<Option<String>> {
        self.with_node(node, |entry| entry.id_name.clone())
    }

    fn class_name(&self, node: NodeId) -> Result<String> {
        self.with_node(node, |entry| entry.class.clone())
    }

    fn bounds(&self, node: NodeId) -> Result<Rect> {
        self.with_node(node, |entry| entry.bounds)
    }

    fn describe(&self, node: NodeId) -> Result<String> {
        self.with_node(node, |entry| describe_node(node, entry))
    }

    fn resolve_class(&self, fqcn: &str) -> Result<ClassHandle> {
        self.state()
            .class_index
            .get(fqcn)
            .map(|&index| ClassHandle(index as u64))
            .ok_or_else(|| ProbeError::ClassNotFound(fqcn.to_string()))
    }

    fn is_instance_of(&self, node: NodeId, class: ClassHandle) -> Result<bool> {
        let state = self.state();
        let entry = state.nodes.get(&node).ok_or(ProbeError::StaleNode(node))?;
        if entry.stale {
            return Err(ProbeError::StaleNode(node));
        }
        let target = state
            .classes
            .get(class.0 as usize)
            .map(|class| class.name.clone())
            .ok_or_else(|| ProbeError::ClassNotFound(format!("<handle {}>", class.0)))?;
        let mut current = Some(entry.class.clone());
        while let Some(name) = current {
            if name == target {
                return Ok(true);
            }
            current = state
                .class_index
                .get(&name)
                .and_then(|&index| state.classes[index].extends.clone());
        }
        Ok(false)
    }

    fn window_roots(&self) -> Result<Vec<NodeId>> {
        Ok(self.state().roots.clone())
    }

    fn has_window_focus(&self, root: NodeId) -> Result<bool> {
        Ok(self.state().focused == Some(root))
    }

    fn activities(&self) -> Result<Vec<ActivityRecord>> {
        Ok(self.state().activities.clone())
    }

    fn set_enabled(&self, node: NodeId, state: bool) -> Result<()> {
        self.with_node_mut(node, |entry| entry.enabled = state)
    }

    fn swap_foreground_highlight(&self, node: NodeId, color: u32) -> Result<ForegroundToken> {
        let mut state = self.state();
        let token = ForegroundToken(state.next_token);
        state.next_token += 1;
        let entry = state
            .nodes
            .get_mut(&node)
            .ok_or(ProbeError::StaleNode(node))?;
        if entry.stale {
            return Err(ProbeError::StaleNode(node));
        }
        let previous = entry.overlay.replace(color);
        state.tokens.insert(token.0, previous);
        Ok(token)
    }

    fn restore_foreground(&self, node: NodeId, token: ForegroundToken) -> Result<()> {
        let mut state = self.state();
        let previous = state
            .tokens
            .remove(&token.0)
            .ok_or_else(|| ProbeError::Other(anyhow!("unknown foreground token {}", token.0)))?;
        let entry = state
            .nodes
            .get_mut(&node)
            .ok_or(ProbeError::StaleNode(node))?;
        if entry.stale {
            return Err(ProbeError::StaleNode(node));
        }
        entry.overlay = previous;
        Ok(())
    }

    fn invalidate(&self, node: NodeId) -> Result<()> {
        self.with_node_mut(node, |entry| entry.invalidations += 1)
    }

    fn invalidate_root(&self, root: NodeId) -> Result<()> {
        self.with_node_mut(root, |entry| entry.invalidations += 1)
    }

    fn scheduler(&self) -> &dyn MainScheduler {
        &self.scheduler
    }

    fn set_debug_draw(&self, state: bool) -> Result<()> {
        self.state().debug_draw = state;
        Ok(())
    }

    fn set_web_debugging(&self, state: bool) -> Result<()> {
        self.state().web_debugging = state;
        Ok(())
    }

    fn set_click_watch(&self, state: bool) -> Result<()> {
        self.state().click_watch = state;
        Ok(())
    }

    fn listener_names(&self, node: NodeId) -> Result<Vec<ListenerSlot>> {
        self.with_node(node, |entry| entry.listeners.clone())
    }
}

fn demo_snapshot() -> Snapshot {
    let title = SnapshotNode {
        class: "android.widget.TextView".to_string(),
        text: Some("Sign in".to_string()),
        id: 0x7f08_00a1,
        id_name: Some("title".to_string()),
        bounds: Rect::new(48, 180, 1032, 320),
        ..SnapshotNode::default()
    };
    let username = SnapshotNode {
        class: "android.widget.EditText".to_string(),
        text: Some(String::new()),
        desc: Some("Username field".to_string()),
        id: 0x7f08_00a2,
        id_name: Some("username".to_string()),
        bounds: Rect::new(48, 380, 1032, 520),
        ..SnapshotNode::default()
    };
    let password = SnapshotNode {
        class: "android.widget.EditText".to_string(),
        text: Some(String::new()),
        desc: Some("Password field".to_string()),
        id: 0x7f08_00a3,
        id_name: Some("password".to_string()),
        bounds: Rect::new(48, 560, 1032, 700),
        ..SnapshotNode::default()
    };
    let submit = SnapshotNode {
        class: "android.widget.Button".to_string(),
        text: Some("Submit".to_string()),
        desc: Some("Submit button".to_string()),
        id: 0x7f08_00a4,
        id_name: Some("submit".to_string()),
        bounds: Rect::new(48, 1268, 1032, 1412),
        listeners: vec![
            SnapshotListener {
                name: "Click".to_string(),
                handler: Some(
                    "com.example.app.LoginActivity$$ExternalSyntheticLambda0".to_string(),
                ),
            },
            SnapshotListener {
                name: "Touch".to_string(),
                handler: None,
            },
        ],
        ..SnapshotNode::default()
    };
    let panel = SnapshotNode {
        class: "android.widget.FrameLayout".to_string(),
        bounds: Rect::new(48, 1268, 1032, 1412),
        children: Some(vec![submit]),
        ..SnapshotNode::default()
    };
    let logo = SnapshotNode {
        class: "android.widget.ImageView".to_string(),
        desc: Some("Logo".to_string()),
        id: 0x7f08_0077,
        id_name: Some("logo".to_string()),
        bounds: Rect::new(390, 760, 690, 1060),
        ..SnapshotNode::default()
    };
    let layout = SnapshotNode {
        class: "android.widget.LinearLayout".to_string(),
        id: 0x7f08_0050,
        id_name: Some("main_layout".to_string()),
        bounds: Rect::new(0, 0, 1080, 2340),
        children: Some(vec![title, username, password, logo, panel]),
        ..SnapshotNode::default()
    };
    let decor = SnapshotNode {
        class: "com.android.internal.policy.DecorView".to_string(),
        bounds: Rect::new(0, 0, 1080, 2340),
        children: Some(vec![layout]),
        ..SnapshotNode::default()
    };

    let toast_text = SnapshotNode {
        class: "android.widget.TextView".to_string(),
        text: Some("Copied to clipboard".to_string()),
        bounds: Rect::new(240, 2060, 840, 2160),
        ..SnapshotNode::default()
    };
    let toast = SnapshotNode {
        class: "android.widget.FrameLayout".to_string(),
        bounds: Rect::new(220, 2040, 860, 2180),
        children: Some(vec![toast_text]),
        ..SnapshotNode::default()
    };

    Snapshot {
        classes: Vec::new(),
        windows: vec![
            SnapshotWindow {
                root: decor,
                focused: true,
            },
            SnapshotWindow {
                root: toast,
                focused: false,
            },
        ],
        activities: vec![
            SnapshotActivity {
                class: "com.example.app.SplashActivity".to_string(),
                paused: true,
                window: None,
                intent: Some(
                    "intent:#Intent;action=android.intent.action.MAIN;component=com.example.app/.SplashActivity;end"
                        .to_string(),
                ),
            },
            SnapshotActivity {
                class: "com.example.app.LoginActivity".to_string(),
                paused: false,
                window: Some(0),
                intent: Some(
                    "intent:#Intent;component=com.example.app/.LoginActivity;end".to_string(),
                ),
            },
        ],
    }
}
