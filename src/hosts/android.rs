//! Live Android host
//!
//! Reflects into the surrounding application's runtime through JNI: ViewGroup
//! child enumeration, TextView text, resource entry names, window roots via
//! WindowManagerGlobal, activity records via ActivityThread. Node handles are
//! global references interned per object; a Java exception raised while
//! reading a node is cleared and surfaced as `StaleNode`, so traversals over
//! a concurrently-mutated hierarchy degrade instead of aborting.
//!
//! [`AndroidHost::attach`] must run on the application's main thread: the
//! scheduler registers a pipe on that thread's looper and later marshals
//! tasks back onto it by writing boxed closures through the pipe.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::os::fd::{AsRawFd, BorrowedFd};
use std::os::unix::net::UnixStream;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use jni::objects::{GlobalRef, JClass, JObject, JObjectArray, JString, JValue};
use jni::{JNIEnv, JavaVM};
use log::{debug, warn};

use crate::config::NO_ID;
use crate::error::{ProbeError, Result};
use crate::geom::Rect;
use crate::host::{
    ActivityRecord, ClassHandle, ForegroundToken, ListenerSlot, MainScheduler, MainTask, NodeId,
    ViewHost,
};

fn jni_err(err: jni::errors::Error) -> ProbeError {
    ProbeError::Other(anyhow::Error::new(err))
}

/// Scheduler backed by the main thread's looper: tasks are boxed, their
/// pointers written through a socket pair whose read end is registered on the
/// looper, and unboxed and run by the looper callback. FIFO by pipe order;
/// delayed tasks sleep on a helper thread before entering the pipe.
struct LooperScheduler {
    writer: Mutex<UnixStream>,
}

impl LooperScheduler {
    /// Register on the current thread's looper. Fails off the main thread
    /// (or any thread without a looper).
    fn install() -> Result<Self> {
        let looper = ndk::looper::ThreadLooper::for_thread()
            .ok_or(ProbeError::Unsupported("main-context scheduling (no looper on this thread)"))?;
        let (mut reader, writer) = UnixStream::pair()
            .map_err(|err| ProbeError::Other(anyhow::Error::new(err)))?;
        reader
            .set_nonblocking(true)
            .map_err(|err| ProbeError::Other(anyhow::Error::new(err)))?;

        let mut pending: Vec<u8> = Vec::new();
        // the callback owns the reader, so the fd stays open as long as the
        // looper holds the registration
        let raw_fd = reader.as_raw_fd();
        looper
            .as_foreign()
            .add_fd_with_callback(
                unsafe { BorrowedFd::borrow_raw(raw_fd) },
                ndk::looper::FdEvent::INPUT,
                move |_fd, _events| {
                    let mut buf = [0u8; 256];
                    loop {
                        match reader.read(&mut buf) {
                            Ok(0) => return false,
                            Ok(n) => pending.extend_from_slice(&buf[..n]),
                            Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => break,
                            Err(err) => {
                                warn!("scheduler pipe read failed: {err}");
                                return false;
                            }
                        }
                    }
                    const PTR: usize = std::mem::size_of::<usize>();
                    while pending.len() >= PTR {
                        let mut raw = [0u8; PTR];
                        raw.copy_from_slice(&pending[..PTR]);
                        pending.drain(..PTR);
                        let task = unsafe {
                            Box::from_raw(usize::from_ne_bytes(raw) as *mut MainTask)
                        };
                        (*task)();
                    }
                    true
                },
            )
            .map_err(|err| ProbeError::Other(anyhow::anyhow!("looper registration failed: {err:?}")))?;

        Ok(Self {
            writer: Mutex::new(writer),
        })
    }

    fn submit(&self, task: MainTask) {
        let raw = Box::into_raw(Box::new(task)) as usize;
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(err) = writer.write_all(&raw.to_ne_bytes()) {
            warn!("scheduler pipe write failed, task dropped: {err}");
            drop(unsafe { Box::from_raw(raw as *mut MainTask) });
        }
    }
}

impl MainScheduler for LooperScheduler {
    fn run_on_main(&self, task: MainTask) {
        self.submit(task);
    }

    fn run_on_main_after(&self, delay: Duration, task: MainTask) {
        let writer = {
            let guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
            guard.try_clone()
        };
        match writer {
            Ok(mut writer) => {
                thread::spawn(move || {
                    thread::sleep(delay);
                    let raw = Box::into_raw(Box::new(task)) as usize;
                    if let Err(err) = writer.write_all(&raw.to_ne_bytes()) {
                        warn!("delayed task dropped: {err}");
                        drop(unsafe { Box::from_raw(raw as *mut MainTask) });
                    }
                });
            }
            Err(err) => warn!("scheduler pipe clone failed, delayed task dropped: {err}"),
        }
    }
}

struct ClassTable {
    by_fqcn: HashMap<String, ClassHandle>,
    refs: Vec<GlobalRef>,
}

pub struct AndroidHost {
    vm: JavaVM,
    nodes: Mutex<Vec<GlobalRef>>,
    classes: Mutex<ClassTable>,
    view_class: GlobalRef,
    view_group_class: GlobalRef,
    text_view_class: GlobalRef,
    saved_foregrounds: Mutex<HashMap<u64, Option<GlobalRef>>>,
    next_token: AtomicU64,
    scheduler: LooperScheduler,
}

impl AndroidHost {
    /// Attach to the runtime the process is embedded in. Must be called on
    /// the main thread (the scheduler binds to the calling thread's looper).
    pub fn attach() -> Result<Self> {
        let ctx = ndk_context::android_context();
        let vm = unsafe { JavaVM::from_raw(ctx.vm().cast()) }.map_err(jni_err)?;
        let scheduler = LooperScheduler::install()?;

        let mut env = vm.attach_current_thread().map_err(jni_err)?;
        let view_class = find_global(&mut env, "android/view/View")?;
        let view_group_class = find_global(&mut env, "android/view/ViewGroup")?;
        let text_view_class = find_global(&mut env, "android/widget/TextView")?;
        drop(env);

        Ok(Self {
            vm,
            nodes: Mutex::new(Vec::new()),
            classes: Mutex::new(ClassTable {
                by_fqcn: HashMap::new(),
                refs: Vec::new(),
            }),
            view_class,
            view_group_class,
            text_view_class,
            saved_foregrounds: Mutex::new(HashMap::new()),
            next_token: AtomicU64::new(1),
            scheduler,
        })
    }

    fn with_env<T>(&self, body: impl FnOnce(&mut JNIEnv) -> Result<T>) -> Result<T> {
        let mut env = self.vm.attach_current_thread().map_err(jni_err)?;
        body(&mut env)
    }

    fn node_ref(&self, node: NodeId) -> Result<GlobalRef> {
        self.nodes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(node.0 as usize)
            .cloned()
            .ok_or(ProbeError::StaleNode(node))
    }

    /// Issue a `NodeId` for an object, reusing the id of an already-interned
    /// reference to the same object so handles stay stable across reads.
    fn intern(&self, env: &mut JNIEnv, obj: &JObject) -> Result<NodeId> {
        let mut nodes = self.nodes.lock().unwrap_or_else(PoisonError::into_inner);
        for (index, existing) in nodes.iter().enumerate() {
            if env.is_same_object(existing.as_obj(), obj).map_err(jni_err)? {
                return Ok(NodeId(index as u64));
            }
        }
        let global = env.new_global_ref(obj).map_err(jni_err)?;
        nodes.push(global);
        Ok(NodeId(nodes.len() as u64 - 1))
    }

    /// Run one reflective read against a node; a pending Java exception means
    /// the node (or its window) died underneath us, so it is cleared and
    /// reported as `StaleNode`.
    fn on_node<T>(
        &self,
        node: NodeId,
        body: impl FnOnce(&mut JNIEnv, &JObject) -> jni::errors::Result<T>,
    ) -> Result<T> {
        let obj = self.node_ref(node)?;
        self.with_env(|env| match body(env, obj.as_obj()) {
            Ok(value) => Ok(value),
            Err(jni::errors::Error::JavaException) => {
                let _ = env.exception_clear();
                Err(ProbeError::StaleNode(node))
            }
            Err(err) => Err(jni_err(err)),
        })
    }

    fn instance_of_global(&self, node: NodeId, class: &GlobalRef) -> Result<bool> {
        let obj = self.node_ref(node)?;
        self.with_env(|env| {
            let class = borrow_class(env, class)?;
            env.is_instance_of(obj.as_obj(), &class).map_err(jni_err)
        })
    }
}

fn find_global(env: &mut JNIEnv, internal: &str) -> Result<GlobalRef> {
    let class = env.find_class(internal).map_err(|err| {
        if matches!(err, jni::errors::Error::JavaException) {
            let _ = env.exception_clear();
        }
        ProbeError::ClassNotFound(internal.replace('/', "."))
    })?;
    env.new_global_ref(&class).map_err(jni_err)
}

/// Local `JClass` view of a global class reference.
fn borrow_class<'l>(env: &mut JNIEnv<'l>, class: &GlobalRef) -> Result<JClass<'l>> {
    let local = env.new_local_ref(class.as_obj()).map_err(jni_err)?;
    Ok(JClass::from(local))
}

fn to_string_of(env: &mut JNIEnv, obj: &JObject) -> jni::errors::Result<String> {
    let value = env
        .call_method(obj, "toString", "()Ljava/lang/String;", &[])?
        .l()?;
    read_string(env, &value)
}

fn class_name_of(env: &mut JNIEnv, obj: &JObject) -> jni::errors::Result<String> {
    let class = env
        .call_method(obj, "getClass", "()Ljava/lang/Class;", &[])?
        .l()?;
    let name = env
        .call_method(&class, "getName", "()Ljava/lang/String;", &[])?
        .l()?;
    read_string(env, &name)
}

fn read_string(env: &mut JNIEnv, obj: &JObject) -> jni::errors::Result<String> {
    let jstr = JString::from(env.new_local_ref(obj)?);
    Ok(env.get_string(&jstr)?.into())
}

/// CharSequence-returning getter folded to `Option<String>`.
fn char_sequence(
    env: &mut JNIEnv,
    obj: &JObject,
    method: &str,
) -> jni::errors::Result<Option<String>> {
    let value = env
        .call_method(obj, method, "()Ljava/lang/CharSequence;", &[])?
        .l()?;
    if value.is_null() {
        return Ok(None);
    }
    to_string_of(env, &value).map(Some)
}

impl ViewHost for AndroidHost {
    fn expect_view(&self, node: NodeId) -> Result<()> {
        let obj = self.node_ref(node)?;
        self.with_env(|env| {
            let view_class = borrow_class(env, &self.view_class)?;
            let is_view = env
                .is_instance_of(obj.as_obj(), &view_class)
                .map_err(jni_err)?;
            if is_view {
                return Ok(());
            }
            let actual = class_name_of(env, obj.as_obj())
                .unwrap_or_else(|_| "<unreadable>".to_string());
            Err(ProbeError::TypeMismatch {
                expected: "android.view.View".to_string(),
                actual,
            })
        })
    }

    fn is_container(&self, node: NodeId) -> Result<bool> {
        self.instance_of_global(node, &self.view_group_class)
    }

    fn child_count(&self, node: NodeId) -> Result<usize> {
        let count = self.on_node(node, |env, obj| {
            env.call_method(obj, "getChildCount", "()I", &[])?.i()
        })?;
        Ok(count.max(0) as usize)
    }

    fn child_at(&self, node: NodeId, index: usize) -> Result<NodeId> {
        let obj = self.node_ref(node)?;
        self.with_env(|env| {
            let child = env
                .call_method(
                    obj.as_obj(),
                    "getChildAt",
                    "(I)Landroid/view/View;",
                    &[JValue::Int(index as i32)],
                )
                .and_then(|value| value.l())
                .map_err(|err| {
                    if matches!(err, jni::errors::Error::JavaException) {
                        let _ = env.exception_clear();
                        ProbeError::StaleNode(node)
                    } else {
                        jni_err(err)
                    }
                })?;
            if child.is_null() {
                // the child list shrank between count and get
                return Err(ProbeError::StaleNode(node));
            }
            self.intern(env, &child)
        })
    }

    fn parent(&self, node: NodeId) -> Result<Option<NodeId>> {
        let obj = self.node_ref(node)?;
        self.with_env(|env| {
            let parent = env
                .call_method(obj.as_obj(), "getParent", "()Landroid/view/ViewParent;", &[])
                .and_then(|value| value.l())
                .map_err(jni_err)?;
            if parent.is_null() {
                return Ok(None);
            }
            // a decor view's parent is the ViewRootImpl, not a view
            let view_class = borrow_class(env, &self.view_class)?;
            let is_view = env
                .is_instance_of(&parent, &view_class)
                .map_err(jni_err)?;
            if !is_view {
                return Ok(None);
            }
            self.intern(env, &parent).map(Some)
        })
    }

    fn text(&self, node: NodeId) -> Result<Option<String>> {
        if !self.instance_of_global(node, &self.text_view_class)? {
            return Ok(None);
        }
        self.on_node(node, |env, obj| char_sequence(env, obj, "getText"))
    }

    fn description(&self, node: NodeId) -> Result<Option<String>> {
        self.on_node(node, |env, obj| {
            char_sequence(env, obj, "getContentDescription")
        })
    }

    fn id_value(&self, node: NodeId) -> Result<i64> {
        let id = self.on_node(node, |env, obj| env.call_method(obj, "getId", "()I", &[])?.i())?;
        Ok(id as i64)
    }

    fn id_entry_name(&self, node: NodeId) -> Result<Option<String>> {
        let id = self.id_value(node)?;
        if id == NO_ID {
            return Ok(None);
        }
        let obj = self.node_ref(node)?;
        self.with_env(|env| {
            let resources = env
                .call_method(
                    obj.as_obj(),
                    "getResources",
                    "()Landroid/content/res/Resources;",
                    &[],
                )
                .and_then(|value| value.l())
                .map_err(jni_err)?;
            if resources.is_null() {
                return Ok(None);
            }
            // Resources.NotFoundException for ids without a resource entry
            match env
                .call_method(
                    &resources,
                    "getResourceEntryName",
                    "(I)Ljava/lang/String;",
                    &[JValue::Int(id as i32)],
                )
                .and_then(|value| value.l())
            {
                Ok(name) if !name.is_null() => {
                    read_string(env, &name).map(Some).map_err(jni_err)
                }
                Ok(_) => Ok(None),
                Err(jni::errors::Error::JavaException) => {
                    let _ = env.exception_clear();
                    Ok(None)
                }
                Err(err) => Err(jni_err(err)),
            }
        })
    }

    fn class_name(&self, node: NodeId) -> Result<String> {
        self.on_node(node, class_name_of)
    }

    fn bounds(&self, node: NodeId) -> Result<Rect> {
        self.on_node(node, |env, obj| {
            let location = env.new_int_array(2)?;
            env.call_method(
                obj,
                "getLocationOnScreen",
                "([I)V",
                &[JValue::Object(&location)],
            )?;
            let mut origin = [0i32; 2];
            env.get_int_array_region(&location, 0, &mut origin)?;
            let width = env.call_method(obj, "getWidth", "()I", &[])?.i()?;
            let height = env.call_method(obj, "getHeight", "()I", &[])?.i()?;
            Ok(Rect::from_origin_size(origin[0], origin[1], width, height))
        })
    }

    fn describe(&self, node: NodeId) -> Result<String> {
        self.on_node(node, to_string_of)
    }

    fn resolve_class(&self, fqcn: &str) -> Result<ClassHandle> {
        {
            let classes = self.classes.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(handle) = classes.by_fqcn.get(fqcn) {
                return Ok(*handle);
            }
        }
        let global = self.with_env(|env| find_global(env, &fqcn.replace('.', "/")))?;
        let mut classes = self.classes.lock().unwrap_or_else(PoisonError::into_inner);
        let handle = ClassHandle(classes.refs.len() as u64);
        classes.refs.push(global);
        classes.by_fqcn.insert(fqcn.to_string(), handle);
        Ok(handle)
    }

    fn is_instance_of(&self, node: NodeId, class: ClassHandle) -> Result<bool> {
        let global = {
            let classes = self.classes.lock().unwrap_or_else(PoisonError::into_inner);
            classes
                .refs
                .get(class.0 as usize)
                .cloned()
                .ok_or_else(|| ProbeError::ClassNotRegistered(format!("handle {}", class.0)))?
        };
        self.instance_of_global(node, &global)
    }

    fn window_roots(&self) -> Result<Vec<NodeId>> {
        self.with_env(|env| {
            let wm_class = env
                .find_class("android/view/WindowManagerGlobal")
                .map_err(jni_err)?;
            let instance = env
                .call_static_method(
                    &wm_class,
                    "getInstance",
                    "()Landroid/view/WindowManagerGlobal;",
                    &[],
                )
                .and_then(|value| value.l())
                .map_err(jni_err)?;
            let views = env
                .get_field(&instance, "mViews", "Ljava/util/ArrayList;")
                .and_then(|value| value.l())
                .map_err(jni_err)?;
            let size = env
                .call_method(&views, "size", "()I", &[])
                .and_then(|value| value.i())
                .map_err(jni_err)?;
            let mut roots = Vec::with_capacity(size.max(0) as usize);
            for index in 0..size {
                let root = env
                    .call_method(
                        &views,
                        "get",
                        "(I)Ljava/lang/Object;",
                        &[JValue::Int(index)],
                    )
                    .and_then(|value| value.l())
                    .map_err(jni_err)?;
                roots.push(self.intern(env, &root)?);
            }
            Ok(roots)
        })
    }

    fn has_window_focus(&self, root: NodeId) -> Result<bool> {
        self.on_node(root, |env, obj| {
            env.call_method(obj, "hasWindowFocus", "()Z", &[])?.z()
        })
    }

    fn activities(&self) -> Result<Vec<ActivityRecord>> {
        self.with_env(|env| {
            let thread_class = env
                .find_class("android/app/ActivityThread")
                .map_err(jni_err)?;
            let thread = env
                .call_static_method(
                    &thread_class,
                    "currentActivityThread",
                    "()Landroid/app/ActivityThread;",
                    &[],
                )
                .and_then(|value| value.l())
                .map_err(jni_err)?;
            let map = env
                .get_field(&thread, "mActivities", "Landroid/util/ArrayMap;")
                .and_then(|value| value.l())
                .map_err(jni_err)?;
            let size = env
                .call_method(&map, "size", "()I", &[])
                .and_then(|value| value.i())
                .map_err(jni_err)?;

            let mut records = Vec::new();
            for index in 0..size {
                match self.read_activity_record(env, &map, index) {
                    Ok(record) => records.push(record),
                    Err(err) => {
                        let _ = env.exception_clear();
                        debug!("activity record {index} skipped: {err}");
                    }
                }
            }
            Ok(records)
        })
    }

    fn set_enabled(&self, node: NodeId, state: bool) -> Result<()> {
        self.on_node(node, |env, obj| {
            env.call_method(obj, "setEnabled", "(Z)V", &[JValue::Bool(state as u8)])
                .map(|_| ())
        })
    }

    fn swap_foreground_highlight(&self, node: NodeId, color: u32) -> Result<ForegroundToken> {
        let obj = self.node_ref(node)?;
        self.with_env(|env| {
            let current = env
                .call_method(
                    obj.as_obj(),
                    "getForeground",
                    "()Landroid/graphics/drawable/Drawable;",
                    &[],
                )
                .and_then(|value| value.l())
                .map_err(jni_err)?;
            let saved = if current.is_null() {
                None
            } else {
                Some(env.new_global_ref(&current).map_err(jni_err)?)
            };

            let drawable_class = env
                .find_class("android/graphics/drawable/ColorDrawable")
                .map_err(jni_err)?;
            let overlay = env
                .new_object(&drawable_class, "(I)V", &[JValue::Int(color as i32)])
                .map_err(jni_err)?;
            env.call_method(
                obj.as_obj(),
                "setForeground",
                "(Landroid/graphics/drawable/Drawable;)V",
                &[JValue::Object(&overlay)],
            )
            .map_err(jni_err)?;

            let token = self.next_token.fetch_add(1, Ordering::Relaxed);
            self.saved_foregrounds
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(token, saved);
            Ok(ForegroundToken(token))
        })
    }

    fn restore_foreground(&self, node: NodeId, token: ForegroundToken) -> Result<()> {
        let saved = self
            .saved_foregrounds
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&token.0)
            .ok_or_else(|| {
                ProbeError::Other(anyhow::anyhow!("no saved foreground for token {}", token.0))
            })?;
        let obj = self.node_ref(node)?;
        self.with_env(|env| {
            let original = match &saved {
                Some(drawable) => env.new_local_ref(drawable.as_obj()).map_err(jni_err)?,
                None => JObject::null(),
            };
            env.call_method(
                obj.as_obj(),
                "setForeground",
                "(Landroid/graphics/drawable/Drawable;)V",
                &[JValue::Object(&original)],
            )
            .map_err(jni_err)?;
            Ok(())
        })
    }

    fn invalidate(&self, node: NodeId) -> Result<()> {
        self.on_node(node, |env, obj| {
            env.call_method(obj, "invalidate", "()V", &[]).map(|_| ())
        })
    }

    fn invalidate_root(&self, root: NodeId) -> Result<()> {
        let obj = self.node_ref(root)?;
        self.with_env(|env| {
            let parent = env
                .call_method(obj.as_obj(), "getParent", "()Landroid/view/ViewParent;", &[])
                .and_then(|value| value.l())
                .map_err(jni_err)?;
            if !parent.is_null() {
                // ViewRootImpl.invalidateWorld redraws the whole window
                let redrawn = env.call_method(
                    &parent,
                    "invalidateWorld",
                    "(Landroid/view/View;)V",
                    &[JValue::Object(obj.as_obj())],
                );
                match redrawn {
                    Ok(_) => return Ok(()),
                    Err(err) => {
                        let _ = env.exception_clear();
                        debug!("invalidateWorld unavailable, falling back: {err}");
                    }
                }
            }
            env.call_method(obj.as_obj(), "invalidate", "()V", &[])
                .map(|_| ())
                .map_err(jni_err)
        })
    }

    fn scheduler(&self) -> &dyn MainScheduler {
        &self.scheduler
    }

    fn set_debug_draw(&self, state: bool) -> Result<()> {
        self.with_env(|env| {
            let class = borrow_class(env, &self.view_class)?;
            let field = env
                .get_static_field_id(&class, "DEBUG_DRAW", "Z")
                .map_err(|err| {
                    let _ = env.exception_clear();
                    warn!("View.DEBUG_DRAW not reachable: {err}");
                    ProbeError::Unsupported("layout border toggling")
                })?;
            env.set_static_field(&class, field, JValue::Bool(state as u8))
                .map_err(jni_err)?;
            Ok(())
        })
    }

    fn set_web_debugging(&self, state: bool) -> Result<()> {
        self.with_env(|env| {
            let class = env.find_class("android/webkit/WebView").map_err(jni_err)?;
            env.call_static_method(
                &class,
                "setWebContentsDebuggingEnabled",
                "(Z)V",
                &[JValue::Bool(state as u8)],
            )
            .map(|_| ())
            .map_err(jni_err)
        })
    }

    fn listener_names(&self, node: NodeId) -> Result<Vec<ListenerSlot>> {
        let obj = self.node_ref(node)?;
        self.with_env(|env| {
            let info = env
                .get_field(
                    obj.as_obj(),
                    "mListenerInfo",
                    "Landroid/view/View$ListenerInfo;",
                )
                .and_then(|value| value.l())
                .map_err(|err| match err {
                    jni::errors::Error::JavaException => {
                        let _ = env.exception_clear();
                        ProbeError::StaleNode(node)
                    }
                    jni::errors::Error::FieldNotFound { .. } => {
                        ProbeError::Unsupported("listener reflection")
                    }
                    err => jni_err(err),
                })?;
            if info.is_null() {
                return Ok(Vec::new());
            }

            let info_class = env
                .call_method(&info, "getClass", "()Ljava/lang/Class;", &[])
                .and_then(|value| value.l())
                .map_err(jni_err)?;
            let fields: JObjectArray = env
                .call_method(
                    &info_class,
                    "getDeclaredFields",
                    "()[Ljava/lang/reflect/Field;",
                    &[],
                )
                .and_then(|value| value.l())
                .map_err(jni_err)?
                .into();
            let count = env.get_array_length(&fields).map_err(jni_err)?;

            let mut slots = Vec::new();
            for index in 0..count {
                let field = env
                    .get_object_array_element(&fields, index)
                    .map_err(jni_err)?;
                let name = env
                    .call_method(&field, "getName", "()Ljava/lang/String;", &[])
                    .and_then(|value| value.l())
                    .map_err(jni_err)?;
                let name = read_string(env, &name).map_err(jni_err)?;
                let Some(slot_name) = listener_slot_name(&name) else {
                    continue;
                };

                env.call_method(&field, "setAccessible", "(Z)V", &[JValue::Bool(1)])
                    .map_err(jni_err)?;
                let value = env
                    .call_method(
                        &field,
                        "get",
                        "(Ljava/lang/Object;)Ljava/lang/Object;",
                        &[JValue::Object(&info)],
                    )
                    .and_then(|value| value.l())
                    .map_err(jni_err)?;
                let handler = if value.is_null() {
                    None
                } else {
                    Some(class_name_of(env, &value).map_err(jni_err)?)
                };
                slots.push(ListenerSlot {
                    name: slot_name.to_string(),
                    handler,
                });
            }
            Ok(slots)
        })
    }
}

impl AndroidHost {
    fn read_activity_record(
        &self,
        env: &mut JNIEnv,
        map: &JObject,
        index: i32,
    ) -> Result<ActivityRecord> {
        let record = env
            .call_method(map, "valueAt", "(I)Ljava/lang/Object;", &[JValue::Int(index)])
            .and_then(|value| value.l())
            .map_err(jni_err)?;
        let paused = env
            .get_field(&record, "paused", "Z")
            .and_then(|value| value.z())
            .map_err(jni_err)?;
        let activity = env
            .get_field(&record, "activity", "Landroid/app/Activity;")
            .and_then(|value| value.l())
            .map_err(jni_err)?;
        if activity.is_null() {
            return Err(ProbeError::Other(anyhow::anyhow!("record without activity")));
        }
        let class_name = class_name_of(env, &activity).map_err(jni_err)?;

        let root = {
            let window = env
                .call_method(&activity, "getWindow", "()Landroid/view/Window;", &[])
                .and_then(|value| value.l())
                .map_err(jni_err)?;
            if window.is_null() {
                None
            } else {
                let decor = env
                    .call_method(&window, "getDecorView", "()Landroid/view/View;", &[])
                    .and_then(|value| value.l())
                    .map_err(jni_err)?;
                if decor.is_null() {
                    None
                } else {
                    Some(self.intern(env, &decor)?)
                }
            }
        };

        let intent_uri = {
            let intent = env
                .get_field(&record, "intent", "Landroid/content/Intent;")
                .and_then(|value| value.l())
                .map_err(jni_err)?;
            if intent.is_null() {
                None
            } else {
                let uri = env
                    .call_method(&intent, "toUri", "(I)Ljava/lang/String;", &[JValue::Int(0)])
                    .and_then(|value| value.l())
                    .map_err(jni_err)?;
                if uri.is_null() {
                    None
                } else {
                    Some(read_string(env, &uri).map_err(jni_err)?)
                }
            }
        };

        Ok(ActivityRecord {
            class_name,
            paused,
            root,
            intent_uri,
        })
    }
}

/// `mOnClickListener` / `mOnAttachStateChangeListeners` → `Click` /
/// `AttachStateChange`.
fn listener_slot_name(field: &str) -> Option<&str> {
    let rest = field.strip_prefix("mOn")?;
    let base = rest
        .strip_suffix("Listeners")
        .or_else(|| rest.strip_suffix("Listener"))?;
    if base.is_empty() || !base.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    Some(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listener_slot_name() {
        assert_eq!(listener_slot_name("mOnClickListener"), Some("Click"));
        assert_eq!(
            listener_slot_name("mOnAttachStateChangeListeners"),
            Some("AttachStateChange")
        );
        assert_eq!(listener_slot_name("mOnListener"), None);
        assert_eq!(listener_slot_name("mListenerInfo"), None);
        assert_eq!(listener_slot_name("mOnClickHandler"), None);
    }
}
