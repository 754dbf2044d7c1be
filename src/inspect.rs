//! Inspection facade
//!
//! `Inspector` bundles a host with a fully-resolved class registry and
//! exposes the window-level operations: current activity, window roots,
//! layout borders, whole-tree redraw, WebView debugging, click watching.
//! It is built explicitly via `attach`; nothing here is ambient state.

use std::fmt;
use std::sync::Arc;

use log::debug;

use crate::error::Result;
use crate::host::{ActivityRecord, ClassHandle, ViewHost};
use crate::registry::ClassRegistry;
use crate::view::View;

/// One activity of the target, as reported by the host's activity table.
pub struct Activity {
    host: Arc<dyn ViewHost>,
    record: ActivityRecord,
}

impl Activity {
    pub fn class_name(&self) -> &str {
        &self.record.class_name
    }

    pub fn intent_uri(&self) -> Option<&str> {
        self.record.intent_uri.as_deref()
    }

    /// Decor root of the activity's window, when one is attached.
    pub fn root(&self) -> Result<Option<View>> {
        self.record
            .root
            .map(|root| View::from_handle(Arc::clone(&self.host), root))
            .transpose()
    }
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Activity{{ {} }}", self.record.class_name)
    }
}

pub struct Inspector {
    host: Arc<dyn ViewHost>,
    registry: ClassRegistry,
}

impl Inspector {
    /// Attach to a host: resolves the whole default class table eagerly and
    /// fails up front when any class is missing from the runtime.
    pub fn attach(host: Arc<dyn ViewHost>) -> Result<Self> {
        let registry = ClassRegistry::with_defaults(Arc::clone(&host))?;
        Ok(Self { host, registry })
    }

    pub fn registry(&self) -> &ClassRegistry {
        &self.registry
    }

    pub fn register_class(&mut self, name: &str, fqcn: &str) -> Result<ClassHandle> {
        self.registry.register(name, fqcn)
    }

    pub fn class_handle(&self, name: &str) -> Result<ClassHandle> {
        self.registry.get(name)
    }

    /// First activity that is not paused, `Ok(None)` when everything is.
    pub fn current_activity(&self) -> Result<Option<Activity>> {
        for record in self.host.activities()? {
            if !record.paused {
                return Ok(Some(Activity {
                    host: Arc::clone(&self.host),
                    record,
                }));
            }
        }
        Ok(None)
    }

    /// Root of the focused window, `Ok(None)` when no window has focus.
    pub fn current_root(&self) -> Result<Option<View>> {
        for root in self.host.window_roots()? {
            if self.host.has_window_focus(root)? {
                return Ok(Some(View::from_handle(Arc::clone(&self.host), root)?));
            }
        }
        Ok(None)
    }

    /// Roots of every active window, in the host's order.
    pub fn current_roots(&self) -> Result<Vec<View>> {
        self.host
            .window_roots()?
            .into_iter()
            .map(|root| View::from_handle(Arc::clone(&self.host), root))
            .collect()
    }

    /// Toggle the runtime's layout-border drawing, then redraw everything so
    /// the change is visible.
    pub fn show_layout_borders(&self, state: bool) -> Result<()> {
        self.host.set_debug_draw(state)?;
        self.invalidate_all()
    }

    /// Schedule a redraw of every window on the main context.
    pub fn invalidate_all(&self) -> Result<()> {
        for root in self.host.window_roots()? {
            let host = Arc::clone(&self.host);
            self.host.scheduler().run_on_main(Box::new(move || {
                if let Err(err) = host.invalidate_root(root) {
                    debug!("window redraw failed for root {}: {}", root, err);
                }
            }));
            let host = Arc::clone(&self.host);
            self.host.scheduler().run_on_main(Box::new(move || {
                if let Err(err) = host.invalidate(root) {
                    debug!("root invalidate failed for {}: {}", root, err);
                }
            }));
        }
        Ok(())
    }

    /// Turn on the WebView remote-inspector flag.
    pub fn enable_web_debugging(&self) -> Result<()> {
        self.host.set_web_debugging(true)
    }

    /// Toggle click logging; hosts without method hooking report
    /// `Unsupported`.
    pub fn watch_clicks(&self, state: bool) -> Result<()> {
        self.host.set_click_watch(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProbeError;
    use crate::hosts::mem::MemHost;

    fn attach() -> (Arc<MemHost>, Inspector) {
        let mem = Arc::new(MemHost::demo());
        let inspector = Inspector::attach(mem.clone() as Arc<dyn ViewHost>).unwrap();
        (mem, inspector)
    }

    #[test]
    fn test_current_activity_skips_paused() {
        let (_, inspector) = attach();
        let activity = inspector.current_activity().unwrap().unwrap();
        assert_eq!(activity.class_name(), "com.example.app.LoginActivity");
        assert!(activity.root().unwrap().is_some());
        assert!(activity.intent_uri().unwrap().contains("LoginActivity"));
    }

    #[test]
    fn test_current_root_is_focused_window() {
        let (mem, inspector) = attach();
        let root = inspector.current_root().unwrap().unwrap();
        assert_eq!(Some(root.node()), mem.focused_root_id());

        let roots = inspector.current_roots().unwrap();
        assert_eq!(roots.len(), 2);
        assert_eq!(roots[0].node(), root.node());
    }

    #[test]
    fn test_layout_borders_set_flag_and_redraw() {
        let (mem, inspector) = attach();
        inspector.show_layout_borders(true).unwrap();
        assert!(mem.debug_draw());

        mem.flush_main();
        for root in mem.root_ids() {
            assert_eq!(mem.invalidations(root), 2);
        }

        inspector.show_layout_borders(false).unwrap();
        assert!(!mem.debug_draw());
    }

    #[test]
    fn test_web_debugging_and_click_watch() {
        let (mem, inspector) = attach();
        inspector.enable_web_debugging().unwrap();
        assert!(mem.web_debugging());

        inspector.watch_clicks(true).unwrap();
        assert!(mem.click_watching());
        inspector.watch_clicks(false).unwrap();
        assert!(!mem.click_watching());
    }

    #[test]
    fn test_registry_lookup_through_facade() {
        let (_, inspector) = attach();
        assert!(inspector.class_handle("DecorView").is_ok());
        assert!(matches!(
            inspector.class_handle("Spinner"),
            Err(ProbeError::ClassNotRegistered(_))
        ));
    }

    #[test]
    fn test_register_class_late() {
        let (_, mut inspector) = attach();
        inspector
            .register_class("Button", "android.widget.Button")
            .unwrap();
        assert!(inspector.class_handle("Button").is_ok());
    }
}
