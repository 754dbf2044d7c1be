//! Class registry
//!
//! Maps short logical names ("View", "TextView") to fully-qualified runtime
//! classes. Every entry is resolved against the host eagerly while the
//! registry is built, so a registry value in hand means every handle in it is
//! live; there is no deferred state to observe.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::{ProbeError, Result};
use crate::host::{ClassHandle, ViewHost};

/// Default table: the classes the inspection surface reflects against.
pub const DEFAULT_CLASSES: &[(&str, &str)] = &[
    ("Activity", "android.app.Activity"),
    ("ActivityThread", "android.app.ActivityThread"),
    ("ActivityClientRecord", "android.app.ActivityThread$ActivityClientRecord"),
    ("Bitmap", "android.graphics.Bitmap"),
    ("BitmapDrawable", "android.graphics.drawable.BitmapDrawable"),
    ("Bitmap$Config", "android.graphics.Bitmap$Config"),
    ("Canvas", "android.graphics.Canvas"),
    ("DecorView", "com.android.internal.policy.DecorView"),
    ("Rect", "android.graphics.Rect"),
    ("Resources", "android.content.res.Resources"),
    ("TextView", "android.widget.TextView"),
    ("Thread", "java.lang.Thread"),
    ("View", "android.view.View"),
    ("ViewGroup", "android.view.ViewGroup"),
    ("ViewRootImpl", "android.view.ViewRootImpl"),
    ("WeakHashMap", "java.util.WeakHashMap"),
    ("WebView", "android.webkit.WebView"),
    ("WindowManagerGlobal", "android.view.WindowManagerGlobal"),
];

#[derive(Clone, Debug)]
struct ClassEntry {
    fqcn: String,
    handle: ClassHandle,
}

/// Fully-resolved name table over one host.
pub struct ClassRegistry {
    host: Arc<dyn ViewHost>,
    entries: BTreeMap<String, ClassEntry>,
}

impl ClassRegistry {
    /// Build a registry from an explicit `(logical name, fqcn)` table.
    /// Fails on the first class the host cannot resolve.
    pub fn new(host: Arc<dyn ViewHost>, table: &[(&str, &str)]) -> Result<Self> {
        let mut registry = Self {
            host,
            entries: BTreeMap::new(),
        };
        for (name, fqcn) in table {
            registry.register(name, fqcn)?;
        }
        Ok(registry)
    }

    /// Build a registry carrying `DEFAULT_CLASSES`.
    pub fn with_defaults(host: Arc<dyn ViewHost>) -> Result<Self> {
        Self::new(host, DEFAULT_CLASSES)
    }

    /// Add one entry, resolving it immediately.
    pub fn register(&mut self, name: &str, fqcn: &str) -> Result<ClassHandle> {
        let handle = self.host.resolve_class(fqcn)?;
        self.entries.insert(
            name.to_string(),
            ClassEntry {
                fqcn: fqcn.to_string(),
                handle,
            },
        );
        Ok(handle)
    }

    /// Resolved handle for a logical name.
    pub fn get(&self, name: &str) -> Result<ClassHandle> {
        self.entries
            .get(name)
            .map(|entry| entry.handle)
            .ok_or_else(|| ProbeError::ClassNotRegistered(name.to_string()))
    }

    /// Fully-qualified name behind a logical name.
    pub fn fqcn(&self, name: &str) -> Result<&str> {
        self.entries
            .get(name)
            .map(|entry| entry.fqcn.as_str())
            .ok_or_else(|| ProbeError::ClassNotRegistered(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// All entries as `(logical name, fqcn)`, sorted by logical name.
    pub fn names(&self) -> Vec<(&str, &str)> {
        self.entries
            .iter()
            .map(|(name, entry)| (name.as_str(), entry.fqcn.as_str()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
