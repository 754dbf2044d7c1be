//! Predicate library
//!
//! Every factory returns a [`Filter`]: a pure weight function over one node.
//! Weight 0 rejects, anything above accepts with that priority. Filters never
//! fail; attribute reads that error are logged at debug level and count as 0.

use std::fmt;
use std::sync::Arc;

use log::debug;
use regex::Regex;

use crate::error::ProbeError;
use crate::geom::{Point, Rect};
use crate::host::ClassHandle;
use crate::view::View;

/// Weight function over `(node, depth)`. Depth is 1-based from the search
/// root and only supplied by depth-first traversal.
pub type FilterFn = dyn Fn(&View, Option<usize>) -> f64 + Send + Sync;

#[derive(Clone)]
pub struct Filter {
    name: String,
    func: Arc<FilterFn>,
}

impl Filter {
    pub fn new(
        name: impl Into<String>,
        func: impl Fn(&View, Option<usize>) -> f64 + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    pub fn weigh(&self, view: &View, depth: Option<usize>) -> f64 {
        (self.func)(view, depth)
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Filter({})", self.name)
    }
}

/// Match spec for text-like attributes: exact equality or a full-string
/// pattern. Patterns built through `From<Regex>` are anchored so the whole
/// value must match, not just a substring.
#[derive(Clone, Debug)]
pub enum TextMatch {
    Exact(String),
    Pattern(Regex),
}

impl TextMatch {
    fn matches(&self, value: &str) -> bool {
        match self {
            TextMatch::Exact(expected) => value == expected,
            TextMatch::Pattern(re) => re.is_match(value),
        }
    }
}

impl From<&str> for TextMatch {
    fn from(value: &str) -> Self {
        TextMatch::Exact(value.to_string())
    }
}

impl From<String> for TextMatch {
    fn from(value: String) -> Self {
        TextMatch::Exact(value)
    }
}

impl From<Regex> for TextMatch {
    fn from(re: Regex) -> Self {
        TextMatch::Pattern(anchor(re))
    }
}

/// Match spec for ids: the raw numeric value (an explicit -1 matches
/// unassigned ids), the resource entry name, or a pattern over it.
#[derive(Clone, Debug)]
pub enum IdMatch {
    Value(i64),
    Entry(String),
    Pattern(Regex),
}

impl From<i64> for IdMatch {
    fn from(value: i64) -> Self {
        IdMatch::Value(value)
    }
}

impl From<&str> for IdMatch {
    fn from(value: &str) -> Self {
        IdMatch::Entry(value.to_string())
    }
}

impl From<String> for IdMatch {
    fn from(value: String) -> Self {
        IdMatch::Entry(value)
    }
}

impl From<Regex> for IdMatch {
    fn from(re: Regex) -> Self {
        IdMatch::Pattern(anchor(re))
    }
}

/// Match spec for classes: exact name, pattern over the name, or a runtime
/// instance-of check against a resolved handle.
#[derive(Clone, Debug)]
pub enum ClassMatch {
    Name(String),
    Pattern(Regex),
    Instance(ClassHandle),
}

impl From<&str> for ClassMatch {
    fn from(value: &str) -> Self {
        ClassMatch::Name(value.to_string())
    }
}

impl From<String> for ClassMatch {
    fn from(value: String) -> Self {
        ClassMatch::Name(value)
    }
}

impl From<Regex> for ClassMatch {
    fn from(re: Regex) -> Self {
        ClassMatch::Pattern(anchor(re))
    }
}

impl From<ClassHandle> for ClassMatch {
    fn from(handle: ClassHandle) -> Self {
        ClassMatch::Instance(handle)
    }
}

/// Anchor a pattern as `\A(?:pat)\z` so it matches the full value. Falls
/// back to the pattern as given when the anchored form does not compile.
fn anchor(re: Regex) -> Regex {
    let pattern = re.as_str();
    if pattern.starts_with(r"\A") && pattern.ends_with(r"\z") {
        return re;
    }
    Regex::new(&format!(r"\A(?:{})\z", pattern)).unwrap_or(re)
}

fn accept(hit: bool) -> f64 {
    if hit {
        1.0
    } else {
        0.0
    }
}

fn absorb(what: &str, view: &View, err: ProbeError) -> f64 {
    debug!("{} filter dropped node {}: {}", what, view.node(), err);
    0.0
}

/// Weight 1 for nodes whose text matches; textless nodes never match.
pub fn text(spec: impl Into<TextMatch>) -> Filter {
    let spec = spec.into();
    Filter::new(format!("text({:?})", spec), move |view, _| match view.text() {
        Ok(Some(value)) => accept(spec.matches(&value)),
        Ok(None) => 0.0,
        Err(err) => absorb("text", view, err),
    })
}

/// Weight 1 for nodes whose accessibility description matches.
pub fn desc(spec: impl Into<TextMatch>) -> Filter {
    let spec = spec.into();
    Filter::new(
        format!("desc({:?})", spec),
        move |view, _| match view.description() {
            Ok(Some(value)) => accept(spec.matches(&value)),
            Ok(None) => 0.0,
            Err(err) => absorb("desc", view, err),
        },
    )
}

/// Weight 1 for nodes whose id matches the spec. The string and pattern
/// forms compare against the resource entry name and never match nodes
/// without one.
pub fn id(spec: impl Into<IdMatch>) -> Filter {
    let spec = spec.into();
    Filter::new(format!("id({:?})", spec), move |view, _| match &spec {
        IdMatch::Value(expected) => match view.id() {
            Ok(value) => accept(value == *expected),
            Err(err) => absorb("id", view, err),
        },
        IdMatch::Entry(expected) => match view.id_name() {
            Ok(Some(name)) => accept(name == *expected),
            Ok(None) => 0.0,
            Err(err) => absorb("id", view, err),
        },
        IdMatch::Pattern(re) => match view.id_name() {
            Ok(Some(name)) => accept(re.is_match(&name)),
            Ok(None) => 0.0,
            Err(err) => absorb("id", view, err),
        },
    })
}

/// Weight 1 for nodes whose class matches: exact name, pattern, or an
/// instance-of check through the host.
pub fn class(spec: impl Into<ClassMatch>) -> Filter {
    let spec = spec.into();
    Filter::new(format!("class({:?})", spec), move |view, _| match &spec {
        ClassMatch::Name(expected) => match view.class_name() {
            Ok(name) => accept(name == *expected),
            Err(err) => absorb("class", view, err),
        },
        ClassMatch::Pattern(re) => match view.class_name() {
            Ok(name) => accept(re.is_match(&name)),
            Err(err) => absorb("class", view, err),
        },
        ClassMatch::Instance(handle) => match view.is_instance_of(*handle) {
            Ok(hit) => accept(hit),
            Err(err) => absorb("class", view, err),
        },
    })
}

/// Weight 1 iff the node's bounds lie entirely inside `reference`, all four
/// edges inclusive.
pub fn bounds_inside(reference: Rect) -> Filter {
    Filter::new(
        format!("bounds_inside({})", reference),
        move |view, _| match view.bounds() {
            Ok(bounds) => accept(reference.contains_rect(&bounds)),
            Err(err) => absorb("bounds_inside", view, err),
        },
    )
}

/// Accepts nodes whose bounds contain the point (edges inclusive). On accept
/// the weight is the traversal depth when one is supplied, 1 otherwise, so in
/// depth-first search the deepest containing node outranks its ancestors.
pub fn bounds_contains(x: i32, y: i32) -> Filter {
    let point = Point::new(x, y);
    Filter::new(
        format!("bounds_contains({}, {})", x, y),
        move |view, depth| match view.bounds() {
            Ok(bounds) if bounds.contains_point(point) => depth.unwrap_or(1) as f64,
            Ok(_) => 0.0,
            Err(err) => absorb("bounds_contains", view, err),
        },
    )
}

/// Caller-supplied weight function; same contract as the built-ins.
pub fn custom(
    name: impl Into<String>,
    func: impl Fn(&View, Option<usize>) -> f64 + Send + Sync + 'static,
) -> Filter {
    Filter::new(name, func)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NO_ID;
    use crate::hosts::mem::MemHost;
    use crate::registry::ClassRegistry;
    use std::sync::Arc;

    fn demo() -> (Arc<MemHost>, View) {
        let mem = Arc::new(MemHost::demo());
        let root = mem.focused_root_id().unwrap();
        let view = View::from_handle(mem.clone() as Arc<dyn crate::host::ViewHost>, root).unwrap();
        (mem, view)
    }

    fn node(root: &View, id_name: &str) -> View {
        root.selector().id(id_name).find().unwrap()
    }

    #[test]
    fn test_text_exact_and_anchored_pattern() {
        let (_, root) = demo();
        let submit = node(&root, "submit");

        assert_eq!(text("Submit").weigh(&submit, None), 1.0);
        assert_eq!(text("Sub").weigh(&submit, None), 0.0);

        let full = text(Regex::new("Sub.*").unwrap());
        assert_eq!(full.weigh(&submit, None), 1.0);

        let partial = text(Regex::new("ub").unwrap());
        assert_eq!(partial.weigh(&submit, None), 0.0);
    }

    #[test]
    fn test_text_rejects_textless_nodes() {
        let (_, root) = demo();
        assert_eq!(text("anything").weigh(&root, None), 0.0);
        assert_eq!(text(Regex::new(".*").unwrap()).weigh(&root, None), 0.0);
    }

    #[test]
    fn test_desc_match() {
        let (_, root) = demo();
        let submit = node(&root, "submit");
        assert_eq!(desc("Submit button").weigh(&submit, None), 1.0);
        assert_eq!(desc(Regex::new(".*button").unwrap()).weigh(&submit, None), 1.0);
        assert_eq!(desc("button").weigh(&submit, None), 0.0);
    }

    #[test]
    fn test_id_numeric_matches_raw_value() {
        let (_, root) = demo();
        let title = node(&root, "title");
        let raw = title.id().unwrap();

        assert_eq!(id(raw).weigh(&title, None), 1.0);
        assert_eq!(id(raw + 1).weigh(&title, None), 0.0);
        assert_eq!(id(NO_ID).weigh(&root, None), 1.0);
    }

    #[test]
    fn test_id_entry_name_absent_never_matches() {
        let (_, root) = demo();
        assert_eq!(id("title").weigh(&root, None), 0.0);
        assert_eq!(id(Regex::new(".*").unwrap()).weigh(&root, None), 0.0);
    }

    #[test]
    fn test_class_name_and_instance() {
        let (mem, root) = demo();
        let title = node(&root, "title");

        assert_eq!(class("android.widget.TextView").weigh(&title, None), 1.0);
        assert_eq!(class("android.widget.Button").weigh(&title, None), 0.0);
        assert_eq!(
            class(Regex::new(r"android\.widget\..*").unwrap()).weigh(&title, None),
            1.0
        );

        let registry = ClassRegistry::with_defaults(mem).unwrap();
        let view_class = registry.get("View").unwrap();
        let group_class = registry.get("ViewGroup").unwrap();
        assert_eq!(class(view_class).weigh(&title, None), 1.0);
        assert_eq!(class(group_class).weigh(&title, None), 0.0);
        assert_eq!(class(group_class).weigh(&root, None), 1.0);
    }

    #[test]
    fn test_bounds_inside_edges_inclusive() {
        let (mem, root) = demo();
        let submit = node(&root, "submit");
        let bounds = submit.bounds().unwrap();

        assert_eq!(bounds_inside(bounds).weigh(&submit, None), 1.0);

        for side in 0..4 {
            let mut grown = bounds;
            match side {
                0 => grown.left -= 1,
                1 => grown.top -= 1,
                2 => grown.right += 1,
                _ => grown.bottom += 1,
            }
            mem.set_bounds(submit.node(), grown);
            assert_eq!(
                bounds_inside(bounds).weigh(&submit, None),
                0.0,
                "side {} grown by 1 should exclude",
                side
            );
        }

        mem.set_bounds(submit.node(), bounds);
        assert_eq!(bounds_inside(bounds).weigh(&submit, None), 1.0);
    }

    #[test]
    fn test_bounds_contains_weight_is_depth_or_one() {
        let (_, root) = demo();
        let submit = node(&root, "submit");
        let bounds = submit.bounds().unwrap();
        let inside = bounds_contains(bounds.left, bounds.top);

        assert_eq!(inside.weigh(&submit, Some(3)), 3.0);
        assert_eq!(inside.weigh(&submit, None), 1.0);

        let outside = bounds_contains(bounds.left - 1, bounds.top);
        assert_eq!(outside.weigh(&submit, Some(3)), 0.0);
    }

    #[test]
    fn test_stale_reads_count_as_zero() {
        let (mem, root) = demo();
        let submit = node(&root, "submit");
        mem.detach(submit.node());

        assert_eq!(text("Submit").weigh(&submit, None), 0.0);
        assert_eq!(id("submit").weigh(&submit, None), 0.0);
        assert_eq!(class("android.widget.Button").weigh(&submit, None), 0.0);
        assert_eq!(bounds_contains(0, 0).weigh(&submit, Some(1)), 0.0);
    }

    #[test]
    fn test_custom_filter_sees_depth() {
        let (_, root) = demo();
        let weigh_depth = custom("depth", |_, depth| depth.unwrap_or(0) as f64);
        assert_eq!(weigh_depth.weigh(&root, Some(4)), 4.0);
        assert_eq!(weigh_depth.weigh(&root, None), 0.0);
    }
}
