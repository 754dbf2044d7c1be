//! viewprobe: view-hierarchy inspection for Android applications.
//!
//! The core is a host-agnostic selector engine: [`view::View`] wraps one node
//! of an externally-owned tree, [`selector::Selector`] evaluates weight
//! filters over the live subtree, and [`inspect::Inspector`] is the facade the
//! console and CLI drive. Hosts live under [`hosts`]: an in-memory snapshot
//! host that is always available, and a JNI-backed live host behind the
//! `android-host` feature.

pub mod cli;
pub mod config;
pub mod console;
pub mod error;
pub mod geom;
pub mod host;
pub mod hosts;
pub mod inspect;
pub mod registry;
pub mod selector;
pub mod view;

pub use config::Config;
pub use error::{ProbeError, Result};
pub use inspect::Inspector;
pub use selector::{Selector, Traversal};
pub use view::View;
