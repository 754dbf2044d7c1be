use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::config::{Config, HostKind};
use crate::console;
use crate::error::{ProbeError, Result};
use crate::registry::ClassRegistry;
use crate::selector::{Selector, Traversal};
use crate::view::View;

#[derive(Parser, Debug)]
#[command(
    name = "viewprobe",
    about = "Android view-hierarchy inspector with selector search",
    version,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the view hierarchy of the focused window.
    Tree(TreeCommand),
    /// Evaluate one selector and print the matching views.
    Query(QueryCommand),
    /// Interactive inspection console.
    Console(ConsoleCommand),
}

/// Host selection shared by every subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct HostOpts {
    /// Hierarchy snapshot (JSON) to inspect instead of the built-in demo tree.
    #[arg(long, value_name = "FILE", conflicts_with = "android")]
    pub snapshot: Option<PathBuf>,

    /// Attach to the live Android runtime (needs the android-host build).
    #[arg(long, action = ArgAction::SetTrue)]
    pub android: bool,
}

impl HostOpts {
    pub fn to_config(&self) -> Config {
        let mut cfg = Config::default();
        if self.android {
            cfg.host_kind = HostKind::Android;
        }
        cfg.snapshot = self.snapshot.clone();
        cfg
    }
}

#[derive(Args, Debug, Clone)]
pub struct TreeCommand {
    #[command(flatten)]
    pub host: HostOpts,

    /// Depth at which the dump elides deeper children.
    #[arg(long, value_name = "LEVELS")]
    pub depth: Option<usize>,
}

impl TreeCommand {
    pub fn to_config(&self) -> Config {
        let mut cfg = self.host.to_config();
        if let Some(depth) = self.depth {
            cfg.tree_depth_limit = depth;
        }
        cfg
    }
}

#[derive(Args, Debug, Clone)]
pub struct QueryCommand {
    #[command(flatten)]
    pub host: HostOpts,

    /// Exact text, or /pattern/ matched against the whole value.
    #[arg(long, value_name = "TEXT")]
    pub text: Option<String>,

    /// Exact accessibility description, or /pattern/.
    #[arg(long, value_name = "TEXT")]
    pub desc: Option<String>,

    /// Numeric id, 0x-prefixed hex id, resource entry name or /pattern/.
    #[arg(long, value_name = "ID")]
    pub id: Option<String>,

    /// Class name, /pattern/ or @RegisteredName for an instance-of check.
    #[arg(long, value_name = "CLASS")]
    pub class: Option<String>,

    /// Keep only views fully inside the given rectangle.
    #[arg(long, value_name = "L,T,R,B")]
    pub inside: Option<String>,

    /// Keep only views containing the given screen point.
    #[arg(long = "at", value_name = "X,Y")]
    pub at: Option<String>,

    /// Traversal order for the single-result search (dfs or bfs).
    #[arg(long, value_name = "ORDER", default_value = "dfs")]
    pub mode: String,

    /// Print every match in tree order instead of the best one.
    #[arg(long, action = ArgAction::SetTrue)]
    pub all: bool,
}

impl QueryCommand {
    /// Map the filter flags onto a selector rooted at `root`. Also returns
    /// the traversal for the single-result search (`--all` ignores it).
    pub fn to_selector(&self, root: View, registry: &ClassRegistry) -> Result<(Selector, Traversal)> {
        let mut selector = root.selector();
        if let Some(value) = &self.text {
            selector = selector.text(console::text_spec(value)?);
        }
        if let Some(value) = &self.desc {
            selector = selector.desc(console::text_spec(value)?);
        }
        if let Some(value) = &self.id {
            selector = selector.id(console::id_spec(value)?);
        }
        if let Some(value) = &self.class {
            selector = selector.class(console::class_spec(value, registry)?);
        }
        if let Some(value) = &self.inside {
            selector = selector.bounds_inside(console::parse_rect(value)?);
        }
        if let Some(value) = &self.at {
            let (x, y) = console::parse_point(value)?;
            selector = selector.bounds_contains(x, y);
        }
        let traversal = self.mode.parse()?;
        Ok((selector, traversal))
    }
}

#[derive(Args, Debug, Clone)]
pub struct ConsoleCommand {
    #[command(flatten)]
    pub host: HostOpts,

    /// Mark overlay color as ARGB hex (default 7fff0000).
    #[arg(long = "mark-color", value_name = "ARGB")]
    pub mark_color: Option<String>,

    /// Delay before a mark reverts, in milliseconds.
    #[arg(long = "mark-revert-ms", value_name = "MILLIS")]
    pub mark_revert_ms: Option<u64>,
}

impl ConsoleCommand {
    pub fn to_config(&self) -> Result<Config> {
        let mut cfg = self.host.to_config();
        if let Some(raw) = &self.mark_color {
            let digits = raw.strip_prefix("0x").unwrap_or(raw);
            cfg.mark.color = u32::from_str_radix(digits, 16).map_err(|_| {
                ProbeError::Console(format!("'{}' is not an ARGB hex color", raw))
            })?;
        }
        if let Some(ms) = self.mark_revert_ms {
            cfg.mark.revert_after = Duration::from_millis(ms);
        }
        Ok(cfg)
    }
}
