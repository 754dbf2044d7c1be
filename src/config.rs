use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_MARK_COLOR: u32 = 0x7FFF_0000;
pub const DEFAULT_MARK_REVERT_MS: u64 = 3000;
pub const DEFAULT_TREE_DEPTH_LIMIT: usize = 64;
pub const NO_ID: i64 = -1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HostKind {
    /// In-process snapshot trees, always available.
    Mem,
    /// Live Android runtime over JNI; needs the `android-host` feature.
    Android,
}

#[derive(Clone, Debug)]
pub struct MarkConfig {
    /// ARGB overlay drawn on marked views (translucent red).
    pub color: u32,
    /// How long a mark stays up before the original state is restored.
    pub revert_after: Duration,
}

impl Default for MarkConfig {
    fn default() -> Self {
        Self {
            color: DEFAULT_MARK_COLOR,
            revert_after: Duration::from_millis(DEFAULT_MARK_REVERT_MS),
        }
    }
}

#[derive(Clone)]
pub struct Config {
    pub host_kind: HostKind,
    /// Snapshot file to load instead of the built-in demo tree.
    pub snapshot: Option<PathBuf>,
    /// Maximum tree depth rendered before eliding the remainder.
    pub tree_depth_limit: usize,
    pub mark: MarkConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host_kind: HostKind::Mem,
            snapshot: None,
            tree_depth_limit: DEFAULT_TREE_DEPTH_LIMIT,
            mark: MarkConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_mark_color_is_translucent_red() {
        let mark = MarkConfig::default();
        assert_eq!(mark.color >> 24, 0x7F);
        assert_eq!((mark.color >> 16) & 0xFF, 0xFF);
        assert_eq!(mark.color & 0xFFFF, 0);
    }

    #[test]
    fn test_default_revert_delay() {
        let mark = MarkConfig::default();
        assert_eq!(mark.revert_after, Duration::from_secs(3));
    }
}
