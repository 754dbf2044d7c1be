//! Unified error handling for viewprobe
//!
//! This module defines domain-specific error types that carry enough context
//! to tell a dead node apart from a host that simply lacks a capability.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::host::NodeId;

/// Main error type for viewprobe operations
#[derive(Debug, Error)]
pub enum ProbeError {
    /// An accessor was built on top of a handle of the wrong runtime type
    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    /// The node went away between enumeration and attribute access
    #[error("Node {0} is stale (detached or recycled)")]
    StaleNode(NodeId),

    /// The host could not resolve a fully-qualified class name
    #[error("Class '{0}' not found in the target runtime")]
    ClassNotFound(String),

    /// A logical class name was never put into the registry
    #[error("Class '{0}' is not registered")]
    ClassNotRegistered(String),

    /// The host does not implement this capability
    #[error("Host does not support {0}")]
    Unsupported(&'static str),

    /// Snapshot file could not be read
    #[error("Failed to read snapshot '{path}': {source}")]
    Snapshot {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Snapshot file could not be decoded
    #[error("Malformed snapshot: {0}")]
    Parse(#[from] serde_json::Error),

    /// Console command could not be parsed or evaluated
    #[error("{0}")]
    Console(String),

    /// Generic error for cases not covered above
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for viewprobe operations
pub type Result<T> = std::result::Result<T, ProbeError>;

impl ProbeError {
    /// Check if this error is a per-node failure that a traversal absorbs
    /// (the walk skips the subtree and carries on)
    pub fn is_stale(&self) -> bool {
        matches!(self, ProbeError::StaleNode(_))
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            ProbeError::Unsupported(what) => {
                format!(
                    "This host cannot do that ({}). Live features need the android-host build.",
                    what
                )
            }
            ProbeError::ClassNotRegistered(name) => {
                format!("'{}' is not a registered class. 'classes' lists the known names.", name)
            }
            _ => self.to_string(),
        }
    }
}

/// Convert IO errors with path context
impl ProbeError {
    pub fn from_snapshot_error(path: impl Into<PathBuf>, error: io::Error) -> Self {
        ProbeError::Snapshot {
            path: path.into(),
            source: error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ProbeError::ClassNotFound("android.view.View".to_string());
        assert_eq!(
            err.to_string(),
            "Class 'android.view.View' not found in the target runtime"
        );
    }

    #[test]
    fn test_is_stale() {
        let err = ProbeError::StaleNode(NodeId(7));
        assert!(err.is_stale());

        let err = ProbeError::Unsupported("click watching");
        assert!(!err.is_stale());
    }

    #[test]
    fn test_user_message() {
        let err = ProbeError::Unsupported("listener reflection");
        assert!(err.user_message().contains("listener reflection"));

        let err = ProbeError::ClassNotRegistered("Button".to_string());
        assert!(err.user_message().contains("Button"));
    }

    #[test]
    fn test_type_mismatch_display() {
        let err = ProbeError::TypeMismatch {
            expected: "android.view.View".to_string(),
            actual: "java.lang.String".to_string(),
        };
        assert!(err.to_string().contains("expected android.view.View"));
    }
}
