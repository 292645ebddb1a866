//! Error types for sheaf operations

use std::path::PathBuf;

/// Fatal, call-aborting errors.
///
/// Per-file problems (unreadable file, binary content, ignore filtering)
/// are never errors — they land in the skip ledger as data. Only structural
/// discovery problems surface here.
#[derive(Debug, thiserror::Error)]
pub enum SheafError {
    #[error("No search patterns were provided")]
    EmptyPatterns,

    #[error("No workspace roots were provided")]
    NoRoots,

    #[error("Workspace root is not a directory: {}", .0.display())]
    InvalidRoot(PathBuf),

    #[error("Glob pattern error: {0}")]
    GlobPattern(String),

    #[error("Discovery failed under {}: {message}", .root.display())]
    Discovery { root: PathBuf, message: String },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Config parse error: {0}")]
    ConfigParse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
