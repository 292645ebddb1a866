//! Sheaf Core - Multi-root file discovery and content assembly
//!
//! This library expands path/glob patterns across one or more workspace
//! roots, applies layered exclusion policies and a security boundary,
//! reads and truncates file content concurrently, and assembles a
//! deterministic combined output that tolerates per-file failure.

pub mod assemble;
pub mod boundary;
pub mod cancel;
pub mod classify;
pub mod config;
pub mod error;
pub mod fetch;
pub mod gather;
pub mod ignore;
pub mod matcher;
pub mod resolve;

pub use assemble::{ContentBlock, NO_MATCHES, TERMINATOR};
pub use cancel::CancelFlag;
pub use classify::FileKind;
pub use config::Config;
pub use error::SheafError;
pub use fetch::{ExplicitRequest, FetchOutcome, ReadPolicy, Truncation};
pub use gather::{GatherOutput, GatherRequest, Workspace};
pub use matcher::{MatchOptions, Matcher, WalkMatcher};
pub use resolve::{CandidateFile, SkipRecord};

/// Result type alias for sheaf operations
pub type Result<T> = std::result::Result<T, SheafError>;
