//! The produced surface: a workspace of roots and the single
//! discover-and-read call.

use crate::assemble::{self, ContentBlock};
use crate::cancel::CancelFlag;
use crate::config::Config;
use crate::error::SheafError;
use crate::fetch::{self, ExplicitRequest, ReadPolicy};
use crate::matcher::{Matcher, WalkMatcher};
use crate::resolve::{self, CandidateFile, SkipRecord};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// One discover-and-read request. All flags are explicit per call; there
/// is no global mutable state.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GatherRequest {
    /// Required path/glob patterns.
    pub patterns: Vec<String>,
    /// Additional include patterns, concatenated after `patterns`.
    pub include: Vec<String>,
    /// Caller-supplied exclude patterns, unioned with the default
    /// excludes at expansion time.
    pub exclude: Vec<String>,
    pub use_default_excludes: bool,
    pub respect_git_ignore: bool,
    pub respect_sheaf_ignore: bool,
}

impl Default for GatherRequest {
    fn default() -> Self {
        Self {
            patterns: Vec::new(),
            include: Vec::new(),
            exclude: Vec::new(),
            use_default_excludes: true,
            respect_git_ignore: true,
            respect_sheaf_ignore: true,
        }
    }
}

impl GatherRequest {
    pub fn new(patterns: Vec<String>) -> Self {
        Self {
            patterns,
            ..Self::default()
        }
    }

    /// Required + include patterns in input order. Order does not affect
    /// the final result (output is sorted), only expansion.
    fn input_patterns(&self) -> Vec<String> {
        let mut patterns = self.patterns.clone();
        patterns.extend(self.include.clone());
        patterns
    }
}

/// Result of one gather call.
#[derive(Debug, Clone)]
pub struct GatherOutput {
    /// Content blocks in sorted-path order, ending with the terminator
    /// (or holding only the no-matches sentinel).
    pub blocks: Vec<ContentBlock>,
    /// Bounded human-readable summary of processed/skipped.
    pub summary: String,
    /// Display paths of processed files, sorted.
    pub processed: Vec<String>,
    /// Skip ledger: discovery-time skips plus per-file fetch failures.
    pub skipped: Vec<SkipRecord>,
}

impl GatherOutput {
    /// The separator-delimited textual payload (binary blocks excluded).
    pub fn combined_text(&self) -> String {
        self.blocks
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text(text) => Some(text.as_str()),
                ContentBlock::Binary { .. } => None,
            })
            .collect()
    }
}

/// A set of validated workspace roots plus configuration. Request-scoped
/// state lives in each call; the workspace itself is immutable.
pub struct Workspace {
    roots: Vec<PathBuf>,
    target: PathBuf,
    config: Config,
    matcher: Box<dyn Matcher + Send + Sync>,
}

impl std::fmt::Debug for Workspace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workspace")
            .field("roots", &self.roots)
            .field("target", &self.target)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Workspace {
    /// Build a workspace over one or more root directories. Roots are
    /// canonicalized; the first root is the target directory used for
    /// display-relative paths.
    pub fn new(roots: Vec<PathBuf>, config: Config) -> crate::Result<Self> {
        Self::with_matcher(roots, config, Box::new(WalkMatcher))
    }

    /// Same, with an injected matcher implementation.
    pub fn with_matcher(
        roots: Vec<PathBuf>,
        config: Config,
        matcher: Box<dyn Matcher + Send + Sync>,
    ) -> crate::Result<Self> {
        if roots.is_empty() {
            return Err(SheafError::NoRoots);
        }
        let mut canonical = Vec::with_capacity(roots.len());
        for root in roots {
            let resolved = root
                .canonicalize()
                .map_err(|_| SheafError::InvalidRoot(root.clone()))?;
            if !resolved.is_dir() {
                return Err(SheafError::InvalidRoot(root));
            }
            canonical.push(resolved);
        }
        let target = canonical[0].clone();
        Ok(Self {
            roots: canonical,
            target,
            config,
            matcher,
        })
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Discover, read, and assemble in one call.
    pub fn gather(&self, request: &GatherRequest) -> crate::Result<GatherOutput> {
        self.gather_cancellable(request, &CancelFlag::new())
    }

    /// `gather` with an external cancellation signal. Cancellation during
    /// discovery aborts the call; during fetching it degrades to per-file
    /// "read cancelled" skips — partial results beat an aborted batch.
    pub fn gather_cancellable(
        &self,
        request: &GatherRequest,
        cancel: &CancelFlag,
    ) -> crate::Result<GatherOutput> {
        let (candidates, skipped) = self.resolve_request(request, cancel)?;

        let policy = ReadPolicy::from(&self.config);
        let explicit = ExplicitRequest::new(&request.input_patterns());
        let outcomes = fetch::fetch_all(&candidates, &policy, &explicit, cancel);

        Ok(assemble::assemble(candidates, outcomes, skipped))
    }

    /// Discovery only: the sorted candidate list and the skip ledger,
    /// without reading any content.
    pub fn resolve_only(
        &self,
        request: &GatherRequest,
    ) -> crate::Result<(Vec<CandidateFile>, Vec<SkipRecord>)> {
        let (mut candidates, skipped) = self.resolve_request(request, &CancelFlag::new())?;
        candidates.sort();
        Ok((candidates, skipped))
    }

    fn resolve_request(
        &self,
        request: &GatherRequest,
        cancel: &CancelFlag,
    ) -> crate::Result<(Vec<CandidateFile>, Vec<SkipRecord>)> {
        let input_patterns = request.input_patterns();
        if input_patterns.is_empty() {
            return Err(SheafError::EmptyPatterns);
        }

        let mut exclusions = if request.use_default_excludes {
            self.config.default_excludes()
        } else {
            Vec::new()
        };
        exclusions.extend(request.exclude.clone());

        resolve::resolve(
            self.matcher.as_ref(),
            &self.roots,
            &self.target,
            &input_patterns,
            &exclusions,
            request.respect_git_ignore,
            request.respect_sheaf_ignore,
            cancel,
        )
    }
}
