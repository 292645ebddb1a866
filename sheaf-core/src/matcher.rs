//! Glob matcher seam.
//!
//! Pattern expansion is consumed as a black box behind the [`Matcher`]
//! trait so the resolver can be exercised against a misbehaving matcher.
//! The production implementation walks one root with the ignore crate and
//! matches include/exclude globsets against root-relative paths.

use crate::cancel::CancelFlag;
use crate::error::SheafError;
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// Options the resolver passes to the matcher.
#[derive(Debug, Clone, Default)]
pub struct MatchOptions {
    /// Exclusion patterns, applied to root-relative paths.
    pub exclude: Vec<String>,
    /// Only files are returned; directories never match.
    pub files_only: bool,
    /// Match dotfiles too.
    pub include_dotfiles: bool,
    /// Case-insensitive glob matching.
    pub case_insensitive: bool,
}

/// External glob matcher: patterns + exclusions + one root directory in,
/// absolute file paths out. Invocation failure is a discovery-level error.
pub trait Matcher {
    fn match_files(
        &self,
        root: &Path,
        patterns: &[String],
        opts: &MatchOptions,
        cancel: &CancelFlag,
    ) -> crate::Result<Vec<PathBuf>>;
}

/// Production matcher: ignore-crate directory walk with all VCS filtering
/// disabled (ignore layers are applied downstream, not here).
#[derive(Debug, Clone, Copy, Default)]
pub struct WalkMatcher;

impl WalkMatcher {
    fn build_set(patterns: &[String], case_insensitive: bool) -> crate::Result<GlobSet> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let glob = GlobBuilder::new(pattern)
                .case_insensitive(case_insensitive)
                .literal_separator(true)
                .build()
                .map_err(|e| SheafError::GlobPattern(e.to_string()))?;
            builder.add(glob);
        }
        builder
            .build()
            .map_err(|e| SheafError::GlobPattern(e.to_string()))
    }
}

impl Matcher for WalkMatcher {
    fn match_files(
        &self,
        root: &Path,
        patterns: &[String],
        opts: &MatchOptions,
        cancel: &CancelFlag,
    ) -> crate::Result<Vec<PathBuf>> {
        let include = Self::build_set(patterns, opts.case_insensitive)?;
        let exclude = Self::build_set(&opts.exclude, opts.case_insensitive)?;

        let mut builder = WalkBuilder::new(root);
        builder.standard_filters(false);
        builder.hidden(!opts.include_dotfiles);

        let mut matches = Vec::new();
        for entry in builder.build() {
            if cancel.is_cancelled() {
                return Err(SheafError::Cancelled);
            }

            let entry = entry.map_err(|e| SheafError::Discovery {
                root: root.to_path_buf(),
                message: e.to_string(),
            })?;

            if opts.files_only && !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }

            let path = entry.path();
            let relative = path.strip_prefix(root).unwrap_or(path);

            if include.is_match(relative) && !exclude.is_match(relative) {
                matches.push(path.to_path_buf());
            }
        }

        Ok(matches)
    }
}
