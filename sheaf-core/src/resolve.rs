//! Pattern resolution: expand patterns across roots into a deduplicated
//! candidate set plus a structured skip ledger.

use crate::boundary;
use crate::cancel::CancelFlag;
use crate::ignore::IgnoreChain;
use crate::matcher::{MatchOptions, Matcher};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Skip-reason label for boundary rejections.
pub const OUTSIDE_ROOTS: &str = "outside of allowed workspace directories";

/// One file surviving resolution. Identity is the absolute path; the
/// display path (relative to the target directory where possible) is used
/// for all output and provenance.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct CandidateFile {
    pub path: PathBuf,
    pub display: String,
}

/// One skipped entry: a path or an aggregated count, plus the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkipRecord {
    pub label: String,
    pub reason: String,
}

impl SkipRecord {
    pub fn new(label: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            reason: reason.into(),
        }
    }

    fn aggregated(count: usize, reason: &str) -> Self {
        Self::new(format!("{} file(s)", count), reason)
    }
}

/// Display path for `path`: relative to the target directory when under
/// it, the absolute path otherwise.
pub fn display_path(path: &Path, target: &Path) -> String {
    path.strip_prefix(target)
        .unwrap_or(path)
        .to_string_lossy()
        .to_string()
}

/// A pattern naming an existing filesystem entry is escaped so glob
/// metacharacters in literal names are not misinterpreted; existing
/// directories additionally gather their contents. Anything else passes
/// through as a glob.
fn prepare_pattern(root: &Path, pattern: &str) -> String {
    let joined = root.join(pattern);
    let Ok(rel) = joined.strip_prefix(root) else {
        // Absolute pattern outside this root: cannot match a
        // root-relative walk, leave it verbatim.
        return pattern.to_string();
    };
    match joined.metadata() {
        Ok(meta) if meta.is_dir() => format!("{}/**", globset::escape(&rel.to_string_lossy())),
        Ok(_) => globset::escape(&rel.to_string_lossy()),
        Err(_) => pattern.to_string(),
    }
}

/// Expand `patterns` over every root, apply the security boundary and the
/// ignore chain, and return the surviving candidates (deduplicated, order
/// unspecified — sorting happens at assembly) plus the skip ledger.
pub(crate) fn resolve(
    matcher: &dyn Matcher,
    roots: &[PathBuf],
    target: &Path,
    patterns: &[String],
    exclusions: &[String],
    respect_git_ignore: bool,
    respect_sheaf_ignore: bool,
    cancel: &CancelFlag,
) -> crate::Result<(Vec<CandidateFile>, Vec<SkipRecord>)> {
    let opts = MatchOptions {
        exclude: exclusions.to_vec(),
        files_only: true,
        include_dotfiles: true,
        case_insensitive: true,
    };

    // Matched paths union across roots; BTreeSet both deduplicates and
    // keeps the skip ledger deterministic.
    let mut matched: BTreeSet<PathBuf> = BTreeSet::new();
    for root in roots {
        let prepared: Vec<String> = patterns.iter().map(|p| prepare_pattern(root, p)).collect();
        for path in matcher.match_files(root, &prepared, &opts, cancel)? {
            matched.insert(path);
        }
    }

    let mut skipped = Vec::new();

    // Boundary check on every match, no exceptions: the matcher runs with
    // absolute output and is not trusted to stay inside the roots.
    let mut in_scope = Vec::new();
    for path in matched {
        if boundary::is_contained(&path, roots) {
            in_scope.push(path);
        } else {
            skipped.push(SkipRecord::new(path.to_string_lossy(), OUTSIDE_ROOTS));
        }
    }

    let chains: Vec<(&PathBuf, IgnoreChain)> = roots
        .iter()
        .map(|root| {
            (
                root,
                IgnoreChain::for_root(root, respect_git_ignore, respect_sheaf_ignore),
            )
        })
        .collect();

    let mut candidates = Vec::new();
    let mut ignore_counts: Vec<(&'static str, usize)> = Vec::new();
    for path in in_scope {
        // Boundary-checked above, so a containing root always exists.
        let Some(chain) = boundary::containing_root(&path, roots)
            .and_then(|root| chains.iter().find(|(r, _)| *r == root))
            .map(|(_, chain)| chain)
        else {
            continue;
        };

        match chain.rejects(&path) {
            Some(reason) => match ignore_counts.iter_mut().find(|(r, _)| *r == reason) {
                Some((_, count)) => *count += 1,
                None => ignore_counts.push((reason, 1)),
            },
            None => {
                let display = display_path(&path, target);
                candidates.push(CandidateFile { path, display });
            }
        }
    }

    for (reason, count) in ignore_counts {
        skipped.push(SkipRecord::aggregated(count, reason));
    }

    Ok((candidates, skipped))
}
