//! Concurrent content fetching with settle-all semantics.
//!
//! Every candidate is read independently; one slow or failing file never
//! blocks or voids the others. Producers fan out over a rayon pool and
//! send `(path, outcome)` pairs through a bounded channel; the calling
//! thread collects exactly one outcome per candidate.

use crate::cancel::CancelFlag;
use crate::classify::{self, FileKind};
use crate::resolve::CandidateFile;
use rayon::prelude::*;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Skip reason for image/pdf files a pattern never asked for by name.
pub const ASSET_NOT_REQUESTED: &str =
    "asset file (image/pdf) was not explicitly requested by name or extension";
/// Skip reason for opaque binary content.
pub const BINARY_NOT_DISPLAYABLE: &str = "cannot display content of binary file";
/// Skip reason for reads short-circuited by cancellation.
pub const READ_CANCELLED: &str = "read cancelled";

/// Why emitted content is a strict prefix of the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Truncation {
    /// The per-file line budget cut the content.
    Lines { shown: usize, total: usize },
    /// The bounded read hit the byte budget before the line budget.
    Bytes { shown: u64 },
}

/// Per-file fetch result. Failures are data, not errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Text {
        content: String,
        truncation: Option<Truncation>,
    },
    Binary {
        data: Vec<u8>,
        mime: &'static str,
    },
    Failure {
        reason: String,
    },
}

/// Budgets applied to every read.
#[derive(Debug, Clone)]
pub struct ReadPolicy {
    pub max_lines: usize,
    pub max_bytes: u64,
}

impl From<&crate::Config> for ReadPolicy {
    fn from(config: &crate::Config) -> Self {
        Self {
            max_lines: config.read.max_lines,
            max_bytes: config.read.max_bytes,
        }
    }
}

/// The explicit-request predicate for binary assets: an image/pdf is only
/// returned when some input pattern contains its dotted extension or its
/// file stem as a substring. Deliberately permissive; tightening it would
/// change observable skip behavior.
pub struct ExplicitRequest {
    patterns: Vec<String>,
}

impl ExplicitRequest {
    pub fn new(patterns: &[String]) -> Self {
        Self {
            patterns: patterns.iter().map(|p| p.to_lowercase()).collect(),
        }
    }

    pub fn requested(&self, path: &Path) -> bool {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e.to_lowercase()));
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .map(|s| s.to_lowercase());

        self.patterns.iter().any(|pattern| {
            ext.as_ref().is_some_and(|e| pattern.contains(e.as_str()))
                || stem
                    .as_ref()
                    .is_some_and(|s| !s.is_empty() && pattern.contains(s.as_str()))
        })
    }
}

/// Fetch all candidates concurrently and settle every outcome.
pub(crate) fn fetch_all(
    candidates: &[CandidateFile],
    policy: &ReadPolicy,
    explicit: &ExplicitRequest,
    cancel: &CancelFlag,
) -> HashMap<PathBuf, FetchOutcome> {
    let (tx, rx) = crossbeam_channel::bounded::<(PathBuf, FetchOutcome)>(64);

    let mut outcomes = HashMap::with_capacity(candidates.len());
    std::thread::scope(|s| {
        s.spawn(move || {
            candidates.par_iter().for_each_with(tx, |sender, candidate| {
                let outcome = fetch_one(&candidate.path, policy, explicit, cancel);
                let _ = sender.send((candidate.path.clone(), outcome));
            });
            // All sender clones dropped here; the receiver drains out.
        });

        for (path, outcome) in rx.iter() {
            outcomes.insert(path, outcome);
        }
    });

    outcomes
}

fn fetch_one(
    path: &Path,
    policy: &ReadPolicy,
    explicit: &ExplicitRequest,
    cancel: &CancelFlag,
) -> FetchOutcome {
    // Short-circuit reads that have not started; a read that already
    // completed still reports its content.
    if cancel.is_cancelled() {
        return FetchOutcome::Failure {
            reason: READ_CANCELLED.to_string(),
        };
    }

    let kind = match classify::classify(path) {
        Ok(kind) => kind,
        Err(e) => {
            return FetchOutcome::Failure {
                reason: format!("read error: {e}"),
            }
        }
    };

    match kind {
        FileKind::Image | FileKind::Pdf => {
            if !explicit.requested(path) {
                return FetchOutcome::Failure {
                    reason: ASSET_NOT_REQUESTED.to_string(),
                };
            }
            // Explicitly requested binary payloads are returned whole.
            match std::fs::read(path) {
                Ok(data) => FetchOutcome::Binary {
                    data,
                    mime: classify::mime_for(path).unwrap_or("application/octet-stream"),
                },
                Err(e) => FetchOutcome::Failure {
                    reason: format!("read error: {e}"),
                },
            }
        }
        FileKind::Binary => FetchOutcome::Failure {
            reason: BINARY_NOT_DISPLAYABLE.to_string(),
        },
        FileKind::Text => read_text(path, policy),
    }
}

fn read_text(path: &Path, policy: &ReadPolicy) -> FetchOutcome {
    let (bytes, clipped) = match read_prefix(path, policy.max_bytes) {
        Ok(read) => read,
        Err(e) => {
            return FetchOutcome::Failure {
                reason: format!("read error: {e}"),
            }
        }
    };

    let content = String::from_utf8_lossy(&bytes).into_owned();

    if clipped {
        // The line budget still applies to the bytes we kept, but the
        // clip is what made the content a prefix of the file.
        let content = match truncate_lines(&content, policy.max_lines) {
            Some((kept, _)) => kept,
            None => content,
        };
        return FetchOutcome::Text {
            content,
            truncation: Some(Truncation::Bytes {
                shown: bytes.len() as u64,
            }),
        };
    }

    match truncate_lines(&content, policy.max_lines) {
        Some((kept, total)) => FetchOutcome::Text {
            content: kept,
            truncation: Some(Truncation::Lines {
                shown: policy.max_lines,
                total,
            }),
        },
        None => FetchOutcome::Text {
            content,
            truncation: None,
        },
    }
}

/// The single bounded-read primitive: at most `max_bytes` from offset 0.
fn read_prefix(path: &Path, max_bytes: u64) -> std::io::Result<(Vec<u8>, bool)> {
    let file = File::open(path)?;
    let mut buf = Vec::new();
    file.take(max_bytes.saturating_add(1)).read_to_end(&mut buf)?;
    let clipped = buf.len() as u64 > max_bytes;
    if clipped {
        buf.truncate(max_bytes as usize);
    }
    Ok((buf, clipped))
}

/// First `max_lines` lines when the content exceeds the budget, with the
/// true total. None when the content already fits.
fn truncate_lines(content: &str, max_lines: usize) -> Option<(String, usize)> {
    let total = content.lines().count();
    if total <= max_lines {
        return None;
    }
    let kept: Vec<&str> = content.lines().take(max_lines).collect();
    Some((kept.join("\n"), total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn candidate(path: &Path) -> CandidateFile {
        CandidateFile {
            path: path.to_path_buf(),
            display: path.file_name().unwrap().to_string_lossy().to_string(),
        }
    }

    fn policy(max_lines: usize, max_bytes: u64) -> ReadPolicy {
        ReadPolicy {
            max_lines,
            max_bytes,
        }
    }

    fn no_assets() -> ExplicitRequest {
        ExplicitRequest::new(&["*.md".to_string()])
    }

    #[test]
    fn test_line_budget_keeps_exact_prefix() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("big.txt");
        let body: String = (1..=30).map(|i| format!("line {}\n", i)).collect();
        fs::write(&path, &body).unwrap();

        let outcomes = fetch_all(
            &[candidate(&path)],
            &policy(10, u64::MAX),
            &no_assets(),
            &CancelFlag::new(),
        );
        let FetchOutcome::Text {
            content,
            truncation,
        } = &outcomes[&path]
        else {
            panic!("expected text outcome");
        };

        let expected: Vec<String> = (1..=10).map(|i| format!("line {}", i)).collect();
        assert_eq!(content, &expected.join("\n"));
        assert_eq!(*truncation, Some(Truncation::Lines { shown: 10, total: 30 }));
    }

    #[test]
    fn test_content_within_budget_is_untouched() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("small.txt");
        fs::write(&path, "one\ntwo\n").unwrap();

        let outcomes = fetch_all(
            &[candidate(&path)],
            &policy(10, u64::MAX),
            &no_assets(),
            &CancelFlag::new(),
        );
        assert_eq!(
            outcomes[&path],
            FetchOutcome::Text {
                content: "one\ntwo\n".to_string(),
                truncation: None,
            }
        );
    }

    #[test]
    fn test_byte_budget_clips_with_byte_truncation() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("wide.txt");
        fs::write(&path, "abcdefghij-and-more").unwrap();

        let outcomes = fetch_all(
            &[candidate(&path)],
            &policy(1000, 10),
            &no_assets(),
            &CancelFlag::new(),
        );
        assert_eq!(
            outcomes[&path],
            FetchOutcome::Text {
                content: "abcdefghij".to_string(),
                truncation: Some(Truncation::Bytes { shown: 10 }),
            }
        );
    }

    #[test]
    fn test_asset_requires_explicit_request() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("logo.png");
        fs::write(&path, b"\x89PNG\r\n").unwrap();

        // Broad glob: not an explicit request.
        let outcomes = fetch_all(
            &[candidate(&path)],
            &policy(1000, u64::MAX),
            &ExplicitRequest::new(&["**/*".to_string()]),
            &CancelFlag::new(),
        );
        assert_eq!(
            outcomes[&path],
            FetchOutcome::Failure {
                reason: ASSET_NOT_REQUESTED.to_string(),
            }
        );

        // Extension named in a pattern.
        let outcomes = fetch_all(
            &[candidate(&path)],
            &policy(1000, u64::MAX),
            &ExplicitRequest::new(&["**/*.png".to_string()]),
            &CancelFlag::new(),
        );
        assert_eq!(
            outcomes[&path],
            FetchOutcome::Binary {
                data: b"\x89PNG\r\n".to_vec(),
                mime: "image/png",
            }
        );

        // File stem named in a pattern.
        let request = ExplicitRequest::new(&["assets/logo.*".to_string()]);
        assert!(request.requested(&path));
    }

    #[test]
    fn test_opaque_binary_fails_with_reason() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.bin");
        fs::write(&path, [1u8, 0, 2, 0]).unwrap();

        let outcomes = fetch_all(
            &[candidate(&path)],
            &policy(1000, u64::MAX),
            &no_assets(),
            &CancelFlag::new(),
        );
        assert_eq!(
            outcomes[&path],
            FetchOutcome::Failure {
                reason: BINARY_NOT_DISPLAYABLE.to_string(),
            }
        );
    }

    #[test]
    fn test_one_failure_never_voids_the_batch() {
        let dir = TempDir::new().unwrap();
        let good = dir.path().join("good.txt");
        let gone = dir.path().join("gone.txt");
        fs::write(&good, "fine\n").unwrap();

        let outcomes = fetch_all(
            &[candidate(&good), candidate(&gone)],
            &policy(1000, u64::MAX),
            &no_assets(),
            &CancelFlag::new(),
        );

        assert_eq!(outcomes.len(), 2);
        assert!(matches!(outcomes[&good], FetchOutcome::Text { .. }));
        assert!(matches!(outcomes[&gone], FetchOutcome::Failure { .. }));
    }

    #[test]
    fn test_cancelled_fetch_settles_every_candidate() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.txt");
        fs::write(&path, "a\n").unwrap();

        let cancel = CancelFlag::new();
        cancel.cancel();
        let outcomes = fetch_all(
            &[candidate(&path)],
            &policy(1000, u64::MAX),
            &no_assets(),
            &cancel,
        );
        assert_eq!(
            outcomes[&path],
            FetchOutcome::Failure {
                reason: READ_CANCELLED.to_string(),
            }
        );
    }
}
