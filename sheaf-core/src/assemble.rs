//! Deterministic result assembly: separator-delimited combined content
//! plus a bounded human-readable summary.
//!
//! The literal strings here are part of the output contract; consumers
//! parse against them.

use crate::fetch::{FetchOutcome, Truncation};
use crate::gather::GatherOutput;
use crate::resolve::{CandidateFile, SkipRecord};
use std::collections::HashMap;
use std::path::PathBuf;

/// Fixed terminator emitted after the last content block.
pub const TERMINATOR: &str = "--- End of content ---";
/// Sentinel emitted when zero files were processed.
pub const NO_MATCHES: &str = "No files matching the criteria were found or all were skipped.";

/// Processed paths listed in full up to this many; elided beyond.
const MAX_LISTED_PROCESSED: usize = 10;
/// Skip entries listed in full up to this many; elided beyond.
const MAX_LISTED_SKIPS: usize = 5;

/// Separator line for one file's content.
pub fn separator(display: &str) -> String {
    format!("--- {} ---", display)
}

/// Warning banner emitted above truncated text content.
pub fn truncation_banner(truncation: &Truncation) -> String {
    match truncation {
        Truncation::Lines { shown, total } => {
            format!("[File truncated: showing lines 1-{} of {}]", shown, total)
        }
        Truncation::Bytes { shown } => {
            format!("[File truncated: first {} bytes shown]", shown)
        }
    }
}

/// Merge fetch outcomes back into sorted candidate order and build the
/// combined payload, the final skip ledger, and the display summary.
pub(crate) fn assemble(
    mut candidates: Vec<CandidateFile>,
    mut outcomes: HashMap<PathBuf, FetchOutcome>,
    mut skipped: Vec<SkipRecord>,
) -> GatherOutput {
    // Output order is always sorted absolute path, independent of fetch
    // completion order.
    candidates.sort();
    candidates.dedup();

    let mut blocks = Vec::new();
    let mut processed = Vec::new();

    for candidate in candidates {
        match outcomes.remove(&candidate.path) {
            Some(FetchOutcome::Text {
                content,
                truncation,
            }) => {
                let mut block = String::new();
                block.push_str(&separator(&candidate.display));
                block.push('\n');
                if let Some(truncation) = &truncation {
                    block.push_str(&truncation_banner(truncation));
                    block.push('\n');
                }
                block.push_str(&content);
                if !content.ends_with('\n') {
                    block.push('\n');
                }
                block.push('\n');
                blocks.push(ContentBlock::Text(block));
                processed.push(candidate.display);
            }
            Some(FetchOutcome::Binary { data, mime }) => {
                blocks.push(ContentBlock::Binary {
                    display: candidate.display.clone(),
                    mime,
                    data,
                });
                processed.push(candidate.display);
            }
            Some(FetchOutcome::Failure { reason }) => {
                skipped.push(SkipRecord::new(candidate.display, reason));
            }
            // Settle-all guarantees an outcome per candidate; keep the
            // processed/skipped partition total regardless.
            None => {
                skipped.push(SkipRecord::new(candidate.display, "no fetch outcome"));
            }
        }
    }

    if processed.is_empty() {
        blocks = vec![ContentBlock::Text(NO_MATCHES.to_string())];
    } else {
        blocks.push(ContentBlock::Text(TERMINATOR.to_string()));
    }

    let summary = build_summary(&processed, &skipped);

    GatherOutput {
        blocks,
        summary,
        processed,
        skipped,
    }
}

/// One piece of combined output, in final order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentBlock {
    /// Separator + optional banner + content + blank line (or a bare
    /// terminator/sentinel literal).
    Text(String),
    /// Raw payload of an explicitly requested image/PDF; carries no text
    /// separator since it is not concatenated prose.
    Binary {
        display: String,
        mime: &'static str,
        data: Vec<u8>,
    },
}

fn build_summary(processed: &[String], skipped: &[SkipRecord]) -> String {
    let mut summary = format!(
        "Processed {} file(s); skipped {} item(s).",
        processed.len(),
        skipped.len()
    );

    if !processed.is_empty() {
        summary.push_str("\n\nProcessed files:\n");
        for path in processed.iter().take(MAX_LISTED_PROCESSED) {
            summary.push_str(&format!("- {}\n", path));
        }
        if processed.len() > MAX_LISTED_PROCESSED {
            summary.push_str(&format!(
                "...and {} more.\n",
                processed.len() - MAX_LISTED_PROCESSED
            ));
        }
    }

    if !skipped.is_empty() {
        summary.push_str("\n\nSkipped:\n");
        for record in skipped.iter().take(MAX_LISTED_SKIPS) {
            summary.push_str(&format!("- {} ({})\n", record.label, record.reason));
        }
        if skipped.len() > MAX_LISTED_SKIPS {
            summary.push_str(&format!(
                "...and {} more.\n",
                skipped.len() - MAX_LISTED_SKIPS
            ));
        }
    }

    summary
}
