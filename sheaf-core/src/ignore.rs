//! Layered ignore filtering: named predicates chained with AND.
//!
//! Each layer is toggled by an explicit flag on the call. A path is kept
//! only if every active layer keeps it; the first rejecting layer names
//! the skip reason, so later layers never double-count a removed path.

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::path::Path;

/// Skip-reason label for the VCS ignore layer.
pub const GIT_IGNORED: &str = "git ignored";
/// Skip-reason label for the tool ignore layer.
pub const SHEAF_IGNORED: &str = "sheaf ignored";

/// Tool-specific ignore file, `.gitignore` semantics.
pub const SHEAF_IGNORE_FILE: &str = ".sheafignore";

struct IgnoreLayer {
    reason: &'static str,
    matcher: Gitignore,
}

/// Ordered AND-chain of ignore layers rooted at one workspace root.
#[derive(Default)]
pub struct IgnoreChain {
    layers: Vec<IgnoreLayer>,
}

impl IgnoreChain {
    /// Build the chain for a root. The VCS layer loads only for git
    /// repositories (both `.git` and `.gitignore` present); the tool layer
    /// only needs the ignore file itself.
    pub fn for_root(root: &Path, respect_git_ignore: bool, respect_sheaf_ignore: bool) -> Self {
        let mut layers = Vec::new();

        if respect_git_ignore {
            let gitignore_file = root.join(".gitignore");
            if root.join(".git").exists() && gitignore_file.exists() {
                if let Some(matcher) = build_matcher(root, &gitignore_file) {
                    layers.push(IgnoreLayer {
                        reason: GIT_IGNORED,
                        matcher,
                    });
                }
            }
        }

        if respect_sheaf_ignore {
            let sheafignore_file = root.join(SHEAF_IGNORE_FILE);
            if sheafignore_file.exists() {
                if let Some(matcher) = build_matcher(root, &sheafignore_file) {
                    layers.push(IgnoreLayer {
                        reason: SHEAF_IGNORED,
                        matcher,
                    });
                }
            }
        }

        Self { layers }
    }

    /// Evaluate a file path against the chain. Returns the rejecting
    /// layer's reason, or None if all active layers keep the path.
    /// Ancestor directories count: `secrets/` rejects `secrets/key.pem`.
    pub fn rejects(&self, path: &Path) -> Option<&'static str> {
        self.layers
            .iter()
            .find(|layer| {
                layer
                    .matcher
                    .matched_path_or_any_parents(path, false)
                    .is_ignore()
            })
            .map(|layer| layer.reason)
    }
}

fn build_matcher(root: &Path, ignore_file: &Path) -> Option<Gitignore> {
    let mut builder = GitignoreBuilder::new(root);
    // add() returns the first error encountered; a broken ignore file
    // simply contributes no patterns.
    if builder.add(ignore_file).is_some() {
        return None;
    }
    builder.build().ok()
}
