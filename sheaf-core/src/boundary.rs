//! Workspace boundary containment checks.
//!
//! Every path returned by a matcher is validated here before it is
//! trusted; a matcher operating with absolute output could (via symlinks
//! or bugs) hand back paths outside the sanctioned roots.

use std::path::{Component, Path, PathBuf};

/// Lexically normalize a path: resolve `.` and `..` components without
/// touching the filesystem.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // Keep leading ".." for relative paths; pop otherwise.
                let last = out.components().next_back();
                let pops = matches!(last, Some(Component::Normal(_)));
                let at_root = matches!(last, Some(Component::RootDir | Component::Prefix(_)));
                if pops {
                    out.pop();
                } else if !at_root {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// True iff `path` (normalized) is equal to or a descendant of at least
/// one root. Component-boundary aware: `/a/bc` is not under `/a/b`.
pub fn is_contained(path: &Path, roots: &[PathBuf]) -> bool {
    containing_root(path, roots).is_some()
}

/// The first root that contains `path`, if any.
pub fn containing_root<'r>(path: &Path, roots: &'r [PathBuf]) -> Option<&'r PathBuf> {
    let normalized = normalize(path);
    roots.iter().find(|root| normalized.starts_with(root))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roots(paths: &[&str]) -> Vec<PathBuf> {
        paths.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn test_descendant_is_contained() {
        let roots = roots(&["/work/project"]);
        assert!(is_contained(Path::new("/work/project/src/main.rs"), &roots));
        assert!(is_contained(Path::new("/work/project"), &roots));
    }

    #[test]
    fn test_sibling_prefix_is_not_contained() {
        // /a/bc must not count as a descendant of /a/b
        let roots = roots(&["/a/b"]);
        assert!(!is_contained(Path::new("/a/bc"), &roots));
        assert!(!is_contained(Path::new("/a/bc/file.txt"), &roots));
    }

    #[test]
    fn test_dotdot_escape_is_rejected() {
        let roots = roots(&["/work/project"]);
        assert!(!is_contained(Path::new("/work/project/../other/f.rs"), &roots));
        assert!(is_contained(Path::new("/work/project/src/../lib.rs"), &roots));
    }

    #[test]
    fn test_any_root_suffices() {
        let roots = roots(&["/alpha", "/beta"]);
        assert!(is_contained(Path::new("/beta/x.txt"), &roots));
        assert!(!is_contained(Path::new("/gamma/x.txt"), &roots));
    }

    #[test]
    fn test_containing_root_prefers_first_match() {
        let roots = roots(&["/work", "/work/nested"]);
        let found = containing_root(Path::new("/work/nested/f.txt"), &roots).unwrap();
        assert_eq!(found, Path::new("/work"));
    }

    #[test]
    fn test_normalize_handles_curdir() {
        assert_eq!(
            normalize(Path::new("/a/./b/./c")),
            PathBuf::from("/a/b/c")
        );
        assert_eq!(normalize(Path::new("a/../../b")), PathBuf::from("../b"));
        assert_eq!(normalize(Path::new("/../a")), PathBuf::from("/a"));
    }
}
