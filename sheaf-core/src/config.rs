//! Configuration for sheaf

use crate::SheafError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration as TOML
pub const DEFAULT_CONFIG: &str = r#"# Sheaf Configuration

[excludes]
# Patterns excluded by default (dependency directories, VCS metadata,
# build output, lockfiles). Disable per call with use_default_excludes=false.
patterns = [
    "**/node_modules/**",
    "**/.git/**",
    "**/.hg/**",
    "**/.svn/**",
    "**/dist/**",
    "**/build/**",
    "**/target/**",
    "**/coverage/**",
    "**/__pycache__/**",
    "**/*.pyc",
    "**/*.pyo",
    "**/.DS_Store",
    "**/.env",
    "**/package-lock.json",
    "**/yarn.lock",
    "**/pnpm-lock.yaml",
    "**/Cargo.lock",
]
# Sentinel files excluded by name wherever they appear. The list is
# deployment-configurable; names here become "**/<name>" patterns.
memory_files = ["SHEAF.md"]

[read]
# Per-file line budget for text content
max_lines = 2000
# Bounded-read byte budget (at most this many bytes from offset 0)
max_bytes = 52428800
"#;

/// Name of the optional per-workspace config file.
pub const CONFIG_FILE_NAME: &str = ".sheaf.toml";

/// Sheaf configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub excludes: ExcludesConfig,
    #[serde(default)]
    pub read: ReadConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExcludesConfig {
    #[serde(default = "default_exclude_patterns")]
    pub patterns: Vec<String>,
    #[serde(default = "default_memory_files")]
    pub memory_files: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadConfig {
    #[serde(default = "default_max_lines")]
    pub max_lines: usize,
    #[serde(default = "default_max_bytes")]
    pub max_bytes: u64,
}

// Default value functions
fn default_exclude_patterns() -> Vec<String> {
    [
        "**/node_modules/**",
        "**/.git/**",
        "**/.hg/**",
        "**/.svn/**",
        "**/dist/**",
        "**/build/**",
        "**/target/**",
        "**/coverage/**",
        "**/__pycache__/**",
        "**/*.pyc",
        "**/*.pyo",
        "**/.DS_Store",
        "**/.env",
        "**/package-lock.json",
        "**/yarn.lock",
        "**/pnpm-lock.yaml",
        "**/Cargo.lock",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}
fn default_memory_files() -> Vec<String> {
    vec!["SHEAF.md".to_string()]
}
fn default_max_lines() -> usize {
    2000
}
fn default_max_bytes() -> u64 {
    52_428_800
}

impl Default for ExcludesConfig {
    fn default() -> Self {
        Self {
            patterns: default_exclude_patterns(),
            memory_files: default_memory_files(),
        }
    }
}

impl Default for ReadConfig {
    fn default() -> Self {
        Self {
            max_lines: default_max_lines(),
            max_bytes: default_max_bytes(),
        }
    }
}

impl Config {
    /// Load config from a TOML file
    pub fn load(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse config from TOML string
    pub fn from_toml(content: &str) -> crate::Result<Self> {
        toml::from_str(content).map_err(|e| SheafError::ConfigParse(e.to_string()))
    }

    /// Load `.sheaf.toml` from a workspace root, falling back to defaults.
    pub fn load_or_default(root: &Path) -> crate::Result<Self> {
        let path = root.join(CONFIG_FILE_NAME);
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Resolve the full default-exclude pattern list: static patterns plus
    /// the dynamically-named sentinel files, expanded to match anywhere.
    pub fn default_excludes(&self) -> Vec<String> {
        let mut patterns = self.excludes.patterns.clone();
        for name in &self.excludes.memory_files {
            patterns.push(format!("**/{}", name));
        }
        patterns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_parses() {
        let config = Config::from_toml(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.read.max_lines, 2000);
        assert_eq!(config.read.max_bytes, 52_428_800);
        assert!(config
            .excludes
            .patterns
            .contains(&"**/node_modules/**".to_string()));
    }

    #[test]
    fn test_default_excludes_include_memory_files() {
        let config = Config::default();
        let excludes = config.default_excludes();
        assert!(excludes.contains(&"**/SHEAF.md".to_string()));
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config = Config::from_toml("[read]\nmax_lines = 100\n").unwrap();
        assert_eq!(config.read.max_lines, 100);
        assert_eq!(config.read.max_bytes, 52_428_800);
        assert!(!config.excludes.patterns.is_empty());
    }

    #[test]
    fn test_custom_memory_files() {
        let config = Config::from_toml("[excludes]\nmemory_files = [\"NOTES.md\", \"AGENT.md\"]\n")
            .unwrap();
        let excludes = config.default_excludes();
        assert!(excludes.contains(&"**/NOTES.md".to_string()));
        assert!(excludes.contains(&"**/AGENT.md".to_string()));
    }

    #[test]
    fn test_invalid_toml_is_a_parse_error() {
        let err = Config::from_toml("[read\nmax_lines = ").unwrap_err();
        assert!(matches!(err, SheafError::ConfigParse(_)));
    }
}
