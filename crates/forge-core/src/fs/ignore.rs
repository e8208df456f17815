//! Ignore list for fingerprint filtering.
//!
//! A workspace carries a `.forgeignore` file listing path prefixes that must
//! never influence a fingerprint. The list is resolved once per pipeline run
//! and applied during traversal, before any file content is hashed.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// File name of the per-workspace ignore list.
pub const IGNORE_FILE: &str = ".forgeignore";

/// Written when a workspace is initialized: Terraform's local plugin and
/// state cache churns on every `terraform init` and must not mark the module
/// directory as changed.
const DEFAULT_IGNORE: &str = "terraform/.terraform";

/// Ordered set of path prefixes excluded from fingerprinting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoreList {
    prefixes: Vec<String>,
}

impl IgnoreList {
    pub fn new(prefixes: Vec<String>) -> Self {
        Self { prefixes }
    }

    /// Write the ignore file with the built-in default entry.
    ///
    /// Idempotent: an existing file is left untouched so operator additions
    /// survive re-initialization.
    pub fn init(workspace: &Path) -> io::Result<PathBuf> {
        let path = workspace.join(IGNORE_FILE);
        if !path.exists() {
            fs::write(&path, format!("{DEFAULT_IGNORE}\n"))?;
        }
        Ok(path)
    }

    /// Load the ignore list from `<workspace>/.forgeignore`.
    ///
    /// A missing file is an error, not an empty list: a prepared workspace
    /// always carries one, so absence means the workspace was never prepared
    /// or has been tampered with.
    pub fn load(workspace: &Path) -> io::Result<Self> {
        let contents = fs::read_to_string(workspace.join(IGNORE_FILE))?;
        Ok(Self::parse(&contents))
    }

    /// Parse newline-separated prefixes, dropping blanks and surrounding
    /// whitespace.
    pub fn parse(contents: &str) -> Self {
        let prefixes = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        Self { prefixes }
    }

    /// True if the relative path starts with any listed prefix.
    pub fn matches(&self, relative: &str) -> bool {
        self.prefixes
            .iter()
            .any(|prefix| relative.starts_with(prefix))
    }

    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }
}
