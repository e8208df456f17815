//! Boundary to the external template renderer.
//!
//! Values files and configuration are generated from templates supplied by
//! the catalog; the rendering engine itself lives outside this crate. The
//! contract here is the input shape (template text plus a context map) and
//! the fixed helper set a conforming renderer exposes.

use crate::types::ContextMap;

/// Renders a template against an installation's context map.
pub trait Renderer {
    fn render(&self, template: &str, context: &ContextMap) -> anyhow::Result<String>;
}

/// Helper functions a conforming renderer must expose to templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Helper {
    /// Generate a fresh AES key, for secrets that must be minted at render
    /// time.
    GenAesKey,
    /// Absolute path of the deployment root.
    RepoRoot,
    /// Name of the repository being rendered.
    RepoName,
    /// Git url of the deployment repository.
    RepoUrl,
    /// Prompt the operator and read one line.
    ReadLine,
    /// Prompt with a default used on empty input.
    ReadLineDefault,
    /// Inline the contents of a local file.
    ReadFile,
    /// The operator's home directory.
    HomeDir,
}

impl Helper {
    pub const ALL: [Helper; 8] = [
        Helper::GenAesKey,
        Helper::RepoRoot,
        Helper::RepoName,
        Helper::RepoUrl,
        Helper::ReadLine,
        Helper::ReadLineDefault,
        Helper::ReadFile,
        Helper::HomeDir,
    ];

    /// Name the helper is registered under in templates.
    pub fn name(&self) -> &'static str {
        match self {
            Helper::GenAesKey => "genAESKey",
            Helper::RepoRoot => "repoRoot",
            Helper::RepoName => "repoName",
            Helper::RepoUrl => "repoUrl",
            Helper::ReadLine => "readLine",
            Helper::ReadLineDefault => "readLineDefault",
            Helper::ReadFile => "readFile",
            Helper::HomeDir => "homeDir",
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn helper_names_are_unique() {
        let names: HashSet<&str> = Helper::ALL.iter().map(Helper::name).collect();
        assert_eq!(names.len(), Helper::ALL.len());
    }

    #[test]
    fn renderer_is_object_safe() {
        struct Echo;
        impl Renderer for Echo {
            fn render(&self, template: &str, _context: &ContextMap) -> anyhow::Result<String> {
                Ok(template.to_string())
            }
        }

        let renderer: &dyn Renderer = &Echo;
        let rendered = renderer
            .render("values: {}", &ContextMap::new())
            .expect("render should succeed");
        assert_eq!(rendered, "values: {}");
    }
}
