//! Application context threading explicit paths through the engine.
//!
//! Nothing in the core consults process-wide state; the deployment root is
//! decided once by the frontend and passed down, which keeps every component
//! testable against a temp directory.

use std::path::{Path, PathBuf};

use crate::executor::{DEPLOY, Execution, ExecutorError};

/// Root of the deployment tree all workspaces live under.
#[derive(Debug, Clone)]
pub struct AppContext {
    root: PathBuf,
}

impl AppContext {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Use the invoking process's working directory as the root.
    pub fn from_current_dir() -> anyhow::Result<Self> {
        Ok(Self::new(std::env::current_dir()?))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory of a repository's workspace under the root.
    pub fn workspace_dir(&self, repo_name: &str) -> PathBuf {
        self.root.join(repo_name)
    }

    /// The deploy execution for a repository: persisted state merged with the
    /// canonical pipeline.
    pub fn deploy_execution(&self, repo_name: &str) -> Result<Execution, ExecutorError> {
        let previous = Execution::load(&self.root, Path::new(repo_name), DEPLOY)?;
        Ok(Execution::deploy(Path::new(repo_name), previous))
    }
}
