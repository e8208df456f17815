//! The persisted, ordered pipeline of steps for one workspace.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::fs::{IGNORE_FILE, IgnoreList};

use super::error::ExecutorError;
use super::reconcile::reconcile;
use super::step::Step;

/// Name of the canonical deploy pipeline and of its state file.
pub const DEPLOY: &str = "deploy";

/// Identifies where an execution's state file lives relative to the root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub path: PathBuf,
    pub name: String,
}

/// An ordered pipeline of fingerprint-gated steps plus its location.
///
/// The state file is the durable record of pipeline progress; the per-step
/// `sha` values are what make re-invocation resume instead of restart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Execution {
    pub metadata: Metadata,
    #[serde(rename = "step", default)]
    pub steps: Vec<Step>,
}

impl Execution {
    /// Load the persisted execution for a workspace.
    ///
    /// A missing state file yields an empty execution (first deploy); any
    /// other read or parse failure is surfaced.
    pub fn load(root: &Path, workspace: &Path, name: &str) -> Result<Self, ExecutorError> {
        let file = state_file(root, workspace, name);
        let contents = match fs::read_to_string(&file) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(file = %file.display(), "no persisted pipeline, starting fresh");
                return Ok(Self {
                    metadata: Metadata {
                        path: workspace.to_path_buf(),
                        name: name.to_string(),
                    },
                    steps: Vec::new(),
                });
            }
            Err(source) => return Err(ExecutorError::ReadState { path: file, source }),
        };

        toml::from_str(&contents).map_err(|source| ExecutorError::ParseState { path: file, source })
    }

    /// Build the deploy pipeline for a workspace, merging the canonical step
    /// list with whatever `previous` recorded.
    pub fn deploy(workspace: &Path, previous: Execution) -> Execution {
        Execution {
            metadata: Metadata {
                path: workspace.to_path_buf(),
                name: DEPLOY.to_string(),
            },
            steps: reconcile(default_steps(workspace), previous.steps),
        }
    }

    /// Run every step in order with fail-fast semantics.
    ///
    /// The ignore list is resolved once up front; a missing ignore file
    /// aborts the run before any step executes. On a step failure the
    /// fingerprints earned so far are flushed before the error returns, so
    /// the next invocation resumes at the failing step.
    pub fn run(&mut self, root: &Path) -> Result<(), ExecutorError> {
        let workspace = root.join(&self.metadata.path);
        let ignore = IgnoreList::load(&workspace).map_err(|source| ExecutorError::IgnoreFile {
            path: workspace.join(IGNORE_FILE),
            source,
        })?;

        println!(
            "deploying {}, hold on to your butts",
            self.metadata.path.display()
        );

        let mut failure = None;
        for step in &mut self.steps {
            match step.execute(root, &ignore) {
                Ok(sha) => step.sha = sha,
                Err(err) => {
                    failure = Some(err);
                    break;
                }
            }
        }

        self.flush(root)?;
        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Persist the execution, replacing the previous state file.
    ///
    /// Writes to a sibling temp file and renames over the target so a crash
    /// mid-write never leaves a truncated state file behind.
    pub fn flush(&self, root: &Path) -> Result<(), ExecutorError> {
        let contents = toml::to_string_pretty(self).map_err(ExecutorError::EncodeState)?;
        let path = state_file(root, &self.metadata.path, &self.metadata.name);
        let staged = path.with_extension("toml.partial");
        fs::write(&staged, contents).map_err(|source| ExecutorError::WriteState {
            path: staged.clone(),
            source,
        })?;
        fs::rename(&staged, &path)
            .map_err(|source| ExecutorError::WriteState { path, source })?;
        Ok(())
    }

    /// Path of this execution's state file under `root`.
    pub fn state_path(&self, root: &Path) -> PathBuf {
        state_file(root, &self.metadata.path, &self.metadata.name)
    }
}

fn state_file(root: &Path, workspace: &Path, name: &str) -> PathBuf {
    root.join(workspace).join(format!("{name}.toml"))
}

/// The canonical deploy pipeline in declared order: terraform provisioning,
/// cluster and chart bootstrap, then the chart deployment itself.
pub fn default_steps(workspace: &Path) -> Vec<Step> {
    let path = workspace.display().to_string();
    let terraform = workspace.join("terraform");
    vec![
        Step::new("terraform-init", &terraform, &terraform, "terraform", &[
            "init",
        ]),
        Step::new("terraform-apply", &terraform, &terraform, "terraform", &[
            "apply",
            "-auto-approve",
        ]),
        Step::new(
            "kube-init",
            workspace,
            &forgefile(workspace, "NONCE"),
            "forge",
            &["wkspace", "kube-init", &path],
        ),
        Step::new(
            "helm-init",
            workspace,
            &forgefile(workspace, "ONCE"),
            "forge",
            &["wkspace", "helm-init", &path],
        ),
        Step::new(
            "docker-credentials",
            workspace,
            &forgefile(workspace, "ONCE"),
            "forge",
            &["wkspace", "docker-credentials", &path],
        ),
        Step::new(
            "bounce",
            workspace,
            &workspace.join("helm"),
            "forge",
            &["wkspace", "helm", &path],
        ),
    ]
}

/// Marker files under `<workspace>/.forge/` gate the bootstrap steps: ONCE is
/// written a single time, NONCE is refreshed on every prepare.
fn forgefile(workspace: &Path, name: &str) -> PathBuf {
    workspace.join(".forge").join(name)
}
