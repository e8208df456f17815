//! Workspace composition and on-disk materialization.
//!
//! A workspace bundles an installation with its chart and Terraform package
//! installations, and knows how to lay out the directory structure the
//! deploy pipeline targets. Generation of the actual Helm/Terraform file
//! trees is delegated through [`ArtifactBuilder`].

pub mod manifest;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Utc;
use tracing::debug;

use crate::catalog::{Catalog, ChartInstallation, Installation, TerraformInstallation};
use crate::fs::IgnoreList;

pub use manifest::{ChartRef, MANIFEST_FILE, Manifest, TerraformRef};

/// Directory under a workspace holding the bootstrap marker files.
pub const FORGE_DIR: &str = ".forge";

/// An installation plus the package installations deployed with it.
#[derive(Debug, Clone)]
pub struct Workspace {
    pub installation: Installation,
    pub charts: Vec<ChartInstallation>,
    pub terraform: Vec<TerraformInstallation>,
}

/// Boundary to the external generators that render Helm charts and Terraform
/// modules into a prepared workspace. Out of scope for the engine; callers
/// supply an implementation when they want trees materialized.
pub trait ArtifactBuilder {
    fn build_terraform(&self, workspace: &Workspace, dir: &Path) -> anyhow::Result<()>;
    fn build_helm(&self, workspace: &Workspace, dir: &Path) -> anyhow::Result<()>;
}

impl Workspace {
    /// Assemble a workspace from the catalog. Any catalog failure aborts.
    pub fn fetch(catalog: &dyn Catalog, repo_name: &str) -> anyhow::Result<Self> {
        let installation = catalog
            .installation(repo_name)
            .with_context(|| format!("Failed to fetch installation for `{repo_name}`"))?;
        let repo_id = installation.repository.id.clone();
        let charts = catalog
            .chart_installations(&repo_id)
            .with_context(|| format!("Failed to fetch chart installations for `{repo_name}`"))?;
        let terraform = catalog.terraform_installations(&repo_id).with_context(|| {
            format!("Failed to fetch terraform installations for `{repo_name}`")
        })?;

        Ok(Self {
            installation,
            charts,
            terraform,
        })
    }

    /// Directory this workspace materializes into, under `root`.
    pub fn dir(&self, root: &Path) -> PathBuf {
        root.join(&self.installation.repository.name)
    }

    /// Lay out the workspace on disk: package directories, ignore file,
    /// bootstrap markers, and the manifest.
    ///
    /// Idempotent over existing directories. Any failure here aborts before
    /// external builders are invoked. Returns the workspace directory.
    pub fn prepare(&self, root: &Path) -> anyhow::Result<PathBuf> {
        let workspace = self.dir(root);
        for sub in ["terraform", "helm", FORGE_DIR] {
            let dir = workspace.join(sub);
            fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        }

        IgnoreList::init(&workspace).context("Failed to write ignore file")?;
        self.write_markers(&workspace)?;

        let manifest_path = workspace.join(MANIFEST_FILE);
        Manifest::from_workspace(self).write(&manifest_path)?;
        debug!(workspace = %workspace.display(), "workspace prepared");

        Ok(workspace)
    }

    /// Prepare the workspace and hand the package directories to the
    /// external generators.
    ///
    /// Terraform trees are rendered before Helm trees so chart values can be
    /// wired from module outputs. Returns the workspace directory.
    pub fn materialize(&self, root: &Path, builder: &dyn ArtifactBuilder) -> anyhow::Result<PathBuf> {
        let workspace = self.prepare(root)?;
        builder
            .build_terraform(self, &workspace.join("terraform"))
            .context("Failed to build terraform modules")?;
        builder
            .build_helm(self, &workspace.join("helm"))
            .context("Failed to build helm charts")?;
        Ok(workspace)
    }

    /// Bootstrap markers gate the run-once pipeline steps.
    ///
    /// ONCE is written a single time, so steps targeting it run exactly once
    /// for the lifetime of the workspace. NONCE is refreshed on every
    /// prepare, forcing its step (cluster credential setup) to re-run after
    /// each re-materialization.
    fn write_markers(&self, workspace: &Path) -> anyhow::Result<()> {
        let forge_dir = workspace.join(FORGE_DIR);

        let once = forge_dir.join("ONCE");
        if !once.exists() {
            fs::write(&once, "ONCE\n")
                .with_context(|| format!("Failed to write marker: {}", once.display()))?;
        }

        let nonce = forge_dir.join("NONCE");
        fs::write(&nonce, format!("{}\n", Utc::now().to_rfc3339()))
            .with_context(|| format!("Failed to write marker: {}", nonce.display()))?;

        Ok(())
    }
}
