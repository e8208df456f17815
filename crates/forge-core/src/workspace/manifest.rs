//! Workspace manifest: the durable record of what was materialized.
//!
//! Written once per preparation (overwrite) with enough identifying data to
//! regenerate the chart and module file trees later.

use std::fs;
use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::ContextMap;

use super::Workspace;

/// File name of the manifest inside a workspace directory.
pub const MANIFEST_FILE: &str = "manifest.yaml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub name: String,
    pub publisher: String,
    #[serde(default)]
    pub license: String,
    pub generated_at: DateTime<Utc>,
    #[serde(default)]
    pub context: ContextMap,
    #[serde(default)]
    pub charts: Vec<ChartRef>,
    #[serde(default)]
    pub terraform: Vec<TerraformRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartRef {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerraformRef {
    pub name: String,
}

impl Manifest {
    /// Snapshot the identifying data of a fetched workspace.
    pub fn from_workspace(workspace: &Workspace) -> Self {
        let installation = &workspace.installation;
        Self {
            name: installation.repository.name.clone(),
            publisher: installation.repository.publisher.name.clone(),
            license: installation.license.clone(),
            generated_at: Utc::now(),
            context: installation.context.clone(),
            charts: workspace
                .charts
                .iter()
                .map(|ci| ChartRef {
                    name: ci.chart.name.clone(),
                    version: ci.version.version.clone(),
                })
                .collect(),
            terraform: workspace
                .terraform
                .iter()
                .map(|ti| TerraformRef {
                    name: ti.terraform.name.clone(),
                })
                .collect(),
        }
    }

    pub fn write(&self, path: &Path) -> anyhow::Result<()> {
        let contents = serde_yaml::to_string(self).context("Failed to serialize manifest")?;
        fs::write(path, contents)
            .with_context(|| format!("Failed to write manifest: {}", path.display()))
    }

    pub fn read(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest: {}", path.display()))?;
        serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse manifest: {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn manifest_round_trips_through_yaml() {
        let tmp = TempDir::new().expect("tempdir should succeed");
        let path = tmp.path().join(MANIFEST_FILE);

        let mut context = ContextMap::new();
        context.insert("region".to_string(), "us-east-1".into());
        let manifest = Manifest {
            name: "airflow".to_string(),
            publisher: "forge".to_string(),
            license: "lic-xyz".to_string(),
            generated_at: Utc::now(),
            context,
            charts: vec![ChartRef {
                name: "airflow".to_string(),
                version: "0.4.2".to_string(),
            }],
            terraform: vec![TerraformRef {
                name: "airflow-aws".to_string(),
            }],
        };

        manifest.write(&path).expect("write should succeed");
        let back = Manifest::read(&path).expect("read should succeed");
        assert_eq!(back, manifest);
    }
}
