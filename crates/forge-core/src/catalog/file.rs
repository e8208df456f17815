//! JSON-file-backed catalog for development and tests.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use super::models::{ChartInstallation, Installation, TerraformInstallation};
use super::Catalog;

/// On-disk catalog document: one entry per installed repository, keyed by
/// repository name.
#[derive(Debug, Default, Deserialize)]
struct CatalogDocument {
    #[serde(default)]
    repositories: BTreeMap<String, CatalogEntry>,
}

#[derive(Debug, Deserialize)]
struct CatalogEntry {
    installation: Installation,
    #[serde(default)]
    charts: Vec<ChartInstallation>,
    #[serde(default)]
    terraform: Vec<TerraformInstallation>,
}

/// A catalog read once from a local JSON document.
#[derive(Debug)]
pub struct FileCatalog {
    path: PathBuf,
    document: CatalogDocument,
}

impl FileCatalog {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog file: {}", path.display()))?;
        let document: CatalogDocument = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse catalog file: {}", path.display()))?;
        Ok(Self {
            path: path.to_path_buf(),
            document,
        })
    }

    fn entry(&self, repo_name: &str) -> anyhow::Result<&CatalogEntry> {
        self.document.repositories.get(repo_name).ok_or_else(|| {
            anyhow::anyhow!(
                "Repository `{}` not present in catalog {}",
                repo_name,
                self.path.display()
            )
        })
    }

    fn entry_by_id(&self, repo_id: &str) -> anyhow::Result<&CatalogEntry> {
        self.document
            .repositories
            .values()
            .find(|entry| entry.installation.repository.id == repo_id)
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "No installation with repository id `{}` in catalog {}",
                    repo_id,
                    self.path.display()
                )
            })
    }
}

impl Catalog for FileCatalog {
    fn installation(&self, repo_name: &str) -> anyhow::Result<Installation> {
        Ok(self.entry(repo_name)?.installation.clone())
    }

    fn chart_installations(&self, repo_id: &str) -> anyhow::Result<Vec<ChartInstallation>> {
        Ok(self.entry_by_id(repo_id)?.charts.clone())
    }

    fn terraform_installations(&self, repo_id: &str) -> anyhow::Result<Vec<TerraformInstallation>> {
        Ok(self.entry_by_id(repo_id)?.terraform.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const DOC: &str = r#"{
        "repositories": {
            "airflow": {
                "installation": {
                    "id": "inst-1",
                    "repository": {
                        "id": "repo-1",
                        "name": "airflow",
                        "publisher": {"id": "pub-1", "name": "forge"}
                    },
                    "user": {"id": "user-1", "name": "op", "email": "op@example.com"},
                    "license": "lic-xyz",
                    "context": {"region": "us-east-1"}
                },
                "charts": [{
                    "id": "ci-1",
                    "chart": {
                        "id": "chart-1",
                        "name": "airflow",
                        "latest_version": "0.4.2"
                    },
                    "version": {"id": "v-1", "version": "0.4.2"}
                }],
                "terraform": [{
                    "id": "ti-1",
                    "terraform": {"id": "tf-1", "name": "airflow-aws"}
                }]
            }
        }
    }"#;

    fn write_catalog(dir: &Path) -> PathBuf {
        let path = dir.join("catalog.json");
        fs::write(&path, DOC).expect("write should succeed");
        path
    }

    #[test]
    fn looks_up_installation_by_repo_name() {
        let tmp = TempDir::new().expect("tempdir should succeed");
        let catalog = FileCatalog::open(&write_catalog(tmp.path())).expect("open should succeed");

        let installation = catalog
            .installation("airflow")
            .expect("installation should resolve");
        assert_eq!(installation.repository.name, "airflow");
        assert_eq!(installation.license, "lic-xyz");
        assert_eq!(installation.context["region"].as_str(), Some("us-east-1"));
    }

    #[test]
    fn looks_up_packages_by_repo_id() {
        let tmp = TempDir::new().expect("tempdir should succeed");
        let catalog = FileCatalog::open(&write_catalog(tmp.path())).expect("open should succeed");

        let charts = catalog
            .chart_installations("repo-1")
            .expect("charts should resolve");
        assert_eq!(charts.len(), 1);
        assert_eq!(charts[0].chart.name, "airflow");

        let terraform = catalog
            .terraform_installations("repo-1")
            .expect("terraform should resolve");
        assert_eq!(terraform.len(), 1);
        assert_eq!(terraform[0].terraform.name, "airflow-aws");
    }

    #[test]
    fn unknown_repository_is_fatal() {
        let tmp = TempDir::new().expect("tempdir should succeed");
        let catalog = FileCatalog::open(&write_catalog(tmp.path())).expect("open should succeed");
        assert!(catalog.installation("unknown").is_err());
        assert!(catalog.chart_installations("missing-id").is_err());
    }
}
