//! Catalog boundary: the external registry that knows what is installed.
//!
//! The engine only requires read access returning the model shapes in
//! [`models`]; transport lives outside this crate. [`file::FileCatalog`]
//! provides a local JSON-backed implementation for development and tests.

pub mod file;
pub mod models;

use serde::{Deserialize, Serialize};
use url::Url;

pub use file::FileCatalog;
pub use models::{
    Chart, ChartInstallation, Dependencies, Dependency, DependencyKind, Installation, Publisher,
    Repository, Terraform, TerraformInstallation, User, Version, Wirings,
};

/// Connection data for a remote catalog.
///
/// Carried as configuration only; the network client consuming it is an
/// external collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub endpoint: Url,
    pub token: String,
}

/// Read access to installation metadata for one repository.
///
/// Every method failure is fatal to workspace construction; callers do not
/// retry or degrade.
pub trait Catalog {
    /// The caller's installation of the named repository.
    fn installation(&self, repo_name: &str) -> anyhow::Result<Installation>;

    /// Chart installations associated with a repository id.
    fn chart_installations(&self, repo_id: &str) -> anyhow::Result<Vec<ChartInstallation>>;

    /// Terraform installations associated with a repository id.
    fn terraform_installations(&self, repo_id: &str) -> anyhow::Result<Vec<TerraformInstallation>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_config_round_trips() {
        let config = CatalogConfig {
            endpoint: Url::parse("https://forge.example.com/gql").expect("url should parse"),
            token: "tok-123".to_string(),
        };
        let encoded = serde_json::to_string(&config).expect("serialize should succeed");
        let back: CatalogConfig = serde_json::from_str(&encoded).expect("deserialize should succeed");
        assert_eq!(back, config);
        assert_eq!(back.endpoint.host_str(), Some("forge.example.com"));
    }
}
