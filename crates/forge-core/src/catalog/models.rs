//! Catalog data model: repositories, packages, installations and wiring.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::ContextMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Publisher {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    pub id: String,
    pub name: String,
    pub publisher: Publisher,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<Publisher>,
}

/// A published chart version with its rendered values template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Version {
    pub id: String,
    pub version: String,
    #[serde(default)]
    pub readme: String,
    #[serde(default)]
    pub values_template: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chart {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub latest_version: String,
    #[serde(default)]
    pub dependencies: Dependencies,
}

/// A Terraform module package.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Terraform {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub values_template: String,
    #[serde(default)]
    pub package: String,
    #[serde(default)]
    pub dependencies: Dependencies,
}

/// Which package kind a dependency reference points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyKind {
    Helm,
    Terraform,
}

/// Reference to another named package in some repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub kind: DependencyKind,
    pub repo: String,
    pub name: String,
}

/// Cross-package parameter wiring.
///
/// Each map goes from a logical parameter name to a source expression
/// evaluated by the template collaborator; `terraform` entries consume
/// Terraform-produced values, `helm` entries consume Helm-produced ones.
/// Keys are unique per package by construction of the map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wirings {
    #[serde(default)]
    pub terraform: BTreeMap<String, String>,
    #[serde(default)]
    pub helm: BTreeMap<String, String>,
}

impl Wirings {
    pub fn is_empty(&self) -> bool {
        self.terraform.is_empty() && self.helm.is_empty()
    }
}

/// What a package declares about the world around it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dependencies {
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
    #[serde(default)]
    pub providers: Vec<String>,
    #[serde(default)]
    pub wirings: Wirings,
}

/// A user's installation of a repository, with its configuration context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Installation {
    pub id: String,
    pub repository: Repository,
    pub user: User,
    #[serde(default)]
    pub license: String,
    #[serde(default)]
    pub context: ContextMap,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartInstallation {
    pub id: String,
    pub chart: Chart,
    pub version: Version,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerraformInstallation {
    pub id: String,
    pub terraform: Terraform,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wirings_round_trip() {
        let json = r#"{
            "kind": "terraform",
            "repo": "gcp",
            "name": "bootstrap"
        }"#;
        let dep: Dependency = serde_json::from_str(json).expect("deserialize should succeed");
        assert_eq!(dep.kind, DependencyKind::Terraform);

        let mut wirings = Wirings::default();
        wirings
            .terraform
            .insert("vpc_name".to_string(), "{{ .cluster.vpc }}".to_string());
        let encoded = serde_json::to_string(&wirings).expect("serialize should succeed");
        let back: Wirings = serde_json::from_str(&encoded).expect("deserialize should succeed");
        assert_eq!(back, wirings);
        assert!(!back.is_empty());
    }

    #[test]
    fn dependencies_default_to_empty() {
        let deps: Dependencies = serde_json::from_str("{}").expect("deserialize should succeed");
        assert!(deps.dependencies.is_empty());
        assert!(deps.providers.is_empty());
        assert!(deps.wirings.is_empty());
    }
}
