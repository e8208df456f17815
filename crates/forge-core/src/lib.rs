//! Forge Core Library
//!
//! Engine for incremental, fingerprint-gated deployment pipelines: workspace
//! materialization, content hashing, step execution and pipeline
//! reconciliation. Frontends (the CLI) wire these pieces to a terminal.

pub mod catalog;
pub mod context;
pub mod executor;
pub mod fs;
pub mod template;
pub mod types;
pub mod workspace;

/// Re-exports of commonly used types
pub mod prelude {
    // Catalog
    pub use crate::catalog::{
        Catalog, CatalogConfig, ChartInstallation, FileCatalog, Installation,
        TerraformInstallation,
    };

    // Executor
    pub use crate::executor::{DEPLOY, Execution, ExecutorError, Step, reconcile};

    // Filesystem
    pub use crate::fs::{FingerprintError, IgnoreList, fingerprint};

    // Workspace
    pub use crate::workspace::{ArtifactBuilder, Manifest, Workspace};

    // Context
    pub use crate::context::AppContext;

    // Values
    pub use crate::types::{ContextMap, ContextValue};
}
