//! Incremental pipeline execution.
//!
//! An [`Execution`] is the ordered, persisted list of [`Step`]s for one
//! workspace. Each step fingerprints its target before running and skips the
//! command when nothing changed; fingerprints advance only on success, so a
//! failed or interrupted deploy resumes exactly where it stopped.

pub mod error;
pub mod execution;
pub mod reconcile;
pub mod step;

pub use error::ExecutorError;
pub use execution::{DEPLOY, Execution, Metadata, default_steps};
pub use reconcile::reconcile;
pub use step::Step;
