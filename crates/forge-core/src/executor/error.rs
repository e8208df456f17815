//! Error taxonomy for the pipeline executor.

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

use crate::fs::FingerprintError;

/// Failures surfaced by step execution and pipeline persistence.
///
/// Every variant is fatal to the run; the executor performs no internal
/// retries. Fingerprints already earned in the failing run are flushed before
/// the error propagates, so a re-invocation resumes at the failing step.
#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error(transparent)]
    Fingerprint(#[from] FingerprintError),

    #[error("failed to read ignore file {path}")]
    IgnoreFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to launch `{command}` for step `{step}`")]
    Spawn {
        step: String,
        command: String,
        #[source]
        source: io::Error,
    },

    /// Nonzero exit. Carries the combined stdout/stderr captured while the
    /// command ran, for diagnostics after the live stream has scrolled by.
    #[error("step `{step}` failed: `{command}` exited with {status}")]
    Process {
        step: String,
        command: String,
        status: ExitStatus,
        output: String,
    },

    #[error("failed to read pipeline state from {path}")]
    ReadState {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse pipeline state at {path}")]
    ParseState {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize pipeline state")]
    EncodeState(#[source] toml::ser::Error),

    #[error("failed to write pipeline state to {path}")]
    WriteState {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
