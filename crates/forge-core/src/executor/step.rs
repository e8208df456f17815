//! A single fingerprint-gated unit of pipeline work.

use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::fs::{IgnoreList, fingerprint};

use super::error::ExecutorError;

/// One command execution gated by the fingerprint of its target path.
///
/// `sha` is the fingerprint recorded by the last successful run; empty means
/// the step has never succeeded and is guaranteed stale. A step is owned by
/// the execution that holds it and only mutated through a successful run or
/// through reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub name: String,
    pub wkdir: PathBuf,
    pub target: PathBuf,
    pub command: String,
    pub args: Vec<String>,
    #[serde(default)]
    pub sha: String,
}

impl Step {
    pub fn new(name: &str, wkdir: &Path, target: &Path, command: &str, args: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            wkdir: wkdir.to_path_buf(),
            target: target.to_path_buf(),
            command: command.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            sha: String::new(),
        }
    }

    /// Fingerprint the target and run the command if it changed.
    ///
    /// Returns the fingerprint the caller should record: the current one on
    /// success or skip. On any error the step's stored `sha` stays as it was,
    /// so the next invocation detects the same staleness and retries.
    ///
    /// The comparison happens before any process is spawned; a pipeline with
    /// no pending changes does zero subprocess work past hashing.
    pub fn execute(&self, root: &Path, ignore: &IgnoreList) -> Result<String, ExecutorError> {
        let current = fingerprint(&root.join(&self.target), ignore)?;

        print!("{} {} ~> ", self.command, self.args.join(" "));
        let _ = io::stdout().flush();

        if current == self.sha {
            debug!(step = %self.name, "target unchanged, skipping");
            println!("no changes to be made for {}", self.name);
            return Ok(current);
        }

        debug!(step = %self.name, target = %self.target.display(), "target changed, running");
        self.run_command(root)?;
        println!("\u{2713}");
        Ok(current)
    }

    /// Spawn the command with stdout/stderr streamed live to the operator's
    /// terminal while also captured for the failure-diagnostics path.
    fn run_command(&self, root: &Path) -> Result<(), ExecutorError> {
        let mut child = Command::new(&self.command)
            .args(&self.args)
            .current_dir(root.join(&self.wkdir))
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| self.spawn_error(source))?;

        let child_out = child.stdout.take();
        let child_err = child.stderr.take();
        let (out, err) = thread::scope(|scope| {
            let out = scope.spawn(|| tee(child_out, io::stdout()));
            let err = scope.spawn(|| tee(child_err, io::stderr()));
            (
                out.join().unwrap_or_default(),
                err.join().unwrap_or_default(),
            )
        });

        let status = child.wait().map_err(|source| self.spawn_error(source))?;
        if !status.success() {
            let mut combined = out;
            combined.extend_from_slice(&err);
            return Err(ExecutorError::Process {
                step: self.name.clone(),
                command: self.rendered_command(),
                status,
                output: String::from_utf8_lossy(&combined).into_owned(),
            });
        }
        Ok(())
    }

    fn spawn_error(&self, source: io::Error) -> ExecutorError {
        ExecutorError::Spawn {
            step: self.name.clone(),
            command: self.rendered_command(),
            source,
        }
    }

    fn rendered_command(&self) -> String {
        if self.args.is_empty() {
            self.command.clone()
        } else {
            format!("{} {}", self.command, self.args.join(" "))
        }
    }
}

/// Forward a child pipe to the terminal while buffering a copy.
///
/// Terminal write failures are ignored so a closed tty never aborts the
/// command; the captured copy is what failure diagnostics rely on.
fn tee(pipe: Option<impl Read>, mut sink: impl Write) -> Vec<u8> {
    let mut captured = Vec::new();
    let Some(mut pipe) = pipe else {
        return captured;
    };

    let mut buf = [0u8; 8192];
    loop {
        match pipe.read(&mut buf) {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                let _ = sink.write_all(&buf[..n]);
                let _ = sink.flush();
                captured.extend_from_slice(&buf[..n]);
            }
        }
    }
    captured
}
