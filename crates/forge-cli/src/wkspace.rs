//! Workspace bootstrap commands.
//!
//! These are the `forge wkspace ...` commands the canonical pipeline steps
//! invoke: cluster credential setup, helm initialization, registry login and
//! the chart deployment itself. Each is a thin wrapper that resolves its
//! parameters from the workspace manifest and spawns one external tool with
//! inherited stdio.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::{Context, Result, bail};
use clap::Subcommand;

use forge_core::workspace::{MANIFEST_FILE, Manifest};

#[derive(Subcommand)]
pub enum WkspaceCommand {
    /// Point kubectl at the workspace's cluster
    KubeInit { path: PathBuf },

    /// One-time helm setup for the cluster
    HelmInit { path: PathBuf },

    /// Log docker into the workspace's registry
    DockerCredentials { path: PathBuf },

    /// Deploy the workspace's helm chart
    Helm { path: PathBuf },
}

pub fn run(command: WkspaceCommand) -> Result<()> {
    match command {
        WkspaceCommand::KubeInit { path } => kube_init(&path),
        WkspaceCommand::HelmInit { path } => helm_init(&path),
        WkspaceCommand::DockerCredentials { path } => docker_credentials(&path),
        WkspaceCommand::Helm { path } => helm_deploy(&path),
    }
}

fn kube_init(path: &Path) -> Result<()> {
    let manifest = read_manifest(path)?;
    let cluster = context_str(&manifest, "cluster")?;
    let region = context_str(&manifest, "region")?;

    let mut command = match context_str(&manifest, "provider")? {
        "gcp" => {
            let project = context_str(&manifest, "project")?;
            let mut cmd = Command::new("gcloud");
            cmd.args([
                "container",
                "clusters",
                "get-credentials",
                cluster,
                "--zone",
                region,
                "--project",
                project,
            ]);
            cmd
        }
        "aws" => {
            let mut cmd = Command::new("aws");
            cmd.args(["eks", "update-kubeconfig", "--name", cluster, "--region", region]);
            cmd
        }
        other => bail!("Unsupported provider `{other}` for kube-init"),
    };

    run_checked(&mut command)
}

fn helm_init(_path: &Path) -> Result<()> {
    run_checked(Command::new("helm").args(["init", "--wait"]))
}

fn docker_credentials(path: &Path) -> Result<()> {
    let manifest = read_manifest(path)?;
    let registry = context_str(&manifest, "registry")?;
    let user = context_str(&manifest, "registry_user")?;
    let token = context_str(&manifest, "registry_token")?;

    let mut child = Command::new("docker")
        .args(["login", registry, "--username", user, "--password-stdin"])
        .stdin(Stdio::piped())
        .spawn()
        .context("Failed to launch docker login")?;
    if let Some(stdin) = child.stdin.as_mut() {
        stdin
            .write_all(token.as_bytes())
            .context("Failed to pass registry token to docker login")?;
    }
    let status = child.wait().context("Failed to wait for docker login")?;
    if !status.success() {
        bail!("docker login exited with {status}");
    }
    Ok(())
}

fn helm_deploy(path: &Path) -> Result<()> {
    let manifest = read_manifest(path)?;
    let chart_dir = path.join("helm").join(&manifest.name);
    run_checked(Command::new("helm").args([
        "upgrade",
        "--install",
        &manifest.name,
        &chart_dir.display().to_string(),
    ]))
}

fn read_manifest(path: &Path) -> Result<Manifest> {
    Manifest::read(&path.join(MANIFEST_FILE))
}

fn context_str<'a>(manifest: &'a Manifest, key: &str) -> Result<&'a str> {
    manifest
        .context
        .get(key)
        .and_then(|value| value.as_str())
        .with_context(|| format!("Manifest context is missing `{key}`"))
}

fn run_checked(command: &mut Command) -> Result<()> {
    let status = command
        .status()
        .with_context(|| format!("Failed to launch {:?}", command.get_program()))?;
    if !status.success() {
        bail!("{:?} exited with {status}", command.get_program());
    }
    Ok(())
}
