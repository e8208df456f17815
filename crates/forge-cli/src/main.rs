//! Forge - incremental deployment pipelines
//!
//! Usage:
//!   forge build <repo>     # Materialize the workspace for a repository
//!   forge deploy <repo>    # Run the deploy pipeline
//!   forge wkspace ...      # Bootstrap commands invoked by pipeline steps

mod wkspace;

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use forge_core::context::AppContext;
use forge_core::executor::ExecutorError;
use forge_core::prelude::{FileCatalog, Workspace};

#[derive(Parser)]
#[command(name = "forge")]
#[command(about = "Incremental deployment pipelines", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Materialize the workspace for an installed repository
    Build {
        /// Repository to build
        repo: String,

        /// Catalog document with installation data
        #[arg(long, default_value = "catalog.json")]
        catalog: PathBuf,
    },

    /// Run the deploy pipeline for a prepared workspace
    ///
    /// Steps whose targets are unchanged since their last successful run are
    /// skipped; a failed run resumes at the failing step next time.
    Deploy {
        /// Repository whose workspace to deploy
        repo: String,
    },

    /// Workspace bootstrap commands invoked by pipeline steps
    #[command(subcommand)]
    Wkspace(wkspace::WkspaceCommand),
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "forge=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Build { repo, catalog } => run_build(&repo, &catalog),
        Commands::Deploy { repo } => run_deploy(&repo),
        Commands::Wkspace(command) => wkspace::run(command),
    }
}

fn run_build(repo: &str, catalog: &Path) -> Result<()> {
    let ctx = AppContext::from_current_dir()?;
    let catalog = FileCatalog::open(catalog)?;
    let workspace = Workspace::fetch(&catalog, repo)?;
    let dir = workspace.prepare(ctx.root())?;
    println!("workspace ready at {}", dir.display());
    Ok(())
}

fn run_deploy(repo: &str) -> Result<()> {
    let ctx = AppContext::from_current_dir()?;
    let mut execution = ctx.deploy_execution(repo)?;
    if let Err(err) = execution.run(ctx.root()) {
        if let ExecutorError::Process { output, .. } = &err {
            eprintln!("\noutput: {output}");
        }
        return Err(err.into());
    }
    Ok(())
}
