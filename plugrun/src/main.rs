mod commands;
mod formatting;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::Level;

use commands::FanOutTask;

#[derive(Parser)]
#[command(name = "plugrun")]
#[command(about = "Concurrent lint, build and release orchestration for plugin monorepos")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Repository root holding the package.json that declares the workspaces.
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Configuration file (defaults to <root>/plugrun.toml when present).
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[arg(short, long, action)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List the plugin workspaces.
    List {
        #[arg(long, action)]
        json: bool,
    },
    /// Lint every plugin concurrently.
    Lint {
        /// Per-plugin deadline in seconds.
        #[arg(long)]
        timeout: Option<u64>,
        #[arg(long, action)]
        no_stream: bool,
    },
    /// Build every plugin concurrently.
    Build {
        #[arg(long)]
        timeout: Option<u64>,
        #[arg(long, action)]
        no_stream: bool,
    },
    /// Run golangci-lint on every plugin that ships schemas.
    GolangciLint {
        #[arg(long)]
        timeout: Option<u64>,
        #[arg(long, action)]
        no_stream: bool,
    },
    /// Publish the CUE module of a released plugin, retrying on failure.
    Publish {
        /// Release tag, e.g. barchart/v0.9.0.
        #[arg(long)]
        tag: String,
        /// Authentication token for the CUE Central Registry.
        #[arg(long)]
        token: String,
    },
    /// Attach a plugin archive to its GitHub release.
    Upload {
        #[arg(long)]
        tag: String,
    },
    /// Bump the Perses dependencies of every plugin.
    BumpDeps {
        /// Version of the core Perses packages, without the 'v' prefix.
        #[arg(long)]
        version: Option<String>,
        /// Version of the shared Perses packages, without the 'v' prefix.
        #[arg(long)]
        shared_version: Option<String>,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let log_level = if cli.quiet {
        Level::ERROR
    } else {
        match cli.verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .init();

    let Cli {
        command,
        root,
        config,
        ..
    } = cli;
    let config = commands::load_config(&root, config.as_deref())?;
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to create tokio runtime")?;

    // Children still attached to the runtime are killed when it drops; exit only afterwards.
    let code = rt.block_on(async move {
        let done = |_: ()| ExitCode::SUCCESS;
        match command {
            Commands::List { json } => commands::cmd_list(&root, json).map(done),
            Commands::Lint { timeout, no_stream } => {
                commands::cmd_fan_out(&root, &config, FanOutTask::Lint, timeout, no_stream)
                    .await
            }
            Commands::Build { timeout, no_stream } => {
                commands::cmd_fan_out(&root, &config, FanOutTask::Build, timeout, no_stream)
                    .await
            }
            Commands::GolangciLint { timeout, no_stream } => {
                commands::cmd_fan_out(
                    &root,
                    &config,
                    FanOutTask::GolangciLint,
                    timeout,
                    no_stream,
                )
                .await
            }
            Commands::Publish { tag, token } => {
                commands::cmd_publish(&root, &config, &tag, &token)
                    .await
                    .map(done)
            }
            Commands::Upload { tag } => commands::cmd_upload(&root, &tag).await.map(done),
            Commands::BumpDeps {
                version,
                shared_version,
            } => commands::cmd_bump_deps(&root, version, shared_version)
                .await
                .map(done),
        }
    })?;
    drop(rt);
    Ok(code)
}
