// ABOUTME: Entry point for the skiff CLI application.
// ABOUTME: Parses arguments and dispatches to appropriate command handlers.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use skiff::config::{self, Config};
use skiff::error::{Error, Result};
use skiff::output::{Output, OutputMode};
use skiff::project::ProjectName;
use std::env;
use std::path::Path;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let mode = OutputMode::from_flags(cli.quiet, cli.json);

    if let Err(e) = run(cli, mode).await {
        Output::new(mode).error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run(cli: Cli, mode: OutputMode) -> Result<()> {
    let output = Output::new(mode);
    let cwd = env::current_dir()?;

    match cli.command {
        Commands::ConfigInit { host, user, force } => {
            config::init_config(&cwd, host.as_deref(), user.as_deref(), force)?;
            output.success(&format!("Created {}", config::CONFIG_FILENAME));
            Ok(())
        }
        Commands::Init { project } => {
            let config = load_config(cli.config.as_deref(), cli.destination.as_deref(), &cwd)?;
            let name = ProjectName::new(&project)?;
            commands::init(&config, &name, output).await
        }
        Commands::Push { project } => {
            let config = load_config(cli.config.as_deref(), cli.destination.as_deref(), &cwd)?;
            let name = ProjectName::new(&project)?;
            commands::push(&config, &name, output).await
        }
        Commands::Rollback { project, backup } => {
            let config = load_config(cli.config.as_deref(), cli.destination.as_deref(), &cwd)?;
            let name = ProjectName::new(&project)?;
            commands::rollback(&config, &name, backup.as_deref(), output).await
        }
        Commands::Status { project } => {
            let config = load_config(cli.config.as_deref(), cli.destination.as_deref(), &cwd)?;
            let name = ProjectName::new(&project)?;
            commands::status(&config, &name, output).await
        }
        Commands::Logs {
            project,
            lines,
            follow,
        } => {
            let config = load_config(cli.config.as_deref(), cli.destination.as_deref(), &cwd)?;
            let name = ProjectName::new(&project)?;
            commands::logs(&config, &name, lines, follow, output).await
        }
    }
}

/// Load the config file and apply destination overrides if specified.
fn load_config(path: Option<&Path>, destination: Option<&str>, cwd: &Path) -> Result<Config> {
    let config = match path {
        Some(path) if !path.exists() => return Err(Error::ConfigNotFound(path.to_path_buf())),
        Some(path) => Config::load(path)?,
        None => Config::discover(cwd)?,
    };

    match destination {
        Some(dest) => config.for_destination(dest),
        None => Ok(config),
    }
}
