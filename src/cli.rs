// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "skiff")]
#[command(about = "Push-style git deployments over SSH")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to the config file (default: $SKIFF_CONFIG, then skiff.yml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Target destination (defined in config)
    #[arg(short, long, global = true)]
    pub destination: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output for CI (only final result)
    #[arg(short, long, global = true, conflicts_with = "json")]
    pub quiet: bool,

    /// Output as JSON for scripting
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Provision directories and a bare repository for a project
    Init {
        /// Project name
        project: String,
    },

    /// Deploy the configured branch of a project
    #[command(alias = "deploy")]
    Push {
        /// Project name
        project: String,
    },

    /// Restore a project from a backup archive
    Rollback {
        /// Project name
        project: String,

        /// Archive to restore (default: latest)
        #[arg(short, long)]
        backup: Option<String>,
    },

    /// Show whether a project is running and who holds its lock
    Status {
        /// Project name
        project: String,
    },

    /// Show a project's deploy log
    Logs {
        /// Project name
        project: String,

        /// Number of lines to show
        #[arg(short = 'n', long, default_value_t = 100)]
        lines: usize,

        /// Follow log output
        #[arg(short, long)]
        follow: bool,
    },

    /// Write a skiff.yml template to the current directory
    ConfigInit {
        /// Deploy host
        #[arg(long)]
        host: Option<String>,

        /// Remote user
        #[arg(long)]
        user: Option<String>,

        /// Overwrite an existing skiff.yml
        #[arg(long)]
        force: bool,
    },
}
