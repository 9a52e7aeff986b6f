//! CLI command definitions for docker-manager
//!
//! This module contains all the clap-based command definitions and argument parsing.

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "docker-manager", version)]
#[command(about = "Manage local docker-compose projects", long_about = None)]
pub struct Cli {
    /// Print debug logs to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build and start a project
    Start { project: String },
    /// Stop a project and remove its containers
    Stop { project: String },
    /// Restart a project, or one of its services (no rebuild)
    Restart {
        project: String,
        service: Option<String>,
    },
    /// Show the status of all projects, or details of one project
    Status {
        project: Option<String>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Show project logs
    Logs {
        project: String,
        service: Option<String>,
        /// Follow log output
        #[arg(short, long)]
        follow: bool,
    },
    /// Manage the Docker daemon
    Daemon {
        #[arg(value_enum)]
        action: DaemonAction,
    },
    /// Launch the interactive dashboard
    Dashboard,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum DaemonAction {
    Start,
    Stop,
    Status,
}
