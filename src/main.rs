//! docker-manager - local docker-compose project manager
//!
//! Discovers `docker-*` project directories, starts/stops/restarts them
//! through docker-compose and reports which services are running and the
//! local URLs they publish.

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod commands;
mod config;
mod dashboard;
mod docker;
mod project;

use cli::{Cli, Commands};
use config::Settings;

/// Diagnostics go to stderr so stdout stays clean for `--json`
fn init_tracing(verbose: bool) {
    let default = if verbose {
        "docker_manager=debug"
    } else {
        "docker_manager=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config_dir = config::get_config_dir()?;
    let config_path = match config::ensure_default_config(&config_dir) {
        Ok(path) => path,
        Err(e) => {
            let message = format!("{:#}", e);
            tracing::warn!(error = %message, "could not create default config");
            config_dir.join(config::CONFIG_FILE)
        }
    };
    let settings = Settings::resolve(config_dir, config::load_config(&config_path)?)?;

    match cli.command {
        None => {
            println!(
                "{} Run {} for the list of commands",
                "ℹ".blue(),
                "docker-manager --help".bright_white()
            );
            commands::status_all(&settings, false)?;
        }
        Some(Commands::Start { project }) => {
            commands::start(&settings, &project)?;
        }
        Some(Commands::Stop { project }) => {
            commands::stop(&settings, &project)?;
        }
        Some(Commands::Restart { project, service }) => {
            commands::restart(&settings, &project, service.as_deref())?;
        }
        Some(Commands::Status { project, json }) => match project {
            Some(name) => commands::status_project(&settings, &name, json)?,
            None => commands::status_all(&settings, json)?,
        },
        Some(Commands::Logs {
            project,
            service,
            follow,
        }) => {
            commands::logs(&settings, &project, service.as_deref(), follow)?;
        }
        Some(Commands::Daemon { action }) => {
            commands::daemon(action)?;
        }
        Some(Commands::Dashboard) => {
            commands::dashboard(&settings)?;
        }
    }

    Ok(())
}
