//! Command handlers
//!
//! Each handler discovers projects, calls into the docker manager and
//! prints the result.

use std::io::{self, Write};

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;

use crate::{
    config::Settings,
    dashboard,
    docker::{
        Manager, daemon,
        runner::{CommandRunner, SystemRunner},
        services::ServiceUrlMap,
        status::StatusReport,
    },
    project::{self, Project, Service, discovery::discover_in},
};

const RULE: &str = "─────────────────────────────────────────";

fn manager(settings: &Settings) -> Manager<SystemRunner> {
    Manager::new(SystemRunner, settings.compose_command.clone())
}

/// Check docker, then look up a project by name
fn prepare(settings: &Settings, name: &str) -> Result<Project> {
    daemon::ensure_running(&SystemRunner)?;
    let projects = discover_in(&settings.search_root, &settings.config)?;
    project::find(&projects, name).cloned()
}

pub fn start(settings: &Settings, name: &str) -> Result<()> {
    let project = prepare(settings, name)?;

    println!("{} Building and starting {}...", "ℹ".blue(), project.name.bright_white());
    manager(settings).start(&project)?;
    println!("{} Project {} started", "✓".green(), project.name.bright_white());

    Ok(())
}

pub fn stop(settings: &Settings, name: &str) -> Result<()> {
    let project = prepare(settings, name)?;

    println!("{} Stopping {}...", "ℹ".blue(), project.name.bright_white());
    manager(settings).stop(&project)?;
    println!(
        "{} Project {} stopped and containers removed",
        "✓".green(),
        project.name.bright_white()
    );

    Ok(())
}

pub fn restart(settings: &Settings, name: &str, service: Option<&str>) -> Result<()> {
    let project = prepare(settings, name)?;

    match service {
        Some(service) => println!(
            "{} Restarting service {} of {}...",
            "ℹ".blue(),
            service.bright_white(),
            project.name.bright_white()
        ),
        None => println!("{} Restarting {}...", "ℹ".blue(), project.name.bright_white()),
    }

    manager(settings).restart(&project, service)?;
    println!("{} Restarted", "✓".green());

    Ok(())
}

pub fn logs(settings: &Settings, name: &str, service: Option<&str>, follow: bool) -> Result<()> {
    let project = prepare(settings, name)?;
    manager(settings).logs(&project, service, follow)
}

#[derive(Serialize)]
struct ProjectSummary<'a> {
    name: &'a str,
    running: bool,
    containers: usize,
}

/// Status of every project. One broken project never hides the others.
pub fn status_all(settings: &Settings, json: bool) -> Result<()> {
    daemon::ensure_running(&SystemRunner)?;
    let mut projects = discover_in(&settings.search_root, &settings.config)?;

    let manager = manager(settings);
    for project in &mut projects {
        manager.refresh(project);
    }

    if json {
        let summaries: Vec<ProjectSummary> = projects
            .iter()
            .map(|p| ProjectSummary {
                name: &p.name,
                running: p.running,
                containers: p.service_count,
            })
            .collect();
        return print_json(&summaries);
    }

    println!();
    println!("{}", "Docker projects".blue());
    println!("{}", RULE);

    if projects.is_empty() {
        println!("  {}", "No projects found".yellow());
        println!(
            "  Looked for docker-*/docker-compose.yml in {}",
            settings.search_root.display()
        );
        println!(
            "  Change search_path in {}",
            settings.config_dir.join(crate::config::CONFIG_FILE).display()
        );
    }

    for project in &projects {
        let status = project.status_string();
        let status = if project.running {
            status.green()
        } else {
            status.dimmed()
        };
        println!("  {:<20} {}", project.name.bright_white(), status);
    }

    println!("{}", RULE);
    println!();

    Ok(())
}

#[derive(Serialize)]
struct ProjectDetails<'a> {
    name: &'a str,
    path: &'a std::path::Path,
    compose_path: &'a std::path::Path,
    compose_exists: bool,
    #[serde(flatten)]
    status: StatusReport,
    declared_services: Vec<String>,
    services: &'a [Service],
    urls: ServiceUrlMap,
}

/// Gather everything shown for a single project. Service and URL queries
/// that fail leave their section empty.
fn details<'a, R: CommandRunner>(
    manager: &Manager<R>,
    project: &'a mut Project,
) -> ProjectDetails<'a> {
    let status = manager.status_detailed(project);
    project.running = status.status.running;
    project.service_count = status.status.containers;

    let declared_services = manager
        .declared_services(project)
        .inspect_err(|e| tracing::warn!(project = %project.name, error = %e, "no declared services"))
        .unwrap_or_default();
    project.services = manager
        .inspect_services(project)
        .inspect_err(|e| tracing::warn!(project = %project.name, error = %e, "no containers"))
        .unwrap_or_default();
    let urls = manager
        .service_urls(project)
        .inspect_err(|e| tracing::warn!(project = %project.name, error = %e, "no urls"))
        .unwrap_or_default();

    let project: &'a Project = project;
    ProjectDetails {
        name: &project.name,
        path: &project.path,
        compose_path: &project.compose_path,
        compose_exists: project.compose_exists(),
        status,
        declared_services,
        services: &project.services,
        urls,
    }
}

pub fn status_project(settings: &Settings, name: &str, json: bool) -> Result<()> {
    let mut project = prepare(settings, name)?;
    let details = details(&manager(settings), &mut project);

    if json {
        return print_json(&details);
    }

    println!();
    println!("{} {}", "Project".blue(), details.name.bright_white());
    println!("{}", RULE);

    let report = &details.status;
    if report.failed {
        println!("  Status   : {} {}", "✗".red(), report.message.red());
    } else if report.status.running {
        println!("  Status   : {}", format!("▶ {}", report.message).green());
    } else {
        println!("  Status   : {}", format!("⏹ {}", report.message).dimmed());
    }

    if !details.declared_services.is_empty() {
        println!("  Services : {}", details.declared_services.join(", "));
    }

    if !details.services.is_empty() {
        println!("  Containers:");
        for service in details.services {
            println!(
                "    - {:<16} {:<10} {}",
                service.name,
                service.state.to_string(),
                service.container.dimmed()
            );
        }
    }

    let declared = if details.declared_services.is_empty() {
        None
    } else {
        Some(details.declared_services.as_slice())
    };
    let ordered = details.urls.ordered(declared);
    if !ordered.is_empty() {
        println!("  URLs     :");
        for (service, urls) in &ordered {
            if urls.is_empty() {
                println!("    - {} => {}", service, "-".dimmed());
            }
            for url in urls {
                println!("    - {} => {}", service, url.bright_cyan());
            }
        }
    }

    println!("  Path     : {}", details.path.display());
    println!("  Compose  : {}", details.compose_path.display());

    if !details.compose_exists {
        println!("  {} docker-compose.yml is missing!", "⚠".yellow());
    }

    println!("{}", RULE);
    println!();

    Ok(())
}

pub fn daemon(action: crate::cli::DaemonAction) -> Result<()> {
    use crate::cli::DaemonAction;

    let runner = SystemRunner;

    if !daemon::is_installed(&runner) {
        println!("{} Docker is not installed", "✗".red());
        println!("  Download Docker: {}", daemon::INSTALL_URL);
        return Ok(());
    }

    let running = daemon::is_running(&runner);

    match action {
        DaemonAction::Status => {
            if running {
                println!("{} Docker daemon is running", "✓".green());
            } else {
                println!("{} Docker daemon is stopped", "⏹".yellow());
            }
        }
        DaemonAction::Start => {
            if running {
                println!("{} Docker daemon is already running", "ℹ".blue());
                return Ok(());
            }
            println!("{} Starting Docker daemon...", "ℹ".blue());
            daemon::start(&runner).context("Failed to start the Docker daemon")?;
            println!("{} Docker daemon started", "✓".green());
        }
        DaemonAction::Stop => {
            if !running {
                println!("{} Docker daemon is already stopped", "ℹ".blue());
                return Ok(());
            }
            println!("{} Stopping Docker daemon...", "ℹ".blue());
            daemon::stop(&runner).context("Failed to stop the Docker daemon")?;
            println!("{} Docker daemon stopped", "✓".green());
        }
    }

    Ok(())
}

pub fn dashboard(settings: &Settings) -> Result<()> {
    daemon::ensure_running(&SystemRunner)?;
    let mut projects = discover_in(&settings.search_root, &settings.config)?;

    // The dashboard owns the screen, so lifecycle output is captured
    let manager = manager(settings).captured();
    for project in &mut projects {
        manager.refresh(project);
    }

    dashboard::run(projects, manager)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value).context("Failed to write JSON")?;
    writeln!(stdout)?;
    Ok(())
}
