//! Docker operations module
//!
//! This module contains functionality for interacting with Docker through
//! its command line tools:
//! - Project status and service URL reconciliation
//! - Project lifecycle (start/stop/restart/logs)
//! - Docker daemon management

pub mod daemon;
pub mod lifecycle;
pub mod ports;
pub mod runner;
pub mod services;
pub mod status;

#[cfg(test)]
pub mod testing;

use crate::project::{COMPOSE_FILE, Project};
use runner::{CommandRunner, Invocation};

/// Runtime CLI
pub const DOCKER: &str = "docker";

/// Label docker-compose puts on every container of a project
pub const PROJECT_LABEL: &str = "com.docker.compose.project";

/// Label docker-compose puts on every container of a service
pub const SERVICE_LABEL: &str = "com.docker.compose.service";

/// Runs orchestrator and runtime queries for projects
pub struct Manager<R> {
    runner: R,
    compose_command: Vec<String>,
    /// Attach lifecycle commands to the terminal instead of capturing them
    passthrough: bool,
}

impl<R: CommandRunner> Manager<R> {
    pub fn new(runner: R, compose_command: Vec<String>) -> Self {
        Self {
            runner,
            compose_command,
            passthrough: true,
        }
    }

    /// Capture lifecycle command output instead of streaming it
    pub fn captured(mut self) -> Self {
        self.passthrough = false;
        self
    }

    #[cfg(test)]
    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// `<compose> -f docker-compose.yml -p <name> <args>` in the project
    /// directory
    fn compose(&self, project: &Project) -> Invocation {
        self.compose_base(project)
            .args(["-p", project.name.as_str()])
    }

    /// `<compose> -f docker-compose.yml` without project scoping
    fn compose_base(&self, project: &Project) -> Invocation {
        let (program, prefix) = match self.compose_command.split_first() {
            Some((program, prefix)) => (program.as_str(), prefix),
            None => (crate::config::DEFAULT_COMPOSE_COMMAND, &[][..]),
        };

        Invocation::new(program)
            .args(prefix.iter().cloned())
            .args(["-f", COMPOSE_FILE])
            .current_dir(&project.path)
            .envs(&project.env)
    }

    /// `docker ps` filtered on the project's compose label
    fn project_containers(&self, project: &Project) -> Invocation {
        Invocation::new(DOCKER)
            .args([
                "ps".to_string(),
                "--filter".to_string(),
                format!("label={}={}", PROJECT_LABEL, project.name),
            ])
            .current_dir(&project.path)
    }
}
