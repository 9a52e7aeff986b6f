//! Project status reconciliation
//!
//! Two entry points share one query (`ps -q`) but apply different error
//! policies: [`Manager::status`] is for sweeps over many projects and
//! reports any failure as "stopped"; [`Manager::status_detailed`] is for a
//! single project and surfaces the failure as its message.

use serde::Serialize;
use tracing::warn;

use super::{Manager, runner::CommandRunner};
use crate::project::Project;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProjectStatus {
    pub running: bool,
    pub containers: usize,
}

impl ProjectStatus {
    /// Status from `ps -q` output: one container id per non-empty line
    pub fn from_ids(output: &str) -> Self {
        let containers = output
            .trim()
            .lines()
            .filter(|line| !line.trim().is_empty())
            .count();

        Self {
            running: containers > 0,
            containers,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    #[serde(flatten)]
    pub status: ProjectStatus,
    /// Status label, or the error when the query failed
    pub message: String,
    pub failed: bool,
}

impl StatusReport {
    fn from_status(status: ProjectStatus) -> Self {
        let message = if status.running {
            format!("Running ({} containers)", status.containers)
        } else {
            "Stopped".to_string()
        };

        Self {
            status,
            message,
            failed: false,
        }
    }

    fn failure(message: String) -> Self {
        Self {
            status: ProjectStatus::default(),
            message,
            failed: true,
        }
    }
}

impl<R: CommandRunner> Manager<R> {
    /// Status for sweeps. A failing query (missing descriptor, broken
    /// config, docker-compose not installed) reads as stopped.
    pub fn status(&self, project: &Project) -> ProjectStatus {
        match self.query_ids(project) {
            Ok(ids) => ProjectStatus::from_ids(&ids),
            Err(message) => {
                warn!(project = %project.name, error = %message, "status query failed");
                ProjectStatus::default()
            }
        }
    }

    /// Status for a single project, with the query error as message
    pub fn status_detailed(&self, project: &Project) -> StatusReport {
        match self.query_ids(project) {
            Ok(ids) => StatusReport::from_status(ProjectStatus::from_ids(&ids)),
            Err(message) => StatusReport::failure(message),
        }
    }

    /// Update the project's transient running state
    pub fn refresh(&self, project: &mut Project) {
        let status = self.status(project);
        project.running = status.running;
        project.service_count = status.containers;
    }

    /// Container ids of the project, or a description of the failure
    fn query_ids(&self, project: &Project) -> Result<String, String> {
        let inv = self.compose(project).args(["ps", "-q"]);

        match self.runner.output(&inv) {
            Ok(output) if output.success => Ok(output.stdout),
            Ok(output) => Err(output.failure_message()),
            Err(e) => Err(format!("{:#}", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docker::{
        fixtures,
        runner::CommandOutput,
        testing::FakeRunner,
    };

    #[test]
    fn test_counts_container_ids() {
        let manager = fixtures::manager(FakeRunner::new().on_stdout("ps -q", "id1\nid2\nid3\n"));
        let project = fixtures::project("shop");

        assert_eq!(
            manager.status(&project),
            ProjectStatus {
                running: true,
                containers: 3
            }
        );
    }

    #[test]
    fn test_empty_output_is_stopped() {
        let manager = fixtures::manager(FakeRunner::new().on_stdout("ps -q", ""));
        let project = fixtures::project("shop");

        assert_eq!(manager.status(&project), ProjectStatus::default());

        let report = manager.status_detailed(&project);
        assert!(!report.failed);
        assert_eq!(report.message, "Stopped");
    }

    #[test]
    fn test_blank_lines_are_not_containers() {
        assert_eq!(ProjectStatus::from_ids("\n  \nabc\n\n").containers, 1);
        assert_eq!(ProjectStatus::from_ids("  \n").containers, 0);
    }

    #[test]
    fn test_sweep_swallows_failures() {
        let project = fixtures::project("shop");

        let manager = fixtures::manager(
            FakeRunner::new().on("ps -q", CommandOutput::failed(1, "no configuration file provided")),
        );
        assert_eq!(manager.status(&project), ProjectStatus::default());

        let manager = fixtures::manager(
            FakeRunner::new().on_spawn_error("ps -q", "docker-compose: not found"),
        );
        assert_eq!(manager.status(&project), ProjectStatus::default());
    }

    #[test]
    fn test_detailed_surfaces_stderr() {
        let manager = fixtures::manager(
            FakeRunner::new().on("ps -q", CommandOutput::failed(1, "no configuration file provided\n")),
        );
        let report = manager.status_detailed(&fixtures::project("shop"));

        assert!(report.failed);
        assert!(!report.status.running);
        assert_eq!(report.message, "no configuration file provided");
    }

    #[test]
    fn test_detailed_falls_back_to_exec_error() {
        let project = fixtures::project("shop");

        let manager = fixtures::manager(FakeRunner::new().on("ps -q", CommandOutput::failed(2, "")));
        assert_eq!(manager.status_detailed(&project).message, "exit status: 2");

        let manager = fixtures::manager(
            FakeRunner::new().on_spawn_error("ps -q", "docker-compose: not found"),
        );
        assert_eq!(
            manager.status_detailed(&project).message,
            "docker-compose: not found"
        );
    }

    #[test]
    fn test_detailed_running_message() {
        let manager = fixtures::manager(FakeRunner::new().on_stdout("ps -q", "a\nb\n"));
        let report = manager.status_detailed(&fixtures::project("shop"));

        assert_eq!(report.message, "Running (2 containers)");
        assert_eq!(report.status.containers, 2);
    }

    #[test]
    fn test_status_is_idempotent() {
        let manager = fixtures::manager(FakeRunner::new().on_stdout("ps -q", "id1\nid2\n"));
        let project = fixtures::project("shop");
        let before = project.clone();

        let first = manager.status_detailed(&project);
        let second = manager.status_detailed(&project);

        assert_eq!(first, second);
        assert_eq!(project, before);
    }

    #[test]
    fn test_query_is_scoped_to_project() {
        let manager = fixtures::manager(FakeRunner::new().on_stdout("ps -q", ""));
        manager.status(&fixtures::project("shop"));

        let calls = manager.runner().calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0].command_line(),
            "docker-compose -f docker-compose.yml -p shop ps -q"
        );
    }

    #[test]
    fn test_refresh_updates_project() {
        let manager = fixtures::manager(FakeRunner::new().on_stdout("ps -q", "id1\nid2\n"));
        let mut project = fixtures::project("shop");

        manager.refresh(&mut project);

        assert!(project.running);
        assert_eq!(project.service_count, 2);
    }
}
