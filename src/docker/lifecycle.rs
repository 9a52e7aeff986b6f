//! Project lifecycle: start, stop, restart and logs

use anyhow::{Result, bail};

use super::{
    Manager,
    runner::{CommandRunner, Invocation},
};
use crate::project::Project;

impl<R: CommandRunner> Manager<R> {
    /// Build images, then start containers in the background
    pub fn start(&self, project: &Project) -> Result<()> {
        self.run_step(self.compose(project).arg("build"), "build")?;
        self.run_step(self.compose(project).args(["up", "-d"]), "start")
    }

    /// Stop and remove containers
    pub fn stop(&self, project: &Project) -> Result<()> {
        self.run_step(self.compose(project).arg("down"), "stop")
    }

    /// Restart one service, or every service when `service` is `None`.
    /// Images are not rebuilt.
    pub fn restart(&self, project: &Project, service: Option<&str>) -> Result<()> {
        let mut inv = self.compose(project).arg("restart");
        if let Some(service) = service {
            inv = inv.arg(service);
        }
        self.run_step(inv, "restart")
    }

    /// Show logs, optionally following them. Always attached to the
    /// terminal.
    pub fn logs(&self, project: &Project, service: Option<&str>, follow: bool) -> Result<()> {
        let mut inv = self.compose(project).arg("logs");
        if follow {
            inv = inv.arg("-f");
        }
        if let Some(service) = service {
            inv = inv.arg(service);
        }

        let output = self.runner.stream(&inv)?;
        if !output.success {
            bail!("Failed to show logs: {}", output.exit_status());
        }
        Ok(())
    }

    fn run_step(&self, inv: Invocation, step: &str) -> Result<()> {
        let output = if self.passthrough {
            self.runner.stream(&inv)?
        } else {
            self.runner.output(&inv)?
        };

        if !output.success {
            bail!("Failed to {} project: {}", step, output.failure_message());
        }
        Ok(())
    }
}
