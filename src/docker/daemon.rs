//! Docker daemon management

use std::env::consts::OS;

use anyhow::{Result, bail};
use tracing::debug;

use super::{
    DOCKER,
    runner::{CommandRunner, Invocation},
};

pub const INSTALL_URL: &str = "https://www.docker.com/products/docker-desktop";

/// Whether the docker CLI can be executed
pub fn is_installed(runner: &impl CommandRunner) -> bool {
    probe(runner, Invocation::new(DOCKER).arg("--version"))
}

/// Whether the daemon answers `docker info`
pub fn is_running(runner: &impl CommandRunner) -> bool {
    probe(runner, Invocation::new(DOCKER).arg("info"))
}

fn probe(runner: &impl CommandRunner, inv: Invocation) -> bool {
    match runner.output(&inv) {
        Ok(output) => output.success,
        Err(e) => {
            debug!(command = %inv, error = %e, "probe failed");
            false
        }
    }
}

/// Fail with a hint when docker is missing or its daemon is down
pub fn ensure_running(runner: &impl CommandRunner) -> Result<()> {
    if !is_installed(runner) {
        bail!("Docker is not installed. Visit: {}", INSTALL_URL);
    }
    if !is_running(runner) {
        bail!("Docker daemon is stopped. Use: docker-manager daemon start");
    }
    Ok(())
}

pub fn start(runner: &impl CommandRunner) -> Result<()> {
    start_on(runner, OS)
}

pub fn stop(runner: &impl CommandRunner) -> Result<()> {
    stop_on(runner, OS)
}

fn start_on(runner: &impl CommandRunner, os: &str) -> Result<()> {
    let inv = match os {
        "macos" => Invocation::new("open").args(["-a", "Docker"]),
        "linux" => Invocation::new("sudo").args(["systemctl", "start", "docker"]),
        "windows" => Invocation::new("powershell").args(["-Command", "Start-Process Docker"]),
        _ => bail!("Unsupported operating system: {}", os),
    };

    let output = runner.stream(&inv)?;
    if !output.success {
        bail!("`{}` failed: {}", inv, output.exit_status());
    }
    Ok(())
}

fn stop_on(runner: &impl CommandRunner, os: &str) -> Result<()> {
    let inv = match os {
        "macos" => Invocation::new("osascript").args(["-e", "quit application \"Docker Desktop\""]),
        "linux" => Invocation::new("sudo").args(["systemctl", "stop", "docker"]),
        "windows" => {
            Invocation::new("powershell").args(["-Command", "Stop-Process -Name Docker.exe"])
        }
        _ => bail!("Unsupported operating system: {}", os),
    };

    let quit = runner.stream(&inv);
    if os == "macos" && !matches!(quit, Ok(ref output) if output.success) {
        // Docker Desktop ignored the quit request
        let kill = Invocation::new("killall").arg("Docker");
        let output = runner.stream(&kill)?;
        if !output.success {
            bail!("`{}` failed: {}", kill, output.exit_status());
        }
        return Ok(());
    }

    let output = quit?;
    if !output.success {
        bail!("`{}` failed: {}", inv, output.exit_status());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docker::{runner::CommandOutput, testing::FakeRunner};

    #[test]
    fn test_ensure_running() {
        let runner = FakeRunner::new()
            .on_stdout("docker --version", "Docker version 27.0.3")
            .on_stdout("docker info", "");
        assert!(ensure_running(&runner).is_ok());

        let runner = FakeRunner::new().on_spawn_error("docker", "No such file or directory");
        let err = ensure_running(&runner).unwrap_err();
        assert!(err.to_string().starts_with("Docker is not installed"));

        let runner = FakeRunner::new()
            .on_stdout("docker --version", "Docker version 27.0.3")
            .on("docker info", CommandOutput::failed(1, "Cannot connect"));
        let err = ensure_running(&runner).unwrap_err();
        assert!(err.to_string().starts_with("Docker daemon is stopped"));
    }

    #[test]
    fn test_start_linux() {
        let runner = FakeRunner::new().on_stdout("systemctl start docker", "");
        start_on(&runner, "linux").unwrap();
        assert_eq!(runner.calls()[0].command_line(), "sudo systemctl start docker");
    }

    #[test]
    fn test_unsupported_os() {
        let runner = FakeRunner::new();
        assert!(start_on(&runner, "freebsd").is_err());
        assert!(stop_on(&runner, "freebsd").is_err());
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_stop_macos_falls_back_to_killall() {
        let runner = FakeRunner::new()
            .on("osascript", CommandOutput::failed(1, ""))
            .on_stdout("killall Docker", "");

        stop_on(&runner, "macos").unwrap();

        let calls = runner.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].command_line(), "killall Docker");
    }

    #[test]
    fn test_stop_linux_failure() {
        let runner = FakeRunner::new().on("systemctl stop docker", CommandOutput::failed(5, ""));
        let err = stop_on(&runner, "linux").unwrap_err();
        assert_eq!(
            err.to_string(),
            "`sudo systemctl stop docker` failed: exit status: 5"
        );
    }
}
