//! Process execution gateway
//!
//! Every interaction with Docker goes through an external command. The
//! [`CommandRunner`] trait is the single seam between the reconciler and
//! the operating system, so the parsing logic can be exercised against
//! canned output.

use std::{
    fmt,
    path::{Path, PathBuf},
    process::{Command, Output, Stdio},
};

use anyhow::{Context, Result};
use tracing::debug;

/// A command line to execute: program, arguments, working directory and
/// extra environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub envs: Vec<(String, String)>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            envs: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: &Path) -> Self {
        self.cwd = Some(dir.to_path_buf());
        self
    }

    pub fn envs<'a, I>(mut self, envs: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        self.envs
            .extend(envs.into_iter().map(|(k, v)| (k.clone(), v.clone())));
        self
    }

    /// Program and arguments joined by spaces, for logs and messages
    pub fn command_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }

    fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(dir) = &self.cwd {
            cmd.current_dir(dir);
        }
        for (key, value) in &self.envs {
            cmd.env(key, value);
        }
        cmd
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command_line())
    }
}

/// Result of a finished process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    /// Exit code, `None` when the process was killed by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Human readable description of the exit status
    pub fn exit_status(&self) -> String {
        match self.code {
            Some(code) => format!("exit status: {}", code),
            None => "terminated by signal".to_string(),
        }
    }

    /// Captured stderr when there is any, otherwise the exit status
    pub fn failure_message(&self) -> String {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            self.exit_status()
        } else {
            stderr.to_string()
        }
    }

    fn from_output(output: Output) -> Self {
        Self {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

/// Executes external commands.
///
/// `Err` means the process could not be run at all (e.g. program not
/// found); a process that ran and exited non-zero is an `Ok` output with
/// `success == false`.
pub trait CommandRunner {
    /// Run to completion, capturing stdout and stderr
    fn output(&self, invocation: &Invocation) -> Result<CommandOutput>;

    /// Run to completion with stdio attached to the user's terminal
    fn stream(&self, invocation: &Invocation) -> Result<CommandOutput>;
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
    fn output(&self, invocation: &Invocation) -> Result<CommandOutput> {
        (**self).output(invocation)
    }

    fn stream(&self, invocation: &Invocation) -> Result<CommandOutput> {
        (**self).stream(invocation)
    }
}

/// [`CommandRunner`] backed by `std::process::Command`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn output(&self, invocation: &Invocation) -> Result<CommandOutput> {
        debug!(command = %invocation, cwd = ?invocation.cwd, "running");

        let output = invocation
            .to_command()
            .stdin(Stdio::null())
            .output()
            .with_context(|| format!("Failed to execute `{}`", invocation))?;

        let output = CommandOutput::from_output(output);
        debug!(command = %invocation, code = ?output.code, "finished");
        Ok(output)
    }

    fn stream(&self, invocation: &Invocation) -> Result<CommandOutput> {
        debug!(command = %invocation, cwd = ?invocation.cwd, "streaming");

        let status = invocation
            .to_command()
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .with_context(|| format!("Failed to execute `{}`", invocation))?;

        Ok(CommandOutput {
            success: status.success(),
            code: status.code(),
            ..CommandOutput::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn test_invocation_builder() {
        let mut env = BTreeMap::new();
        env.insert("COMPOSE_PROFILES".to_string(), "dev".to_string());

        let inv = Invocation::new("docker-compose")
            .args(["-f", "docker-compose.yml"])
            .arg("ps")
            .current_dir(Path::new("/tmp/docker-shop"))
            .envs(&env);

        assert_eq!(inv.command_line(), "docker-compose -f docker-compose.yml ps");
        assert_eq!(inv.cwd, Some(PathBuf::from("/tmp/docker-shop")));
        assert_eq!(
            inv.envs,
            vec![("COMPOSE_PROFILES".to_string(), "dev".to_string())]
        );
    }

    #[test]
    fn test_failure_message_prefers_stderr() {
        let output = CommandOutput {
            code: Some(1),
            stderr: "  no such service: web\n".to_string(),
            ..CommandOutput::default()
        };
        assert_eq!(output.failure_message(), "no such service: web");

        let output = CommandOutput {
            code: Some(14),
            ..CommandOutput::default()
        };
        assert_eq!(output.failure_message(), "exit status: 14");
    }

    #[test]
    fn test_signal_exit_status() {
        let output = CommandOutput {
            success: false,
            code: None,
            ..CommandOutput::default()
        };
        assert_eq!(output.failure_message(), "terminated by signal");
    }
}
