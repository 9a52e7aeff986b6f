//! Fake command runner for unit tests

use std::cell::RefCell;

use anyhow::{Result, bail};

use super::runner::{CommandOutput, CommandRunner, Invocation};

impl CommandOutput {
    /// Successful output with the given stdout
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            success: true,
            code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Failed output with the given exit code and stderr
    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            code: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }
}

enum Reply {
    Output(CommandOutput),
    SpawnError(String),
}

/// Replies with canned output to commands whose command line contains a
/// registered needle. Rules are tried in registration order. Every call is
/// recorded.
#[derive(Default)]
pub struct FakeRunner {
    rules: Vec<(String, Reply)>,
    calls: RefCell<Vec<Invocation>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, needle: &str, output: CommandOutput) -> Self {
        self.rules.push((needle.to_string(), Reply::Output(output)));
        self
    }

    pub fn on_stdout(self, needle: &str, stdout: &str) -> Self {
        self.on(needle, CommandOutput::ok(stdout))
    }

    pub fn on_spawn_error(mut self, needle: &str, message: &str) -> Self {
        self.rules
            .push((needle.to_string(), Reply::SpawnError(message.to_string())));
        self
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.borrow().clone()
    }

    fn reply(&self, invocation: &Invocation) -> Result<CommandOutput> {
        self.calls.borrow_mut().push(invocation.clone());

        let line = invocation.command_line();
        for (needle, reply) in &self.rules {
            if line.contains(needle.as_str()) {
                return match reply {
                    Reply::Output(output) => Ok(output.clone()),
                    Reply::SpawnError(message) => bail!("{}", message),
                };
            }
        }

        bail!("no canned reply for `{}`", line)
    }
}

impl CommandRunner for FakeRunner {
    fn output(&self, invocation: &Invocation) -> Result<CommandOutput> {
        self.reply(invocation)
    }

    fn stream(&self, invocation: &Invocation) -> Result<CommandOutput> {
        self.reply(invocation)
    }
}
