//! Test support utilities shared across unit and integration tests.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::ffi::OsString;
use std::rc::Rc;

use crate::command::{CommandError, CommandOutput, CommandRunner};
use crate::config::WorkspaceConfig;
use crate::device::{ActiveDevices, DeviceSerial};
use crate::environment::{EnvironmentError, ProcessCleaner, WorkspaceResetter};

/// Scripted command runner that returns pre-seeded outputs in FIFO order.
///
/// Used to drive deterministic command outcomes without spawning processes.
#[derive(Clone, Debug, Default)]
pub struct ScriptedRunner {
    responses: Rc<RefCell<VecDeque<CommandOutput>>>,
    invocations: Rc<RefCell<Vec<CommandInvocation>>>,
}

/// Records a single invocation made through [`ScriptedRunner`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CommandInvocation {
    /// Program name as passed to the runner.
    pub program: String,
    /// Arguments passed to the program.
    pub args: Vec<OsString>,
}

impl CommandInvocation {
    /// Returns a shell-like command string for assertions.
    #[must_use]
    pub fn command_string(&self) -> String {
        let mut parts = Vec::with_capacity(self.args.len() + 1);
        parts.push(self.program.clone());
        parts.extend(
            self.args
                .iter()
                .map(|arg| arg.to_string_lossy().into_owned()),
        );
        parts.join(" ")
    }
}

impl ScriptedRunner {
    /// Creates a new runner with no queued responses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all invocations recorded so far.
    #[must_use]
    pub fn invocations(&self) -> Vec<CommandInvocation> {
        self.invocations.borrow().clone()
    }

    /// Pushes a successful exit status.
    pub fn push_success(&self) {
        self.push_output(Some(0), "", "");
    }

    /// Pushes a specific exit code.
    pub fn push_exit_code(&self, code: i32) {
        self.push_output(Some(code), "", "");
    }

    /// Pushes a failing exit code with stderr text.
    pub fn push_failure(&self, code: i32) {
        self.push_output(Some(code), "", "simulated failure");
    }

    /// Pushes an explicit command output response.
    pub fn push_output(
        &self,
        code: Option<i32>,
        stdout: impl Into<String>,
        stderr: impl Into<String>,
    ) {
        self.responses.borrow_mut().push_back(CommandOutput {
            code,
            stdout: stdout.into(),
            stderr: stderr.into(),
        });
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, program: &str, args: &[OsString]) -> Result<CommandOutput, CommandError> {
        self.invocations.borrow_mut().push(CommandInvocation {
            program: program.to_owned(),
            args: args.to_vec(),
        });
        self.responses
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| CommandError::Spawn {
                program: program.to_owned(),
                message: String::from("no scripted response available"),
            })
    }
}

/// Environment step observed by the recording collaborators.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum EnvironmentCall {
    /// This workspace was reset.
    Reset(WorkspaceConfig),
    /// Cleanup ran for these devices.
    Cleanup(Vec<DeviceSerial>),
}

/// Shared, ordered log of environment calls.
#[derive(Clone, Debug, Default)]
pub struct EnvironmentLog {
    calls: Rc<RefCell<Vec<EnvironmentCall>>>,
}

impl EnvironmentLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of the calls recorded so far.
    #[must_use]
    pub fn calls(&self) -> Vec<EnvironmentCall> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: EnvironmentCall) {
        self.calls.borrow_mut().push(call);
    }
}

/// Workspace resetter that records calls and optionally fails.
#[derive(Clone, Debug, Default)]
pub struct RecordingResetter {
    log: EnvironmentLog,
    failure: Option<String>,
}

impl RecordingResetter {
    /// Creates a resetter writing to `log`.
    #[must_use]
    pub const fn new(log: EnvironmentLog) -> Self {
        Self { log, failure: None }
    }

    /// Makes every reset fail with `message`.
    #[must_use]
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }
}

impl WorkspaceResetter for RecordingResetter {
    fn reset(&self, workspace: &WorkspaceConfig) -> Result<(), EnvironmentError> {
        self.log.record(EnvironmentCall::Reset(workspace.clone()));
        match &self.failure {
            Some(message) => Err(EnvironmentError::Workspace {
                path: workspace.output_dir.clone(),
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }
}

/// Process cleaner that records calls and optionally fails.
#[derive(Clone, Debug, Default)]
pub struct RecordingCleaner {
    log: EnvironmentLog,
    failure: Option<String>,
}

impl RecordingCleaner {
    /// Creates a cleaner writing to `log`.
    #[must_use]
    pub const fn new(log: EnvironmentLog) -> Self {
        Self { log, failure: None }
    }

    /// Makes every cleanup fail with `stderr`.
    #[must_use]
    pub fn failing(mut self, stderr: impl Into<String>) -> Self {
        self.failure = Some(stderr.into());
        self
    }
}

impl ProcessCleaner for RecordingCleaner {
    fn cleanup(&self, active: &ActiveDevices) -> Result<(), EnvironmentError> {
        self.log
            .record(EnvironmentCall::Cleanup(active.iter().cloned().collect()));
        match &self.failure {
            Some(stderr) => Err(EnvironmentError::CommandFailure {
                program: String::from("adb"),
                status: Some(1),
                status_text: String::from("1"),
                stderr: stderr.clone(),
            }),
            None => Ok(()),
        }
    }
}
