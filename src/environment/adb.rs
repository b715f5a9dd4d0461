//! `adb`-backed device listing and leftover-process cleanup.

use std::ffi::OsString;

use tracing::{debug, info};

use super::{DeviceLister, EnvironmentError, ProcessCleaner};
use crate::command::{CommandOutput, CommandRunner, ProcessCommandRunner};
use crate::config::DEFAULT_ADB_BIN;
use crate::device::ActiveDevices;

/// Device-side processes killed before a run by default.
pub const DEFAULT_LEFTOVER_PROCESSES: &[&str] = &["device_forwarder"];

/// State `adb devices` reports for a device that is ready for commands.
const READY_STATE: &str = "device";

/// `pkill` exit status meaning no process matched.
const PKILL_NO_MATCH: i32 = 1;

/// Lists responding devices with `adb devices`.
#[derive(Clone, Debug)]
pub struct AdbDeviceLister<R: CommandRunner> {
    adb_bin: String,
    runner: R,
}

impl AdbDeviceLister<ProcessCommandRunner> {
    /// Creates a lister wired to the real process runner.
    #[must_use]
    pub fn with_process_runner(adb_bin: impl Into<String>) -> Self {
        Self::new(adb_bin, ProcessCommandRunner)
    }
}

impl<R: CommandRunner> AdbDeviceLister<R> {
    /// Creates a lister using the provided `adb` binary and runner.
    #[must_use]
    pub fn new(adb_bin: impl Into<String>, runner: R) -> Self {
        Self {
            adb_bin: adb_bin.into(),
            runner,
        }
    }
}

impl<R: CommandRunner> DeviceLister for AdbDeviceLister<R> {
    fn active_devices(&self) -> Result<ActiveDevices, EnvironmentError> {
        let output = self
            .runner
            .run(&self.adb_bin, &[OsString::from("devices")])?;
        let stdout = check_output(&self.adb_bin, output)?.stdout;
        let devices = parse_adb_devices(&stdout);
        info!(count = devices.len(), "found active devices");
        Ok(devices)
    }
}

/// Keeps serials whose state is `device`, skipping offline and unauthorised
/// entries and the header line.
pub(crate) fn parse_adb_devices(stdout: &str) -> ActiveDevices {
    stdout
        .lines()
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let serial = fields.next()?;
            let state = fields.next()?;
            (state == READY_STATE).then_some(serial)
        })
        .collect()
}

/// Kills named processes on every active device via `adb shell pkill`.
#[derive(Clone, Debug)]
pub struct AdbProcessCleaner<R: CommandRunner> {
    adb_bin: String,
    process_names: Vec<String>,
    runner: R,
}

impl AdbProcessCleaner<ProcessCommandRunner> {
    /// Creates a cleaner wired to the real process runner.
    #[must_use]
    pub fn with_process_runner(adb_bin: impl Into<String>) -> Self {
        Self::new(adb_bin, ProcessCommandRunner)
    }
}

impl<R: CommandRunner> AdbProcessCleaner<R> {
    /// Creates a cleaner that kills [`DEFAULT_LEFTOVER_PROCESSES`].
    #[must_use]
    pub fn new(adb_bin: impl Into<String>, runner: R) -> Self {
        Self {
            adb_bin: adb_bin.into(),
            process_names: DEFAULT_LEFTOVER_PROCESSES
                .iter()
                .map(|name| (*name).to_owned())
                .collect(),
            runner,
        }
    }

    /// Replaces the list of process names to kill.
    #[must_use]
    pub fn with_process_names(mut self, names: Vec<String>) -> Self {
        self.process_names = names;
        self
    }

    fn kill_args(serial: &str, process_name: &str) -> Vec<OsString> {
        vec![
            OsString::from("-s"),
            OsString::from(serial),
            OsString::from("shell"),
            OsString::from("pkill"),
            OsString::from("-f"),
            OsString::from(process_name),
        ]
    }
}

impl<R: CommandRunner> ProcessCleaner for AdbProcessCleaner<R> {
    fn cleanup(&self, active: &ActiveDevices) -> Result<(), EnvironmentError> {
        for serial in active {
            for name in &self.process_names {
                debug!(device = %serial, process = %name, "killing leftover process");
                let output = self
                    .runner
                    .run(&self.adb_bin, &Self::kill_args(serial.as_str(), name))?;
                if output.code == Some(PKILL_NO_MATCH) {
                    continue;
                }
                check_output(&self.adb_bin, output)?;
            }
        }
        Ok(())
    }
}

impl Default for AdbProcessCleaner<ProcessCommandRunner> {
    fn default() -> Self {
        Self::with_process_runner(DEFAULT_ADB_BIN)
    }
}

fn check_output(program: &str, output: CommandOutput) -> Result<CommandOutput, EnvironmentError> {
    if output.is_success() {
        return Ok(output);
    }
    Err(EnvironmentError::CommandFailure {
        program: program.to_owned(),
        status: output.code,
        status_text: output.status_text(),
        stderr: output.stderr,
    })
}
