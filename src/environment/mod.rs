//! Environment collaborators invoked around plan assembly: listing active
//! devices, resetting the output workspace, and killing processes left over
//! from a previous run.

use camino::Utf8PathBuf;
use thiserror::Error;
use tracing::debug;

use crate::command::CommandError;
use crate::config::WorkspaceConfig;
use crate::device::ActiveDevices;

mod adb;
mod workspace;

pub use adb::{AdbDeviceLister, AdbProcessCleaner, DEFAULT_LEFTOVER_PROCESSES};
pub use workspace::DirWorkspaceResetter;

/// Errors raised by environment collaborators.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum EnvironmentError {
    /// Raised when the output directory cannot be removed or recreated.
    #[error("failed to reset workspace {path}: {message}")]
    Workspace {
        /// Directory being reset.
        path: Utf8PathBuf,
        /// Operating system error string.
        message: String,
    },
    /// Raised when a device command exits unsuccessfully.
    #[error("{program} exited with status {status_text}: {stderr}")]
    CommandFailure {
        /// Program that failed.
        program: String,
        /// Exit status reported by the OS.
        status: Option<i32>,
        /// Human readable representation of the exit status.
        status_text: String,
        /// Stderr captured from the command.
        stderr: String,
    },
    /// Raised when command execution fails.
    #[error(transparent)]
    Runner(#[from] CommandError),
}

/// Supplies the devices that respond right now.
pub trait DeviceLister {
    /// Lists responding devices.
    ///
    /// # Errors
    ///
    /// Returns [`EnvironmentError`] when the device bridge cannot be queried.
    fn active_devices(&self) -> Result<ActiveDevices, EnvironmentError>;
}

/// Deletes and recreates the output directory.
pub trait WorkspaceResetter {
    /// Leaves `workspace.output_dir` present and empty.
    ///
    /// # Errors
    ///
    /// Returns [`EnvironmentError::Workspace`] when the directory cannot be
    /// removed or created.
    fn reset(&self, workspace: &WorkspaceConfig) -> Result<(), EnvironmentError>;
}

/// Terminates processes left behind by a previous run.
pub trait ProcessCleaner {
    /// Cleans every device in `active`.
    ///
    /// # Errors
    ///
    /// Returns [`EnvironmentError`] when a cleanup command cannot run or
    /// fails.
    fn cleanup(&self, active: &ActiveDevices) -> Result<(), EnvironmentError>;
}

/// Collaborator that leaves the environment untouched, for dry runs where
/// the output directory and devices must not be modified.
#[derive(Clone, Copy, Debug, Default)]
pub struct SkipEnvironment;

impl WorkspaceResetter for SkipEnvironment {
    fn reset(&self, workspace: &WorkspaceConfig) -> Result<(), EnvironmentError> {
        debug!(path = %workspace.output_dir, "skipping workspace reset");
        Ok(())
    }
}

impl ProcessCleaner for SkipEnvironment {
    fn cleanup(&self, active: &ActiveDevices) -> Result<(), EnvironmentError> {
        debug!(devices = active.len(), "skipping leftover process cleanup");
        Ok(())
    }
}
