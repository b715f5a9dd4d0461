//! Test options consumed by setup.

use camino::{Utf8Path, Utf8PathBuf};

use crate::steps::{ConfigValidationError, StepSource};

/// Options describing what a performance run should execute.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PerfOptions {
    /// Ad-hoc command to run as the only step.
    pub single_step: Option<Vec<String>>,
    /// JSON steps file describing a multi-step plan.
    pub steps: Option<Utf8PathBuf>,
    /// JSON list of step names known to be flaky.
    pub flaky_steps: Option<Utf8PathBuf>,
    /// Glob restricting which steps run.
    pub test_filter: Option<String>,
    /// Persisted roster of every device seen across runs.
    pub known_devices_file: Option<Utf8PathBuf>,
}

impl PerfOptions {
    /// Resolves where the step plan comes from.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigValidationError::NoStepSource`] when neither a
    /// single-step command nor a steps file is set.
    pub fn step_source(&self) -> Result<StepSource, ConfigValidationError> {
        StepSource::from_options(self.single_step.as_deref(), self.steps.as_deref())
    }

    /// Known-devices roster path, if configured.
    #[must_use]
    pub fn known_devices_file(&self) -> Option<&Utf8Path> {
        self.known_devices_file.as_deref()
    }

    /// Flaky-steps path, if configured.
    #[must_use]
    pub fn flaky_steps(&self) -> Option<&Utf8Path> {
        self.flaky_steps.as_deref()
    }

    /// Filter pattern, if configured.
    #[must_use]
    pub fn test_filter(&self) -> Option<&str> {
        self.test_filter.as_deref()
    }
}
