//! Setup orchestration for a performance run.
//!
//! Setup prepares the environment, resolves device affinity, assembles the
//! step plan and returns a [`RunnerFactory`] for the dispatcher. It never
//! runs a step itself.

use thiserror::Error;
use tracing::info;

use crate::affinity::{ResolvedDevices, resolve_devices};
use crate::config::WorkspaceConfig;
use crate::device::ActiveDevices;
use crate::environment::{EnvironmentError, ProcessCleaner, WorkspaceResetter};
use crate::options::PerfOptions;
use crate::runner::RunnerFactory;
use crate::steps::{ConfigValidationError, StepFilter, load_flaky_steps, load_step_plan};

/// Errors that abort setup. No partial plan is returned.
#[derive(Debug, Error)]
pub enum SetupError {
    /// Raised when the output workspace cannot be reset.
    #[error("workspace reset failed: {0}")]
    Workspace(#[source] EnvironmentError),
    /// Raised when leftover processes cannot be cleaned up.
    #[error("leftover process cleanup failed: {0}")]
    Cleanup(#[source] EnvironmentError),
    /// Raised when the step plan, filter, or flaky list is invalid.
    #[error("invalid run configuration: {0}")]
    Config(#[from] ConfigValidationError),
}

/// Everything the dispatcher needs to run the plan.
#[derive(Clone, Debug)]
pub struct PerfSetup {
    /// Binds `(device, shard)` pairs to runners.
    pub factory: RunnerFactory,
    /// Sorted step names that survived the filter.
    pub step_names: Vec<String>,
    /// Device ordering that defines shard indices.
    pub devices: ResolvedDevices,
}

/// Sequences environment preparation and plan assembly.
#[derive(Debug)]
pub struct SetupOrchestrator<W, C> {
    workspace: WorkspaceConfig,
    resetter: W,
    cleaner: C,
}

impl<W, C> SetupOrchestrator<W, C>
where
    W: WorkspaceResetter,
    C: ProcessCleaner,
{
    /// Creates a new orchestrator.
    #[must_use]
    pub const fn new(workspace: WorkspaceConfig, resetter: W, cleaner: C) -> Self {
        Self {
            workspace,
            resetter,
            cleaner,
        }
    }

    /// Workspace this orchestrator prepares.
    #[must_use]
    pub const fn workspace(&self) -> &WorkspaceConfig {
        &self.workspace
    }

    /// Runs setup for `options` against the devices in `active`.
    ///
    /// Roster problems only degrade device affinity and never fail setup.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError`] when the workspace cannot be reset, cleanup
    /// fails, or the step plan, filter, or flaky list is invalid.
    pub fn execute(
        &self,
        options: &PerfOptions,
        active: &ActiveDevices,
    ) -> Result<PerfSetup, SetupError> {
        self.resetter
            .reset(&self.workspace)
            .map_err(SetupError::Workspace)?;
        self.cleaner
            .cleanup(active)
            .map_err(SetupError::Cleanup)?;

        let devices = resolve_devices(active, options.known_devices_file());

        let plan = load_step_plan(&options.step_source()?)?;
        let filter = StepFilter::new(options.test_filter())?;
        let step_names = filter.apply(plan.sorted_step_names());

        let flaky_steps = load_flaky_steps(options.flaky_steps())?;

        info!(
            devices = devices.len(),
            active = active.len(),
            steps = step_names.len(),
            flaky = flaky_steps.len(),
            build_type = %self.workspace.build_type,
            "performance run prepared"
        );

        let factory = RunnerFactory::new(
            options.clone(),
            self.workspace.clone(),
            plan,
            flaky_steps,
            &devices,
            active.clone(),
        );

        Ok(PerfSetup {
            factory,
            step_names,
            devices,
        })
    }
}
