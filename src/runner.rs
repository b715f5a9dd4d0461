//! Binding of `(device, shard)` pairs to runnable test units.

use std::sync::Arc;

use crate::affinity::ResolvedDevices;
use crate::config::WorkspaceConfig;
use crate::device::{ActiveDevices, DeviceSerial};
use crate::options::PerfOptions;
use crate::steps::{StepPlan, StepSpec};

#[derive(Debug)]
struct RunContext {
    options: PerfOptions,
    workspace: WorkspaceConfig,
    plan: StepPlan,
    flaky_steps: Vec<String>,
    active: ActiveDevices,
    resolved: ResolvedDevices,
}

/// Produces runner bindings for the dispatcher.
///
/// The factory is immutable after construction; it can be called any number
/// of times, in any order, from any thread.
#[derive(Clone, Debug)]
pub struct RunnerFactory {
    context: Arc<RunContext>,
}

impl RunnerFactory {
    /// Captures everything a runner needs. The shard count is taken from
    /// `resolved`, not from the active set, so it stays the same across runs
    /// where some known devices are offline.
    #[must_use]
    pub fn new(
        options: PerfOptions,
        workspace: WorkspaceConfig,
        plan: StepPlan,
        flaky_steps: Vec<String>,
        resolved: &ResolvedDevices,
        active: ActiveDevices,
    ) -> Self {
        Self {
            context: Arc::new(RunContext {
                options,
                workspace,
                plan,
                flaky_steps,
                active,
                resolved: resolved.clone(),
            }),
        }
    }

    /// Binds `device` to `shard_index`.
    ///
    /// Returns `None` when the device is known for affinity purposes but did
    /// not respond this run, and for active devices outside the resolved
    /// ordering; the dispatcher skips such shards.
    #[must_use]
    pub fn runner_for(&self, device: &DeviceSerial, shard_index: usize) -> Option<RunnerBinding> {
        if !self.context.active.contains(device)
            || self.context.resolved.shard_index_of(device).is_none()
        {
            return None;
        }
        Some(RunnerBinding {
            context: Arc::clone(&self.context),
            device: device.clone(),
            shard_index,
        })
    }

    /// Shard count every binding reports.
    #[must_use]
    pub fn total_devices(&self) -> usize {
        self.context.resolved.len()
    }

    /// The step plan handed to every binding.
    #[must_use]
    pub fn plan(&self) -> &StepPlan {
        &self.context.plan
    }

    /// Advisory flaky step names handed to every binding.
    #[must_use]
    pub fn flaky_steps(&self) -> &[String] {
        &self.context.flaky_steps
    }
}

/// A fully parameterised test runner descriptor for one shard.
#[derive(Clone, Debug)]
pub struct RunnerBinding {
    context: Arc<RunContext>,
    device: DeviceSerial,
    shard_index: usize,
}

impl RunnerBinding {
    /// Device this runner drives.
    #[must_use]
    pub const fn device(&self) -> &DeviceSerial {
        &self.device
    }

    /// Position of the device in the resolved ordering.
    #[must_use]
    pub const fn shard_index(&self) -> usize {
        self.shard_index
    }

    /// Number of resolved devices at setup time.
    #[must_use]
    pub fn total_devices(&self) -> usize {
        self.context.resolved.len()
    }

    /// Options the run was set up with.
    #[must_use]
    pub fn options(&self) -> &PerfOptions {
        &self.context.options
    }

    /// Output location and build flavour.
    #[must_use]
    pub fn workspace(&self) -> &WorkspaceConfig {
        &self.context.workspace
    }

    /// The full step plan.
    #[must_use]
    pub fn plan(&self) -> &StepPlan {
        &self.context.plan
    }

    /// Looks up a step in the plan.
    #[must_use]
    pub fn step(&self, name: &str) -> Option<&StepSpec> {
        self.context.plan.step(name)
    }

    /// Advisory flaky step names.
    #[must_use]
    pub fn flaky_steps(&self) -> &[String] {
        &self.context.flaky_steps
    }

    /// Returns `true` when `step_name` is marked flaky.
    #[must_use]
    pub fn is_flaky(&self, step_name: &str) -> bool {
        self.context
            .flaky_steps
            .iter()
            .any(|flaky| flaky == step_name)
    }
}
