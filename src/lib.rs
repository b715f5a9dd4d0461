//! Core library for the perfshard performance-run planner.
//!
//! The crate resolves which attached devices a performance run shards over,
//! loads and filters the step plan, and hands the dispatcher a
//! [`RunnerFactory`] that binds each `(device, shard)` pair to a runner.
//! Device communication and step execution stay behind traits.

pub mod affinity;
pub mod command;
pub mod config;
pub mod device;
pub mod environment;
pub mod options;
pub mod runner;
pub mod setup;
mod source;
pub mod steps;
pub mod test_support;

pub use affinity::{DeviceSource, ResolvedDevices, RosterLoad, RosterUnavailable, resolve_devices};
pub use command::{CommandError, CommandOutput, CommandRunner, ProcessCommandRunner};
pub use config::{BuildType, ConfigError, PerfshardConfig, WorkspaceConfig};
pub use device::{ActiveDevices, DeviceSerial};
pub use environment::{
    AdbDeviceLister, AdbProcessCleaner, DeviceLister, DirWorkspaceResetter, EnvironmentError,
    ProcessCleaner, SkipEnvironment, WorkspaceResetter,
};
pub use options::PerfOptions;
pub use runner::{RunnerBinding, RunnerFactory};
pub use setup::{PerfSetup, SetupError, SetupOrchestrator};
pub use steps::{
    ConfigValidationError, StepFilter, StepPlan, StepSource, StepSpec, load_flaky_steps,
    load_step_plan,
};
