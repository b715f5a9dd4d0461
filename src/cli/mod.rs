//! Command-line interface definitions for the `perfshard` binary.
//!
//! This module centralises the clap parser structures so both the main binary
//! and the build script can reuse them when generating the manual page.

use camino::Utf8PathBuf;
use clap::{Args, Parser};

/// Top-level CLI for the `perfshard` binary.
#[derive(Debug, Parser)]
#[command(
    name = "perfshard",
    about = "Assemble a device-sharded performance test plan",
    arg_required_else_help = true
)]
pub(crate) enum Cli {
    /// Resolve devices and steps, then print the plan as JSON.
    #[command(name = "plan", about = "Resolve devices and steps, then print the plan")]
    Plan(PlanCommand),
}

/// Arguments for the `perfshard plan` subcommand.
#[derive(Debug, Args)]
pub(crate) struct PlanCommand {
    /// JSON steps file describing a multi-step plan.
    #[arg(long, value_name = "PATH")]
    pub(crate) steps: Option<Utf8PathBuf>,
    /// JSON list of step names known to be flaky.
    #[arg(long, value_name = "PATH")]
    pub(crate) flaky_steps: Option<Utf8PathBuf>,
    /// Only keep steps whose names match this glob.
    #[arg(long, value_name = "PATTERN")]
    pub(crate) test_filter: Option<String>,
    /// Persisted roster of every device seen across runs.
    #[arg(long, value_name = "PATH")]
    pub(crate) known_devices_file: Option<Utf8PathBuf>,
    /// Treat this serial as active instead of asking `adb devices`
    /// (repeatable).
    #[arg(long = "device", value_name = "SERIAL")]
    pub(crate) devices: Vec<String>,
    /// Leave the output directory and devices untouched.
    #[arg(long)]
    pub(crate) skip_environment: bool,
    /// Run this command as the only step (use -- to separate flags).
    #[arg(trailing_var_arg = true, value_name = "SINGLE_STEP")]
    pub(crate) single_step: Vec<String>,
}
