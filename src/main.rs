//! Binary entry point for the perfshard CLI.

use std::io::{self, Write};
use std::process;

use camino::Utf8Path;
use clap::Parser;
use serde::Serialize;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use perfshard::{
    AdbDeviceLister, AdbProcessCleaner, ConfigError, DeviceLister, DeviceSource,
    DirWorkspaceResetter, EnvironmentError, PerfOptions, PerfSetup, PerfshardConfig,
    SetupError, SetupOrchestrator, SkipEnvironment, WorkspaceConfig,
};

mod cli;

use cli::{Cli, PlanCommand};

/// Environment variable holding the log filter directives.
const LOG_ENV: &str = "PERFSHARD_LOG";

#[derive(Debug, Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("device listing failed: {0}")]
    Devices(#[source] EnvironmentError),
    #[error("setup failed: {0}")]
    Setup(#[from] SetupError),
    #[error("failed to write plan: {0}")]
    Output(String),
}

fn main() {
    install_subscriber();
    let cli = Cli::parse();
    let exit_code = match dispatch(cli) {
        Ok(code) => code,
        Err(err) => {
            report_error(&err);
            1
        }
    };

    process::exit(exit_code);
}

fn install_subscriber() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn dispatch(cli: Cli) -> Result<i32, CliError> {
    match cli {
        Cli::Plan(command) => plan_command(command),
    }
}

fn plan_command(args: PlanCommand) -> Result<i32, CliError> {
    let config = PerfshardConfig::load_without_cli_args()?;
    let workspace = config.workspace()?;

    let active = if args.devices.is_empty() {
        AdbDeviceLister::with_process_runner(config.adb_bin.as_str())
            .active_devices()
            .map_err(CliError::Devices)?
    } else {
        args.devices.iter().map(String::as_str).collect()
    };

    let skip_environment = args.skip_environment;
    let options = options_from_args(args);
    let setup = if skip_environment {
        SetupOrchestrator::new(workspace.clone(), SkipEnvironment, SkipEnvironment)
            .execute(&options, &active)?
    } else {
        SetupOrchestrator::new(
            workspace.clone(),
            DirWorkspaceResetter,
            AdbProcessCleaner::with_process_runner(config.adb_bin.as_str())
                .with_process_names(config.leftover_process_names()),
        )
        .execute(&options, &active)?
    };

    let report = PlanReport::new(&setup, &workspace);
    write_report(io::stdout(), &report)?;
    Ok(0)
}

fn options_from_args(args: PlanCommand) -> PerfOptions {
    PerfOptions {
        single_step: (!args.single_step.is_empty()).then_some(args.single_step),
        steps: args.steps,
        flaky_steps: args.flaky_steps,
        test_filter: args.test_filter,
        known_devices_file: args.known_devices_file,
    }
}

#[derive(Debug, Serialize)]
struct PlanReport<'a> {
    build_type: String,
    output_dir: &'a Utf8Path,
    device_source: String,
    shards: Vec<ShardReport<'a>>,
    steps: Vec<StepReport<'a>>,
    flaky_steps: &'a [String],
}

#[derive(Debug, Serialize)]
struct ShardReport<'a> {
    shard_index: usize,
    serial: &'a str,
    active: bool,
}

#[derive(Debug, Serialize)]
struct StepReport<'a> {
    name: &'a str,
    device_affinity: i64,
    command: String,
    flaky: bool,
}

impl<'a> PlanReport<'a> {
    fn new(setup: &'a PerfSetup, workspace: &'a WorkspaceConfig) -> Self {
        let device_source = match setup.devices.source() {
            DeviceSource::Roster => String::from("roster"),
            DeviceSource::ActiveFallback(reason) => format!("active devices ({reason})"),
        };
        let shards = setup
            .devices
            .shards()
            .map(|(shard_index, serial)| ShardReport {
                shard_index,
                serial: serial.as_str(),
                active: setup.factory.runner_for(serial, shard_index).is_some(),
            })
            .collect();
        let flaky_steps = setup.factory.flaky_steps();
        let steps = setup
            .step_names
            .iter()
            .filter_map(|name| {
                let spec = setup.factory.plan().step(name)?;
                Some(StepReport {
                    name,
                    device_affinity: spec.device_affinity,
                    command: spec.command_line(),
                    flaky: flaky_steps.contains(name),
                })
            })
            .collect();

        Self {
            build_type: workspace.build_type.to_string(),
            output_dir: &workspace.output_dir,
            device_source,
            shards,
            steps,
            flaky_steps,
        }
    }
}

fn write_report(mut target: impl Write, report: &PlanReport<'_>) -> Result<(), CliError> {
    serde_json::to_writer_pretty(&mut target, report)
        .map_err(|err| CliError::Output(err.to_string()))?;
    writeln!(target).map_err(|err| CliError::Output(err.to_string()))
}

fn report_error(err: &CliError) {
    write_error(io::stderr(), err);
}

fn write_error(mut target: impl Write, err: &CliError) {
    writeln!(target, "{err}").ok();
}
