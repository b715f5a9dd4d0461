//! BDD step definitions for setup behaviour.

use perfshard::DeviceSerial;
use perfshard::test_support::EnvironmentCall;
use rstest_bdd_macros::{given, then, when};

use super::test_helpers::{SetupContext, SetupOutcome, split_list, steps_file_json};

#[derive(Debug, thiserror::Error)]
pub enum StepError {
    #[error("assertion failed: {0}")]
    Assertion(String),
}

#[given("a known devices roster listing \"{serials}\"")]
fn known_devices_roster(mut setup_context: SetupContext, serials: String) -> SetupContext {
    let contents = serde_json::to_string(&split_list(&serials))
        .unwrap_or_else(|err| panic!("roster should serialise: {err}"));
    let path = setup_context.write("known_devices.json", &contents);
    setup_context.options.known_devices_file = Some(path);
    setup_context
}

#[given("active devices \"{serials}\"")]
fn active_devices(mut setup_context: SetupContext, serials: String) -> SetupContext {
    setup_context.active = split_list(&serials).into_iter().collect();
    setup_context
}

#[given("a single-step command \"{command}\"")]
fn single_step_command(mut setup_context: SetupContext, command: String) -> SetupContext {
    setup_context.options.single_step = Some(
        command
            .split_whitespace()
            .map(str::to_owned)
            .collect::<Vec<_>>(),
    );
    setup_context
}

#[given("a steps file with steps \"{names}\"")]
fn steps_file(mut setup_context: SetupContext, names: String) -> SetupContext {
    let contents = steps_file_json(&split_list(&names));
    let path = setup_context.write("steps.json", &contents);
    setup_context.options.steps = Some(path);
    setup_context
}

#[given("a steps file declaring version {version:u32}")]
fn steps_file_with_version(mut setup_context: SetupContext, version: u32) -> SetupContext {
    let contents = format!(r#"{{"version": {version}, "steps": {{}}}}"#);
    let path = setup_context.write("steps.json", &contents);
    setup_context.options.steps = Some(path);
    setup_context
}

#[given("the test filter \"{pattern}\"")]
fn test_filter(mut setup_context: SetupContext, pattern: String) -> SetupContext {
    setup_context.options.test_filter = Some(pattern);
    setup_context
}

#[when("setup runs")]
fn setup_runs(mut setup_context: SetupContext) -> SetupContext {
    let orchestrator = setup_context.orchestrator();
    setup_context.outcome = Some(
        match orchestrator.execute(&setup_context.options, &setup_context.active) {
            Ok(setup) => SetupOutcome::Success(Box::new(setup)),
            Err(err) => SetupOutcome::Failure(err.to_string()),
        },
    );
    setup_context
}

fn success(setup_context: &SetupContext) -> Result<&perfshard::PerfSetup, StepError> {
    match setup_context.outcome.as_ref() {
        Some(SetupOutcome::Success(setup)) => Ok(setup.as_ref()),
        Some(SetupOutcome::Failure(message)) => Err(StepError::Assertion(format!(
            "expected setup to succeed, got: {message}"
        ))),
        None => Err(StepError::Assertion(String::from("missing outcome"))),
    }
}

#[then("the resolved devices are \"{serials}\"")]
fn resolved_devices(setup_context: &SetupContext, serials: String) -> Result<(), StepError> {
    let setup = success(setup_context)?;
    let expected = split_list(&serials)
        .into_iter()
        .map(DeviceSerial::from)
        .collect::<Vec<_>>();
    if setup.devices.as_slice() == expected.as_slice() {
        Ok(())
    } else {
        Err(StepError::Assertion(format!(
            "expected devices {expected:?}, got {:?}",
            setup.devices.as_slice()
        )))
    }
}

#[then("the step names are \"{names}\"")]
fn step_names(setup_context: &SetupContext, names: String) -> Result<(), StepError> {
    let setup = success(setup_context)?;
    let expected = split_list(&names);
    if setup.step_names == expected {
        Ok(())
    } else {
        Err(StepError::Assertion(format!(
            "expected steps {expected:?}, got {:?}",
            setup.step_names
        )))
    }
}

#[then("device \"{serial}\" at shard {shard:u32} gets a runner over {total:u32} devices")]
fn device_gets_runner(
    setup_context: &SetupContext,
    serial: String,
    shard: u32,
    total: u32,
) -> Result<(), StepError> {
    let setup = success(setup_context)?;
    let binding = setup
        .factory
        .runner_for(&DeviceSerial::from(serial.as_str()), shard as usize)
        .ok_or_else(|| StepError::Assertion(format!("expected a runner for {serial}")))?;
    if binding.total_devices() == total as usize && binding.shard_index() == shard as usize {
        Ok(())
    } else {
        Err(StepError::Assertion(format!(
            "expected shard {shard} of {total}, got shard {} of {}",
            binding.shard_index(),
            binding.total_devices()
        )))
    }
}

#[then("device \"{serial}\" at shard {shard:u32} gets no runner")]
fn device_gets_no_runner(
    setup_context: &SetupContext,
    serial: String,
    shard: u32,
) -> Result<(), StepError> {
    let setup = success(setup_context)?;
    match setup
        .factory
        .runner_for(&DeviceSerial::from(serial.as_str()), shard as usize)
    {
        None => Ok(()),
        Some(binding) => Err(StepError::Assertion(format!(
            "expected no runner for {serial}, got {binding:?}"
        ))),
    }
}

#[then("the workspace is reset before devices \"{serials}\" are cleaned")]
fn workspace_reset_before_cleanup(
    setup_context: &SetupContext,
    serials: String,
) -> Result<(), StepError> {
    let expected = vec![
        EnvironmentCall::Reset(setup_context.workspace()),
        EnvironmentCall::Cleanup(
            split_list(&serials)
                .into_iter()
                .map(DeviceSerial::from)
                .collect(),
        ),
    ];
    let calls = setup_context.log.calls();
    if calls == expected {
        Ok(())
    } else {
        Err(StepError::Assertion(format!(
            "expected calls {expected:?}, got {calls:?}"
        )))
    }
}

#[then("setup fails mentioning \"{text}\"")]
fn setup_fails(setup_context: &SetupContext, text: String) -> Result<(), StepError> {
    match setup_context.outcome.as_ref() {
        Some(SetupOutcome::Failure(message)) if message.contains(text.as_str()) => Ok(()),
        other => Err(StepError::Assertion(format!(
            "expected failure mentioning {text}, got {other:?}"
        ))),
    }
}
