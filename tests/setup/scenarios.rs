//! BDD scenarios for performance run setup.

use rstest_bdd_macros::scenario;

use super::test_helpers::{SetupContext, setup_context};

#[scenario(
    path = "tests/features/setup.feature",
    name = "Roster devices define shards for a single step"
)]
fn scenario_roster_defines_shards(setup_context: SetupContext) {
    let _ = setup_context;
}

#[scenario(
    path = "tests/features/setup.feature",
    name = "Missing roster falls back to active devices"
)]
fn scenario_missing_roster_fallback(setup_context: SetupContext) {
    let _ = setup_context;
}

#[scenario(
    path = "tests/features/setup.feature",
    name = "Steps file is sorted and filtered"
)]
fn scenario_steps_sorted_and_filtered(setup_context: SetupContext) {
    let _ = setup_context;
}

#[scenario(
    path = "tests/features/setup.feature",
    name = "Unsupported steps file version aborts setup"
)]
fn scenario_unsupported_version(setup_context: SetupContext) {
    let _ = setup_context;
}
