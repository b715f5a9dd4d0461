//! Unit tests for step plan and flaky-step loading.

use super::*;
use rstest::{fixture, rstest};
use tempfile::TempDir;

struct StepsFixture {
    _tmp: TempDir,
    dir: Utf8PathBuf,
}

impl StepsFixture {
    fn write(&self, name: &str, contents: &str) -> Utf8PathBuf {
        let path = self.dir.join(name);
        std::fs::write(&path, contents).unwrap_or_else(|err| panic!("write {path}: {err}"));
        path
    }
}

#[fixture]
fn steps_fixture() -> StepsFixture {
    let tmp = TempDir::new().unwrap_or_else(|err| panic!("tempdir: {err}"));
    let dir = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf())
        .unwrap_or_else(|path| panic!("temp path should be utf8: {}", path.display()));
    StepsFixture { _tmp: tmp, dir }
}

fn argv(items: &[&str]) -> Vec<String> {
    items.iter().copied().map(str::to_owned).collect()
}

const TWO_STEPS: &str = r#"{
    "version": 1,
    "steps": {
        "sunspider": {"device_affinity": 1, "cmd": ["run", "sunspider"], "perf_dashboard_id": "x"},
        "octane": {"device_affinity": 0, "cmd": ["run", "octane"]}
    }
}"#;

#[rstest]
#[case(&["echo", "hi"])]
#[case(&["tools/perf/run_benchmark", "--browser=android", "smoothness"])]
fn single_command_yields_one_step(#[case] cmd: &[&str]) {
    let step_source = StepSource::from_options(Some(&argv(cmd)), None)
        .unwrap_or_else(|err| panic!("source: {err}"));

    let plan = load_step_plan(&step_source).unwrap_or_else(|err| panic!("load: {err}"));

    assert_eq!(plan.version, SUPPORTED_VERSION);
    assert_eq!(plan.sorted_step_names(), vec![SINGLE_STEP_NAME.to_owned()]);
    let step = plan
        .step(SINGLE_STEP_NAME)
        .unwrap_or_else(|| panic!("single step should exist"));
    assert_eq!(step.device_affinity, 0);
    assert_eq!(step.cmd, argv(cmd));
}

#[rstest]
fn single_command_wins_over_steps_file() {
    let cmd = argv(&["echo"]);
    let step_source = StepSource::from_options(Some(&cmd), Some(Utf8Path::new("steps.json")))
        .unwrap_or_else(|err| panic!("source: {err}"));

    assert_eq!(step_source, StepSource::SingleCommand(cmd));
}

#[rstest]
fn empty_single_command_defers_to_steps_file() {
    let step_source = StepSource::from_options(Some(&[]), Some(Utf8Path::new("steps.json")))
        .unwrap_or_else(|err| panic!("source: {err}"));

    assert_eq!(step_source, StepSource::File(Utf8PathBuf::from("steps.json")));
}

#[rstest]
#[case(None)]
#[case(Some(Vec::new()))]
fn missing_step_source_is_a_validation_error(#[case] single_step: Option<Vec<String>>) {
    let err = StepSource::from_options(single_step.as_deref(), None)
        .expect_err("no source should fail");
    assert_eq!(err, ConfigValidationError::NoStepSource);
}

#[rstest]
fn steps_file_loads_sorted_steps(steps_fixture: StepsFixture) {
    let path = steps_fixture.write("steps.json", TWO_STEPS);

    let plan = load_step_plan(&StepSource::File(path)).unwrap_or_else(|err| panic!("load: {err}"));

    assert_eq!(plan.sorted_step_names(), argv(&["octane", "sunspider"]));
    let sunspider = plan
        .step("sunspider")
        .unwrap_or_else(|| panic!("sunspider should exist"));
    assert_eq!(sunspider.device_affinity, 1);
    assert_eq!(sunspider.command_line(), "run sunspider");
}

#[rstest]
#[case(-1)]
#[case(5_000_000_000)]
fn steps_file_accepts_any_integer_affinity(steps_fixture: StepsFixture, #[case] affinity: i64) {
    let contents = format!(
        r#"{{"version": 1, "steps": {{"octane": {{"device_affinity": {affinity}, "cmd": ["run"]}}}}}}"#
    );
    let path = steps_fixture.write("steps.json", &contents);

    let plan = load_step_plan(&StepSource::File(path)).unwrap_or_else(|err| panic!("load: {err}"));

    assert_eq!(
        plan.step("octane").map(|step| step.device_affinity),
        Some(affinity)
    );
}

#[rstest]
#[case(r#"{"version": 2, "steps": {}}"#, "2")]
#[case(r#"{"version": 0, "steps": {}}"#, "0")]
#[case(r#"{"version": "1", "steps": {}}"#, "\"1\"")]
#[case(r#"{"version": 1.5, "steps": {}}"#, "1.5")]
#[case(r#"{"version": 1.0, "steps": {}}"#, "1.0")]
fn steps_file_with_wrong_version_is_rejected(
    steps_fixture: StepsFixture,
    #[case] contents: &str,
    #[case] expected_found: &str,
) {
    let path = steps_fixture.write("steps.json", contents);

    let err = load_step_plan(&StepSource::File(path.clone())).expect_err("version should fail");

    assert_eq!(
        err,
        ConfigValidationError::UnsupportedVersion {
            path,
            found: expected_found.to_owned(),
        }
    );
}

#[rstest]
fn steps_file_without_version_is_rejected(steps_fixture: StepsFixture) {
    let path = steps_fixture.write("steps.json", r#"{"steps": {}}"#);

    let err = load_step_plan(&StepSource::File(path.clone())).expect_err("version should fail");

    assert_eq!(err, ConfigValidationError::MissingVersion { path });
}

#[rstest]
#[case("{not json")]
#[case(r#"{"version": 1}"#)]
#[case(r#"{"version": 1, "steps": {"a": {"device_affinity": 0}}}"#)]
#[case(r#"{"version": 1, "steps": {"a": {"device_affinity": "0", "cmd": []}}}"#)]
fn malformed_steps_file_is_a_parse_error(steps_fixture: StepsFixture, #[case] contents: &str) {
    let path = steps_fixture.write("steps.json", contents);

    let err = load_step_plan(&StepSource::File(path)).expect_err("parse should fail");

    assert!(
        matches!(err, ConfigValidationError::Parse { .. }),
        "unexpected error: {err}"
    );
}

#[rstest]
fn unreadable_steps_file_is_a_read_error(steps_fixture: StepsFixture) {
    let path = steps_fixture.dir.join("absent.json");

    let err = load_step_plan(&StepSource::File(path.clone())).expect_err("read should fail");

    let ConfigValidationError::Read { path: reported, .. } = err else {
        panic!("expected read error");
    };
    assert_eq!(reported, path);
}

#[test]
fn command_line_escapes_arguments() {
    let spec = StepSpec {
        device_affinity: 0,
        cmd: argv(&["echo", "a b", "c'd"]),
    };

    assert_eq!(spec.command_line(), "echo 'a b' 'c'\\''d'");
}

#[rstest]
fn flaky_steps_default_to_empty() {
    let flaky = load_flaky_steps(None).unwrap_or_else(|err| panic!("flaky: {err}"));
    assert!(flaky.is_empty());
}

#[rstest]
fn flaky_steps_load_from_json_array(steps_fixture: StepsFixture) {
    let path = steps_fixture.write("flaky.json", r#"["octane", "not_a_step"]"#);

    let flaky = load_flaky_steps(Some(&path)).unwrap_or_else(|err| panic!("flaky: {err}"));

    assert_eq!(flaky, argv(&["octane", "not_a_step"]));
}

#[rstest]
#[case(r#"{"octane": true}"#)]
#[case("[1, 2]")]
#[case("")]
fn flaky_steps_reject_non_string_lists(steps_fixture: StepsFixture, #[case] contents: &str) {
    let path = steps_fixture.write("flaky.json", contents);

    let err = load_flaky_steps(Some(&path)).expect_err("parse should fail");

    assert!(
        matches!(err, ConfigValidationError::Parse { .. }),
        "unexpected error: {err}"
    );
}

#[rstest]
fn flaky_steps_surface_read_failures(steps_fixture: StepsFixture) {
    let path = steps_fixture.dir.join("absent.json");

    let err = load_flaky_steps(Some(&path)).expect_err("read should fail");

    assert!(
        matches!(err, ConfigValidationError::Read { .. }),
        "unexpected error: {err}"
    );
}
