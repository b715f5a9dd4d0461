//! Shared fixtures and helpers for setup BDD scenarios.

use std::rc::Rc;

use camino::Utf8PathBuf;
use perfshard::test_support::{EnvironmentLog, RecordingCleaner, RecordingResetter};
use perfshard::{ActiveDevices, PerfOptions, PerfSetup, SetupOrchestrator, WorkspaceConfig};
use rstest::fixture;
use tempfile::TempDir;

#[derive(Clone, Debug)]
pub enum SetupOutcome {
    Success(Box<PerfSetup>),
    Failure(String),
}

#[derive(Clone, Debug)]
pub struct SetupContext {
    pub tmp: Rc<TempDir>,
    pub log: EnvironmentLog,
    pub active: ActiveDevices,
    pub options: PerfOptions,
    pub outcome: Option<SetupOutcome>,
}

impl SetupContext {
    pub fn dir(&self) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(self.tmp.path().to_path_buf())
            .unwrap_or_else(|path| panic!("temp path should be utf8: {}", path.display()))
    }

    pub fn write(&self, name: &str, contents: &str) -> Utf8PathBuf {
        let path = self.dir().join(name);
        std::fs::write(&path, contents).unwrap_or_else(|err| panic!("write {path}: {err}"));
        path
    }

    pub fn workspace(&self) -> WorkspaceConfig {
        WorkspaceConfig::new(self.dir().join("step_results"))
    }

    pub fn orchestrator(&self) -> SetupOrchestrator<RecordingResetter, RecordingCleaner> {
        SetupOrchestrator::new(
            self.workspace(),
            RecordingResetter::new(self.log.clone()),
            RecordingCleaner::new(self.log.clone()),
        )
    }
}

#[fixture]
pub fn setup_context() -> SetupContext {
    let tmp = TempDir::new().unwrap_or_else(|err| panic!("tempdir: {err}"));
    SetupContext {
        tmp: Rc::new(tmp),
        log: EnvironmentLog::new(),
        active: ActiveDevices::default(),
        options: PerfOptions::default(),
        outcome: None,
    }
}

/// Splits a comma-separated feature-file list.
pub fn split_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_owned)
        .collect()
}

pub fn steps_file_json(names: &[String]) -> String {
    let steps = names
        .iter()
        .map(|name| {
            (
                name.clone(),
                serde_json::json!({"device_affinity": 0, "cmd": ["run", name]}),
            )
        })
        .collect::<serde_json::Map<_, _>>();
    serde_json::json!({"version": 1, "steps": steps}).to_string()
}
