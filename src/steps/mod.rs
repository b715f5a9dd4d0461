//! Step plan loading.
//!
//! A plan is either synthesised from a single ad-hoc command or read from a
//! JSON steps file of the form:
//!
//! ```json
//! {
//!   "version": 1,
//!   "steps": {
//!     "page_cycler": { "device_affinity": 0, "cmd": ["tools/perf/run", "page_cycler"] }
//!   }
//! }
//! ```

use std::collections::BTreeMap;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shell_escape::unix::escape;

use crate::source;

mod error;
mod filter;
mod flaky;

pub use error::ConfigValidationError;
pub use filter::StepFilter;
pub use flaky::load_flaky_steps;

/// The only steps-file format version understood.
pub const SUPPORTED_VERSION: u32 = 1;

/// Name given to the step synthesised from a single command.
pub const SINGLE_STEP_NAME: &str = "single_step";

/// A named unit of work: which shard prefers it and what to run.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct StepSpec {
    /// Preferred shard. Dispatchers reduce it modulo the shard count, so any
    /// integer, including a negative one, is valid.
    pub device_affinity: i64,
    /// Command line as an argument vector.
    pub cmd: Vec<String>,
}

impl StepSpec {
    /// Renders the command as a shell-escaped string for display.
    #[must_use]
    pub fn command_line(&self) -> String {
        self.cmd
            .iter()
            .map(|arg| escape(arg.as_str().into()).into_owned())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Validated step plan. Step names are unique and iterate in sorted order.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct StepPlan {
    /// Format version; always [`SUPPORTED_VERSION`] once loaded.
    pub version: u32,
    /// Steps keyed by name.
    pub steps: BTreeMap<String, StepSpec>,
}

impl StepPlan {
    /// Builds the one-step plan used for ad-hoc commands.
    #[must_use]
    pub fn single_step(cmd: Vec<String>) -> Self {
        let mut steps = BTreeMap::new();
        steps.insert(
            SINGLE_STEP_NAME.to_owned(),
            StepSpec {
                device_affinity: 0,
                cmd,
            },
        );
        Self {
            version: SUPPORTED_VERSION,
            steps,
        }
    }

    /// Step names in sorted order.
    #[must_use]
    pub fn sorted_step_names(&self) -> Vec<String> {
        self.steps.keys().cloned().collect()
    }

    /// Looks up a step by name.
    #[must_use]
    pub fn step(&self, name: &str) -> Option<&StepSpec> {
        self.steps.get(name)
    }
}

/// Where the step plan comes from, decided once from the test options.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StepSource {
    /// Run one ad-hoc command.
    SingleCommand(Vec<String>),
    /// Read a JSON steps file.
    File(Utf8PathBuf),
}

impl StepSource {
    /// Chooses the plan source. A non-empty single-step command wins over a
    /// steps file; an empty command counts as absent.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigValidationError::NoStepSource`] when neither input is
    /// usable.
    pub fn from_options(
        single_step: Option<&[String]>,
        steps_file: Option<&Utf8Path>,
    ) -> Result<Self, ConfigValidationError> {
        match (single_step, steps_file) {
            (Some(cmd), _) if !cmd.is_empty() => Ok(Self::SingleCommand(cmd.to_vec())),
            (_, Some(path)) => Ok(Self::File(path.to_path_buf())),
            _ => Err(ConfigValidationError::NoStepSource),
        }
    }
}

/// Loads and validates the plan described by `source`.
///
/// # Errors
///
/// Returns [`ConfigValidationError`] when the steps file cannot be read, is
/// not valid JSON of the expected shape, or does not declare version 1.
pub fn load_step_plan(step_source: &StepSource) -> Result<StepPlan, ConfigValidationError> {
    match step_source {
        StepSource::SingleCommand(cmd) => Ok(StepPlan::single_step(cmd.clone())),
        StepSource::File(path) => {
            let contents =
                source::read_to_string(path).map_err(|err| ConfigValidationError::Read {
                    path: path.clone(),
                    message: err.to_string(),
                })?;
            parse_step_plan(path, &contents)
        }
    }
}

pub(crate) fn parse_step_plan(
    path: &Utf8Path,
    contents: &str,
) -> Result<StepPlan, ConfigValidationError> {
    let parse_error = |err: serde_json::Error| ConfigValidationError::Parse {
        path: path.to_path_buf(),
        message: err.to_string(),
    };

    let document: Value = serde_json::from_str(contents).map_err(parse_error)?;
    match document.get("version") {
        None => {
            return Err(ConfigValidationError::MissingVersion {
                path: path.to_path_buf(),
            });
        }
        Some(version) if version.as_u64() != Some(u64::from(SUPPORTED_VERSION)) => {
            return Err(ConfigValidationError::UnsupportedVersion {
                path: path.to_path_buf(),
                found: version.to_string(),
            });
        }
        Some(_) => {}
    }

    serde_json::from_value(document).map_err(parse_error)
}

#[cfg(test)]
mod tests;
