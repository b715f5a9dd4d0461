//! Configuration loading via `ortho-config`.

use std::fmt;
use std::str::FromStr;

use camino::Utf8PathBuf;
use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

use crate::environment::DEFAULT_LEFTOVER_PROCESSES;

/// Default directory that receives per-step results.
pub const DEFAULT_OUTPUT_DIR: &str = "out/step_results";

/// Default `adb` executable.
pub const DEFAULT_ADB_BIN: &str = "adb";

/// Layered settings derived from defaults, `perfshard.toml`, and
/// `PERFSHARD_*` environment variables.
#[derive(Clone, Debug, Deserialize, OrthoConfig, PartialEq, Eq)]
#[ortho_config(
    prefix = "PERFSHARD",
    discovery(
        app_name = "perfshard",
        env_var = "PERFSHARD_CONFIG_PATH",
        config_file_name = "perfshard.toml",
        dotfile_name = ".perfshard.toml",
        project_file_name = "perfshard.toml"
    )
)]
pub struct PerfshardConfig {
    /// Directory that is wiped and recreated before each run.
    #[ortho_config(default = DEFAULT_OUTPUT_DIR.to_owned())]
    pub output_dir: String,
    /// Build flavour under test (`Debug` or `Release`).
    #[ortho_config(default = "Release".to_owned())]
    pub build_type: String,
    /// Path to the `adb` executable used to list and clean devices.
    #[ortho_config(default = DEFAULT_ADB_BIN.to_owned())]
    pub adb_bin: String,
    /// Comma-separated device process names killed before each run.
    #[ortho_config(default = DEFAULT_LEFTOVER_PROCESSES.join(","))]
    pub leftover_processes: String,
}

impl PerfshardConfig {
    /// Loads configuration without attempting to parse CLI arguments.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the merge fails.
    pub fn load_without_cli_args() -> Result<Self, ConfigError> {
        Self::load_from_iter([std::ffi::OsString::from("perfshard")])
            .map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Performs semantic validation on required fields.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] when a field is blank, or
    /// [`ConfigError::InvalidBuildType`] for an unknown build flavour.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Self::require_field(&self.output_dir, "output_dir")?;
        Self::require_field(&self.adb_bin, "adb_bin")?;
        self.build_type.parse::<BuildType>()?;
        Ok(())
    }

    /// Builds the workspace description handed to setup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when validation fails.
    pub fn workspace(&self) -> Result<WorkspaceConfig, ConfigError> {
        self.validate()?;
        Ok(WorkspaceConfig {
            output_dir: Utf8PathBuf::from(self.output_dir.trim()),
            build_type: self.build_type.parse()?,
        })
    }

    /// Process names from `leftover_processes`, trimmed, without blanks.
    #[must_use]
    pub fn leftover_process_names(&self) -> Vec<String> {
        self.leftover_processes
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_owned)
            .collect()
    }

    fn require_field(value: &str, field: &str) -> Result<(), ConfigError> {
        if value.trim().is_empty() {
            return Err(ConfigError::MissingField(format!(
                "{field}: set PERFSHARD_{env_suffix} or add {field} to perfshard.toml",
                env_suffix = field.to_uppercase()
            )));
        }
        Ok(())
    }
}

/// Build flavour of the binaries under test.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum BuildType {
    /// Unoptimised build.
    Debug,
    /// Optimised build; perf numbers are only meaningful here.
    #[default]
    Release,
}

impl fmt::Display for BuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Debug => "Debug",
            Self::Release => "Release",
        })
    }
}

impl FromStr for BuildType {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "Debug" | "debug" => Ok(Self::Debug),
            "Release" | "release" => Ok(Self::Release),
            other => Err(ConfigError::InvalidBuildType(other.to_owned())),
        }
    }
}

/// Output location and build flavour for a run.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WorkspaceConfig {
    /// Directory that receives per-step results.
    pub output_dir: Utf8PathBuf,
    /// Build flavour under test.
    pub build_type: BuildType,
}

impl WorkspaceConfig {
    /// Creates a workspace for `output_dir` with the default build type.
    #[must_use]
    pub fn new(output_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            build_type: BuildType::default(),
        }
    }

    /// Overrides the build type.
    #[must_use]
    pub const fn with_build_type(mut self, build_type: BuildType) -> Self {
        self.build_type = build_type;
        self
    }
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self::new(DEFAULT_OUTPUT_DIR)
    }
}

/// Errors raised during configuration loading and validation.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum ConfigError {
    /// Indicates a required configuration field is empty or missing.
    #[error("missing configuration field: {0}")]
    MissingField(String),
    /// Indicates an unknown build flavour.
    #[error("unknown build type '{0}': expected Debug or Release")]
    InvalidBuildType(String),
    /// Surfaces errors from the `ortho-config` loader.
    #[error("configuration parsing failed: {0}")]
    Parse(String),
}

impl From<ortho_config::OrthoError> for ConfigError {
    fn from(value: ortho_config::OrthoError) -> Self {
        Self::Parse(value.to_string())
    }
}
