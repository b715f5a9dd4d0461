//! Validation errors for step plans, flaky-step lists and name filters.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Raised when the run's intent cannot be determined from its inputs. Any
/// of these aborts setup.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ConfigValidationError {
    /// Neither a single-step command nor a steps file was supplied.
    #[error("no step source given: pass a single-step command or a steps file")]
    NoStepSource,
    /// A source file could not be read.
    #[error("failed to read {path}: {message}")]
    Read {
        /// Path that could not be read.
        path: Utf8PathBuf,
        /// Operating system error string.
        message: String,
    },
    /// A source file is not valid JSON of the expected shape.
    #[error("failed to parse {path}: {message}")]
    Parse {
        /// Path that could not be parsed.
        path: Utf8PathBuf,
        /// Parser error message.
        message: String,
    },
    /// The steps file has no `version` marker.
    #[error("steps file {path} has no version marker; expected version 1")]
    MissingVersion {
        /// Steps file path.
        path: Utf8PathBuf,
    },
    /// The steps file declares a version other than 1.
    #[error("steps file {path} declares version {found}; only version 1 is supported")]
    UnsupportedVersion {
        /// Steps file path.
        path: Utf8PathBuf,
        /// Version value as written in the file.
        found: String,
    },
    /// The name filter is not a valid glob.
    #[error("invalid test filter '{pattern}': {message}")]
    InvalidFilter {
        /// Pattern as supplied.
        pattern: String,
        /// Glob compiler message.
        message: String,
    },
}
