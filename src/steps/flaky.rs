//! Loading of the advisory flaky-step list.

use camino::Utf8Path;

use super::ConfigValidationError;
use crate::source;

/// Reads the JSON array of flaky step names at `path`, or returns an empty
/// list when no path is configured.
///
/// The list is carried to each runner as metadata; it never removes steps
/// from the plan.
///
/// # Errors
///
/// Returns [`ConfigValidationError::Read`] or
/// [`ConfigValidationError::Parse`] when the file cannot be read or is not
/// an array of strings.
pub fn load_flaky_steps(path: Option<&Utf8Path>) -> Result<Vec<String>, ConfigValidationError> {
    let Some(flaky_path) = path else {
        return Ok(Vec::new());
    };

    let contents =
        source::read_to_string(flaky_path).map_err(|err| ConfigValidationError::Read {
            path: flaky_path.to_path_buf(),
            message: err.to_string(),
        })?;

    serde_json::from_str(&contents).map_err(|err| ConfigValidationError::Parse {
        path: flaky_path.to_path_buf(),
        message: err.to_string(),
    })
}
