//! Loading of the persisted known-devices roster.

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;

use crate::device::DeviceSerial;
use crate::source;

/// Placeholder written by device tooling when a serial could not be read.
const ERROR_PLACEHOLDER: &str = "(error)";

/// Reasons the roster could not provide a device ordering.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum RosterUnavailable {
    /// No known-devices file was configured.
    #[error("known devices file path not provided")]
    NotConfigured,
    /// The file could not be opened or read.
    #[error("unable to read known devices file {path}: {message}")]
    Unreadable {
        /// Roster path.
        path: Utf8PathBuf,
        /// Operating system error string.
        message: String,
    },
    /// The file was readable but not a list of serials.
    #[error("known devices file {path} is not a list of serials: {message}")]
    Malformed {
        /// Roster path.
        path: Utf8PathBuf,
        /// Parser error message.
        message: String,
    },
    /// The file listed no devices while some are active.
    #[error("known devices file {path} is empty")]
    Empty {
        /// Roster path.
        path: Utf8PathBuf,
    },
}

/// Outcome of loading the roster. Failures are reported as values.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RosterLoad {
    /// Serials in file order. May be empty.
    Loaded(Vec<DeviceSerial>),
    /// The roster could not be used.
    Degraded(RosterUnavailable),
}

/// Reads the roster at `path`.
///
/// Both the JSON array format and the legacy one-serial-per-line format are
/// accepted.
#[must_use]
pub fn load_roster(path: &Utf8Path) -> RosterLoad {
    let contents = match source::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) => {
            return RosterLoad::Degraded(RosterUnavailable::Unreadable {
                path: path.to_path_buf(),
                message: err.to_string(),
            });
        }
    };

    match parse_roster(&contents) {
        Ok(serials) => RosterLoad::Loaded(serials),
        Err(message) => RosterLoad::Degraded(RosterUnavailable::Malformed {
            path: path.to_path_buf(),
            message,
        }),
    }
}

pub(crate) fn parse_roster(contents: &str) -> Result<Vec<DeviceSerial>, String> {
    let trimmed = contents.trim();
    let raw: Vec<String> = if trimmed.starts_with('[') {
        serde_json::from_str(trimmed).map_err(|err| err.to_string())?
    } else {
        trimmed.lines().map(str::to_owned).collect()
    };

    Ok(raw
        .into_iter()
        .map(|serial| serial.trim().to_owned())
        .filter(|serial| !serial.is_empty() && serial != ERROR_PLACEHOLDER)
        .map(DeviceSerial::from)
        .collect())
}
