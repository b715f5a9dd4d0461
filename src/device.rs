//! Device identifiers and the set of devices responding during a run.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Hardware serial identifying a single attached device.
///
/// Serials are opaque; ordering is lexicographic on the raw string so shard
/// assignment is stable across runs.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct DeviceSerial(String);

impl DeviceSerial {
    /// Wraps a raw serial string.
    #[must_use]
    pub fn new(serial: impl Into<String>) -> Self {
        Self(serial.into())
    }

    /// Returns the serial as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceSerial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeviceSerial {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for DeviceSerial {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Devices physically present and communicating at setup time.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ActiveDevices {
    serials: BTreeSet<DeviceSerial>,
}

impl ActiveDevices {
    /// Creates an empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            serials: BTreeSet::new(),
        }
    }

    /// Returns `true` when `serial` responded during this run.
    #[must_use]
    pub fn contains(&self, serial: &DeviceSerial) -> bool {
        self.serials.contains(serial)
    }

    /// Number of active devices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.serials.len()
    }

    /// Returns `true` when no device responded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.serials.is_empty()
    }

    /// Iterates serials in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &DeviceSerial> {
        self.serials.iter()
    }
}

impl<S: Into<DeviceSerial>> FromIterator<S> for ActiveDevices {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            serials: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ActiveDevices {
    type Item = &'a DeviceSerial;
    type IntoIter = std::collections::btree_set::Iter<'a, DeviceSerial>;

    fn into_iter(self) -> Self::IntoIter {
        self.serials.iter()
    }
}
