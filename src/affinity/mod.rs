//! Device affinity resolution.
//!
//! Shard indices are positions in a sorted device list. When a persisted
//! roster of every device seen across runs is available that list comes from
//! the roster, so a shard keeps landing on the same physical device even when
//! some devices are offline. Otherwise the currently active devices are used
//! and affinity only holds while the fleet is unchanged.

use camino::Utf8Path;
use tracing::{error, warn};

use crate::device::{ActiveDevices, DeviceSerial};

mod roster;

pub use roster::{RosterLoad, RosterUnavailable, load_roster};

/// Where the resolved ordering came from.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DeviceSource {
    /// The known-devices roster.
    Roster,
    /// The active device set, because the roster could not be used.
    ActiveFallback(RosterUnavailable),
}

/// Sorted device ordering used to assign shard indices.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ResolvedDevices {
    devices: Vec<DeviceSerial>,
    source: DeviceSource,
}

impl ResolvedDevices {
    fn sorted(mut devices: Vec<DeviceSerial>, source: DeviceSource) -> Self {
        devices.sort();
        devices.dedup();
        Self { devices, source }
    }

    /// Devices in shard order.
    #[must_use]
    pub fn as_slice(&self) -> &[DeviceSerial] {
        &self.devices
    }

    /// Number of resolved devices, which is also the shard count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    /// Returns `true` when no device could be resolved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Iterates `(shard_index, device)` pairs.
    pub fn shards(&self) -> impl Iterator<Item = (usize, &DeviceSerial)> {
        self.devices.iter().enumerate()
    }

    /// Shard index assigned to `serial`, if it is part of the ordering.
    #[must_use]
    pub fn shard_index_of(&self, serial: &DeviceSerial) -> Option<usize> {
        self.devices.binary_search(serial).ok()
    }

    /// Reports whether the ordering came from the roster.
    #[must_use]
    pub const fn source(&self) -> &DeviceSource {
        &self.source
    }
}

/// Resolves the device ordering from the active set and an optional roster.
///
/// Roster problems never fail resolution: they are logged and the active set
/// is used instead.
#[must_use]
pub fn resolve_devices(active: &ActiveDevices, roster_path: Option<&Utf8Path>) -> ResolvedDevices {
    let Some(path) = roster_path else {
        warn!(
            "known devices file path not provided; device affinity will not be stable across runs"
        );
        return fall_back(active, RosterUnavailable::NotConfigured);
    };

    match load_roster(path) {
        RosterLoad::Loaded(serials) if serials.is_empty() && !active.is_empty() => {
            warn!(path = %path, "known devices file is empty; falling back to active devices");
            fall_back(
                active,
                RosterUnavailable::Empty {
                    path: path.to_path_buf(),
                },
            )
        }
        RosterLoad::Loaded(serials) => ResolvedDevices::sorted(serials, DeviceSource::Roster),
        RosterLoad::Degraded(reason) => {
            error!(path = %path, reason = %reason, "unable to load known devices file");
            fall_back(active, reason)
        }
    }
}

fn fall_back(active: &ActiveDevices, reason: RosterUnavailable) -> ResolvedDevices {
    ResolvedDevices::sorted(
        active.iter().cloned().collect(),
        DeviceSource::ActiveFallback(reason),
    )
}
