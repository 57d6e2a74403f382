// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device readings produced by one poll.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::DeviceDescriptor;
use crate::types::{DeviceType, DeviceValue};

/// Builds the unique id of a device for a controller.
///
/// The id is `<controller>_<code>`, e.g. `john_doe_T1`.
#[must_use]
pub fn unique_id(controller_name: &str, descriptor: &DeviceDescriptor) -> String {
    format!("{controller_name}_{}", descriptor.code())
}

/// The reading of one device at the time of a poll.
///
/// # Examples
///
/// ```
/// use macvolt_lib::catalog::DeviceDescriptor;
/// use macvolt_lib::device::DeviceSnapshot;
/// use macvolt_lib::types::{DeviceType, DeviceValue};
///
/// let descriptor = DeviceDescriptor::new(2, DeviceType::TempSensor);
/// let device = DeviceSnapshot::new("john_doe", descriptor, DeviceValue::Int(21));
/// assert_eq!(device.unique_id, "john_doe_T2");
/// assert_eq!(device.name, "TempSensor2");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSnapshot {
    /// Numeric id within the device type.
    pub device_id: u32,
    /// Stable unique id, namespaced by the controller name.
    pub unique_id: String,
    /// Device type.
    pub device_type: DeviceType,
    /// Display name.
    pub name: String,
    /// Current reading.
    pub value: DeviceValue,
}

impl DeviceSnapshot {
    /// Creates a snapshot for `descriptor` owned by `controller_name`.
    #[must_use]
    pub fn new(controller_name: &str, descriptor: DeviceDescriptor, value: DeviceValue) -> Self {
        Self {
            device_id: descriptor.id,
            unique_id: unique_id(controller_name, &descriptor),
            device_type: descriptor.device_type,
            name: descriptor.display_name(),
            value,
        }
    }

    /// Returns the descriptor this reading belongs to.
    #[must_use]
    pub fn descriptor(&self) -> DeviceDescriptor {
        DeviceDescriptor::new(self.device_id, self.device_type)
    }
}

/// All readings from one successful refresh.
///
/// Shared with consumers as `Arc<Snapshot>` and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Refresh counter, starting at 1.
    pub sequence: u64,
    /// When the readings were taken.
    pub taken_at: DateTime<Utc>,
    /// Readings in catalog order.
    pub devices: Vec<DeviceSnapshot>,
}

impl Snapshot {
    /// Creates a snapshot taken now.
    #[must_use]
    pub fn new(sequence: u64, devices: Vec<DeviceSnapshot>) -> Self {
        Self {
            sequence,
            taken_at: Utc::now(),
            devices,
        }
    }

    /// Looks up a device by unique id.
    #[must_use]
    pub fn get(&self, unique_id: &str) -> Option<&DeviceSnapshot> {
        self.devices.iter().find(|d| d.unique_id == unique_id)
    }

    /// Returns the number of devices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    /// Returns true if the snapshot holds no devices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}
