// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The descriptor catalog: which devices the integration knows about.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::DeviceType;

/// Static identity of a device: a numeric id plus its type.
///
/// Ids are only unique per type; `T1` and `D1` are different devices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceDescriptor {
    /// Numeric id within the device type.
    pub id: u32,
    /// Device type.
    #[serde(rename = "type")]
    pub device_type: DeviceType,
}

impl DeviceDescriptor {
    /// Creates a new descriptor.
    #[must_use]
    pub const fn new(id: u32, device_type: DeviceType) -> Self {
        Self { id, device_type }
    }

    /// Returns the reading code, e.g. `T1` or `D3`.
    #[must_use]
    pub fn code(&self) -> String {
        format!("{}{}", self.device_type.code_letter(), self.id)
    }

    /// Returns the display name, e.g. `TempSensor1`.
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{}{}", self.device_type.name_prefix(), self.id)
    }
}

impl fmt::Display for DeviceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.device_type.code_letter(), self.id)
    }
}

/// Devices shipped with the integration.
const DEFAULT_DESCRIPTORS: [DeviceDescriptor; 8] = [
    DeviceDescriptor::new(1, DeviceType::TempSensor),
    DeviceDescriptor::new(2, DeviceType::TempSensor),
    DeviceDescriptor::new(3, DeviceType::TempSensor),
    DeviceDescriptor::new(4, DeviceType::TempSensor),
    DeviceDescriptor::new(1, DeviceType::DoorSensor),
    DeviceDescriptor::new(2, DeviceType::DoorSensor),
    DeviceDescriptor::new(3, DeviceType::DoorSensor),
    DeviceDescriptor::new(4, DeviceType::DoorSensor),
];

/// An ordered list of distinct device descriptors.
///
/// # Examples
///
/// ```
/// use macvolt_lib::catalog::{Catalog, DeviceDescriptor};
/// use macvolt_lib::types::DeviceType;
///
/// let catalog = Catalog::default();
/// assert_eq!(catalog.len(), 8);
///
/// let custom = Catalog::new(vec![
///     DeviceDescriptor::new(1, DeviceType::Other),
///     DeviceDescriptor::new(1, DeviceType::Other),
/// ]);
/// assert!(custom.is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    descriptors: Vec<DeviceDescriptor>,
}

impl Catalog {
    /// Creates a catalog from a list of descriptors.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Empty` if the list is empty and
    /// `ConfigError::Invalid` if it contains the same descriptor twice.
    pub fn new(descriptors: Vec<DeviceDescriptor>) -> Result<Self, ConfigError> {
        if descriptors.is_empty() {
            return Err(ConfigError::Empty("catalog"));
        }

        let mut seen = HashSet::with_capacity(descriptors.len());
        for descriptor in &descriptors {
            if !seen.insert(*descriptor) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate device descriptor {descriptor}"
                )));
            }
        }

        Ok(Self { descriptors })
    }

    /// Returns the descriptors in catalog order.
    #[must_use]
    pub fn descriptors(&self) -> &[DeviceDescriptor] {
        &self.descriptors
    }

    /// Returns an iterator over the descriptors.
    pub fn iter(&self) -> std::slice::Iter<'_, DeviceDescriptor> {
        self.descriptors.iter()
    }

    /// Returns the number of descriptors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Returns true if the catalog has no descriptors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            descriptors: DEFAULT_DESCRIPTORS.to_vec(),
        }
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a DeviceDescriptor;
    type IntoIter = std::slice::Iter<'a, DeviceDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
