// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device reading values.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::DeviceType;

/// A single device reading.
///
/// Door sensors report [`DeviceValue::Bool`]; temperature and other sensors
/// report [`DeviceValue::Int`].
///
/// # Examples
///
/// ```
/// use macvolt_lib::types::{DeviceType, DeviceValue};
///
/// let open = DeviceValue::Bool(true);
/// assert!(open.matches_type(DeviceType::DoorSensor));
/// assert_eq!(open.as_bool(), Some(true));
///
/// let temp = DeviceValue::Int(21);
/// assert!(!temp.matches_type(DeviceType::DoorSensor));
/// assert_eq!(temp.as_int(), Some(21));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DeviceValue {
    /// Binary reading.
    Bool(bool),
    /// Integer reading.
    Int(i64),
}

impl DeviceValue {
    /// Returns the boolean reading, if this is one.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            Self::Int(_) => None,
        }
    }

    /// Returns the integer reading, if this is one.
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            Self::Bool(_) => None,
        }
    }

    /// Returns true if the value has the shape expected for `device_type`.
    #[must_use]
    pub const fn matches_type(&self, device_type: DeviceType) -> bool {
        match self {
            Self::Bool(_) => device_type.is_binary(),
            Self::Int(_) => !device_type.is_binary(),
        }
    }
}

impl fmt::Display for DeviceValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
        }
    }
}

impl From<bool> for DeviceValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for DeviceValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_matches_type() {
        assert!(DeviceValue::Bool(false).matches_type(DeviceType::DoorSensor));
        assert!(DeviceValue::Int(20).matches_type(DeviceType::TempSensor));
        assert!(DeviceValue::Int(3).matches_type(DeviceType::Other));
        assert!(!DeviceValue::Bool(true).matches_type(DeviceType::Other));
        assert!(!DeviceValue::Int(1).matches_type(DeviceType::DoorSensor));
    }

    #[test]
    fn deserializes_untagged() {
        let v: DeviceValue = serde_json::from_str("true").unwrap();
        assert_eq!(v, DeviceValue::Bool(true));
        let v: DeviceValue = serde_json::from_str("23").unwrap();
        assert_eq!(v, DeviceValue::Int(23));
        assert!(serde_json::from_str::<DeviceValue>("\"23\"").is_err());
    }

    #[test]
    fn display() {
        assert_eq!(DeviceValue::Bool(true).to_string(), "true");
        assert_eq!(DeviceValue::Int(-4).to_string(), "-4");
    }
}
