// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device kinds known to the Mac Volt integration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// The kind of a device, which decides the shape of its reading.
///
/// # Examples
///
/// ```
/// use macvolt_lib::types::DeviceType;
///
/// assert_eq!(DeviceType::TempSensor.as_str(), "temp_sensor");
/// assert_eq!(DeviceType::DoorSensor.code_letter(), 'D');
/// assert_eq!("other".parse::<DeviceType>().unwrap(), DeviceType::Other);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceType {
    /// Temperature sensor, reports an integer in degrees.
    TempSensor,
    /// Door contact, reports open/closed as a boolean.
    DoorSensor,
    /// Any other sensor, reports a small integer.
    Other,
}

impl DeviceType {
    /// All device types, in declaration order.
    pub const ALL: [Self; 3] = [Self::TempSensor, Self::DoorSensor, Self::Other];

    /// Returns the wire name of the type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::TempSensor => "temp_sensor",
            Self::DoorSensor => "door_sensor",
            Self::Other => "other",
        }
    }

    /// Returns the letter used in unique ids and reading codes.
    #[must_use]
    pub const fn code_letter(&self) -> char {
        match self {
            Self::TempSensor => 'T',
            Self::DoorSensor => 'D',
            Self::Other => 'Z',
        }
    }

    /// Returns the prefix used for display names.
    #[must_use]
    pub const fn name_prefix(&self) -> &'static str {
        match self {
            Self::TempSensor => "TempSensor",
            Self::DoorSensor => "DoorSensor",
            Self::Other => "OtherSensor",
        }
    }

    /// Returns true if readings of this type are booleans.
    #[must_use]
    pub const fn is_binary(&self) -> bool {
        matches!(self, Self::DoorSensor)
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseError::InvalidValue {
                field: "device_type".to_string(),
                message: format!("unknown device type '{s}'"),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_type_as_str() {
        assert_eq!(DeviceType::TempSensor.as_str(), "temp_sensor");
        assert_eq!(DeviceType::DoorSensor.as_str(), "door_sensor");
        assert_eq!(DeviceType::Other.as_str(), "other");
    }

    #[test]
    fn device_type_from_str() {
        assert_eq!(
            "temp_sensor".parse::<DeviceType>().unwrap(),
            DeviceType::TempSensor
        );
        assert_eq!(
            "DOOR_SENSOR".parse::<DeviceType>().unwrap(),
            DeviceType::DoorSensor
        );
        assert!(matches!(
            "window".parse::<DeviceType>(),
            Err(ParseError::InvalidValue { .. })
        ));
    }

    #[test]
    fn code_letters_are_distinct() {
        let letters: Vec<char> = DeviceType::ALL.iter().map(DeviceType::code_letter).collect();
        assert_eq!(letters, vec!['T', 'D', 'Z']);
    }

    #[test]
    fn serde_uses_wire_names() {
        let json = serde_json::to_string(&DeviceType::DoorSensor).unwrap();
        assert_eq!(json, "\"door_sensor\"");
        let parsed: DeviceType = serde_json::from_str("\"temp_sensor\"").unwrap();
        assert_eq!(parsed, DeviceType::TempSensor);
    }

    #[test]
    fn only_door_sensors_are_binary() {
        assert!(DeviceType::DoorSensor.is_binary());
        assert!(!DeviceType::TempSensor.is_binary());
        assert!(!DeviceType::Other.is_binary());
    }
}
