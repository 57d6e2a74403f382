// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Deterministic device source.

use crate::catalog::Catalog;
use crate::error::{AuthError, Result};
use crate::protocol::{DeviceSource, Readings};
use crate::session::{Credentials, SessionTokens};
use crate::types::{DeviceType, DeviceValue};

/// A source that reports the same value for every device of a type.
///
/// # Examples
///
/// ```
/// use macvolt_lib::protocol::StaticSource;
///
/// let source = StaticSource::new()
///     .with_temperature(19)
///     .with_door_open(true);
/// ```
#[derive(Debug, Clone)]
pub struct StaticSource {
    temperature: i64,
    door_open: bool,
    other: i64,
    reject_logins: bool,
}

impl StaticSource {
    /// Default temperature reading.
    pub const DEFAULT_TEMPERATURE: i64 = 21;
    /// Default reading for other sensors.
    pub const DEFAULT_OTHER: i64 = 5;

    /// Creates a source with default readings that accepts any login.
    #[must_use]
    pub fn new() -> Self {
        Self {
            temperature: Self::DEFAULT_TEMPERATURE,
            door_open: false,
            other: Self::DEFAULT_OTHER,
            reject_logins: false,
        }
    }

    /// Sets the temperature reading.
    #[must_use]
    pub fn with_temperature(mut self, temperature: i64) -> Self {
        self.temperature = temperature;
        self
    }

    /// Sets the door sensor reading.
    #[must_use]
    pub fn with_door_open(mut self, open: bool) -> Self {
        self.door_open = open;
        self
    }

    /// Sets the reading of other sensors.
    #[must_use]
    pub fn with_other(mut self, value: i64) -> Self {
        self.other = value;
        self
    }

    /// Makes every login fail with invalid credentials.
    #[must_use]
    pub fn rejecting_logins(mut self) -> Self {
        self.reject_logins = true;
        self
    }

    /// Returns the value reported for `device_type`.
    #[must_use]
    pub fn value_for(&self, device_type: DeviceType) -> DeviceValue {
        match device_type {
            DeviceType::TempSensor => DeviceValue::Int(self.temperature),
            DeviceType::DoorSensor => DeviceValue::Bool(self.door_open),
            DeviceType::Other => DeviceValue::Int(self.other),
        }
    }
}

impl Default for StaticSource {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceSource for StaticSource {
    async fn login(&self, credentials: &Credentials) -> Result<SessionTokens> {
        if self.reject_logins {
            return Err(AuthError::InvalidCredentials {
                code: 401,
                message: None,
            }
            .into());
        }
        Ok(SessionTokens::new(
            format!("static-{}", credentials.controller_name()),
            "static-refresh",
        ))
    }

    async fn read_values(&self, _tokens: &SessionTokens, catalog: &Catalog) -> Result<Readings> {
        Ok(Readings::new(
            catalog
                .iter()
                .map(|d| self.value_for(d.device_type))
                .collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reads_configured_values() {
        let source = StaticSource::new().with_temperature(17).with_door_open(true);
        let tokens = source.login(&Credentials::new("u", "p")).await.unwrap();
        let readings = source.read_values(&tokens, &Catalog::default()).await.unwrap();

        assert_eq!(readings.values.len(), 8);
        assert_eq!(readings.values[0], DeviceValue::Int(17));
        assert_eq!(readings.values[7], DeviceValue::Bool(true));
    }

    #[tokio::test]
    async fn rejects_logins_when_asked() {
        let source = StaticSource::new().rejecting_logins();
        let err = source.login(&Credentials::new("u", "p")).await.unwrap_err();
        assert!(err.is_auth());
    }
}
