// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Simulated device source producing random readings.

use std::ops::RangeInclusive;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::catalog::Catalog;
use crate::error::Result;
use crate::protocol::{DeviceSource, Readings};
use crate::session::{Credentials, SessionTokens};
use crate::types::{DeviceType, DeviceValue};

/// Range of simulated temperature readings.
pub const TEMPERATURE_RANGE: RangeInclusive<i64> = 15..=28;

/// Range of simulated readings for other sensors.
pub const OTHER_RANGE: RangeInclusive<i64> = 1..=10;

/// A source that accepts any login and draws readings at random.
///
/// Door sensors are open or closed with equal probability, temperatures fall
/// in [`TEMPERATURE_RANGE`] and other sensors in [`OTHER_RANGE`]. The random
/// generator is injected, so tests can use a seeded one.
///
/// # Examples
///
/// ```
/// use macvolt_lib::protocol::SimulatedSource;
///
/// // Reproducible readings
/// let source = SimulatedSource::seeded(42);
/// ```
#[derive(Debug)]
pub struct SimulatedSource<R = StdRng> {
    rng: Mutex<R>,
}

impl SimulatedSource<StdRng> {
    /// Creates a source seeded from the operating system.
    #[must_use]
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    /// Creates a source with a fixed seed.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl Default for SimulatedSource<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> SimulatedSource<R> {
    /// Creates a source drawing from `rng`.
    #[must_use]
    pub fn with_rng(rng: R) -> Self {
        Self {
            rng: Mutex::new(rng),
        }
    }

    /// Draws one reading for a device of `device_type`.
    #[must_use]
    pub fn sample(&self, device_type: DeviceType) -> DeviceValue {
        let mut rng = self.rng.lock();
        match device_type {
            DeviceType::DoorSensor => DeviceValue::Bool(rng.random_bool(0.5)),
            DeviceType::TempSensor => DeviceValue::Int(rng.random_range(TEMPERATURE_RANGE)),
            DeviceType::Other => DeviceValue::Int(rng.random_range(OTHER_RANGE)),
        }
    }
}

impl<R: Rng + Send> DeviceSource for SimulatedSource<R> {
    async fn login(&self, credentials: &Credentials) -> Result<SessionTokens> {
        tracing::debug!(username = credentials.username(), "Simulated login");
        Ok(SessionTokens::new(
            format!("simulated-{}", credentials.controller_name()),
            "simulated-refresh",
        ))
    }

    async fn read_values(&self, _tokens: &SessionTokens, catalog: &Catalog) -> Result<Readings> {
        Ok(Readings::new(
            catalog.iter().map(|d| self.sample(d.device_type)).collect(),
        ))
    }
}
