// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sources of device readings.
//!
//! The [`DeviceClient`](crate::DeviceClient) never talks to the network
//! itself. It asks a [`DeviceSource`] to log in and to read the values of
//! the catalog, so the same client works against the vendor cloud, a
//! simulation, or a fixed test fixture.
//!
//! # Sources
//!
//! - [`HttpSource`]: the Mac Volt cloud API (feature `http`)
//! - [`SimulatedSource`]: random readings from a seedable generator (feature `simulation`)
//! - [`StaticSource`]: fixed readings, optionally refusing logins

mod fixed;
#[cfg(feature = "http")]
mod http;
#[cfg(feature = "simulation")]
mod simulated;

pub use fixed::StaticSource;
#[cfg(feature = "http")]
pub use http::{HttpConfig, HttpSource};
#[cfg(feature = "simulation")]
pub use simulated::{OTHER_RANGE, SimulatedSource, TEMPERATURE_RANGE};

use std::future::Future;

use crate::catalog::Catalog;
use crate::error::Result;
use crate::session::{Credentials, SessionTokens};
use crate::types::DeviceValue;

/// Values read for a catalog in one call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Readings {
    /// One value per catalog descriptor, in catalog order.
    pub values: Vec<DeviceValue>,
    /// System serial numbers reported alongside the values, if any.
    pub systems: Vec<String>,
}

impl Readings {
    /// Creates readings without system information.
    #[must_use]
    pub fn new(values: Vec<DeviceValue>) -> Self {
        Self {
            values,
            systems: Vec::new(),
        }
    }
}

/// A backend that can authenticate and report device values.
///
/// Implementations may write `async fn` for both methods; the returned
/// futures must be `Send` so a coordinator can poll from a spawned task.
pub trait DeviceSource: Send + Sync {
    /// Authenticates and returns a fresh token pair.
    ///
    /// # Errors
    ///
    /// Returns `Error::Auth` if the credentials are refused, `Error::Transport`
    /// if the request does not complete and `Error::Parse` if the answer is
    /// malformed.
    fn login(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<SessionTokens>> + Send;

    /// Reads the current value of every descriptor in `catalog`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Auth` if the session is refused, `Error::Transport`
    /// if the request does not complete and `Error::Parse` if a value is
    /// missing or has the wrong shape.
    fn read_values(
        &self,
        tokens: &SessionTokens,
        catalog: &Catalog,
    ) -> impl Future<Output = Result<Readings>> + Send;
}
