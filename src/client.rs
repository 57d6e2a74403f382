// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The device client: session owner and reading producer.

use crate::catalog::{Catalog, DeviceDescriptor};
use crate::device::{self, DeviceSnapshot};
use crate::error::{Error, ParseError, Result};
use crate::protocol::DeviceSource;
use crate::session::{Credentials, Session};

#[cfg(feature = "http")]
use crate::protocol::{HttpConfig, HttpSource};

/// Client for one Mac Volt account.
///
/// The client owns its [`Session`]; all mutation goes through `&mut self`,
/// so a single owner (usually a [`Coordinator`](crate::Coordinator))
/// serializes connects and polls.
///
/// # Examples
///
/// ```
/// use macvolt_lib::{Credentials, DeviceClient};
/// use macvolt_lib::protocol::StaticSource;
///
/// # async fn example() -> macvolt_lib::Result<()> {
/// let mut client = DeviceClient::new(StaticSource::new(), Credentials::new("jane.doe", "pw"));
/// client.connect().await?;
///
/// let devices = client.get_devices().await?;
/// assert_eq!(devices.len(), 8);
/// assert_eq!(devices[0].unique_id, "jane_doe_T1");
///
/// client.disconnect();
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct DeviceClient<S> {
    source: S,
    credentials: Credentials,
    catalog: Catalog,
    session: Session,
}

#[cfg(feature = "http")]
impl DeviceClient<HttpSource> {
    /// Creates a client for the Mac Volt cloud.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP configuration is invalid.
    pub fn http(config: HttpConfig, credentials: Credentials) -> Result<Self> {
        Ok(Self::new(config.into_source()?, credentials))
    }
}

impl<S: DeviceSource> DeviceClient<S> {
    /// Creates a disconnected client using the default catalog.
    #[must_use]
    pub fn new(source: S, credentials: Credentials) -> Self {
        Self {
            source,
            credentials,
            catalog: Catalog::default(),
            session: Session::new(),
        }
    }

    /// Replaces the descriptor catalog.
    #[must_use]
    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Returns the controller name used to namespace unique ids.
    #[must_use]
    pub fn controller_name(&self) -> String {
        self.credentials.controller_name()
    }

    /// Returns the credentials.
    #[must_use]
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Returns the descriptor catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Returns the session state.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Returns the device source.
    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Returns true if the last connect succeeded and the session is alive.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.session.is_connected()
    }

    /// Returns the unique id of `descriptor` for this account.
    #[must_use]
    pub fn unique_id(&self, descriptor: &DeviceDescriptor) -> String {
        device::unique_id(&self.controller_name(), descriptor)
    }

    /// Returns the display name of `descriptor`.
    #[must_use]
    pub fn device_name(&self, descriptor: &DeviceDescriptor) -> String {
        descriptor.display_name()
    }

    /// Logs in and stores the new tokens.
    ///
    /// A successful call replaces any previously stored tokens. A failed call
    /// leaves the client disconnected.
    ///
    /// # Errors
    ///
    /// Returns `Error::Auth` if the credentials are refused, `Error::Transport`
    /// or `Error::Parse` if the login call itself fails.
    pub async fn connect(&mut self) -> Result<()> {
        tracing::info!(controller = %self.controller_name(), "Connecting");

        match self.source.login(&self.credentials).await {
            Ok(tokens) => {
                self.session.establish(tokens);
                tracing::info!(controller = %self.controller_name(), "Login successful");
                Ok(())
            }
            Err(e) => {
                self.session.clear();
                tracing::warn!(controller = %self.controller_name(), error = %e, "Login failed");
                Err(e)
            }
        }
    }

    /// Drops the session. No revocation call is made. Idempotent.
    pub fn disconnect(&mut self) {
        if self.session.is_connected() {
            tracing::info!(controller = %self.controller_name(), "Disconnecting");
        }
        self.session.clear();
    }

    /// Reads every device in the catalog.
    ///
    /// If the source refuses the session, the client disconnects so that the
    /// next refresh logs in again.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotConnected` without a session, otherwise any error
    /// reported by the source.
    pub async fn get_devices(&mut self) -> Result<Vec<DeviceSnapshot>> {
        let Some(tokens) = self.session.tokens() else {
            return Err(Error::NotConnected);
        };

        tracing::debug!(devices = self.catalog.len(), "Reading devices");

        let readings = match self.source.read_values(tokens, &self.catalog).await {
            Ok(readings) => readings,
            Err(e) => {
                if e.is_auth() {
                    tracing::warn!(error = %e, "Session refused, dropping it");
                    self.session.clear();
                }
                return Err(e);
            }
        };

        if readings.values.len() != self.catalog.len() {
            return Err(ParseError::UnexpectedFormat {
                body: format!(
                    "expected {} readings, got {}",
                    self.catalog.len(),
                    readings.values.len()
                ),
            }
            .into());
        }

        let controller = self.controller_name();
        let devices = self
            .catalog
            .iter()
            .zip(readings.values)
            .map(|(descriptor, value)| {
                if value.matches_type(descriptor.device_type) {
                    Ok(DeviceSnapshot::new(&controller, *descriptor, value))
                } else {
                    Err(ParseError::InvalidValue {
                        field: descriptor.code(),
                        message: format!("{value} is not a {} reading", descriptor.device_type),
                    })
                }
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        if !readings.systems.is_empty() {
            self.session.set_systems(readings.systems);
        }

        Ok(devices)
    }
}
