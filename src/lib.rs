// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `MacVolt` Lib - poll Mac Volt cloud devices and publish their readings.
//!
//! The library has two layers:
//!
//! - **[`DeviceClient`]**: logs in to the vendor cloud and reads temperature
//!   and door sensors through a pluggable [`DeviceSource`](protocol::DeviceSource)
//! - **[`Coordinator`]**: refreshes the client on a fixed interval and
//!   publishes each result as an immutable [`Snapshot`]
//!
//! # Quick Start
//!
//! ## Polling the cloud
//!
//! ```no_run
//! use std::sync::Arc;
//! use macvolt_lib::{Coordinator, DeviceClient, EntryConfig};
//! use macvolt_lib::protocol::HttpConfig;
//!
//! #[tokio::main]
//! async fn main() -> macvolt_lib::Result<()> {
//!     let entry = EntryConfig::from_json(r#"{"username": "me@example.com", "password": "pw"}"#)?;
//!     let client = DeviceClient::http(HttpConfig::new(), entry.credentials())?;
//!     let coordinator = Arc::new(Coordinator::new(client, entry.coordinator_config()));
//!
//!     // Fails with Error::NotReady if the account cannot be reached.
//!     let snapshot = coordinator.first_refresh().await?;
//!     for device in &snapshot.devices {
//!         println!("{} = {}", device.unique_id, device.value);
//!     }
//!
//!     let handle = Arc::clone(&coordinator).spawn();
//!     // ... hand coordinator.subscribe() to consumers ...
//!     handle.shutdown().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Simulated readings
//!
//! ```
//! use macvolt_lib::{Credentials, DeviceClient};
//! use macvolt_lib::protocol::SimulatedSource;
//!
//! # async fn example() -> macvolt_lib::Result<()> {
//! let mut client = DeviceClient::new(SimulatedSource::seeded(7), Credentials::new("demo", "demo"));
//! client.connect().await?;
//! let devices = client.get_devices().await?;
//! assert_eq!(devices.len(), 8);
//! # Ok(())
//! # }
//! ```

pub mod catalog;
mod client;
mod config;
pub mod coordinator;
pub mod device;
pub mod error;
pub mod event;
pub mod protocol;
pub mod session;
pub mod types;

pub use catalog::{Catalog, DeviceDescriptor};
pub use client::DeviceClient;
pub use config::{DEFAULT_SCAN_INTERVAL_SECS, EntryConfig};
pub use coordinator::{Coordinator, CoordinatorConfig, CoordinatorState, PollHandle, StalePolicy};
pub use device::{DeviceSnapshot, Snapshot};
pub use error::{AuthError, ConfigError, Error, ParseError, Result, TransportError};
pub use session::{Credentials, Session, SessionTokens};
pub use types::{DeviceType, DeviceValue};
