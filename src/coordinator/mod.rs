// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Periodic refresh of device readings.
//!
//! The [`Coordinator`] owns a [`DeviceClient`](crate::DeviceClient), polls it
//! on a fixed interval and publishes each successful result as an immutable
//! [`Snapshot`](crate::Snapshot). Consumers either read the latest snapshot
//! or watch for new ones.
//!
//! # Lifecycle
//!
//! ```text
//! Uninitialized ──first refresh ok──▶ Ready ◀──refresh ok── Stale / Unavailable
//!       │                              │
//!       └──first refresh fails──▶ NotReady   refresh fails ──▶ Stale / Unavailable
//! ```
//!
//! A failed first refresh returns [`Error::NotReady`](crate::Error::NotReady);
//! the host is expected to retry setup later. What happens to the published
//! snapshot after later failures is decided by the [`StalePolicy`].
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//! use macvolt_lib::{Coordinator, CoordinatorConfig, Credentials, DeviceClient};
//! use macvolt_lib::protocol::HttpConfig;
//!
//! #[tokio::main]
//! async fn main() -> macvolt_lib::Result<()> {
//!     let client = DeviceClient::http(HttpConfig::new(), Credentials::new("me@example.com", "pw"))?;
//!     let coordinator = Arc::new(Coordinator::new(client, CoordinatorConfig::default()));
//!
//!     let first = coordinator.first_refresh().await?;
//!     println!("{} devices", first.len());
//!
//!     let handle = Arc::clone(&coordinator).spawn();
//!     let mut updates = coordinator.subscribe();
//!     while updates.changed().await.is_ok() {
//!         if let Some(snapshot) = updates.borrow_and_update().clone() {
//!             println!("refresh #{}", snapshot.sequence);
//!         }
//!     }
//!     handle.shutdown().await;
//!     Ok(())
//! }
//! ```

mod config;
mod poll_coordinator;
mod state;

pub use config::{CoordinatorConfig, StalePolicy};
pub use poll_coordinator::{Coordinator, PollHandle};
pub use state::CoordinatorState;
