// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Coordinator events.
//!
//! Besides the snapshot watch channel, the coordinator reports what each
//! refresh did through an [`EventBus`] backed by tokio's broadcast channel.
//!
//! # Examples
//!
//! ```
//! use macvolt_lib::event::{CoordinatorEvent, EventBus};
//!
//! let bus = EventBus::new();
//! let mut rx = bus.subscribe();
//!
//! bus.publish(CoordinatorEvent::Refreshed { sequence: 1, device_count: 8 });
//! ```

mod coordinator_event;
mod event_bus;

pub use coordinator_event::CoordinatorEvent;
pub use event_bus::EventBus;
