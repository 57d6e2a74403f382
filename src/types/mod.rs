// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for Mac Volt devices.
//!
//! # Types
//!
//! - [`DeviceType`] - Temperature sensor, door sensor or other
//! - [`DeviceValue`] - A boolean or integer reading

mod device_type;
mod device_value;

pub use device_type::DeviceType;
pub use device_value::DeviceValue;
