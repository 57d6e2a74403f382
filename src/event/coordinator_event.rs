// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Coordinator event types.

use crate::coordinator::CoordinatorState;

/// Events emitted by a [`Coordinator`](crate::Coordinator).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoordinatorEvent {
    /// A refresh succeeded and a new snapshot was published.
    Refreshed {
        /// Sequence number of the new snapshot.
        sequence: u64,
        /// Number of devices in it.
        device_count: usize,
    },

    /// A refresh failed.
    RefreshFailed {
        /// Rendered error.
        error: String,
        /// Failures since the last success, including this one.
        consecutive_failures: u32,
    },

    /// The coordinator moved to another state.
    StateChanged {
        /// Previous state.
        from: CoordinatorState,
        /// New state.
        to: CoordinatorState,
    },
}

impl CoordinatorEvent {
    /// Returns true for [`CoordinatorEvent::RefreshFailed`].
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::RefreshFailed { .. })
    }
}
