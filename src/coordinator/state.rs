// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Coordinator state.

use std::fmt;

/// Where a coordinator is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CoordinatorState {
    /// No refresh has run yet.
    #[default]
    Uninitialized,
    /// The first refresh failed; setup should be retried.
    NotReady,
    /// The last refresh succeeded.
    Ready,
    /// Recent refreshes failed; the last good snapshot is still published.
    Stale {
        /// Failures since the last success.
        consecutive_failures: u32,
    },
    /// Recent refreshes failed and the snapshot was withdrawn.
    Unavailable {
        /// Failures since the last success.
        consecutive_failures: u32,
    },
}

impl CoordinatorState {
    /// Returns true once a first refresh has succeeded, whatever happened since.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        !matches!(self, Self::Uninitialized | Self::NotReady)
    }

    /// Returns true if a snapshot is published in this state.
    #[must_use]
    pub fn has_data(&self) -> bool {
        matches!(self, Self::Ready | Self::Stale { .. })
    }

    /// Returns the failures since the last success.
    #[must_use]
    pub fn consecutive_failures(&self) -> u32 {
        match self {
            Self::Stale {
                consecutive_failures,
            }
            | Self::Unavailable {
                consecutive_failures,
            } => *consecutive_failures,
            _ => 0,
        }
    }
}

impl fmt::Display for CoordinatorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uninitialized => write!(f, "uninitialized"),
            Self::NotReady => write!(f, "not ready"),
            Self::Ready => write!(f, "ready"),
            Self::Stale {
                consecutive_failures,
            } => write!(f, "stale ({consecutive_failures} failures)"),
            Self::Unavailable {
                consecutive_failures,
            } => write!(f, "unavailable ({consecutive_failures} failures)"),
        }
    }
}
