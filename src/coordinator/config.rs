// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Coordinator configuration.

use std::time::Duration;

/// What to do with the published snapshot when refreshes fail after the
/// first success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StalePolicy {
    /// Keep serving the last good snapshot indefinitely.
    #[default]
    KeepLastGood,
    /// Withdraw the snapshot once `after` consecutive refreshes have failed.
    MarkUnavailable {
        /// Failures tolerated before the snapshot is withdrawn (at least 1).
        after: u32,
    },
}

impl StalePolicy {
    /// Returns true if the snapshot must be withdrawn after `failures`
    /// consecutive failures.
    #[must_use]
    pub fn withdraws_after(&self, failures: u32) -> bool {
        match self {
            Self::KeepLastGood => false,
            Self::MarkUnavailable { after } => failures >= (*after).max(1),
        }
    }
}

/// Configuration for a [`Coordinator`](crate::Coordinator).
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use macvolt_lib::{CoordinatorConfig, StalePolicy};
///
/// let config = CoordinatorConfig::new()
///     .with_poll_interval(Duration::from_secs(30))
///     .with_refresh_timeout(Duration::from_secs(10))
///     .with_stale_policy(StalePolicy::MarkUnavailable { after: 3 });
///
/// assert_eq!(config.poll_interval(), Duration::from_secs(30));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinatorConfig {
    poll_interval: Duration,
    refresh_timeout: Duration,
    stale_policy: StalePolicy,
}

impl CoordinatorConfig {
    /// Default polling interval.
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);
    /// Default bound on a whole refresh (login plus listing).
    pub const DEFAULT_REFRESH_TIMEOUT: Duration = Duration::from_secs(30);

    /// Creates a configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the polling interval. Zero is raised to one millisecond.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval.max(Duration::from_millis(1));
        self
    }

    /// Sets the bound on a whole refresh.
    #[must_use]
    pub fn with_refresh_timeout(mut self, timeout: Duration) -> Self {
        self.refresh_timeout = timeout;
        self
    }

    /// Sets the stale-data policy.
    #[must_use]
    pub fn with_stale_policy(mut self, policy: StalePolicy) -> Self {
        self.stale_policy = policy;
        self
    }

    /// Returns the polling interval.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Returns the bound on a whole refresh.
    #[must_use]
    pub fn refresh_timeout(&self) -> Duration {
        self.refresh_timeout
    }

    /// Returns the stale-data policy.
    #[must_use]
    pub fn stale_policy(&self) -> StalePolicy {
        self.stale_policy
    }
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
            refresh_timeout: Self::DEFAULT_REFRESH_TIMEOUT,
            stale_policy: StalePolicy::default(),
        }
    }
}
