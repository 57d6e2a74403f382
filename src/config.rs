// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Host configuration entry.
//!
//! The host application stores one entry per account: credentials and a
//! scan interval. [`EntryConfig`] is that entry, deserialized from the host's
//! JSON and turned into the library's own types.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::coordinator::CoordinatorConfig;
use crate::error::ConfigError;
use crate::session::Credentials;

/// Scan interval used when the entry does not set one.
pub const DEFAULT_SCAN_INTERVAL_SECS: u64 = 60;

fn default_scan_interval() -> u64 {
    DEFAULT_SCAN_INTERVAL_SECS
}

/// A configuration entry supplied by the host.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use macvolt_lib::EntryConfig;
///
/// let entry = EntryConfig::from_json(r#"{"username": "a.b", "password": "pw"}"#).unwrap();
/// assert_eq!(entry.scan_interval(), Duration::from_secs(60));
/// assert_eq!(entry.credentials().controller_name(), "a_b");
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryConfig {
    /// Account username.
    pub username: String,
    /// Account password.
    pub password: String,
    /// Seconds between refreshes.
    #[serde(default = "default_scan_interval", alias = "scan_interval")]
    pub scan_interval_secs: u64,
}

impl EntryConfig {
    /// Creates an entry with the default scan interval.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            scan_interval_secs: DEFAULT_SCAN_INTERVAL_SECS,
        }
    }

    /// Sets the scan interval in seconds.
    #[must_use]
    pub fn with_scan_interval_secs(mut self, secs: u64) -> Self {
        self.scan_interval_secs = secs;
        self
    }

    /// Parses and validates an entry from JSON.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` for malformed JSON, otherwise any
    /// error from [`validate`](Self::validate).
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let entry: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Invalid(e.to_string()))?;
        entry.validate()?;
        Ok(entry)
    }

    /// Checks that the entry can be used.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Empty` for an empty username or password and
    /// `ConfigError::ZeroInterval` for a zero scan interval.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.username.trim().is_empty() {
            return Err(ConfigError::Empty("username"));
        }
        if self.password.is_empty() {
            return Err(ConfigError::Empty("password"));
        }
        if self.scan_interval_secs == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        Ok(())
    }

    /// Returns the scan interval.
    #[must_use]
    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.scan_interval_secs)
    }

    /// Returns the account credentials.
    #[must_use]
    pub fn credentials(&self) -> Credentials {
        Credentials::new(&self.username, &self.password)
    }

    /// Returns a coordinator configuration polling at the scan interval.
    #[must_use]
    pub fn coordinator_config(&self) -> CoordinatorConfig {
        CoordinatorConfig::new().with_poll_interval(self.scan_interval())
    }
}

impl fmt::Debug for EntryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryConfig")
            .field("username", &self.username)
            .field("password", &"***")
            .field("scan_interval_secs", &self.scan_interval_secs)
            .finish()
    }
}
