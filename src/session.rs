// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Credentials and session state owned by the device client.

use std::fmt;

/// Username and password for the vendor cloud.
///
/// `Debug` never prints the password.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    /// Creates a new set of credentials.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Returns the username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the password.
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Returns the controller name: the username with every `.` replaced by `_`.
    ///
    /// # Examples
    ///
    /// ```
    /// use macvolt_lib::session::Credentials;
    ///
    /// let creds = Credentials::new("john.doe@example.com", "secret");
    /// assert_eq!(creds.controller_name(), "john_doe@example_com");
    /// ```
    #[must_use]
    pub fn controller_name(&self) -> String {
        self.username.replace('.', "_")
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Tokens returned by a successful login.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionTokens {
    /// Opaque access token sent as the `Authorization` header.
    pub token: String,
    /// Refresh token. Stored but not rotated.
    pub refresh_token: String,
}

impl SessionTokens {
    /// Creates a token pair.
    #[must_use]
    pub fn new(token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            refresh_token: refresh_token.into(),
        }
    }
}

impl fmt::Debug for SessionTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionTokens")
            .field("token", &"***")
            .field("refresh_token", &"***")
            .finish()
    }
}

/// Mutable session state of a client.
///
/// Empty when created, filled by [`Session::establish`], cleared by
/// [`Session::clear`]. Only the client that owns it writes to it.
#[derive(Debug, Clone, Default)]
pub struct Session {
    tokens: Option<SessionTokens>,
    systems: Vec<String>,
}

impl Session {
    /// Creates an empty, disconnected session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the session holds tokens.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.tokens.is_some()
    }

    /// Returns the tokens, if connected.
    #[must_use]
    pub fn tokens(&self) -> Option<&SessionTokens> {
        self.tokens.as_ref()
    }

    /// Returns the access token, if connected.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.tokens.as_ref().map(|t| t.token.as_str())
    }

    /// Returns the refresh token, if connected.
    #[must_use]
    pub fn refresh_token(&self) -> Option<&str> {
        self.tokens.as_ref().map(|t| t.refresh_token.as_str())
    }

    /// Returns the system serial numbers seen in the last listing.
    #[must_use]
    pub fn systems(&self) -> &[String] {
        &self.systems
    }

    /// Stores the tokens of a successful login, replacing older ones.
    pub fn establish(&mut self, tokens: SessionTokens) {
        self.tokens = Some(tokens);
    }

    /// Records the system serial numbers reported by the vendor.
    pub fn set_systems(&mut self, systems: Vec<String>) {
        self.systems = systems;
    }

    /// Drops the tokens and known systems.
    pub fn clear(&mut self) {
        self.tokens = None;
        self.systems.clear();
    }
}
