// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the Mac Volt library.
//!
//! Failures are split by where they happen: the vendor refusing the
//! credentials or session ([`AuthError`]), the transport failing before a
//! usable answer arrives ([`TransportError`]), and an answer that cannot be
//! understood ([`ParseError`]). The coordinator adds its own readiness
//! conditions on top.

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// The vendor rejected the credentials or the session token.
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// The request did not complete (network, TLS, timeout, HTTP status).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The response could not be interpreted.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// The configuration entry is invalid.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The client has no active session.
    #[error("client is not connected")]
    NotConnected,

    /// The first refresh failed; the host should retry setup later.
    #[error("coordinator not ready: {0}")]
    NotReady(#[source] Box<Error>),

    /// The published snapshot was withdrawn after repeated refresh failures.
    #[error("data unavailable after {consecutive_failures} consecutive refresh failures")]
    Unavailable {
        /// Number of failed refreshes since the last success.
        consecutive_failures: u32,
    },
}

impl Error {
    /// Returns true if this error (or the cause of a not-ready error) is an
    /// authentication failure.
    #[must_use]
    pub fn is_auth(&self) -> bool {
        match self {
            Self::Auth(_) => true,
            Self::NotReady(inner) => inner.is_auth(),
            _ => false,
        }
    }

    /// Returns true if this error (or the cause of a not-ready error) is a
    /// transport failure.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::NotReady(inner) => inner.is_transport(),
            _ => false,
        }
    }
}

/// Errors reported by the vendor about credentials or sessions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Login was refused.
    #[error("invalid username or password (code {code}{})", fmt_message(.message))]
    InvalidCredentials {
        /// Application-level code from the response envelope, or the HTTP status.
        code: i64,
        /// Message returned by the vendor, if any.
        message: Option<String>,
    },

    /// A request made with the stored token was refused.
    #[error("session token rejected (code {code})")]
    SessionRejected {
        /// Application-level code from the response envelope, or the HTTP status.
        code: i64,
    },
}

#[allow(clippy::ref_option)]
fn fmt_message(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|m| format!(": {m}"))
        .unwrap_or_default()
}

/// Errors that happen before a usable response is received.
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP request failed.
    #[cfg(feature = "http")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success HTTP status.
    #[error("HTTP {status}: {body}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// Request timed out.
    #[error("request timed out after {0} ms")]
    Timeout(u64),

    /// Invalid URL or address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),
}

/// Errors related to interpreting vendor responses.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Expected field is missing from the response.
    #[error("missing field in response: {0}")]
    MissingField(String),

    /// The body is not the expected envelope.
    #[error("unexpected response format: {body}")]
    UnexpectedFormat {
        /// Raw response body.
        body: String,
    },

    /// A field has the wrong shape or an unknown value.
    #[error("failed to parse {field}: {message}")]
    InvalidValue {
        /// The field that failed to parse.
        field: String,
        /// Description of the parsing failure.
        message: String,
    },
}

/// Errors in the host configuration entry.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required field is empty.
    #[error("{0} must not be empty")]
    Empty(&'static str),

    /// The polling interval is zero.
    #[error("scan interval must be at least one second")]
    ZeroInterval,

    /// The entry could not be deserialized.
    #[error("invalid entry data: {0}")]
    Invalid(String),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
