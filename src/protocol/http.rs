// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP source for the Mac Volt cloud API.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::catalog::{Catalog, DeviceDescriptor};
use crate::error::{AuthError, ParseError, Result, TransportError};
use crate::protocol::{DeviceSource, Readings};
use crate::session::{Credentials, SessionTokens};
use crate::types::DeviceValue;

const PATH_LOGIN: &str = "/usercenter/cloud/user/login";
const PATH_SYSTEM_LIST: &str = "/stable/home/getCustomMenuEssList";

/// Envelope `code` for a successful call.
const CODE_OK: i64 = 200;

const USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:146.0) Gecko/20100101 Firefox/146.0";
const PLATFORM: &str = "AK9D8H";
const SYSTEM: &str = "macvolt";
const LANGUAGE: &str = "en-US";

// ============================================================================
// HttpConfig
// ============================================================================

/// Configuration for the Mac Volt cloud API.
///
/// # Examples
///
/// ```
/// use macvolt_lib::protocol::HttpConfig;
/// use std::time::Duration;
///
/// let config = HttpConfig::new();
/// assert_eq!(config.base_url(), "https://monitor.macvolt.de/api");
///
/// let config = HttpConfig::new()
///     .with_base_url("http://127.0.0.1:8080/api")
///     .with_timeout(Duration::from_secs(5));
/// ```
#[derive(Debug, Clone)]
pub struct HttpConfig {
    base_url: String,
    timeout: Duration,
}

impl HttpConfig {
    /// Default API root.
    pub const DEFAULT_BASE_URL: &'static str = "https://monitor.macvolt.de/api";
    /// Default request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Creates a configuration for the public Mac Volt cloud.
    #[must_use]
    pub fn new() -> Self {
        Self {
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Sets the API root, e.g. a mock server in tests.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the API root.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Creates an `HttpSource` from this configuration.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::InvalidAddress` if the base URL is not an
    /// absolute `http`/`https` URL, or `TransportError::Http` if the HTTP
    /// client cannot be created.
    pub fn into_source(self) -> std::result::Result<HttpSource, TransportError> {
        let base = self.base_url.trim_end_matches('/').to_string();
        let url = Url::parse(&base)
            .map_err(|e| TransportError::InvalidAddress(format!("{base}: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(TransportError::InvalidAddress(format!(
                "{base}: unsupported scheme"
            )));
        }
        let origin = url.origin().ascii_serialization();

        let client = Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(TransportError::Http)?;

        Ok(HttpSource {
            base_url: base,
            origin,
            client,
            timeout: self.timeout,
        })
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Wire types
// ============================================================================

/// Response envelope shared by all vendor endpoints.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    code: i64,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    data: Value,
}

#[derive(Debug, Deserialize)]
struct LoginData {
    #[serde(default)]
    token: Option<String>,
    #[serde(default, rename = "refreshToken")]
    refresh_token: Option<String>,
}

// ============================================================================
// HttpSource
// ============================================================================

/// Device source backed by the Mac Volt cloud.
///
/// Logs in with `POST /usercenter/cloud/user/login` and lists the energy
/// storage systems of the account with `GET /stable/home/getCustomMenuEssList`.
/// Each system entry may carry readings keyed by descriptor code (`"T1": 21`,
/// `"D2": true`); the first entry holding a code supplies that device's value.
#[derive(Debug, Clone)]
pub struct HttpSource {
    base_url: String,
    origin: String,
    client: Client,
    timeout: Duration,
}

impl HttpSource {
    /// Creates a source for the public Mac Volt cloud with default settings.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn new() -> std::result::Result<Self, TransportError> {
        HttpConfig::new().into_source()
    }

    /// Returns the API root.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Adds the browser-like header set the vendor web app sends.
    ///
    /// `Accept-Encoding` is set by the client from its enabled decoders and
    /// `Connection` is managed by the connection pool.
    fn with_headers(&self, request: RequestBuilder) -> RequestBuilder {
        let operation_date = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        request
            .header("Accept", "application/json, text/plain, */*")
            .header("Accept-Language", "en-US,en;q=0.5")
            .header("platform", PLATFORM)
            .header("System", SYSTEM)
            .header("language", LANGUAGE)
            .header("operationDate", operation_date)
            .header("Origin", &self.origin)
            .header("Referer", format!("{}/login", self.origin))
            .header("Sec-Fetch-Dest", "empty")
            .header("Sec-Fetch-Mode", "cors")
            .header("Sec-Fetch-Site", "same-origin")
            .header("Priority", "u=0")
            .header("TE", "trailers")
    }

    /// Sends a request and returns the status with the raw body.
    async fn execute(&self, request: RequestBuilder) -> Result<(StatusCode, String)> {
        let response = request.send().await.map_err(|e| self.transport_error(e))?;
        let status = response.status();
        let body = response.text().await.map_err(|e| self.transport_error(e))?;

        tracing::debug!(status = status.as_u16(), body = %body, "Received HTTP response");

        Ok((status, body))
    }

    fn transport_error(&self, error: reqwest::Error) -> TransportError {
        if error.is_timeout() {
            TransportError::Timeout(u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX))
        } else {
            TransportError::Http(error)
        }
    }
}

/// Parses the envelope, or reports the raw body if it is not one.
fn parse_envelope(body: &str) -> std::result::Result<ApiResponse, ParseError> {
    serde_json::from_str(body).map_err(|_| ParseError::UnexpectedFormat {
        body: body.to_string(),
    })
}

fn non_empty(value: Option<String>, field: &str) -> std::result::Result<String, ParseError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ParseError::MissingField(field.to_string()))
}

/// Extracts the value of `descriptor` from the first system entry holding its code.
fn value_for(
    systems: &[Map<String, Value>],
    descriptor: &DeviceDescriptor,
) -> std::result::Result<DeviceValue, ParseError> {
    let code = descriptor.code();
    let raw = systems
        .iter()
        .find_map(|entry| entry.get(&code))
        .ok_or_else(|| ParseError::MissingField(code.clone()))?;

    let value = if descriptor.device_type.is_binary() {
        raw.as_bool().map(DeviceValue::Bool)
    } else {
        raw.as_i64().map(DeviceValue::Int)
    };

    value.ok_or_else(|| ParseError::InvalidValue {
        field: code,
        message: format!(
            "expected {} for {}, got {raw}",
            if descriptor.device_type.is_binary() {
                "boolean"
            } else {
                "integer"
            },
            descriptor.device_type
        ),
    })
}

impl DeviceSource for HttpSource {
    async fn login(&self, credentials: &Credentials) -> Result<SessionTokens> {
        let url = self.url(PATH_LOGIN);

        tracing::debug!(url = %url, username = credentials.username(), "Sending login request");

        let body = serde_json::json!({
            "username": credentials.username(),
            "password": credentials.password(),
        });
        let request = self.with_headers(self.client.post(&url)).json(&body);
        let (status, body) = self.execute(request).await?;

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(AuthError::InvalidCredentials {
                code: i64::from(status.as_u16()),
                message: None,
            }
            .into());
        }
        if !status.is_success() {
            return Err(TransportError::HttpStatus {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let envelope = parse_envelope(&body)?;
        if envelope.code != CODE_OK {
            return Err(AuthError::InvalidCredentials {
                code: envelope.code,
                message: envelope.msg,
            }
            .into());
        }

        let data: LoginData = serde_json::from_value(envelope.data)
            .map_err(|_| ParseError::MissingField("data".to_string()))?;

        Ok(SessionTokens {
            token: non_empty(data.token, "data.token")?,
            refresh_token: non_empty(data.refresh_token, "data.refreshToken")?,
        })
    }

    async fn read_values(&self, tokens: &SessionTokens, catalog: &Catalog) -> Result<Readings> {
        let url = self.url(PATH_SYSTEM_LIST);

        tracing::debug!(url = %url, "Requesting system list");

        let request = self
            .with_headers(self.client.get(&url))
            .header("Authorization", &tokens.token);
        let (status, body) = self.execute(request).await?;

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(AuthError::SessionRejected {
                code: i64::from(status.as_u16()),
            }
            .into());
        }
        if !status.is_success() {
            return Err(TransportError::HttpStatus {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let envelope = parse_envelope(&body)?;
        match envelope.code {
            CODE_OK => {}
            401 | 403 => {
                return Err(AuthError::SessionRejected {
                    code: envelope.code,
                }
                .into());
            }
            code => {
                return Err(ParseError::InvalidValue {
                    field: "code".to_string(),
                    message: format!(
                        "vendor returned code {code}: {}",
                        envelope.msg.unwrap_or_default()
                    ),
                }
                .into());
            }
        }

        let entries: Vec<Map<String, Value>> =
            serde_json::from_value(envelope.data).map_err(|e| ParseError::InvalidValue {
                field: "data".to_string(),
                message: e.to_string(),
            })?;

        let systems = entries
            .iter()
            .enumerate()
            .map(|(i, entry)| match entry.get("SystemSn") {
                Some(Value::String(sn)) => Ok(sn.clone()),
                Some(Value::Number(sn)) => Ok(sn.to_string()),
                _ => Err(ParseError::MissingField(format!("data[{i}].SystemSn"))),
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        tracing::debug!(systems = ?systems, "Listed systems");

        let values = catalog
            .iter()
            .map(|descriptor| value_for(&entries, descriptor))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Readings { values, systems })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DeviceType;

    fn entry(json: Value) -> Map<String, Value> {
        match json {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn config_defaults() {
        let config = HttpConfig::new();
        assert_eq!(config.base_url(), "https://monitor.macvolt.de/api");
        assert_eq!(config.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn into_source_trims_and_derives_origin() {
        let source = HttpConfig::new()
            .with_base_url("http://127.0.0.1:9000/api/")
            .into_source()
            .unwrap();
        assert_eq!(source.base_url(), "http://127.0.0.1:9000/api");
        assert_eq!(source.origin, "http://127.0.0.1:9000");
        assert_eq!(
            source.url(PATH_LOGIN),
            "http://127.0.0.1:9000/api/usercenter/cloud/user/login"
        );
    }

    #[test]
    fn into_source_rejects_bad_urls() {
        assert!(matches!(
            HttpConfig::new().with_base_url("monitor.macvolt.de").into_source(),
            Err(TransportError::InvalidAddress(_))
        ));
        assert!(matches!(
            HttpConfig::new().with_base_url("ftp://example.com").into_source(),
            Err(TransportError::InvalidAddress(_))
        ));
    }

    #[test]
    fn value_for_reads_first_matching_entry() {
        let systems = vec![
            entry(serde_json::json!({"SystemSn": "A", "T1": 19})),
            entry(serde_json::json!({"SystemSn": "B", "T1": 25, "D1": true})),
        ];
        let t1 = DeviceDescriptor::new(1, DeviceType::TempSensor);
        let d1 = DeviceDescriptor::new(1, DeviceType::DoorSensor);
        assert_eq!(value_for(&systems, &t1).unwrap(), DeviceValue::Int(19));
        assert_eq!(value_for(&systems, &d1).unwrap(), DeviceValue::Bool(true));
    }

    #[test]
    fn value_for_checks_shape() {
        let systems = vec![entry(serde_json::json!({"D1": 1, "T2": "warm"}))];
        let d1 = DeviceDescriptor::new(1, DeviceType::DoorSensor);
        let t2 = DeviceDescriptor::new(2, DeviceType::TempSensor);
        let t3 = DeviceDescriptor::new(3, DeviceType::TempSensor);
        assert!(matches!(
            value_for(&systems, &d1),
            Err(ParseError::InvalidValue { .. })
        ));
        assert!(matches!(
            value_for(&systems, &t2),
            Err(ParseError::InvalidValue { .. })
        ));
        assert!(matches!(
            value_for(&systems, &t3),
            Err(ParseError::MissingField(field)) if field == "T3"
        ));
    }

    #[test]
    fn parse_envelope_keeps_raw_body() {
        let err = parse_envelope("<html>oops</html>").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedFormat { body } if body == "<html>oops</html>"));
    }
}
