// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Connection configuration for an S21 unit.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for a Modbus TCP connection to an S21 unit.
///
/// Every connection is short-lived: it is opened for one poll or command and
/// closed right after, so there is no keep-alive setting.
///
/// # Examples
///
/// ```
/// use bls21_lib::protocol::ModbusConfig;
/// use std::time::Duration;
///
/// // Simple configuration
/// let config = ModbusConfig::new("192.168.1.125");
/// assert_eq!(config.port(), 502);
///
/// // With all options
/// let config = ModbusConfig::new("192.168.1.125")
///     .with_port(5020)
///     .with_unit_id(2)
///     .with_connect_timeout(Duration::from_secs(2))
///     .with_request_timeout(Duration::from_secs(1))
///     .with_max_attempts(5);
/// ```
///
/// The configuration can also be loaded from JSON; missing fields take their
/// defaults and timeouts are given in milliseconds:
///
/// ```
/// use bls21_lib::protocol::ModbusConfig;
///
/// let config: ModbusConfig =
///     serde_json::from_str(r#"{ "host": "10.0.0.7", "connect_timeout_ms": 1500 }"#).unwrap();
/// assert_eq!(config.port(), 502);
/// assert_eq!(config.connect_timeout().as_millis(), 1500);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModbusConfig {
    host: String,
    #[serde(default = "default_port")]
    port: u16,
    #[serde(default = "default_unit_id")]
    unit_id: u8,
    #[serde(
        rename = "connect_timeout_ms",
        with = "millis",
        default = "default_connect_timeout"
    )]
    connect_timeout: Duration,
    #[serde(
        rename = "request_timeout_ms",
        with = "millis",
        default = "default_request_timeout"
    )]
    request_timeout: Duration,
    #[serde(default = "default_max_attempts")]
    max_attempts: u8,
}

impl ModbusConfig {
    /// Default Modbus TCP port.
    pub const DEFAULT_PORT: u16 = 502;
    /// Default Modbus unit identifier.
    pub const DEFAULT_UNIT_ID: u8 = 1;
    /// Default time allowed to open the TCP connection.
    pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
    /// Default time allowed for a single request.
    pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(3);
    /// Default number of attempts per operation.
    pub const DEFAULT_MAX_ATTEMPTS: u8 = 3;

    /// Creates a new configuration for the specified host.
    ///
    /// # Arguments
    ///
    /// * `host` - The hostname or IP address of the S21 unit
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: Self::DEFAULT_PORT,
            unit_id: Self::DEFAULT_UNIT_ID,
            connect_timeout: Self::DEFAULT_CONNECT_TIMEOUT,
            request_timeout: Self::DEFAULT_REQUEST_TIMEOUT,
            max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Sets a custom port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the Modbus unit identifier.
    #[must_use]
    pub fn with_unit_id(mut self, unit_id: u8) -> Self {
        self.unit_id = unit_id;
        self
    }

    /// Sets the connection timeout.
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Sets how many times an operation is attempted on connection failure.
    ///
    /// Values below 1 are treated as 1.
    #[must_use]
    pub fn with_max_attempts(mut self, attempts: u8) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Returns the host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns the Modbus unit identifier.
    #[must_use]
    pub fn unit_id(&self) -> u8 {
        self.unit_id
    }

    /// Returns the connection timeout.
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Returns the per-request timeout.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Returns the number of attempts per operation.
    #[must_use]
    pub fn max_attempts(&self) -> u8 {
        self.max_attempts.max(1)
    }
}

fn default_port() -> u16 {
    ModbusConfig::DEFAULT_PORT
}

fn default_unit_id() -> u8 {
    ModbusConfig::DEFAULT_UNIT_ID
}

fn default_connect_timeout() -> Duration {
    ModbusConfig::DEFAULT_CONNECT_TIMEOUT
}

fn default_request_timeout() -> Duration {
    ModbusConfig::DEFAULT_REQUEST_TIMEOUT
}

fn default_max_attempts() -> u8 {
    ModbusConfig::DEFAULT_MAX_ATTEMPTS
}

/// Converts a duration to whole milliseconds, saturating at `u64::MAX`.
pub(crate) fn as_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(super::as_millis(*duration))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
