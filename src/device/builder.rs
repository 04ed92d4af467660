// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device client builder.

use std::time::Duration;

use crate::device::DeviceClient;
use crate::protocol::{ModbusConfig, ModbusLink};
use crate::types::HvacActionPolicy;

/// Builder for [`DeviceClient`].
///
/// Created with `DeviceClient::tcp("host")` or
/// `DeviceClient::tcp_config(ModbusConfig::new("host").with_port(5020))`.
/// Building does not touch the network; the first session is opened by the
/// first operation.
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use bls21_lib::DeviceClient;
/// use bls21_lib::types::HvacActionPolicy;
///
/// # fn example() -> bls21_lib::Result<()> {
/// let client = DeviceClient::tcp("192.168.1.125")
///     .with_request_timeout(Duration::from_secs(1))
///     .with_max_attempts(5)
///     .with_action_policy(HvacActionPolicy::OperationMode)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct DeviceClientBuilder {
    config: ModbusConfig,
    action_policy: HvacActionPolicy,
}

impl DeviceClientBuilder {
    /// Creates a new builder with the specified configuration.
    #[must_use]
    pub fn new(config: ModbusConfig) -> Self {
        Self {
            config,
            action_policy: HvacActionPolicy::default(),
        }
    }

    /// Sets a custom port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.config = self.config.with_port(port);
        self
    }

    /// Sets the Modbus unit identifier.
    #[must_use]
    pub fn with_unit_id(mut self, unit_id: u8) -> Self {
        self.config = self.config.with_unit_id(unit_id);
        self
    }

    /// Sets the connection timeout.
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.with_connect_timeout(timeout);
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.with_request_timeout(timeout);
        self
    }

    /// Sets how many times an operation is attempted on connection failure.
    #[must_use]
    pub fn with_max_attempts(mut self, attempts: u8) -> Self {
        self.config = self.config.with_max_attempts(attempts);
        self
    }

    /// Sets how `hvac_action` is derived on poll.
    #[must_use]
    pub fn with_action_policy(mut self, policy: HvacActionPolicy) -> Self {
        self.action_policy = policy;
        self
    }

    /// Returns the configuration built so far.
    #[must_use]
    pub fn config(&self) -> &ModbusConfig {
        &self.config
    }

    /// Builds a client over the bundled Modbus TCP link.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::InvalidAddress` if the host is empty.
    #[cfg(feature = "tcp")]
    pub fn build(self) -> crate::Result<DeviceClient<crate::protocol::TcpLink>> {
        if self.config.host().trim().is_empty() {
            return Err(crate::error::ProtocolError::InvalidAddress("empty host".to_string()).into());
        }
        let link = crate::protocol::TcpLink::new(&self.config);
        Ok(self.build_with_link(link))
    }

    /// Builds a client over a custom link.
    ///
    /// The host and port of the configuration still name the device in its
    /// identity; the link decides where requests actually go.
    #[must_use]
    pub fn build_with_link<L: ModbusLink>(self, link: L) -> DeviceClient<L> {
        DeviceClient::new(link, &self.config, self.action_policy)
    }
}

#[cfg(all(test, feature = "tcp"))]
mod tests {
    use super::*;
    use crate::error::{Error, ProtocolError};

    #[test]
    fn builder_defaults() {
        let builder = DeviceClientBuilder::new(ModbusConfig::new("192.168.1.125"));
        assert_eq!(builder.config(), &ModbusConfig::new("192.168.1.125"));
        assert_eq!(builder.action_policy, HvacActionPolicy::TemperatureComparison);
    }

    #[test]
    fn builder_forwards_to_config() {
        let builder = DeviceClient::tcp("192.168.1.125")
            .with_port(5020)
            .with_unit_id(4)
            .with_connect_timeout(Duration::from_millis(500))
            .with_request_timeout(Duration::from_millis(200))
            .with_max_attempts(0);

        let config = builder.config();
        assert_eq!(config.port(), 5020);
        assert_eq!(config.unit_id(), 4);
        assert_eq!(config.connect_timeout(), Duration::from_millis(500));
        assert_eq!(config.request_timeout(), Duration::from_millis(200));
        assert_eq!(config.max_attempts(), 1);
    }

    #[test]
    fn build_tcp_client() {
        let client = DeviceClient::tcp_config(ModbusConfig::new("s21.local").with_port(5020))
            .with_action_policy(HvacActionPolicy::OperationMode)
            .build()
            .unwrap();

        assert_eq!(client.host(), "s21.local");
        assert_eq!(client.port(), 5020);
        assert_eq!(client.action_policy(), HvacActionPolicy::OperationMode);
        assert!(client.snapshot().is_none());
    }

    #[test]
    fn build_rejects_empty_host() {
        let err = DeviceClient::tcp("  ").build().unwrap_err();
        assert!(matches!(
            err,
            Error::Protocol(ProtocolError::InvalidAddress(_))
        ));
    }
}
