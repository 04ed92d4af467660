// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Modbus TCP link built on `tokio-modbus`.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::time::error::Elapsed;
use tokio_modbus::Slave;
use tokio_modbus::client::{Client, Context, Reader, Writer, tcp};

use crate::error::ProtocolError;
use crate::protocol::ModbusLink;
use crate::protocol::config::{ModbusConfig, as_millis};

/// Modbus TCP connection to an S21 unit.
///
/// The host is resolved on every [`connect`](ModbusLink::connect), so a
/// unit that changes address behind a DNS name is picked up on the next
/// session.
///
/// Transport I/O errors and connection timeouts are reported as connection
/// failures and drop the connection. A request timeout drops the connection
/// too, since a late answer would otherwise be read as the reply to the next
/// request, but it is reported as a communication failure and not retried.
///
/// # Examples
///
/// ```no_run
/// use bls21_lib::protocol::{ModbusConfig, ModbusLink, TcpLink};
///
/// # async fn example() -> Result<(), bls21_lib::ProtocolError> {
/// let mut link = TcpLink::new(&ModbusConfig::new("192.168.1.125"));
/// link.connect().await?;
/// let device_type = link.read_input_registers(37, 1).await?;
/// link.close().await;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct TcpLink {
    host: String,
    port: u16,
    unit_id: u8,
    connect_timeout: Duration,
    request_timeout: Duration,
    context: Option<Context>,
}

impl TcpLink {
    /// Creates a disconnected link from a configuration.
    #[must_use]
    pub fn new(config: &ModbusConfig) -> Self {
        Self {
            host: config.host().to_string(),
            port: config.port(),
            unit_id: config.unit_id(),
            connect_timeout: config.connect_timeout(),
            request_timeout: config.request_timeout(),
            context: None,
        }
    }

    /// Returns the `host:port` this link connects to.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Resolves `host:port` to the first socket address.
    ///
    /// Takes the address by value: `TcpLink` is not `Sync`, so no borrow of
    /// it may live across the lookup.
    async fn resolve(host: String, port: u16) -> Result<SocketAddr, ProtocolError> {
        let mut addrs = tokio::net::lookup_host((host.as_str(), port))
            .await
            .map_err(|e| ProtocolError::InvalidAddress(format!("{host}:{port}: {e}")))?;

        addrs
            .next()
            .ok_or_else(|| ProtocolError::InvalidAddress(format!("{host}:{port}: no address")))
    }

    fn context(&mut self) -> Result<&mut Context, ProtocolError> {
        self.context
            .as_mut()
            .ok_or_else(|| ProtocolError::ConnectionFailed("not connected".to_string()))
    }

    /// Maps a timed `tokio-modbus` result, dropping the connection when the
    /// stream can no longer be trusted.
    fn finish<T>(
        &mut self,
        function: &'static str,
        response: Result<tokio_modbus::Result<T>, Elapsed>,
    ) -> Result<T, ProtocolError> {
        match response {
            Ok(Ok(Ok(value))) => Ok(value),
            Ok(Ok(Err(code))) => Err(ProtocolError::Exception {
                function,
                code: format!("{code:?}"),
            }),
            Ok(Err(tokio_modbus::Error::Transport(err))) => {
                self.context = None;
                Err(ProtocolError::ConnectionFailed(format!("{function}: {err}")))
            }
            Ok(Err(err)) => {
                self.context = None;
                Err(ProtocolError::Malformed(format!("{function}: {err}")))
            }
            Err(_) => {
                self.context = None;
                Err(ProtocolError::Timeout(as_millis(self.request_timeout)))
            }
        }
    }
}

impl ModbusLink for TcpLink {
    fn is_connected(&self) -> bool {
        self.context.is_some()
    }

    async fn connect(&mut self) -> Result<(), ProtocolError> {
        if self.context.is_some() {
            return Ok(());
        }

        let socket_addr = Self::resolve(self.host.clone(), self.port).await?;
        tracing::debug!(address = %socket_addr, unit_id = self.unit_id, "Connecting to Modbus TCP device");

        let context = tokio::time::timeout(
            self.connect_timeout,
            tcp::connect_slave(socket_addr, Slave(self.unit_id)),
        )
        .await
        .map_err(|_| ProtocolError::ConnectTimeout(as_millis(self.connect_timeout)))?
        .map_err(|e| ProtocolError::ConnectionFailed(format!("{socket_addr}: {e}")))?;

        self.context = Some(context);
        Ok(())
    }

    async fn close(&mut self) {
        if let Some(mut context) = self.context.take() {
            if let Err(e) = context.disconnect().await {
                tracing::debug!(address = %self.address(), error = %e, "Error while disconnecting");
            }
        }
    }

    async fn read_coils(&mut self, address: u16, count: u16) -> Result<Vec<bool>, ProtocolError> {
        let timeout = self.request_timeout;
        let context = self.context()?;
        let response = tokio::time::timeout(timeout, context.read_coils(address, count)).await;
        self.finish("read coils", response)
    }

    async fn read_holding_registers(
        &mut self,
        address: u16,
        count: u16,
    ) -> Result<Vec<u16>, ProtocolError> {
        let timeout = self.request_timeout;
        let context = self.context()?;
        let response =
            tokio::time::timeout(timeout, context.read_holding_registers(address, count)).await;
        self.finish("read holding registers", response)
    }

    async fn read_input_registers(
        &mut self,
        address: u16,
        count: u16,
    ) -> Result<Vec<u16>, ProtocolError> {
        let timeout = self.request_timeout;
        let context = self.context()?;
        let response =
            tokio::time::timeout(timeout, context.read_input_registers(address, count)).await;
        self.finish("read input registers", response)
    }

    async fn write_coil(&mut self, address: u16, value: bool) -> Result<(), ProtocolError> {
        let timeout = self.request_timeout;
        let context = self.context()?;
        let response = tokio::time::timeout(timeout, context.write_single_coil(address, value)).await;
        self.finish("write coil", response)
    }

    async fn write_register(&mut self, address: u16, value: u16) -> Result<(), ProtocolError> {
        let timeout = self.request_timeout;
        let context = self.context()?;
        let response =
            tokio::time::timeout(timeout, context.write_single_register(address, value)).await;
        self.finish("write register", response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_link_is_disconnected() {
        let link = TcpLink::new(&ModbusConfig::new("192.168.1.125"));
        assert!(!link.is_connected());
        assert_eq!(link.address(), "192.168.1.125:502");
    }

    #[test]
    fn link_takes_settings_from_config() {
        let config = ModbusConfig::new("s21.local")
            .with_port(5020)
            .with_unit_id(3)
            .with_request_timeout(Duration::from_millis(400));
        let link = TcpLink::new(&config);

        assert_eq!(link.address(), "s21.local:5020");
        assert_eq!(link.unit_id, 3);
        assert_eq!(link.request_timeout, Duration::from_millis(400));
    }

    #[tokio::test]
    async fn request_without_connection_is_connection_failure() {
        let mut link = TcpLink::new(&ModbusConfig::new("127.0.0.1"));
        let err = link.read_input_registers(37, 1).await.unwrap_err();
        assert!(err.is_connection_failure());
    }

    #[tokio::test]
    async fn refused_connection_is_connection_failure() {
        // Bind then drop a listener to get a port nobody listens on
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let mut link = TcpLink::new(&ModbusConfig::new("127.0.0.1").with_port(port));
        let err = link.connect().await.unwrap_err();

        assert!(err.is_connection_failure());
        assert!(!link.is_connected());
    }

    #[tokio::test]
    async fn connect_runs_on_a_spawned_task() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let mut link = TcpLink::new(&ModbusConfig::new("localhost").with_port(port));
        let err = tokio::spawn(async move { link.connect().await })
            .await
            .unwrap()
            .unwrap_err();

        assert!(err.is_connection_failure());
    }

    #[tokio::test]
    async fn close_when_disconnected_is_noop() {
        let mut link = TcpLink::new(&ModbusConfig::new("127.0.0.1"));
        link.close().await;
        assert!(!link.is_connected());
    }
}
