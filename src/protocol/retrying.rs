// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Reconnect-and-retry wrapper around a [`ModbusLink`].

use std::pin::Pin;

use crate::error::ProtocolError;
use crate::protocol::ModbusLink;
use crate::protocol::config::ModbusConfig;

/// One request on a borrowed link.
type LinkFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ProtocolError>> + Send + 'a>>;

/// Typed Modbus operations with bounded reconnect-and-retry.
///
/// Each operation is attempted up to `max_attempts` times. Before every
/// attempt the link is reopened if it is not connected. Only connection
/// failures are retried; a Modbus exception or a malformed response is
/// returned immediately.
///
/// Reads return exactly the requested number of values: shorter responses
/// are errors, surplus coil bits from byte padding are dropped.
///
/// The transport never closes the link on its own; callers decide when a
/// session ends with [`close`](Self::close).
#[derive(Debug)]
pub struct RetryingTransport<L> {
    link: L,
    max_attempts: u8,
}

impl<L: ModbusLink> RetryingTransport<L> {
    /// Wraps a link with the default attempt budget.
    #[must_use]
    pub fn new(link: L) -> Self {
        Self {
            link,
            max_attempts: ModbusConfig::DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Sets the number of attempts per operation (at least 1).
    #[must_use]
    pub fn with_max_attempts(mut self, attempts: u8) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Returns the number of attempts per operation.
    #[must_use]
    pub fn max_attempts(&self) -> u8 {
        self.max_attempts
    }

    /// Returns the wrapped link.
    #[must_use]
    pub fn link(&self) -> &L {
        &self.link
    }

    /// Returns `true` while the link is open.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.link.is_connected()
    }

    /// Opens the link if it is not already open. Not retried.
    ///
    /// # Errors
    ///
    /// Returns a connection failure if the link cannot be opened.
    pub async fn connect(&mut self) -> Result<(), ProtocolError> {
        if self.link.is_connected() {
            return Ok(());
        }
        tracing::debug!("Opening Modbus connection");
        self.link.connect().await
    }

    /// Closes the link.
    pub async fn close(&mut self) {
        if self.link.is_connected() {
            tracing::debug!("Closing Modbus connection");
        }
        self.link.close().await;
    }

    /// Reads exactly `count` coils starting at `address`.
    ///
    /// # Errors
    ///
    /// Returns a connection failure once every attempt failed to reach the
    /// device, or the first communication failure.
    pub async fn read_coils(&mut self, address: u16, count: u16) -> Result<Vec<bool>, ProtocolError> {
        tracing::trace!(address, count, "Reading coils");
        let values: Vec<bool> = self
            .retry(move |link| Box::pin(link.read_coils(address, count)))
            .await?;
        exact_count("read coils", values, count)
    }

    /// Reads exactly `count` holding registers starting at `address`.
    ///
    /// # Errors
    ///
    /// Returns a connection failure once every attempt failed to reach the
    /// device, or the first communication failure.
    pub async fn read_holding_registers(
        &mut self,
        address: u16,
        count: u16,
    ) -> Result<Vec<u16>, ProtocolError> {
        tracing::trace!(address, count, "Reading holding registers");
        let values: Vec<u16> = self
            .retry(move |link| Box::pin(link.read_holding_registers(address, count)))
            .await?;
        exact_count("read holding registers", values, count)
    }

    /// Reads exactly `count` input registers starting at `address`.
    ///
    /// # Errors
    ///
    /// Returns a connection failure once every attempt failed to reach the
    /// device, or the first communication failure.
    pub async fn read_input_registers(
        &mut self,
        address: u16,
        count: u16,
    ) -> Result<Vec<u16>, ProtocolError> {
        tracing::trace!(address, count, "Reading input registers");
        let values: Vec<u16> = self
            .retry(move |link| Box::pin(link.read_input_registers(address, count)))
            .await?;
        exact_count("read input registers", values, count)
    }

    /// Writes a single coil.
    ///
    /// # Errors
    ///
    /// Returns a connection failure once every attempt failed to reach the
    /// device, or the first communication failure.
    pub async fn write_coil(&mut self, address: u16, value: bool) -> Result<(), ProtocolError> {
        tracing::trace!(address, value, "Writing coil");
        self.retry(move |link| Box::pin(link.write_coil(address, value)))
            .await
    }

    /// Writes a single holding register.
    ///
    /// # Errors
    ///
    /// Returns a connection failure once every attempt failed to reach the
    /// device, or the first communication failure.
    pub async fn write_register(&mut self, address: u16, value: u16) -> Result<(), ProtocolError> {
        tracing::trace!(address, value, "Writing register");
        self.retry(move |link| Box::pin(link.write_register(address, value)))
            .await
    }

    async fn retry<T, F>(&mut self, mut operation: F) -> Result<T, ProtocolError>
    where
        F: for<'a> FnMut(&'a mut L) -> LinkFuture<'a, T> + Send,
    {
        let mut last_error = None;

        for attempt in 1..=self.max_attempts {
            let result = match self.ensure_connected().await {
                Ok(()) => operation(&mut self.link).await,
                Err(err) => Err(err),
            };

            match result {
                Ok(value) => return Ok(value),
                Err(err) if err.is_connection_failure() => {
                    tracing::warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %err,
                        "Modbus connection failure"
                    );
                    last_error = Some(err);
                }
                Err(err) => return Err(err),
            }
        }

        Err(last_error.unwrap_or_else(|| {
            ProtocolError::ConnectionFailed("no connection attempt was made".to_string())
        }))
    }

    async fn ensure_connected(&mut self) -> Result<(), ProtocolError> {
        if self.link.is_connected() {
            Ok(())
        } else {
            self.link.connect().await
        }
    }
}

fn exact_count<T>(
    function: &'static str,
    mut values: Vec<T>,
    count: u16,
) -> Result<Vec<T>, ProtocolError> {
    let expected = usize::from(count);

    if values.is_empty() && expected > 0 {
        return Err(ProtocolError::EmptyResponse(function));
    }
    if values.len() < expected {
        return Err(ProtocolError::ShortResponse {
            expected,
            actual: values.len(),
        });
    }
    values.truncate(expected);
    Ok(values)
}
