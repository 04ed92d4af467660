// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Modbus transport layer.
//!
//! # Layers
//!
//! - [`ModbusLink`]: one raw connection to the device. It knows how to open
//!   and close itself and how to issue single Modbus requests, nothing more.
//! - [`TcpLink`]: the Modbus TCP implementation, built on `tokio-modbus`
//!   (feature `tcp`).
//! - [`RetryingTransport`]: wraps a link, reconnects and retries on
//!   connection failures, and checks that reads return what was asked for.
//!
//! Custom links (a serial gateway, a simulator in tests) only need to
//! implement [`ModbusLink`].

mod config;
mod retrying;
#[cfg(feature = "tcp")]
mod tcp;

pub use config::ModbusConfig;
pub use retrying::RetryingTransport;
#[cfg(feature = "tcp")]
pub use tcp::TcpLink;

use crate::error::ProtocolError;

/// A single, non-shareable connection to a Modbus device.
///
/// Addresses are 0-based offsets within each region. Implementations must
/// report transport-level breakage as a connection failure (see
/// [`ProtocolError::is_connection_failure`]) and drop into the disconnected
/// state, so the next attempt reconnects. Device-level rejections are
/// reported as any other [`ProtocolError`] and leave the link connected.
///
/// Request futures are `Send`, so clients built on a link can be driven
/// from spawned tasks. Implementations may still use `async fn`.
pub trait ModbusLink: Send {
    /// Returns `true` while the link is open.
    fn is_connected(&self) -> bool;

    /// Opens the link. Does nothing if it is already open.
    ///
    /// # Errors
    ///
    /// Returns a connection failure if the link cannot be opened.
    fn connect(&mut self) -> impl Future<Output = Result<(), ProtocolError>> + Send;

    /// Closes the link. Does nothing if it is already closed.
    fn close(&mut self) -> impl Future<Output = ()> + Send;

    /// Reads `count` coils starting at `address`.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the request fails.
    fn read_coils(
        &mut self,
        address: u16,
        count: u16,
    ) -> impl Future<Output = Result<Vec<bool>, ProtocolError>> + Send;

    /// Reads `count` holding registers starting at `address`.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the request fails.
    fn read_holding_registers(
        &mut self,
        address: u16,
        count: u16,
    ) -> impl Future<Output = Result<Vec<u16>, ProtocolError>> + Send;

    /// Reads `count` input registers starting at `address`.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the request fails.
    fn read_input_registers(
        &mut self,
        address: u16,
        count: u16,
    ) -> impl Future<Output = Result<Vec<u16>, ProtocolError>> + Send;

    /// Writes a single coil.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the request fails.
    fn write_coil(
        &mut self,
        address: u16,
        value: bool,
    ) -> impl Future<Output = Result<(), ProtocolError>> + Send;

    /// Writes a single holding register.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the request fails.
    fn write_register(
        &mut self,
        address: u16,
        value: u16,
    ) -> impl Future<Output = Result<(), ProtocolError>> + Send;
}
