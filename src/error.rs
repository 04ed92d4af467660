// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `bls21_lib` library.
//!
//! Failures fall into three families that callers usually want to tell apart:
//!
//! - **connection failures**: the TCP link could not be opened or broke while
//!   in use. The transport retries these a bounded number of times.
//! - **communication failures**: the link worked but the device answered with
//!   a Modbus exception or a malformed/short response. Never retried.
//! - **unsupported device**: the link worked and the device answered, but its
//!   device-type register identifies a different product.

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred during value validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// Error occurred while talking Modbus to the device.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The device answered but is not something this library can drive.
    #[error("device error: {0}")]
    Device(#[from] DeviceError),

    /// The link reported success but is still not connected.
    ///
    /// Counts as a connection failure: [`Error::is_connection_failure`]
    /// returns `true` for it. It is raised when a session opens, so it is
    /// never retried.
    #[error("failed to open connection")]
    NotConnected,
}

impl Error {
    /// Returns `true` if the link could not be opened or was lost, including
    /// [`Error::NotConnected`].
    #[must_use]
    pub fn is_connection_failure(&self) -> bool {
        match self {
            Self::Protocol(err) => err.is_connection_failure(),
            Self::NotConnected => true,
            Self::Value(_) | Self::Device(_) => false,
        }
    }

    /// Returns `true` if the device returned an error or an unusable response.
    #[must_use]
    pub fn is_communication_failure(&self) -> bool {
        matches!(self, Self::Protocol(err) if !err.is_connection_failure())
    }

    /// Returns `true` if the device-type register did not match.
    #[must_use]
    pub fn is_unsupported_device(&self) -> bool {
        matches!(self, Self::Device(DeviceError::UnsupportedDevice { .. }))
    }
}

/// Errors related to value validation and constraints.
///
/// These errors occur when attempting to create constrained types
/// with invalid values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A numeric value is outside the allowed range.
    #[error("value {actual} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Minimum allowed value.
        min: u16,
        /// Maximum allowed value.
        max: u16,
        /// The actual value that was provided.
        actual: u16,
    },

    /// An unknown HVAC mode name was provided.
    #[error("invalid HVAC mode: {0}")]
    InvalidHvacMode(String),
}

/// Errors related to Modbus TCP communication.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The TCP link could not be opened or was lost.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Opening the TCP link took too long.
    #[error("connection attempt timed out after {0} ms")]
    ConnectTimeout(u64),

    /// The host could not be resolved to a socket address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// A request got no answer in time.
    #[error("request timed out after {0} ms")]
    Timeout(u64),

    /// The device answered with a Modbus exception.
    #[error("{function} rejected by device: {code}")]
    Exception {
        /// The request that was rejected.
        function: &'static str,
        /// Exception description as reported by the transport.
        code: String,
    },

    /// The device returned nothing for a read.
    #[error("empty response to {0}")]
    EmptyResponse(&'static str),

    /// The device returned fewer values than requested.
    #[error("short response: expected {expected} values, got {actual}")]
    ShortResponse {
        /// Number of values requested.
        expected: usize,
        /// Number of values received.
        actual: usize,
    },

    /// The response could not be decoded.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl ProtocolError {
    /// Returns `true` for failures the transport retries after reconnecting.
    #[must_use]
    pub const fn is_connection_failure(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed(_) | Self::ConnectTimeout(_) | Self::InvalidAddress(_)
        )
    }
}

/// Errors related to the identity of the connected device.
#[derive(Debug, Error)]
pub enum DeviceError {
    /// The device-type register holds a value other than the S21 one.
    #[error("unsupported device (device type {device_type}, expected {expected})")]
    UnsupportedDevice {
        /// The value read from the device-type register.
        device_type: u16,
        /// The value an S21 reports.
        expected: u16,
    },
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
