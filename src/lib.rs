// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `bls21_lib` - A Rust library to monitor and control Blauberg S21
//! ventilation units over Modbus TCP.
//!
//! The library exposes the unit as a climate device: power, HVAC mode, fan
//! mode, target temperature, boost and maintenance resets, plus a full state
//! snapshot decoded from the unit's registers.
//!
//! # Supported Features
//!
//! - **Polling**: one self-consistent [`DeviceSnapshot`] per call
//! - **Climate control**: on/off, heat/cool/auto/fan-only, set point
//! - **Fan control**: preset levels or manual speed in percent
//! - **Maintenance**: filter timer and alarm reset, boost ventilation
//! - **Availability**: the last snapshot is flagged stale when an operation fails
//!
//! # Quick Start
//!
//! ```no_run
//! use bls21_lib::DeviceClient;
//! use bls21_lib::types::{FanMode, HvacMode};
//!
//! #[tokio::main]
//! async fn main() -> bls21_lib::Result<()> {
//!     let client = DeviceClient::tcp("192.168.1.125").build()?;
//!
//!     let snapshot = client.poll().await?;
//!     println!(
//!         "{} at {:.1}{}",
//!         snapshot.state().hvac_mode,
//!         snapshot.state().current_temperature,
//!         snapshot.temperature_unit()
//!     );
//!
//!     client.set_hvac_mode(HvacMode::Auto).await?;
//!     client.set_fan_mode(FanMode::level(2)?).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Sessions
//!
//! No connection is kept open between calls. Each operation takes an
//! internal lock, opens the link, runs, closes the link and releases the
//! lock, so concurrent calls on one client queue up rather than interleave.
//! Connection failures are retried a bounded number of times (see
//! [`protocol::ModbusConfig::with_max_attempts`]).
//!
//! # Logging
//!
//! The library logs through `tracing` and installs no subscriber.

mod capabilities;
mod device;
pub mod error;
pub mod protocol;
pub mod registers;
pub mod state;
pub mod types;

pub use capabilities::SupportedFeatures;
pub use device::{DeviceClient, DeviceClientBuilder};
pub use error::{DeviceError, Error, ProtocolError, Result, ValueError};
pub use protocol::{ModbusConfig, ModbusLink, RetryingTransport};
#[cfg(feature = "tcp")]
pub use protocol::TcpLink;
pub use state::{ClimateState, DeviceIdentity, DeviceSnapshot};
pub use types::{
    FanMode, FanSpeedPercent, FirmwareVersion, HvacAction, HvacActionPolicy, HvacMode,
    TargetTemperature,
};
