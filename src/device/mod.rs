// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! High-level client for a Blauberg S21 unit.
//!
//! Every operation opens a fresh Modbus session, runs, and closes it again.
//! Operations on the same client are serialized: at most one session is
//! ever open against the unit.
//!
//! ```no_run
//! use bls21_lib::DeviceClient;
//! use bls21_lib::types::{HvacMode, TargetTemperature};
//!
//! # async fn example() -> bls21_lib::Result<()> {
//! let client = DeviceClient::tcp("192.168.1.125").build()?;
//!
//! let snapshot = client.poll().await?;
//! println!("{} is {}", snapshot.identity().name, snapshot.state().hvac_mode);
//!
//! client.set_hvac_mode(HvacMode::Heat).await?;
//! client.set_temperature(TargetTemperature::new(21)?).await?;
//! # Ok(())
//! # }
//! ```

mod builder;
mod operation;

pub use builder::DeviceClientBuilder;

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::Mutex;

use self::operation::{Operation, PowerOnWithMode, ReadSnapshot, WriteCoil, WriteRegister};
use crate::error::{Error, Result};
use crate::protocol::{ModbusConfig, ModbusLink, RetryingTransport};
use crate::registers::{Coil, HoldingRegister};
use crate::state::DeviceSnapshot;
use crate::types::{FanMode, FanSpeedPercent, HvacActionPolicy, HvacMode, TargetTemperature};

/// Client for one S21 unit.
///
/// # Type Parameter
///
/// `L` is the Modbus link the client talks through. Use
/// [`DeviceClient::tcp`] for the bundled TCP link, or
/// [`DeviceClientBuilder::build_with_link`] to plug in another one.
///
/// # Availability
///
/// The last snapshot returned by [`poll`](Self::poll) is kept. When any later
/// operation fails, that same snapshot is flagged unavailable before the
/// error is returned. Commands never update the snapshot; poll again to see
/// their effect.
///
/// # Concurrency
///
/// All operations take `&self` and return `Send` futures. Share the client
/// behind an `Arc` to use it from several spawned tasks; calls queue on an
/// internal async mutex.
#[derive(Debug)]
pub struct DeviceClient<L: ModbusLink> {
    transport: Mutex<RetryingTransport<L>>,
    snapshot: RwLock<Option<Arc<DeviceSnapshot>>>,
    host: String,
    port: u16,
    action_policy: HvacActionPolicy,
}

impl<L: ModbusLink> DeviceClient<L> {
    /// Creates a client from a link and its configuration.
    pub(crate) fn new(link: L, config: &ModbusConfig, action_policy: HvacActionPolicy) -> Self {
        Self {
            transport: Mutex::new(
                RetryingTransport::new(link).with_max_attempts(config.max_attempts()),
            ),
            snapshot: RwLock::new(None),
            host: config.host().to_string(),
            port: config.port(),
            action_policy,
        }
    }

    /// Returns the host the client talks to.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the port the client talks to.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns how `hvac_action` is derived on poll.
    #[must_use]
    pub fn action_policy(&self) -> HvacActionPolicy {
        self.action_policy
    }

    /// Returns the last snapshot produced by [`poll`](Self::poll), if any.
    #[must_use]
    pub fn snapshot(&self) -> Option<Arc<DeviceSnapshot>> {
        self.snapshot.read().clone()
    }

    // ========== Polling ==========

    /// Reads the whole device state.
    ///
    /// Checks the device type first, then reads the coil, holding and input
    /// register regions in one request each. The new snapshot replaces the
    /// stored one.
    ///
    /// # Errors
    ///
    /// Returns `DeviceError::UnsupportedDevice` if the unit is not an S21, in
    /// which case the stored snapshot is not replaced. Returns a protocol
    /// error if the unit cannot be reached or answers badly.
    pub async fn poll(&self) -> Result<Arc<DeviceSnapshot>> {
        tracing::debug!(host = %self.host, port = self.port, "Polling device");

        self.with_connection(ReadSnapshot { client: self }).await
    }

    // ========== Power Control ==========

    /// Switches the unit on.
    ///
    /// # Errors
    ///
    /// Returns a protocol error if the write fails.
    pub async fn turn_on(&self) -> Result<()> {
        self.write_coil(Coil::Power, true).await
    }

    /// Switches the unit off.
    ///
    /// # Errors
    ///
    /// Returns a protocol error if the write fails.
    pub async fn turn_off(&self) -> Result<()> {
        self.write_coil(Coil::Power, false).await
    }

    /// Sets the operating mode.
    ///
    /// [`HvacMode::Off`] only switches the unit off. Every other mode switches
    /// it on and then writes the operation mode register, in one session.
    ///
    /// # Errors
    ///
    /// Returns a protocol error if a write fails.
    pub async fn set_hvac_mode(&self, mode: HvacMode) -> Result<()> {
        let Some(operation_mode) = mode.operation_mode() else {
            return self.turn_off().await;
        };

        tracing::debug!(host = %self.host, %mode, "Setting HVAC mode");
        self.with_connection(PowerOnWithMode { operation_mode })
            .await
    }

    // ========== Fan Control ==========

    /// Selects a preset fan level or manual fan mode.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` for a level outside [1, 254], before
    /// anything is sent. Returns a protocol error if the write fails.
    pub async fn set_fan_mode(&self, mode: FanMode) -> Result<()> {
        let mode = match mode {
            FanMode::Level(level) => FanMode::level(level)?,
            FanMode::Manual => FanMode::Manual,
        };
        self.write_register(HoldingRegister::SpeedMode, mode.to_raw())
            .await
    }

    /// Sets the fan speed used in manual fan mode.
    ///
    /// # Errors
    ///
    /// Returns a protocol error if the write fails.
    pub async fn set_manual_fan_speed_percent(&self, speed: FanSpeedPercent) -> Result<()> {
        self.write_register(HoldingRegister::ManualSpeed, speed.value())
            .await
    }

    // ========== Temperature ==========

    /// Sets the target temperature.
    ///
    /// # Errors
    ///
    /// Returns a protocol error if the write fails.
    pub async fn set_temperature(&self, temperature: TargetTemperature) -> Result<()> {
        self.write_register(HoldingRegister::SetTemperature, temperature.celsius())
            .await
    }

    // ========== Maintenance ==========

    /// Resets the filter change timer.
    ///
    /// # Errors
    ///
    /// Returns a protocol error if the write fails.
    pub async fn reset_filter_change_timer(&self) -> Result<()> {
        self.write_coil(Coil::ResetFilterTimer, true).await
    }

    /// Acknowledges the active alarm.
    ///
    /// # Errors
    ///
    /// Returns a protocol error if the write fails.
    pub async fn reset_alarm(&self) -> Result<()> {
        self.write_coil(Coil::ResetAlarm, true).await
    }

    // ========== Boost ==========

    /// Starts boost ventilation.
    ///
    /// # Errors
    ///
    /// Returns a protocol error if the write fails.
    pub async fn boost_on(&self) -> Result<()> {
        self.write_coil(Coil::BoostMode, true).await
    }

    /// Stops boost ventilation.
    ///
    /// # Errors
    ///
    /// Returns a protocol error if the write fails.
    pub async fn boost_off(&self) -> Result<()> {
        self.write_coil(Coil::BoostMode, false).await
    }

    /// Enables or disables boost activation from the wall switch.
    ///
    /// # Errors
    ///
    /// Returns a protocol error if the write fails.
    pub async fn set_boost_switch_control(&self, enabled: bool) -> Result<()> {
        self.write_coil(Coil::BoostSwitchControl, enabled).await
    }

    // ========== Helpers ==========

    async fn write_coil(&self, coil: Coil, value: bool) -> Result<()> {
        tracing::debug!(host = %self.host, ?coil, value, "Writing coil");
        self.with_connection(WriteCoil { coil, value }).await
    }

    async fn write_register(&self, register: HoldingRegister, value: u16) -> Result<()> {
        tracing::debug!(host = %self.host, ?register, value, "Writing register");
        self.with_connection(WriteRegister { register, value })
            .await
    }

    /// Runs `operation` in its own session: lock, open, run, close, unlock.
    ///
    /// The link is closed whatever the outcome. On failure the stored
    /// snapshot, if any, is marked unavailable before the lock is released.
    async fn with_connection<O: Operation<L>>(&self, operation: O) -> Result<O::Output> {
        let mut transport = self.transport.lock().await;

        let result = match Self::open(&mut transport).await {
            Ok(()) => operation.run(&mut transport).await,
            Err(err) => Err(err),
        };
        transport.close().await;

        if let Err(err) = &result {
            self.mark_unavailable(err);
        }
        result
    }

    async fn open(transport: &mut RetryingTransport<L>) -> Result<()> {
        transport.connect().await?;
        if transport.is_connected() {
            Ok(())
        } else {
            Err(Error::NotConnected)
        }
    }

    fn store(&self, snapshot: Arc<DeviceSnapshot>) {
        *self.snapshot.write() = Some(snapshot);
    }

    fn mark_unavailable(&self, err: &Error) {
        if let Some(snapshot) = self.snapshot.read().as_ref() {
            tracing::warn!(host = %self.host, port = self.port, error = %err, "Marking device unavailable");
            snapshot.mark_unavailable();
        }
    }
}

// ========== TCP Entry Point ==========

#[cfg(feature = "tcp")]
impl DeviceClient<crate::protocol::TcpLink> {
    /// Creates a builder for a Modbus TCP client from a host string.
    ///
    /// Equivalent to `DeviceClient::tcp_config(ModbusConfig::new(host))`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use bls21_lib::DeviceClient;
    ///
    /// # async fn example() -> bls21_lib::Result<()> {
    /// let client = DeviceClient::tcp("192.168.1.125")
    ///     .with_port(5020)
    ///     .build()?;
    /// # Ok(())
    /// # }
    /// ```
    #[must_use]
    pub fn tcp(host: impl Into<String>) -> DeviceClientBuilder {
        DeviceClientBuilder::new(ModbusConfig::new(host))
    }

    /// Creates a builder for a Modbus TCP client from a `ModbusConfig`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::time::Duration;
    /// use bls21_lib::DeviceClient;
    /// use bls21_lib::protocol::ModbusConfig;
    ///
    /// # async fn example() -> bls21_lib::Result<()> {
    /// let config = ModbusConfig::new("192.168.1.125")
    ///     .with_unit_id(2)
    ///     .with_request_timeout(Duration::from_secs(1));
    ///
    /// let client = DeviceClient::tcp_config(config).build()?;
    /// # Ok(())
    /// # }
    /// ```
    #[must_use]
    pub fn tcp_config(config: ModbusConfig) -> DeviceClientBuilder {
        DeviceClientBuilder::new(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProtocolError;

    /// Link that accepts everything and counts sessions.
    #[derive(Debug, Default)]
    struct CountingLink {
        connected: bool,
        connects: usize,
        writes: Vec<(u16, u16)>,
    }

    impl ModbusLink for CountingLink {
        fn is_connected(&self) -> bool {
            self.connected
        }

        async fn connect(&mut self) -> std::result::Result<(), ProtocolError> {
            self.connects += 1;
            self.connected = true;
            Ok(())
        }

        async fn close(&mut self) {
            self.connected = false;
        }

        async fn read_coils(
            &mut self,
            _: u16,
            count: u16,
        ) -> std::result::Result<Vec<bool>, ProtocolError> {
            Ok(vec![false; usize::from(count)])
        }

        async fn read_holding_registers(
            &mut self,
            _: u16,
            count: u16,
        ) -> std::result::Result<Vec<u16>, ProtocolError> {
            Ok(vec![0; usize::from(count)])
        }

        async fn read_input_registers(
            &mut self,
            _: u16,
            count: u16,
        ) -> std::result::Result<Vec<u16>, ProtocolError> {
            Ok(vec![0; usize::from(count)])
        }

        async fn write_coil(
            &mut self,
            address: u16,
            value: bool,
        ) -> std::result::Result<(), ProtocolError> {
            self.writes.push((address, u16::from(value)));
            Ok(())
        }

        async fn write_register(
            &mut self,
            address: u16,
            value: u16,
        ) -> std::result::Result<(), ProtocolError> {
            self.writes.push((address, value));
            Ok(())
        }
    }

    /// Link whose connect reports success without connecting.
    #[derive(Debug, Default)]
    struct StuckLink;

    impl ModbusLink for StuckLink {
        fn is_connected(&self) -> bool {
            false
        }

        async fn connect(&mut self) -> std::result::Result<(), ProtocolError> {
            Ok(())
        }

        async fn close(&mut self) {}

        async fn read_coils(
            &mut self,
            _: u16,
            _: u16,
        ) -> std::result::Result<Vec<bool>, ProtocolError> {
            Ok(Vec::new())
        }

        async fn read_holding_registers(
            &mut self,
            _: u16,
            _: u16,
        ) -> std::result::Result<Vec<u16>, ProtocolError> {
            Ok(Vec::new())
        }

        async fn read_input_registers(
            &mut self,
            _: u16,
            _: u16,
        ) -> std::result::Result<Vec<u16>, ProtocolError> {
            Ok(Vec::new())
        }

        async fn write_coil(&mut self, _: u16, _: bool) -> std::result::Result<(), ProtocolError> {
            Ok(())
        }

        async fn write_register(
            &mut self,
            _: u16,
            _: u16,
        ) -> std::result::Result<(), ProtocolError> {
            Ok(())
        }
    }

    fn client<L: ModbusLink>(link: L) -> DeviceClient<L> {
        DeviceClientBuilder::new(ModbusConfig::new("192.168.1.125")).build_with_link(link)
    }

    #[tokio::test]
    async fn invalid_fan_level_never_reaches_the_link() {
        let client = client(CountingLink::default());

        let err = client.set_fan_mode(FanMode::Level(0)).await.unwrap_err();

        assert!(matches!(err, Error::Value(_)));
        assert_eq!(client.transport.lock().await.link().connects, 0);
    }

    #[tokio::test]
    async fn each_command_is_one_session() {
        let client = client(CountingLink::default());

        client.turn_on().await.unwrap();
        client.set_hvac_mode(HvacMode::Cool).await.unwrap();

        let transport = client.transport.lock().await;
        assert_eq!(transport.link().connects, 2);
        assert_eq!(transport.link().writes, vec![(0, 1), (0, 1), (43, 2)]);
        assert!(!transport.is_connected());
    }

    #[tokio::test]
    async fn hvac_mode_off_only_powers_down() {
        let client = client(CountingLink::default());

        client.set_hvac_mode(HvacMode::Off).await.unwrap();

        assert_eq!(client.transport.lock().await.link().writes, vec![(0, 0)]);
    }

    #[tokio::test]
    async fn link_that_stays_disconnected_is_not_connected_error() {
        let client = client(StuckLink);

        let err = client.turn_on().await.unwrap_err();

        assert!(matches!(err, Error::NotConnected));
        assert!(err.is_connection_failure());
    }

    #[tokio::test]
    async fn snapshot_is_stored_after_poll() {
        let client = client(CountingLink::default());
        assert!(client.snapshot().is_none());

        // All-zero registers report device type 0
        let err = client.poll().await.unwrap_err();
        assert!(err.is_unsupported_device());
        assert!(client.snapshot().is_none());
    }

    #[tokio::test]
    async fn commands_run_on_spawned_tasks() {
        let client = Arc::new(client(CountingLink::default()));

        let handles: Vec<_> = [HvacMode::Heat, HvacMode::Auto]
            .into_iter()
            .map(|mode| {
                let client = Arc::clone(&client);
                tokio::spawn(async move { client.set_hvac_mode(mode).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let transport = client.transport.lock().await;
        assert_eq!(transport.link().connects, 2);
        assert_eq!(transport.link().writes.len(), 4);
    }

    #[cfg(feature = "tcp")]
    #[test]
    fn tcp_client_futures_are_send() {
        fn assert_send<T: Send>(_: T) {}

        let client = DeviceClient::tcp("127.0.0.1").build().unwrap();
        assert_send(client.poll());
        assert_send(client.set_hvac_mode(HvacMode::Cool));
        assert_send(client.set_fan_mode(FanMode::Manual));
        assert_send(client.reset_alarm());
    }

    #[test]
    fn accessors() {
        let client = DeviceClientBuilder::new(ModbusConfig::new("10.0.0.7").with_port(5020))
            .with_action_policy(HvacActionPolicy::OperationMode)
            .build_with_link(CountingLink::default());

        assert_eq!(client.host(), "10.0.0.7");
        assert_eq!(client.port(), 5020);
        assert_eq!(client.action_policy(), HvacActionPolicy::OperationMode);
    }
}
