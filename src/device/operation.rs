// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Units of work run by [`DeviceClient::with_connection`].

use std::sync::Arc;

use crate::device::DeviceClient;
use crate::error::{DeviceError, ProtocolError, Result};
use crate::protocol::{ModbusLink, RetryingTransport};
use crate::registers::{
    COIL_POLL_COUNT, Coil, HOLDING_POLL_COUNT, HoldingRegister, INPUT_POLL_COUNT, InputRegister,
    SUPPORTED_DEVICE_TYPE,
};
use crate::state::{ClimateState, DeviceIdentity, DeviceSnapshot, RegisterReadings};
use crate::types::FirmwareVersion;

/// Work done against an open transport, inside one session.
///
/// The returned future is `Send`, so every public client method stays
/// spawnable whatever the operation.
pub(crate) trait Operation<L: ModbusLink>: Send {
    type Output: Send;

    fn run(
        self,
        transport: &mut RetryingTransport<L>,
    ) -> impl Future<Output = Result<Self::Output>> + Send;
}

/// Full state read. Stores the snapshot on the client before returning it.
pub(crate) struct ReadSnapshot<'c, L: ModbusLink> {
    pub(crate) client: &'c DeviceClient<L>,
}

impl<L: ModbusLink> Operation<L> for ReadSnapshot<'_, L> {
    type Output = Arc<DeviceSnapshot>;

    async fn run(self, transport: &mut RetryingTransport<L>) -> Result<Arc<DeviceSnapshot>> {
        let device_type = transport
            .read_input_registers(InputRegister::DeviceType.address(), 1)
            .await?
            .first()
            .copied()
            .ok_or(ProtocolError::EmptyResponse("read device type"))?;

        if device_type != SUPPORTED_DEVICE_TYPE {
            return Err(DeviceError::UnsupportedDevice {
                device_type,
                expected: SUPPORTED_DEVICE_TYPE,
            }
            .into());
        }

        let coils = transport.read_coils(0, COIL_POLL_COUNT).await?;
        let holding = transport
            .read_holding_registers(0, HOLDING_POLL_COUNT)
            .await?;
        let input = transport.read_input_registers(0, INPUT_POLL_COUNT).await?;

        let client = self.client;
        let readings = RegisterReadings::parse(&coils, &holding, &input)?;
        let identity = DeviceIdentity::s21(
            client.host(),
            client.port(),
            FirmwareVersion::from_registers(readings.firmware),
        );
        let state = ClimateState::derive(&readings, client.action_policy());
        let snapshot = Arc::new(DeviceSnapshot::new(identity, state));

        client.store(Arc::clone(&snapshot));
        Ok(snapshot)
    }
}

/// Single coil write.
#[derive(Debug, Clone, Copy)]
pub(crate) struct WriteCoil {
    pub(crate) coil: Coil,
    pub(crate) value: bool,
}

impl<L: ModbusLink> Operation<L> for WriteCoil {
    type Output = ();

    async fn run(self, transport: &mut RetryingTransport<L>) -> Result<()> {
        transport.write_coil(self.coil.address(), self.value).await?;
        Ok(())
    }
}

/// Single holding register write.
#[derive(Debug, Clone, Copy)]
pub(crate) struct WriteRegister {
    pub(crate) register: HoldingRegister,
    pub(crate) value: u16,
}

impl<L: ModbusLink> Operation<L> for WriteRegister {
    type Output = ();

    async fn run(self, transport: &mut RetryingTransport<L>) -> Result<()> {
        transport
            .write_register(self.register.address(), self.value)
            .await?;
        Ok(())
    }
}

/// Power on, then select an operation mode.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PowerOnWithMode {
    pub(crate) operation_mode: u16,
}

impl<L: ModbusLink> Operation<L> for PowerOnWithMode {
    type Output = ();

    async fn run(self, transport: &mut RetryingTransport<L>) -> Result<()> {
        transport.write_coil(Coil::Power.address(), true).await?;
        transport
            .write_register(HoldingRegister::OperationMode.address(), self.operation_mode)
            .await?;
        Ok(())
    }
}
