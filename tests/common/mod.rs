// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory S21 used by the integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use bls21_lib::protocol::{ModbusConfig, ModbusLink};
use bls21_lib::{DeviceClient, DeviceClientBuilder, ProtocolError};
use parking_lot::Mutex;

/// Register contents of a simulated unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterBank {
    pub coils: Vec<bool>,
    pub holding: Vec<u16>,
    pub input: Vec<u16>,
}

impl RegisterBank {
    /// A powered-on S21 in fan-only mode at level 2 of 3.
    pub fn s21() -> Self {
        let mut coils = vec![false; 20];
        let mut holding = vec![0; 45];
        let mut input = vec![0; 39];

        coils[0] = true;
        holding[1] = 3;
        holding[2] = 2;
        holding[17] = 100;
        holding[43] = 0;
        holding[44] = 15;
        input[1] = 108;
        input[2] = 192;
        input[10] = 0;
        input[31] = 3;
        input[34] = 36;
        input[35] = 2053;
        input[36] = 2019;
        input[37] = 1;
        input[38] = 2;

        Self {
            coils,
            holding,
            input,
        }
    }
}

/// One request seen by the simulated unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    Connect,
    Close,
    ReadCoils(u16, u16),
    ReadHolding(u16, u16),
    ReadInput(u16, u16),
    WriteCoil(u16, bool),
    WriteRegister(u16, u16),
}

#[derive(Debug)]
struct Shared {
    bank: RegisterBank,
    calls: Vec<Call>,
    failing_connects: usize,
    failing_requests: usize,
    rejected_requests: usize,
}

/// Handle on a simulated unit, shared by the test and its links.
#[derive(Debug, Clone)]
pub struct SimulatedDevice {
    shared: Arc<Mutex<Shared>>,
}

impl SimulatedDevice {
    pub fn new(bank: RegisterBank) -> Self {
        Self {
            shared: Arc::new(Mutex::new(Shared {
                bank,
                calls: Vec::new(),
                failing_connects: 0,
                failing_requests: 0,
                rejected_requests: 0,
            })),
        }
    }

    pub fn s21() -> Self {
        Self::new(RegisterBank::s21())
    }

    /// Creates a link to this unit.
    pub fn link(&self) -> SimulatedLink {
        SimulatedLink {
            device: self.clone(),
            connected: false,
        }
    }

    /// Creates a client whose every session goes to this unit.
    pub fn client(&self) -> DeviceClient<SimulatedLink> {
        self.client_with(DeviceClientBuilder::new(ModbusConfig::new("192.168.1.125")))
    }

    pub fn client_with(&self, builder: DeviceClientBuilder) -> DeviceClient<SimulatedLink> {
        builder.build_with_link(self.link())
    }

    pub fn bank(&self) -> RegisterBank {
        self.shared.lock().bank.clone()
    }

    pub fn update(&self, f: impl FnOnce(&mut RegisterBank)) {
        f(&mut self.shared.lock().bank);
    }

    /// Makes the next `n` connection attempts fail.
    pub fn fail_connects(&self, n: usize) {
        self.shared.lock().failing_connects = n;
    }

    /// Makes the next `n` requests drop the connection.
    pub fn fail_requests(&self, n: usize) {
        self.shared.lock().failing_requests = n;
    }

    /// Makes the next `n` requests answer with a Modbus exception.
    pub fn reject_requests(&self, n: usize) {
        self.shared.lock().rejected_requests = n;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.shared.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.shared.lock().calls.clear();
    }

    /// Writes seen so far, in order.
    pub fn writes(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| matches!(call, Call::WriteCoil(..) | Call::WriteRegister(..)))
            .collect()
    }

    /// Groups the call log into sessions, panicking if one opens before the
    /// previous one closed.
    pub fn sessions(&self) -> Vec<Vec<Call>> {
        let mut sessions = Vec::new();
        let mut current: Option<Vec<Call>> = None;

        for call in self.calls() {
            match call {
                // A second connect within a session is a reconnect
                Call::Connect => {
                    current.get_or_insert_with(Vec::new);
                }
                Call::Close => sessions.extend(current.take()),
                call => match current.as_mut() {
                    Some(session) => session.push(call),
                    None => panic!("{call:?} outside of a session"),
                },
            }
        }

        assert!(current.is_none(), "session left open");
        sessions
    }

    fn request<T>(
        &self,
        call: Call,
        function: &'static str,
        respond: impl FnOnce(&mut RegisterBank) -> T,
    ) -> Result<T, ProtocolError> {
        let mut shared = self.shared.lock();
        shared.calls.push(call);

        if shared.failing_requests > 0 {
            shared.failing_requests -= 1;
            return Err(ProtocolError::ConnectionFailed(
                "connection reset by peer".to_string(),
            ));
        }
        if shared.rejected_requests > 0 {
            shared.rejected_requests -= 1;
            return Err(ProtocolError::Exception {
                function,
                code: "IllegalDataAddress".to_string(),
            });
        }
        Ok(respond(&mut shared.bank))
    }
}

/// Link into a [`SimulatedDevice`].
#[derive(Debug)]
pub struct SimulatedLink {
    device: SimulatedDevice,
    connected: bool,
}

impl SimulatedLink {
    async fn request<T>(
        &mut self,
        call: Call,
        function: &'static str,
        respond: impl FnOnce(&mut RegisterBank) -> T,
    ) -> Result<T, ProtocolError> {
        tokio::task::yield_now().await;

        if !self.connected {
            return Err(ProtocolError::ConnectionFailed("not connected".to_string()));
        }
        let result = self.device.request(call, function, respond);
        if matches!(&result, Err(err) if err.is_connection_failure()) {
            self.connected = false;
        }
        result
    }
}

fn window<T: Copy>(region: &[T], address: u16, count: u16) -> Vec<T> {
    let start = usize::from(address).min(region.len());
    let end = (start + usize::from(count)).min(region.len());
    region[start..end].to_vec()
}

impl ModbusLink for SimulatedLink {
    fn is_connected(&self) -> bool {
        self.connected
    }

    async fn connect(&mut self) -> Result<(), ProtocolError> {
        tokio::task::yield_now().await;

        let mut shared = self.device.shared.lock();
        shared.calls.push(Call::Connect);
        if shared.failing_connects > 0 {
            shared.failing_connects -= 1;
            return Err(ProtocolError::ConnectionFailed(
                "connection refused".to_string(),
            ));
        }
        self.connected = true;
        Ok(())
    }

    async fn close(&mut self) {
        tokio::task::yield_now().await;

        self.device.shared.lock().calls.push(Call::Close);
        self.connected = false;
    }

    async fn read_coils(&mut self, address: u16, count: u16) -> Result<Vec<bool>, ProtocolError> {
        self.request(Call::ReadCoils(address, count), "read coils", |bank| {
            window(&bank.coils, address, count)
        })
        .await
    }

    async fn read_holding_registers(
        &mut self,
        address: u16,
        count: u16,
    ) -> Result<Vec<u16>, ProtocolError> {
        self.request(
            Call::ReadHolding(address, count),
            "read holding registers",
            |bank| window(&bank.holding, address, count),
        )
        .await
    }

    async fn read_input_registers(
        &mut self,
        address: u16,
        count: u16,
    ) -> Result<Vec<u16>, ProtocolError> {
        self.request(
            Call::ReadInput(address, count),
            "read input registers",
            |bank| window(&bank.input, address, count),
        )
        .await
    }

    async fn write_coil(&mut self, address: u16, value: bool) -> Result<(), ProtocolError> {
        self.request(Call::WriteCoil(address, value), "write coil", |bank| {
            bank.coils[usize::from(address)] = value;
        })
        .await
    }

    async fn write_register(&mut self, address: u16, value: u16) -> Result<(), ProtocolError> {
        self.request(
            Call::WriteRegister(address, value),
            "write register",
            |bank| bank.holding[usize::from(address)] = value,
        )
        .await
    }
}
