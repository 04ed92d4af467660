// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Raw register parsing.
//!
//! [`RegisterReadings::parse`] picks the fields the S21 exposes out of the
//! three polled regions by direct index. Only the register encoding is
//! applied here (temperatures are signed); sentinels and packed fields are
//! interpreted by the domain types.

use crate::error::ProtocolError;
use crate::registers::{
    self, COIL_POLL_COUNT, Coil, FIRMWARE_REGISTER_COUNT, HOLDING_POLL_COUNT, HoldingRegister,
    INPUT_POLL_COUNT, InputRegister,
};

/// Raw fields of one poll, one per register of interest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterReadings {
    /// Power coil.
    pub is_on: bool,
    /// Boost mode coil.
    pub is_boosting: bool,
    /// Set point in whole °C.
    pub target_temperature: u16,
    /// Relative humidity, 0 when no sensor is fitted.
    pub humidity: u16,
    /// Filter state code.
    pub filter_state: u16,
    /// Alarm state code.
    pub alarm_state: u16,
    /// Number of preset fan levels.
    pub max_fan_level: u16,
    /// Selected fan level or the manual sentinel.
    pub fan_level: u16,
    /// Manual fan speed in percent.
    pub manual_fan_speed: u16,
    /// Raw operation mode.
    pub operation_mode: u16,
    /// Supply air temperature before the heater, tenths of °C.
    pub temp_supply_in: i16,
    /// Supply air temperature after the heater, tenths of °C.
    pub temp_supply_out: i16,
    /// The three firmware version registers.
    pub firmware: [u16; FIRMWARE_REGISTER_COUNT],
    /// Supply fan speed, if the register map has one.
    pub supply_fan_speed: Option<u16>,
    /// Extract fan speed, if the register map has one.
    pub extract_fan_speed: Option<u16>,
}

impl RegisterReadings {
    /// Parses the coil, holding and input register regions of one poll.
    ///
    /// Each region must start at offset 0 and cover its poll window.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::ShortResponse` if a region is shorter than
    /// its poll window.
    pub fn parse(coils: &[bool], holding: &[u16], input: &[u16]) -> Result<Self, ProtocolError> {
        check_len(coils.len(), COIL_POLL_COUNT)?;
        check_len(holding.len(), HOLDING_POLL_COUNT)?;
        check_len(input.len(), INPUT_POLL_COUNT)?;

        let coil_at = |c: Coil| coils[usize::from(c.address())];
        let holding_at = |r: HoldingRegister| holding[usize::from(r.address())];
        let input_at = |r: InputRegister| input[usize::from(r.address())];

        let start = usize::from(InputRegister::FirmwareStart.address());
        let mut firmware = [0; FIRMWARE_REGISTER_COUNT];
        firmware.copy_from_slice(&input[start..start + FIRMWARE_REGISTER_COUNT]);

        Ok(Self {
            is_on: coil_at(Coil::Power),
            is_boosting: coil_at(Coil::BoostMode),
            target_temperature: holding_at(HoldingRegister::SetTemperature),
            humidity: input_at(InputRegister::Humidity),
            filter_state: input_at(InputRegister::FilterState),
            alarm_state: input_at(InputRegister::Alarm),
            max_fan_level: holding_at(HoldingRegister::MaxSpeedMode),
            fan_level: holding_at(HoldingRegister::SpeedMode),
            manual_fan_speed: holding_at(HoldingRegister::ManualSpeed),
            operation_mode: holding_at(HoldingRegister::OperationMode),
            temp_supply_in: signed(input_at(InputRegister::TempSupplyIn)),
            temp_supply_out: signed(input_at(InputRegister::TempSupplyOut)),
            firmware,
            supply_fan_speed: registers::SUPPLY_FAN_SPEED.map(input_at),
            extract_fan_speed: registers::EXTRACT_FAN_SPEED.map(input_at),
        })
    }
}

fn check_len(actual: usize, expected: u16) -> Result<(), ProtocolError> {
    let expected = usize::from(expected);
    if actual < expected {
        return Err(ProtocolError::ShortResponse { expected, actual });
    }
    Ok(())
}

/// Reinterprets a register as two's complement.
#[allow(clippy::cast_possible_wrap)]
const fn signed(raw: u16) -> i16 {
    raw as i16
}

/// Converts tenths of a degree to degrees.
#[must_use]
pub fn tenths_to_celsius(tenths: i16) -> f32 {
    f32::from(tenths) / 10.0
}
