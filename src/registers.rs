// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Modbus register map of the Blauberg S21 controller.
//!
//! Addresses are 0-based offsets within each Modbus region. The poll path
//! reads each region once as a batch starting at offset 0, so every address
//! used for decoding must fall inside the corresponding `*_POLL_COUNT`
//! window.

/// Single-bit read/write registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Coil {
    /// Unit on/off.
    Power,
    /// Boost ventilation active.
    BoostMode,
    /// Enables the external boost switch input.
    BoostSwitchControl,
    /// Writing `true` restarts the filter replacement countdown.
    ResetFilterTimer,
    /// Writing `true` clears all active alarms.
    ResetAlarm,
}

impl Coil {
    /// Returns the coil offset.
    #[must_use]
    pub const fn address(self) -> u16 {
        match self {
            Self::Power => 0,
            Self::BoostMode => 3,
            Self::BoostSwitchControl => 13,
            Self::ResetFilterTimer => 17,
            Self::ResetAlarm => 18,
        }
    }
}

/// 16-bit read/write registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HoldingRegister {
    /// Number of discrete fan levels configured on the unit.
    MaxSpeedMode,
    /// Selected fan level, or [`MANUAL_FAN_MODE`].
    SpeedMode,
    /// Fan speed in percent used while in manual fan mode.
    ManualSpeed,
    /// Raw operation mode (0 fan, 1 heat, 2 cool, 3 auto).
    OperationMode,
    /// Target supply temperature in whole °C.
    SetTemperature,
}

impl HoldingRegister {
    /// Returns the register offset.
    #[must_use]
    pub const fn address(self) -> u16 {
        match self {
            Self::MaxSpeedMode => 1,
            Self::SpeedMode => 2,
            Self::ManualSpeed => 17,
            Self::OperationMode => 43,
            Self::SetTemperature => 44,
        }
    }
}

/// 16-bit read-only registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputRegister {
    /// Supply air temperature before the heater, tenths of °C.
    TempSupplyIn,
    /// Supply air temperature after the heater, tenths of °C.
    TempSupplyOut,
    /// Relative humidity in percent, 0 when no sensor is fitted.
    Humidity,
    /// Filter state code.
    FilterState,
    /// First of the three firmware version registers.
    FirmwareStart,
    /// Last of the three firmware version registers.
    FirmwareEnd,
    /// Product identifier, [`SUPPORTED_DEVICE_TYPE`] for an S21.
    DeviceType,
    /// Alarm state code.
    Alarm,
}

impl InputRegister {
    /// Returns the register offset.
    #[must_use]
    pub const fn address(self) -> u16 {
        match self {
            Self::TempSupplyIn => 1,
            Self::TempSupplyOut => 2,
            Self::Humidity => 10,
            Self::FilterState => 31,
            Self::FirmwareStart => 34,
            Self::FirmwareEnd => 36,
            Self::DeviceType => 37,
            Self::Alarm => 38,
        }
    }
}

/// Value of [`InputRegister::DeviceType`] reported by an S21.
pub const SUPPORTED_DEVICE_TYPE: u16 = 1;

/// Fan level sentinel meaning "manual speed".
pub const MANUAL_FAN_MODE: u16 = 255;

/// Number of coils read per poll, starting at offset 0.
pub const COIL_POLL_COUNT: u16 = 4;

/// Number of holding registers read per poll, starting at offset 0.
pub const HOLDING_POLL_COUNT: u16 = 45;

/// Number of input registers read per poll, starting at offset 0.
pub const INPUT_POLL_COUNT: u16 = 39;

/// Number of registers holding the firmware version.
pub const FIRMWARE_REGISTER_COUNT: usize = 3;

/// Supply fan tachometer register. The S21 firmware does not expose one.
pub const SUPPLY_FAN_SPEED: Option<InputRegister> = None;

/// Extract fan tachometer register. The S21 firmware does not expose one.
pub const EXTRACT_FAN_SPEED: Option<InputRegister> = None;
