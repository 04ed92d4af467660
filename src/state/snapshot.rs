// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device snapshot produced by a poll.

use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Serialize, Serializer};

use crate::capabilities::SupportedFeatures;
use crate::state::decode::{RegisterReadings, tenths_to_celsius};
use crate::types::{
    FanMode, FirmwareVersion, HvacAction, HvacActionPolicy, HvacMode, TEMPERATURE_PRECISION,
    TEMPERATURE_UNIT, TargetTemperature,
};

/// Who the device is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceIdentity {
    /// Display name.
    pub name: String,
    /// Stable identifier derived from the connection address and model.
    pub unique_id: String,
    /// Manufacturer name.
    pub manufacturer: String,
    /// Model name.
    pub model: String,
    /// Firmware version string, e.g. `0.36 (2019-05-08)`.
    pub sw_version: String,
    /// Structured firmware version.
    #[serde(skip)]
    pub firmware: FirmwareVersion,
}

impl DeviceIdentity {
    /// Model name of the supported unit.
    pub const MODEL: &'static str = "S21";
    /// Manufacturer of the supported unit.
    pub const MANUFACTURER: &'static str = "Blauberg";

    /// Identity of an S21 reached at `host:port`.
    #[must_use]
    pub fn s21(host: &str, port: u16, firmware: FirmwareVersion) -> Self {
        Self {
            name: format!("{} {}", Self::MANUFACTURER, Self::MODEL),
            unique_id: format!("{}_{host}_{port}", Self::MODEL),
            manufacturer: Self::MANUFACTURER.to_string(),
            model: Self::MODEL.to_string(),
            sw_version: firmware.to_string(),
            firmware,
        }
    }
}

/// Climate state decoded from one poll.
///
/// Every field is a pure function of the polled registers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClimateState {
    /// Supply air temperature after the heater in °C.
    pub current_temperature: f32,
    /// Set point in whole °C.
    pub target_temperature: u16,
    /// Supply air temperature before the heater in °C.
    pub current_intake_temperature: f32,
    /// Relative humidity in percent, `None` when no sensor is fitted.
    pub current_humidity: Option<u16>,
    /// Current mode.
    pub hvac_mode: HvacMode,
    /// Current action.
    pub hvac_action: HvacAction,
    /// Current fan mode.
    pub fan_mode: FanMode,
    /// Fan modes the unit offers.
    pub fan_modes: Vec<FanMode>,
    /// Number of preset fan levels.
    pub max_fan_level: u16,
    /// Fan speed used in manual fan mode, in percent.
    pub manual_fan_speed_percent: u16,
    /// Boost ventilation active.
    pub is_boosting: bool,
    /// Filter state code.
    pub filter_state: u16,
    /// Alarm state code.
    pub alarm_state: u16,
    /// Supply fan speed, when the unit reports it.
    pub supply_fan_speed: Option<u16>,
    /// Extract fan speed, when the unit reports it.
    pub extract_fan_speed: Option<u16>,
    /// Controls the unit supports.
    pub supported_features: SupportedFeatures,
}

impl ClimateState {
    /// Derives the domain state from parsed registers.
    #[must_use]
    pub fn derive(readings: &RegisterReadings, policy: HvacActionPolicy) -> Self {
        let hvac_mode = if readings.is_on {
            HvacMode::from_operation_mode(readings.operation_mode)
        } else {
            HvacMode::Off
        };

        let hvac_action = policy.derive(
            readings.is_on,
            readings.operation_mode,
            readings.temp_supply_in,
            readings.temp_supply_out,
        );

        Self {
            current_temperature: tenths_to_celsius(readings.temp_supply_out),
            target_temperature: readings.target_temperature,
            current_intake_temperature: tenths_to_celsius(readings.temp_supply_in),
            current_humidity: (readings.humidity != 0).then_some(readings.humidity),
            hvac_mode,
            hvac_action,
            fan_mode: FanMode::from_raw(readings.fan_level),
            fan_modes: FanMode::available(readings.max_fan_level),
            max_fan_level: readings.max_fan_level,
            manual_fan_speed_percent: readings.manual_fan_speed,
            is_boosting: readings.is_boosting,
            filter_state: readings.filter_state,
            alarm_state: readings.alarm_state,
            supply_fan_speed: readings.supply_fan_speed,
            extract_fan_speed: readings.extract_fan_speed,
            supported_features: SupportedFeatures::s21(),
        }
    }
}

/// One fully decoded, self-consistent view of the device.
///
/// Snapshots are shared as `Arc<DeviceSnapshot>`. Availability is the only
/// mutable part: when an operation fails, the client flips it on the very
/// instance every reader holds, so stale data stays visible but marked.
///
/// # Examples
///
/// ```no_run
/// use bls21_lib::DeviceClient;
///
/// # async fn example() -> bls21_lib::Result<()> {
/// let client = DeviceClient::tcp("192.168.1.125").build()?;
/// let snapshot = client.poll().await?;
///
/// if client.turn_on().await.is_err() {
///     // Same instance, now flagged
///     assert!(!snapshot.is_available());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct DeviceSnapshot {
    available: AtomicBool,
    identity: DeviceIdentity,
    state: ClimateState,
}

impl DeviceSnapshot {
    /// Creates an available snapshot.
    #[must_use]
    pub fn new(identity: DeviceIdentity, state: ClimateState) -> Self {
        Self {
            available: AtomicBool::new(true),
            identity,
            state,
        }
    }

    /// Returns `false` once an operation failed after this snapshot was taken.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::Relaxed)
    }

    /// Flags the snapshot as stale.
    pub(crate) fn mark_unavailable(&self) {
        self.available.store(false, Ordering::Relaxed);
    }

    /// Returns the device identity.
    #[must_use]
    pub fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    /// Returns the decoded climate state.
    #[must_use]
    pub fn state(&self) -> &ClimateState {
        &self.state
    }

    /// Returns the modes [`set_hvac_mode`](crate::DeviceClient::set_hvac_mode) accepts.
    #[must_use]
    pub fn hvac_modes(&self) -> &'static [HvacMode] {
        &HvacMode::ALL
    }

    /// Returns the unit of every temperature in the snapshot.
    #[must_use]
    pub fn temperature_unit(&self) -> &'static str {
        TEMPERATURE_UNIT
    }

    /// Returns the lowest accepted set point.
    #[must_use]
    pub fn min_temp(&self) -> u16 {
        TargetTemperature::MIN
    }

    /// Returns the highest accepted set point.
    #[must_use]
    pub fn max_temp(&self) -> u16 {
        TargetTemperature::MAX
    }

    /// Returns the set point granularity.
    #[must_use]
    pub fn target_temperature_step(&self) -> u16 {
        TargetTemperature::STEP
    }

    /// Returns the precision temperatures should be displayed with.
    #[must_use]
    pub fn precision(&self) -> f32 {
        TEMPERATURE_PRECISION
    }
}

impl Clone for DeviceSnapshot {
    fn clone(&self) -> Self {
        Self {
            available: AtomicBool::new(self.is_available()),
            identity: self.identity.clone(),
            state: self.state.clone(),
        }
    }
}

impl PartialEq for DeviceSnapshot {
    fn eq(&self, other: &Self) -> bool {
        self.is_available() == other.is_available()
            && self.identity == other.identity
            && self.state == other.state
    }
}

impl Serialize for DeviceSnapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Repr<'a> {
            available: bool,
            #[serde(flatten)]
            identity: &'a DeviceIdentity,
            temperature_unit: &'static str,
            min_temp: u16,
            max_temp: u16,
            target_temperature_step: u16,
            precision: f32,
            hvac_modes: &'static [HvacMode],
            #[serde(flatten)]
            state: &'a ClimateState,
        }

        Repr {
            available: self.is_available(),
            identity: &self.identity,
            temperature_unit: self.temperature_unit(),
            min_temp: self.min_temp(),
            max_temp: self.max_temp(),
            target_temperature_step: self.target_temperature_step(),
            precision: self.precision(),
            hvac_modes: self.hvac_modes(),
            state: &self.state,
        }
        .serialize(serializer)
    }
}
