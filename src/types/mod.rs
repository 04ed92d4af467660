// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for S21 monitoring and control.
//!
//! Command arguments are validated at construction time, so an out-of-range
//! value is rejected before a connection to the device is even opened.
//!
//! # Types
//!
//! - [`HvacMode`] / [`HvacAction`] - Climate mode and current action
//! - [`HvacActionPolicy`] - How the action is derived for heat/cool modes
//! - [`TargetTemperature`] - Set point in °C (15-30)
//! - [`FanMode`] - Preset fan level or manual speed
//! - [`FanSpeedPercent`] - Manual fan speed (0-100%)
//! - [`FirmwareVersion`] - Decoded firmware version and build date

mod fan;
mod firmware;
mod hvac;
mod temperature;

pub use fan::{FanMode, FanSpeedPercent};
pub use firmware::FirmwareVersion;
pub use hvac::{HvacAction, HvacActionPolicy, HvacMode};
pub use temperature::{TEMPERATURE_PRECISION, TEMPERATURE_UNIT, TargetTemperature};
