// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HVAC mode and action types.
//!
//! The S21 only stores a power coil and a raw operation mode. [`HvacMode`]
//! combines both into the mode a climate entity exposes, and [`HvacAction`]
//! describes what the unit is doing right now, derived from the mode and the
//! air temperatures around the heater.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// Operating mode requested from the unit.
///
/// # Examples
///
/// ```
/// use bls21_lib::types::HvacMode;
///
/// assert_eq!(HvacMode::from_operation_mode(1), HvacMode::Heat);
/// assert_eq!(HvacMode::Heat.operation_mode(), Some(1));
/// assert_eq!(HvacMode::Off.operation_mode(), None);
/// assert_eq!("fan_only".parse::<HvacMode>().unwrap(), HvacMode::FanOnly);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HvacMode {
    /// Unit is powered off.
    Off,
    /// Heating.
    Heat,
    /// Cooling.
    Cool,
    /// Heating or cooling as needed.
    Auto,
    /// Ventilation only.
    FanOnly,
}

impl HvacMode {
    /// Every mode the S21 supports, in the order hosts list them.
    pub const ALL: [Self; 5] = [Self::Off, Self::Heat, Self::Cool, Self::Auto, Self::FanOnly];

    /// Maps a raw operation mode of a powered unit to a mode.
    ///
    /// Unrecognized values are reported as [`HvacMode::Auto`].
    #[must_use]
    pub const fn from_operation_mode(raw: u16) -> Self {
        match raw {
            0 => Self::FanOnly,
            1 => Self::Heat,
            2 => Self::Cool,
            _ => Self::Auto,
        }
    }

    /// Returns the raw operation mode to write, or `None` for [`HvacMode::Off`].
    #[must_use]
    pub const fn operation_mode(self) -> Option<u16> {
        match self {
            Self::Off => None,
            Self::FanOnly => Some(0),
            Self::Heat => Some(1),
            Self::Cool => Some(2),
            Self::Auto => Some(3),
        }
    }

    /// Returns the identifier used in serialized state.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Heat => "heat",
            Self::Cool => "cool",
            Self::Auto => "auto",
            Self::FanOnly => "fan_only",
        }
    }
}

impl fmt::Display for HvacMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HvacMode {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "off" => Ok(Self::Off),
            "heat" => Ok(Self::Heat),
            "cool" => Ok(Self::Cool),
            "auto" => Ok(Self::Auto),
            "fan_only" | "fan" => Ok(Self::FanOnly),
            _ => Err(ValueError::InvalidHvacMode(s.to_string())),
        }
    }
}

/// What the unit is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HvacAction {
    /// Unit is powered off.
    Off,
    /// Only the fans are running.
    Fan,
    /// Supply air leaves warmer than it came in.
    Heating,
    /// Supply air leaves cooler than it came in.
    Cooling,
    /// Supply air temperature is not being changed.
    Idle,
}

impl HvacAction {
    /// Returns the identifier used in serialized state.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Fan => "fan",
            Self::Heating => "heating",
            Self::Cooling => "cooling",
            Self::Idle => "idle",
        }
    }
}

impl fmt::Display for HvacAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How [`HvacAction`] is derived for a powered unit outside fan-only mode.
///
/// Firmware revisions disagree on whether heat and cool modes should report
/// their nominal action or the measured one, so the choice is left to the
/// caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HvacActionPolicy {
    /// Always compare intake and supply temperatures: warmer supply air is
    /// heating, cooler is cooling, equal is idle.
    #[default]
    TemperatureComparison,
    /// Heat mode reports heating and cool mode reports cooling. Auto mode
    /// falls back to the temperature comparison.
    OperationMode,
}

impl HvacActionPolicy {
    /// Derives the current action.
    ///
    /// `intake` and `supply` are the air temperatures before and after the
    /// heater in the device's raw unit; only their ordering matters.
    #[must_use]
    pub fn derive(self, is_on: bool, operation_mode: u16, intake: i16, supply: i16) -> HvacAction {
        if !is_on {
            return HvacAction::Off;
        }

        match (self, HvacMode::from_operation_mode(operation_mode)) {
            (_, HvacMode::FanOnly) => HvacAction::Fan,
            (Self::OperationMode, HvacMode::Heat) => HvacAction::Heating,
            (Self::OperationMode, HvacMode::Cool) => HvacAction::Cooling,
            _ => match intake.cmp(&supply) {
                std::cmp::Ordering::Less => HvacAction::Heating,
                std::cmp::Ordering::Greater => HvacAction::Cooling,
                std::cmp::Ordering::Equal => HvacAction::Idle,
            },
        }
    }
}
