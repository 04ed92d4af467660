// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fan control types.
//!
//! The S21 runs its fans either at one of a few preset levels or, when the
//! speed register holds [`MANUAL_FAN_MODE`], at a manually set percentage.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;
use crate::registers::MANUAL_FAN_MODE;

/// Selected fan mode.
///
/// Serializes as the raw register value so hosts see `1, 2, 3, 255`.
///
/// # Examples
///
/// ```
/// use bls21_lib::types::FanMode;
///
/// let level = FanMode::level(2).unwrap();
/// assert_eq!(level.to_raw(), 2);
///
/// assert_eq!(FanMode::from_raw(255), FanMode::Manual);
/// assert!(FanMode::level(0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u16", into = "u16")]
pub enum FanMode {
    /// Preset level, starting at 1.
    Level(u16),
    /// Manual speed, see [`FanSpeedPercent`].
    Manual,
}

impl FanMode {
    /// Lowest preset level.
    pub const MIN_LEVEL: u16 = 1;

    /// Highest preset level that does not collide with the manual sentinel.
    pub const MAX_LEVEL: u16 = MANUAL_FAN_MODE - 1;

    /// Creates a preset level.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if `level` is outside [1, 254].
    pub fn level(level: u16) -> Result<Self, ValueError> {
        if !(Self::MIN_LEVEL..=Self::MAX_LEVEL).contains(&level) {
            return Err(ValueError::OutOfRange {
                min: Self::MIN_LEVEL,
                max: Self::MAX_LEVEL,
                actual: level,
            });
        }
        Ok(Self::Level(level))
    }

    /// Interprets a raw speed-mode register value.
    #[must_use]
    pub const fn from_raw(raw: u16) -> Self {
        if raw == MANUAL_FAN_MODE {
            Self::Manual
        } else {
            Self::Level(raw)
        }
    }

    /// Returns the raw register value.
    #[must_use]
    pub const fn to_raw(self) -> u16 {
        match self {
            Self::Level(level) => level,
            Self::Manual => MANUAL_FAN_MODE,
        }
    }

    /// Returns the modes a unit with `max_level` presets offers: every level
    /// from 1 to `max_level`, then manual.
    #[must_use]
    pub fn available(max_level: u16) -> Vec<Self> {
        (Self::MIN_LEVEL..=max_level.min(Self::MAX_LEVEL))
            .map(Self::Level)
            .chain(std::iter::once(Self::Manual))
            .collect()
    }
}

impl From<u16> for FanMode {
    fn from(raw: u16) -> Self {
        Self::from_raw(raw)
    }
}

impl From<FanMode> for u16 {
    fn from(mode: FanMode) -> Self {
        mode.to_raw()
    }
}

impl fmt::Display for FanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Level(level) => write!(f, "level {level}"),
            Self::Manual => f.write_str("manual"),
        }
    }
}

/// Manual fan speed in percent (0-100).
///
/// # Examples
///
/// ```
/// use bls21_lib::types::FanSpeedPercent;
///
/// let speed = FanSpeedPercent::new(42).unwrap();
/// assert_eq!(speed.value(), 42);
/// assert!(FanSpeedPercent::new(101).is_err());
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct FanSpeedPercent(u16);

impl FanSpeedPercent {
    /// Fans stopped.
    pub const MIN: u16 = 0;

    /// Full speed.
    pub const MAX: u16 = 100;

    /// Creates a new fan speed.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if `percent` is above 100.
    pub fn new(percent: u16) -> Result<Self, ValueError> {
        if percent > Self::MAX {
            return Err(ValueError::OutOfRange {
                min: Self::MIN,
                max: Self::MAX,
                actual: percent,
            });
        }
        Ok(Self(percent))
    }

    /// Returns the speed in percent.
    #[must_use]
    pub const fn value(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for FanSpeedPercent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn available_modes_for_three_levels() {
        assert_eq!(
            FanMode::available(3),
            vec![
                FanMode::Level(1),
                FanMode::Level(2),
                FanMode::Level(3),
                FanMode::Manual
            ]
        );
    }

    #[test]
    fn available_modes_without_levels() {
        assert_eq!(FanMode::available(0), vec![FanMode::Manual]);
    }

    #[test]
    fn available_modes_never_repeat_manual() {
        let modes = FanMode::available(u16::MAX);
        assert_eq!(modes.len(), 255);
        assert_eq!(modes.last(), Some(&FanMode::Manual));
        assert_eq!(modes[253], FanMode::Level(254));
    }

    #[test]
    fn serializes_as_raw_values() {
        let json = serde_json::to_string(&FanMode::available(2)).unwrap();
        assert_eq!(json, "[1,2,255]");

        let mode: FanMode = serde_json::from_str("255").unwrap();
        assert_eq!(mode, FanMode::Manual);
    }

    #[test]
    fn level_rejects_sentinel() {
        assert!(FanMode::level(255).is_err());
        assert!(FanMode::level(254).is_ok());
    }

    #[test]
    fn fan_speed_bounds() {
        assert!(FanSpeedPercent::new(0).is_ok());
        assert!(FanSpeedPercent::new(100).is_ok());
        assert_eq!(
            FanSpeedPercent::new(150),
            Err(ValueError::OutOfRange {
                min: 0,
                max: 100,
                actual: 150
            })
        );
    }

    #[test]
    fn display() {
        assert_eq!(FanMode::Level(2).to_string(), "level 2");
        assert_eq!(FanMode::Manual.to_string(), "manual");
        assert_eq!(FanSpeedPercent::new(42).unwrap().to_string(), "42%");
    }
}
