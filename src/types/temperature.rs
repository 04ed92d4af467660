// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Target temperature type.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// Unit of every temperature reported by the S21.
pub const TEMPERATURE_UNIT: &str = "°C";

/// Display precision of reported temperatures, in degrees.
pub const TEMPERATURE_PRECISION: f32 = 1.0;

/// Target supply air temperature in whole degrees Celsius (15-30).
///
/// # Examples
///
/// ```
/// use bls21_lib::types::TargetTemperature;
///
/// let target = TargetTemperature::new(21).unwrap();
/// assert_eq!(target.celsius(), 21);
///
/// assert!(TargetTemperature::new(14).is_err());
/// assert!(TargetTemperature::new(31).is_err());
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct TargetTemperature(u16);

impl TargetTemperature {
    /// Lowest accepted set point.
    pub const MIN: u16 = 15;

    /// Highest accepted set point.
    pub const MAX: u16 = 30;

    /// Set point granularity.
    pub const STEP: u16 = 1;

    /// Creates a new target temperature.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if `celsius` is outside [15, 30].
    pub fn new(celsius: u16) -> Result<Self, ValueError> {
        if !(Self::MIN..=Self::MAX).contains(&celsius) {
            return Err(ValueError::OutOfRange {
                min: Self::MIN,
                max: Self::MAX,
                actual: celsius,
            });
        }
        Ok(Self(celsius))
    }

    /// Creates a target temperature, clamping to the valid range.
    #[must_use]
    pub const fn clamped(celsius: u16) -> Self {
        if celsius < Self::MIN {
            Self(Self::MIN)
        } else if celsius > Self::MAX {
            Self(Self::MAX)
        } else {
            Self(celsius)
        }
    }

    /// Returns the temperature in degrees Celsius.
    #[must_use]
    pub const fn celsius(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for TargetTemperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{TEMPERATURE_UNIT}", self.0)
    }
}

impl TryFrom<u16> for TargetTemperature {
    type Error = ValueError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_are_inclusive() {
        assert_eq!(TargetTemperature::new(15).unwrap().celsius(), 15);
        assert_eq!(TargetTemperature::new(30).unwrap().celsius(), 30);
    }

    #[test]
    fn out_of_range_reports_bounds() {
        assert_eq!(
            TargetTemperature::new(0),
            Err(ValueError::OutOfRange {
                min: 15,
                max: 30,
                actual: 0
            })
        );
    }

    #[test]
    fn clamped() {
        assert_eq!(TargetTemperature::clamped(3).celsius(), 15);
        assert_eq!(TargetTemperature::clamped(22).celsius(), 22);
        assert_eq!(TargetTemperature::clamped(99).celsius(), 30);
    }

    #[test]
    fn display() {
        assert_eq!(TargetTemperature::new(20).unwrap().to_string(), "20°C");
    }
}
