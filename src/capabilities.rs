// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Climate entity feature flags.
//!
//! Host integrations use these flags to decide which controls to offer. The
//! bit values follow the common climate-entity numbering, so the raw value
//! can be handed to a host unchanged.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};

/// Set of features a climate device supports.
///
/// # Examples
///
/// ```
/// use bls21_lib::SupportedFeatures;
///
/// let features = SupportedFeatures::s21();
/// assert!(features.contains(SupportedFeatures::TARGET_TEMPERATURE));
/// assert!(features.contains(SupportedFeatures::FAN_MODE));
/// assert_eq!(features.bits(), 9);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SupportedFeatures(u32);

impl SupportedFeatures {
    /// The set point can be changed.
    pub const TARGET_TEMPERATURE: Self = Self(1);

    /// The fan mode can be changed.
    pub const FAN_MODE: Self = Self(8);

    /// Creates an empty feature set.
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Features of the Blauberg S21.
    #[must_use]
    pub const fn s21() -> Self {
        Self(Self::TARGET_TEMPERATURE.0 | Self::FAN_MODE.0)
    }

    /// Returns the raw bit set.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Returns `true` if every flag in `other` is set.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns `true` if no flag is set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for SupportedFeatures {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for SupportedFeatures {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for SupportedFeatures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = Vec::new();
        if self.contains(Self::TARGET_TEMPERATURE) {
            names.push("target_temperature");
        }
        if self.contains(Self::FAN_MODE) {
            names.push("fan_mode");
        }
        write!(f, "[{}]", names.join(", "))
    }
}
