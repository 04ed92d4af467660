// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Firmware version decoding.
//!
//! The controller packs its main firmware version into three consecutive
//! input registers:
//!
//! | Register | High byte | Low byte |
//! |----------|-----------|----------|
//! | 0        | major     | minor    |
//! | 1        | day       | month    |
//! | 2        | year (full 16 bits)  ||
//!
//! # Examples
//!
//! ```
//! use bls21_lib::types::FirmwareVersion;
//!
//! let version = FirmwareVersion::from_registers([36, 2053, 2019]);
//! assert_eq!(version.to_string(), "0.36 (2019-05-08)");
//!
//! // Use chrono for anything beyond the canonical format
//! let date = version.build_date().unwrap();
//! assert_eq!(date.format("%d/%m/%Y").to_string(), "08/05/2019");
//! ```

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::registers::FIRMWARE_REGISTER_COUNT;

/// Decoded firmware version and build date.
///
/// The date fields are kept as reported; [`build_date`](Self::build_date)
/// validates them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FirmwareVersion {
    /// Major version.
    pub major: u8,
    /// Minor version.
    pub minor: u8,
    /// Build day of month.
    pub day: u8,
    /// Build month.
    pub month: u8,
    /// Build year.
    pub year: u16,
}

impl FirmwareVersion {
    /// Decodes the three firmware registers.
    #[must_use]
    pub const fn from_registers(registers: [u16; FIRMWARE_REGISTER_COUNT]) -> Self {
        let [major, minor] = registers[0].to_be_bytes();
        let [day, month] = registers[1].to_be_bytes();

        Self {
            major,
            minor,
            day,
            month,
            year: registers[2],
        }
    }

    /// Returns the build date, or `None` if the registers hold no valid date.
    #[must_use]
    pub fn build_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(
            i32::from(self.year),
            u32::from(self.month),
            u32::from(self.day),
        )
    }
}

impl fmt::Display for FirmwareVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{} ({}-{:02}-{:02})",
            self.major, self.minor, self.year, self.month, self.day
        )
    }
}
