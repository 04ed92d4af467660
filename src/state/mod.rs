// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device state types.
//!
//! A poll reads three register regions, [`RegisterReadings`] picks the raw
//! fields out of them and [`ClimateState::derive`] turns those into domain
//! values. The result is published as an immutable [`DeviceSnapshot`].
//!
//! # Examples
//!
//! ```
//! use bls21_lib::state::{ClimateState, RegisterReadings};
//! use bls21_lib::types::{HvacActionPolicy, HvacMode};
//!
//! let coils = [true, false, false, false];
//! let mut holding = [0_u16; 45];
//! holding[43] = 1; // heating
//! let input = [0_u16; 39];
//!
//! let readings = RegisterReadings::parse(&coils, &holding, &input)?;
//! let state = ClimateState::derive(&readings, HvacActionPolicy::default());
//! assert_eq!(state.hvac_mode, HvacMode::Heat);
//! # Ok::<(), bls21_lib::ProtocolError>(())
//! ```

mod decode;
mod snapshot;

pub use decode::{RegisterReadings, tenths_to_celsius};
pub use snapshot::{ClimateState, DeviceIdentity, DeviceSnapshot};
