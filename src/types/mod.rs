// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for switcher control.
//!
//! Each type ensures values are within their valid ranges at construction
//! time, so the command encoder never has to re-check them.
//!
//! # Types
//!
//! - [`MixEffect`] - Mix-effect bank index (1-2)
//! - [`KeyIndex`] - Upstream keyer index within a bank (1-4)
//! - [`KeyState`] - Four-state keyer indicator
//! - [`KeySwitch`] - On/Off/Toggle operation on a keyer

mod bank;
mod key_state;

pub use bank::{KeyIndex, MixEffect};
pub use key_state::{KeyState, KeySwitch};
