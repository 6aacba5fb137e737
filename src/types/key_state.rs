// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Keyer indicator states and switch operations.

use std::fmt;
use std::str::FromStr;

use crate::error::ValueError;

/// The four-state indicator reported for every upstream keyer.
///
/// The indicator combines whether the key is on air with whether it is
/// selected to change on the next transition.
///
/// # Examples
///
/// ```
/// use switcher_lib::types::KeyState;
///
/// assert_eq!(KeyState::OnNext.as_str(), "on_next");
/// assert_eq!("2".parse::<KeyState>().unwrap(), KeyState::Next);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyState {
    /// Off air, not selected.
    #[default]
    Off,
    /// On air, not selected.
    On,
    /// Off air, will come on with the next transition.
    Next,
    /// On air, will go off with the next transition.
    OnNext,
}

impl KeyState {
    /// Returns the value string published in the state map.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::On => "on",
            Self::Next => "next",
            Self::OnNext => "on_next",
        }
    }

    /// Returns the numeric code used by classic firmware.
    #[must_use]
    pub const fn code(&self) -> u8 {
        match self {
            Self::Off => 0,
            Self::On => 1,
            Self::Next => 2,
            Self::OnNext => 3,
        }
    }

    /// Returns true if the key is currently on air.
    #[must_use]
    pub const fn is_on_air(&self) -> bool {
        matches!(self, Self::On | Self::OnNext)
    }
}

impl fmt::Display for KeyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyState {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "off" | "0" => Ok(Self::Off),
            "on" | "1" => Ok(Self::On),
            "next" | "2" => Ok(Self::Next),
            "on_next" | "3" => Ok(Self::OnNext),
            _ => Err(ValueError::InvalidKeyState(s.to_string())),
        }
    }
}

/// Operation requested on a keyer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeySwitch {
    /// Put the key on air.
    On,
    /// Take the key off air.
    Off,
    /// Flip the on-air state.
    Toggle,
}

impl KeySwitch {
    /// Returns the lowercase wire form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::On => "on",
            Self::Off => "off",
            Self::Toggle => "toggle",
        }
    }
}

impl fmt::Display for KeySwitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeySwitch {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "on" => Ok(Self::On),
            "off" => Ok(Self::Off),
            "toggle" => Ok(Self::Toggle),
            _ => Err(ValueError::InvalidKeySwitch(s.to_string())),
        }
    }
}
