// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Addressing types for mix-effect banks and their keyers.

use std::fmt;
use std::str::FromStr;

use crate::error::ValueError;

/// Index of a mix-effect (M/E) bank, 1-based.
///
/// No supported model has more than two banks. Whether a particular model
/// has the second bank is checked at encode time.
///
/// # Examples
///
/// ```
/// use switcher_lib::types::MixEffect;
///
/// let me = MixEffect::new(2).unwrap();
/// assert_eq!(me.value(), 2);
/// assert!(MixEffect::new(0).is_err());
/// assert!(MixEffect::new(3).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MixEffect(u8);

impl MixEffect {
    /// Highest bank index any model exposes.
    pub const MAX: u8 = 2;

    /// Creates a bank index.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` unless `index` is in `1..=2`.
    pub fn new(index: u8) -> Result<Self, ValueError> {
        if index == 0 || index > Self::MAX {
            return Err(ValueError::OutOfRange {
                min: 1,
                max: Self::MAX,
                actual: index,
            });
        }
        Ok(Self(index))
    }

    /// The first bank.
    #[must_use]
    pub const fn one() -> Self {
        Self(1)
    }

    /// Returns the numeric value of the index.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for MixEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MixEffect {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let index = s.trim().parse::<u8>().map_err(|_| ValueError::OutOfRange {
            min: 1,
            max: Self::MAX,
            actual: 0,
        })?;
        Self::new(index)
    }
}

/// Index of an upstream keyer within a bank, 1-based.
///
/// # Examples
///
/// ```
/// use switcher_lib::types::KeyIndex;
///
/// assert_eq!("4".parse::<KeyIndex>().unwrap().value(), 4);
/// assert!(KeyIndex::new(5).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyIndex(u8);

impl KeyIndex {
    /// Number of keyers per bank.
    pub const MAX: u8 = 4;

    /// Creates a keyer index.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` unless `index` is in `1..=4`.
    pub fn new(index: u8) -> Result<Self, ValueError> {
        if index == 0 || index > Self::MAX {
            return Err(ValueError::OutOfRange {
                min: 1,
                max: Self::MAX,
                actual: index,
            });
        }
        Ok(Self(index))
    }

    /// Returns the numeric value of the index.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }

    /// Iterates over every keyer index of a bank.
    pub fn all() -> impl Iterator<Item = Self> {
        (1..=Self::MAX).map(Self)
    }
}

impl fmt::Display for KeyIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for KeyIndex {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let index = s.trim().parse::<u8>().map_err(|_| ValueError::OutOfRange {
            min: 1,
            max: Self::MAX,
            actual: 0,
        })?;
        Self::new(index)
    }
}
