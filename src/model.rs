// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Catalogue of supported switcher models.
//!
//! Every model is a variant of the closed [`Model`] enum. Its protocol quirks
//! (port, bootstrap query, how state tokens are decoded) live in a static
//! [`ModelInfo`] record, so supporting another model is a data change.
//!
//! # Examples
//!
//! ```
//! use switcher_lib::Model;
//!
//! let info = Model::Studio.info();
//! assert_eq!(info.default_port, 9990);
//! assert_eq!(info.mix_effects, 2);
//! assert!(Model::Studio.variables().any(|v| v.name == "me_2_key_4"));
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::{KeyIndex, KeyState, MixEffect};

/// Supported switcher models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Model {
    /// Single-bank compact switcher.
    Compact,
    /// Two-bank studio switcher.
    Studio,
    /// Two-bank studio switcher running classic firmware.
    StudioClassic,
}

/// How a model encodes state tokens on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenParser {
    /// `key:value` with textual values.
    Plain,
    /// `key:value` where keyer indicators are reported as numeric codes.
    IndicatorCodes,
}

/// How a model spells outbound commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandDialect {
    /// Lowercase `me_<n>_<verb>[:<arg>]`.
    Tokens,
    /// Uppercase space-separated verbs.
    Verbs,
}

/// Static protocol description of a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelInfo {
    /// Human-readable name.
    pub label: &'static str,
    /// WebSocket port the device listens on.
    pub default_port: u16,
    /// Number of mix-effect banks.
    pub mix_effects: u8,
    /// Query sent right after the transport opens.
    pub bootstrap_command: &'static str,
    /// Decoder for inbound state tokens.
    pub token_parser: TokenParser,
    /// Encoder dialect for outbound commands.
    pub dialect: CommandDialect,
}

/// A variable the model declares up front, with its value before any report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableSpec {
    /// Variable name.
    pub name: String,
    /// Seed value.
    pub default: &'static str,
}

const COMPACT: ModelInfo = ModelInfo {
    label: "Compact 1 M/E",
    default_port: 9990,
    mix_effects: 1,
    bootstrap_command: "get_state",
    token_parser: TokenParser::Plain,
    dialect: CommandDialect::Tokens,
};

const STUDIO: ModelInfo = ModelInfo {
    label: "Studio 2 M/E",
    default_port: 9990,
    mix_effects: 2,
    bootstrap_command: "get_state",
    token_parser: TokenParser::Plain,
    dialect: CommandDialect::Tokens,
};

const STUDIO_CLASSIC: ModelInfo = ModelInfo {
    label: "Studio Classic 2 M/E",
    default_port: 6800,
    mix_effects: 2,
    bootstrap_command: "STATE?",
    token_parser: TokenParser::IndicatorCodes,
    dialect: CommandDialect::Verbs,
};

/// Default for source selections before the device reports them.
const SOURCE_DEFAULT: &str = "0";

impl Model {
    /// Every supported model.
    pub const ALL: [Self; 3] = [Self::Compact, Self::Studio, Self::StudioClassic];

    /// Returns the static protocol description.
    #[must_use]
    pub const fn info(&self) -> &'static ModelInfo {
        match self {
            Self::Compact => &COMPACT,
            Self::Studio => &STUDIO,
            Self::StudioClassic => &STUDIO_CLASSIC,
        }
    }

    /// Returns the configuration id (`"studio_classic"`, ...).
    #[must_use]
    pub const fn id(&self) -> &'static str {
        match self {
            Self::Compact => "compact",
            Self::Studio => "studio",
            Self::StudioClassic => "studio_classic",
        }
    }

    /// Returns the human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        self.info().label
    }

    /// Returns the WebSocket port.
    #[must_use]
    pub const fn default_port(&self) -> u16 {
        self.info().default_port
    }

    /// Returns true if the model has the given bank.
    #[must_use]
    pub fn has_mix_effect(self, me: MixEffect) -> bool {
        me.value() <= self.info().mix_effects
    }

    /// Iterates over the banks the model has.
    pub fn mix_effects(self) -> impl Iterator<Item = MixEffect> {
        (1..=self.info().mix_effects).filter_map(|i| MixEffect::new(i).ok())
    }

    /// Iterates over the declared variables with their seed values.
    ///
    /// Per bank: four keyer indicators followed by program and preview.
    pub fn variables(self) -> impl Iterator<Item = VariableSpec> {
        self.mix_effects().flat_map(|me| {
            KeyIndex::all()
                .map(move |key| VariableSpec {
                    name: key_variable(me, key),
                    default: KeyState::Off.as_str(),
                })
                .chain([
                    VariableSpec {
                        name: program_variable(me),
                        default: SOURCE_DEFAULT,
                    },
                    VariableSpec {
                        name: preview_variable(me),
                        default: SOURCE_DEFAULT,
                    },
                ])
        })
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Model {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|model| model.id().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConfigError::UnknownModel(s.to_string()))
    }
}

/// Name of a keyer indicator variable.
#[must_use]
pub fn key_variable(me: MixEffect, key: KeyIndex) -> String {
    format!("me_{me}_key_{key}")
}

/// Name of a bank's program source variable.
#[must_use]
pub fn program_variable(me: MixEffect) -> String {
    format!("me_{me}_program")
}

/// Name of a bank's preview source variable.
#[must_use]
pub fn preview_variable(me: MixEffect) -> String {
    format!("me_{me}_preview")
}
