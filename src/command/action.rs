// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Typed switcher actions and their string-keyed parameters.

use std::collections::HashMap;
use std::str::FromStr;

use crate::error::{EncodeError, ValueError};
use crate::types::{KeyIndex, KeySwitch, MixEffect};

/// String parameters supplied with an action.
///
/// # Examples
///
/// ```
/// use switcher_lib::command::ActionParams;
///
/// let params = ActionParams::new().with("me", "1");
/// assert_eq!(params.get("me"), Some("1"));
/// assert_eq!(params.get("key"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionParams(HashMap<String, String>);

impl ActionParams {
    /// Creates an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    /// Sets a parameter in place.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    /// Returns a parameter value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    fn required(&self, name: &'static str) -> Result<&str, EncodeError> {
        self.get(name).ok_or(EncodeError::MissingParam(name))
    }

    fn parse<T>(&self, name: &'static str) -> Result<T, EncodeError>
    where
        T: FromStr<Err = ValueError>,
    {
        let raw = self.required(name)?;
        raw.parse().map_err(|_| EncodeError::InvalidParam {
            name,
            value: raw.to_string(),
        })
    }

    fn mix_effect(&self) -> Result<MixEffect, EncodeError> {
        if self.get("me").is_none() {
            return Ok(MixEffect::one());
        }
        self.parse("me")
    }

    fn source(&self) -> Result<u16, EncodeError> {
        let raw = self.required("source")?;
        raw.trim().parse().map_err(|_| EncodeError::InvalidParam {
            name: "source",
            value: raw.to_string(),
        })
    }
}

impl<K, V> FromIterator<(K, V)> for ActionParams
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// A switcher operation with validated arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Hard cut on a bank.
    Cut {
        /// Target bank.
        me: MixEffect,
    },
    /// Run the selected transition on a bank.
    Auto {
        /// Target bank.
        me: MixEffect,
    },
    /// Fade a bank to black.
    FadeToBlack {
        /// Target bank.
        me: MixEffect,
    },
    /// Switch an upstream keyer.
    Key {
        /// Target bank.
        me: MixEffect,
        /// Keyer within the bank.
        key: KeyIndex,
        /// Requested operation.
        switch: KeySwitch,
    },
    /// Select the program source.
    Program {
        /// Target bank.
        me: MixEffect,
        /// Source number.
        source: u16,
    },
    /// Select the preview source.
    Preview {
        /// Target bank.
        me: MixEffect,
        /// Source number.
        source: u16,
    },
    /// Caller-supplied text sent unchanged.
    Raw(String),
    /// Ask for a full state dump.
    GetState,
}

impl Action {
    /// Builds an action from a control surface's action id and parameters.
    ///
    /// # Errors
    ///
    /// Returns `EncodeError::UnknownAction` for an unrecognised id, or a
    /// parameter error when a value is missing or malformed.
    pub fn from_id(action_id: &str, params: &ActionParams) -> Result<Self, EncodeError> {
        let action = match action_id {
            "cut" => Self::Cut {
                me: params.mix_effect()?,
            },
            "auto" => Self::Auto {
                me: params.mix_effect()?,
            },
            "ftb" => Self::FadeToBlack {
                me: params.mix_effect()?,
            },
            "key_on" | "key_off" | "key_toggle" => {
                let switch = match action_id {
                    "key_on" => KeySwitch::On,
                    "key_off" => KeySwitch::Off,
                    _ => KeySwitch::Toggle,
                };
                Self::Key {
                    me: params.mix_effect()?,
                    key: params.parse("key")?,
                    switch,
                }
            }
            "program" => Self::Program {
                me: params.mix_effect()?,
                source: params.source()?,
            },
            "preview" => Self::Preview {
                me: params.mix_effect()?,
                source: params.source()?,
            },
            "raw" => {
                let text = params.required("command")?.trim();
                if text.is_empty() {
                    return Err(EncodeError::InvalidParam {
                        name: "command",
                        value: String::new(),
                    });
                }
                Self::Raw(text.to_string())
            }
            "get_state" => Self::GetState,
            other => return Err(EncodeError::UnknownAction(other.to_string())),
        };
        Ok(action)
    }

    /// Returns the action id this action is known by.
    #[must_use]
    pub fn id(&self) -> &'static str {
        match self {
            Self::Cut { .. } => "cut",
            Self::Auto { .. } => "auto",
            Self::FadeToBlack { .. } => "ftb",
            Self::Key { switch, .. } => match switch {
                KeySwitch::On => "key_on",
                KeySwitch::Off => "key_off",
                KeySwitch::Toggle => "key_toggle",
            },
            Self::Program { .. } => "program",
            Self::Preview { .. } => "preview",
            Self::Raw(_) => "raw",
            Self::GetState => "get_state",
        }
    }

    /// Returns the bank the action targets, if any.
    #[must_use]
    pub fn mix_effect(&self) -> Option<MixEffect> {
        match self {
            Self::Cut { me }
            | Self::Auto { me }
            | Self::FadeToBlack { me }
            | Self::Key { me, .. }
            | Self::Program { me, .. }
            | Self::Preview { me, .. } => Some(*me),
            Self::Raw(_) | Self::GetState => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn me_defaults_to_first_bank() {
        let action = Action::from_id("cut", &ActionParams::new()).unwrap();
        assert_eq!(action, Action::Cut { me: MixEffect::one() });
    }

    #[test]
    fn key_action_requires_key() {
        let result = Action::from_id("key_on", &ActionParams::new().with("me", "1"));
        assert_eq!(result, Err(EncodeError::MissingParam("key")));
    }

    #[test]
    fn key_action_rejects_bad_index() {
        let params = ActionParams::new().with("key", "9");
        assert_eq!(
            Action::from_id("key_toggle", &params),
            Err(EncodeError::InvalidParam {
                name: "key",
                value: "9".to_string()
            })
        );
    }

    #[test]
    fn program_parses_source() {
        let params: ActionParams = [("me", "2"), ("source", " 12 ")].into_iter().collect();
        let action = Action::from_id("program", &params).unwrap();
        assert_eq!(
            action,
            Action::Program {
                me: MixEffect::new(2).unwrap(),
                source: 12
            }
        );
    }

    #[test]
    fn preview_rejects_non_numeric_source() {
        let params = ActionParams::new().with("source", "cam1");
        assert!(matches!(
            Action::from_id("preview", &params),
            Err(EncodeError::InvalidParam { name: "source", .. })
        ));
    }

    #[test]
    fn raw_requires_text() {
        let params = ActionParams::new().with("command", "   ");
        assert!(Action::from_id("raw", &params).is_err());

        let params = ActionParams::new().with("command", " me_1_cut ");
        assert_eq!(
            Action::from_id("raw", &params).unwrap(),
            Action::Raw("me_1_cut".to_string())
        );
    }

    #[test]
    fn id_round_trips_through_from_id() {
        let params = ActionParams::new()
            .with("me", "1")
            .with("key", "2")
            .with("source", "3")
            .with("command", "x");
        for id in [
            "cut",
            "auto",
            "ftb",
            "key_on",
            "key_off",
            "key_toggle",
            "program",
            "preview",
            "raw",
            "get_state",
        ] {
            assert_eq!(Action::from_id(id, &params).unwrap().id(), id);
        }
    }
}
