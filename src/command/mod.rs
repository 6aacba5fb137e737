// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Outbound command construction.
//!
//! A control surface names an action by string id and passes string
//! parameters. [`Action::from_id`] turns that into a typed [`Action`], and
//! [`encode`] spells it for a particular [`Model`].
//!
//! # Available Actions
//!
//! | Id | Params | Purpose |
//! |----|--------|---------|
//! | `cut` | `me` | Hard cut preview to program |
//! | `auto` | `me` | Run the selected transition |
//! | `ftb` | `me` | Fade to black |
//! | `key_on` / `key_off` / `key_toggle` | `me`, `key` | Switch an upstream keyer |
//! | `program` / `preview` | `me`, `source` | Select a source |
//! | `raw` | `command` | Send text as-is |
//! | `get_state` | - | Ask for a full state dump |
//!
//! The `me` parameter defaults to bank 1 when omitted.
//!
//! # Examples
//!
//! ```
//! use switcher_lib::Model;
//! use switcher_lib::command::{ActionParams, encode};
//!
//! let params = ActionParams::new().with("me", "2").with("key", "3");
//! let cmd = encode(Model::Studio, "key_on", &params).unwrap();
//! assert_eq!(cmd.as_str(), "me_2_key_3:on");
//!
//! let cmd = encode(Model::StudioClassic, "key_on", &params).unwrap();
//! assert_eq!(cmd.as_str(), "KEY 2 3 ON");
//! ```

mod action;
mod encoder;

pub use action::{Action, ActionParams};
pub use encoder::encode_action;

use std::fmt;

use crate::error::EncodeError;
use crate::model::Model;

/// A fully encoded outbound frame.
///
/// Commands carry no identity; two commands with the same text are
/// interchangeable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Command(String);

impl Command {
    pub(crate) fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// The bootstrap query for a model.
    #[must_use]
    pub fn bootstrap(model: Model) -> Self {
        Self::new(model.info().bootstrap_command)
    }

    /// Returns the frame text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the command and returns the frame text.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Encodes a string-identified action for a model.
///
/// Pure: the same inputs always yield the same command.
///
/// # Errors
///
/// Returns an [`EncodeError`] if the action id is unknown, a parameter is
/// missing or malformed, or the model cannot perform the action.
pub fn encode(model: Model, action_id: &str, params: &ActionParams) -> Result<Command, EncodeError> {
    let action = Action::from_id(action_id, params)?;
    encode_action(model, &action)
}
