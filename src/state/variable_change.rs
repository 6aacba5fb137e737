// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Variable change notifications.

use serde::{Deserialize, Serialize};

/// A change of one state variable.
///
/// # Examples
///
/// ```
/// use switcher_lib::state::VariableChange;
///
/// let change = VariableChange {
///     key: "me_1_key_1".to_string(),
///     old: Some("off".to_string()),
///     new: "on".to_string(),
/// };
/// assert!(!change.is_new_key());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableChange {
    /// Variable name.
    pub key: String,
    /// Previous value, absent the first time the key is set.
    pub old: Option<String>,
    /// Current value.
    pub new: String,
}

impl VariableChange {
    /// Returns true if the key had no value before this change.
    #[must_use]
    pub fn is_new_key(&self) -> bool {
        self.old.is_none()
    }
}
