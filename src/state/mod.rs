// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Switcher state tracking.
//!
//! The [`StateStore`] holds the last value reported for every variable, and
//! [`VariableChange`] describes one update.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use switcher_lib::Model;
//! use switcher_lib::state::StateStore;
//! use switcher_lib::subscription::CallbackRegistry;
//!
//! let store = StateStore::new(Arc::new(CallbackRegistry::new()));
//! store.initialize(Model::Compact);
//! assert_eq!(store.get("me_1_key_1").as_deref(), Some("off"));
//!
//! store.set("me_1_key_1", "on");
//! assert_eq!(store.get("me_1_key_1").as_deref(), Some("on"));
//! ```

mod store;
mod variable_change;

pub use store::StateStore;
pub use variable_change::VariableChange;
