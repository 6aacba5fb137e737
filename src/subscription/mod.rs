// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Subscription system for switcher notifications.
//!
//! # Overview
//!
//! - [`SubscriptionId`] - A unique identifier for a subscription, used to unsubscribe
//! - [`CallbackRegistry`] - Registry that manages callbacks and dispatches events
//! - [`Subscribable`] - Trait for types that support event subscriptions
//!
//! # Usage
//!
//! ```no_run
//! use switcher_lib::{Model, Switcher, SwitcherConfig};
//! use switcher_lib::subscription::Subscribable;
//!
//! # async fn example() -> switcher_lib::Result<()> {
//! let switcher = Switcher::new();
//!
//! let sub_id = switcher.on_variable_changed(|change| {
//!     println!("{} changed to {}", change.key, change.new);
//! });
//!
//! switcher.configure(SwitcherConfig::new("10.0.0.20", Model::Studio))?;
//!
//! // Later, unsubscribe
//! switcher.unsubscribe(sub_id);
//! # Ok(())
//! # }
//! ```

mod callback;
mod subscribable;

pub use callback::{CallbackRegistry, SubscriptionId};
pub use subscribable::Subscribable;
