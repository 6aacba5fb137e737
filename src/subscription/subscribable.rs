// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Subscribable trait for types that publish switcher notifications.

use crate::connection::Status;
use crate::state::VariableChange;
use crate::subscription::SubscriptionId;

/// Trait for types that support switcher event subscriptions.
///
/// Callbacks run on the connection driver task; they should return quickly
/// and must not block.
pub trait Subscribable {
    /// Subscribes to every variable change.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// switcher.on_variable_changed(|change| {
    ///     println!("{} = {}", change.key, change.new);
    /// });
    /// ```
    fn on_variable_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&VariableChange) + Send + Sync + 'static;

    /// Subscribes to changes of one variable.
    fn on_variable<F>(&self, key: impl Into<String>, callback: F) -> SubscriptionId
    where
        F: Fn(&VariableChange) + Send + Sync + 'static;

    /// Subscribes to connection status changes.
    fn on_status_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&Status) + Send + Sync + 'static;

    /// Subscribes to tokens that are not state updates.
    fn on_opaque_event<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&str) + Send + Sync + 'static;

    /// Removes a subscription.
    ///
    /// Returns `true` if the subscription existed.
    fn unsubscribe(&self, id: SubscriptionId) -> bool;
}
