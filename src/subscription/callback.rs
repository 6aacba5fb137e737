// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Callback management for switcher subscriptions.
//!
//! This module provides the core types for managing subscription callbacks:
//!
//! - [`SubscriptionId`] - Unique identifier for unsubscribing
//! - [`CallbackRegistry`] - Registry for storing and dispatching callbacks

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::connection::Status;
use crate::state::VariableChange;

/// Unique identifier for a subscription.
///
/// IDs are unique within a registry's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    #[must_use]
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sub({})", self.0)
    }
}

type VariableCallback = Arc<dyn Fn(&VariableChange) + Send + Sync>;

type StatusCallback = Arc<dyn Fn(&Status) + Send + Sync>;

type OpaqueEventCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// A variable callback, optionally limited to one key.
#[derive(Clone)]
struct VariableSubscription {
    key: Option<String>,
    callback: VariableCallback,
}

/// Registry for switcher subscription callbacks.
///
/// Thread-safe via `parking_lot::RwLock`. Callbacks are cloned out of the
/// registry before they run, so a callback may subscribe or unsubscribe
/// without deadlocking.
pub struct CallbackRegistry {
    next_id: AtomicU64,
    variable_callbacks: RwLock<HashMap<SubscriptionId, VariableSubscription>>,
    status_callbacks: RwLock<HashMap<SubscriptionId, StatusCallback>>,
    opaque_callbacks: RwLock<HashMap<SubscriptionId, OpaqueEventCallback>>,
}

impl CallbackRegistry {
    /// Creates a new empty callback registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            variable_callbacks: RwLock::new(HashMap::new()),
            status_callbacks: RwLock::new(HashMap::new()),
            opaque_callbacks: RwLock::new(HashMap::new()),
        }
    }

    fn next_id(&self) -> SubscriptionId {
        SubscriptionId::new(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    // =========================================================================
    // Registration methods
    // =========================================================================

    /// Registers a callback for every variable change.
    pub fn on_variable_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&VariableChange) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.variable_callbacks.write().insert(
            id,
            VariableSubscription {
                key: None,
                callback: Arc::new(callback),
            },
        );
        id
    }

    /// Registers a callback for changes of a single variable.
    pub fn on_variable<F>(&self, key: impl Into<String>, callback: F) -> SubscriptionId
    where
        F: Fn(&VariableChange) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.variable_callbacks.write().insert(
            id,
            VariableSubscription {
                key: Some(key.into()),
                callback: Arc::new(callback),
            },
        );
        id
    }

    /// Registers a callback for connection status changes.
    pub fn on_status_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&Status) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.status_callbacks.write().insert(id, Arc::new(callback));
        id
    }

    /// Registers a callback for tokens outside the state grammar.
    pub fn on_opaque_event<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.opaque_callbacks.write().insert(id, Arc::new(callback));
        id
    }

    // =========================================================================
    // Unsubscription
    // =========================================================================

    /// Unregisters a callback by its subscription ID.
    ///
    /// Returns `true` if a callback was found and removed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.variable_callbacks.write().remove(&id).is_some()
            || self.status_callbacks.write().remove(&id).is_some()
            || self.opaque_callbacks.write().remove(&id).is_some()
    }

    /// Clears all callbacks.
    pub fn clear(&self) {
        self.variable_callbacks.write().clear();
        self.status_callbacks.write().clear();
        self.opaque_callbacks.write().clear();
    }

    // =========================================================================
    // Dispatch methods
    // =========================================================================

    /// Dispatches a variable change to matching callbacks.
    pub fn dispatch_variable(&self, change: &VariableChange) {
        let subscriptions: Vec<VariableSubscription> =
            self.variable_callbacks.read().values().cloned().collect();
        for sub in subscriptions {
            if sub.key.as_deref().is_none_or(|key| key == change.key) {
                (sub.callback)(change);
            }
        }
    }

    /// Dispatches a status change.
    pub fn dispatch_status(&self, status: &Status) {
        let callbacks: Vec<StatusCallback> =
            self.status_callbacks.read().values().cloned().collect();
        for callback in callbacks {
            callback(status);
        }
    }

    /// Dispatches an opaque event token.
    pub fn dispatch_opaque(&self, raw: &str) {
        let callbacks: Vec<OpaqueEventCallback> =
            self.opaque_callbacks.read().values().cloned().collect();
        for callback in callbacks {
            callback(raw);
        }
    }

    // =========================================================================
    // Statistics
    // =========================================================================

    /// Returns the total number of registered callbacks.
    #[must_use]
    pub fn callback_count(&self) -> usize {
        self.variable_callbacks.read().len()
            + self.status_callbacks.read().len()
            + self.opaque_callbacks.read().len()
    }

    /// Returns `true` if there are no registered callbacks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.callback_count() == 0
    }
}

impl Default for CallbackRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("callback_count", &self.callback_count())
            .finish()
    }
}
