// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Last-known value of every switcher variable.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::model::Model;
use crate::subscription::CallbackRegistry;

use super::VariableChange;

/// Map from variable name to its most recent value.
///
/// Keys are never removed, only overwritten. Values are strings; any numeric
/// or boolean reading is up to the caller. Keys the model does not declare
/// are stored like any other.
///
/// The connection driver is the only writer. Readers may sit on any thread.
pub struct StateStore {
    values: RwLock<HashMap<String, String>>,
    callbacks: Arc<CallbackRegistry>,
}

impl StateStore {
    /// Creates an empty store that notifies through `callbacks`.
    #[must_use]
    pub fn new(callbacks: Arc<CallbackRegistry>) -> Self {
        Self {
            values: RwLock::new(HashMap::new()),
            callbacks,
        }
    }

    /// Seeds every variable the model declares with its default value.
    ///
    /// Existing values for those keys are overwritten; other keys are left
    /// alone.
    pub fn initialize(&self, model: Model) {
        for variable in model.variables() {
            self.set(variable.name, variable.default);
        }
        tracing::debug!(model = %model, "Seeded declared variables");
    }

    /// Stores a value, notifying subscribers if it differs from the previous one.
    ///
    /// Returns the change, or `None` if the value was already current.
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) -> Option<VariableChange> {
        let key = key.into();
        let value = value.into();

        let change = {
            let mut values = self.values.write();
            let old = values.insert(key.clone(), value.clone());
            if old.as_deref() == Some(value.as_str()) {
                return None;
            }
            VariableChange {
                key,
                old,
                new: value,
            }
        };

        // Lock released before callbacks run so they can read the store.
        self.callbacks.dispatch_variable(&change);
        Some(change)
    }

    /// Returns a variable's value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        self.values.read().get(key).cloned()
    }

    /// Returns true if the key has ever been set.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.values.read().contains_key(key)
    }

    /// Returns a copy of every variable.
    #[must_use]
    pub fn snapshot(&self) -> HashMap<String, String> {
        self.values.read().clone()
    }

    /// Returns the number of known variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.read().len()
    }

    /// Returns true if no variable has been set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.read().is_empty()
    }
}

impl std::fmt::Debug for StateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateStore")
            .field("variables", &self.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn store() -> StateStore {
        StateStore::new(Arc::new(CallbackRegistry::new()))
    }

    #[test]
    fn set_and_get() {
        let store = store();
        assert_eq!(store.get("me_1_key_1"), None);

        let change = store.set("me_1_key_1", "on").unwrap();
        assert_eq!(change.old, None);
        assert_eq!(change.new, "on");
        assert_eq!(store.get("me_1_key_1").as_deref(), Some("on"));
    }

    #[test]
    fn identical_value_is_not_a_change() {
        let store = store();
        assert!(store.set("x", "1").is_some());
        assert!(store.set("x", "1").is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn overwrite_reports_old_value() {
        let store = store();
        store.set("x", "1");
        let change = store.set("x", "2").unwrap();
        assert_eq!(change.old.as_deref(), Some("1"));
        assert_eq!(change.new, "2");
    }

    #[test]
    fn most_recent_value_wins() {
        let store = store();
        for value in ["on", "off", "next", "on_next", "off"] {
            store.set("me_2_key_1", value);
        }
        assert_eq!(store.get("me_2_key_1").as_deref(), Some("off"));
    }

    #[test]
    fn initialize_seeds_declared_variables() {
        let store = store();
        store.initialize(Model::Studio);

        assert_eq!(store.len(), 12);
        assert_eq!(store.get("me_1_key_1").as_deref(), Some("off"));
        assert_eq!(store.get("me_2_key_4").as_deref(), Some("off"));
        assert_eq!(store.get("me_2_preview").as_deref(), Some("0"));
    }

    #[test]
    fn initialize_keeps_undeclared_keys() {
        let store = store();
        store.set("firmware", "2.1");
        store.set("me_1_key_1", "on");

        store.initialize(Model::Compact);

        assert_eq!(store.get("firmware").as_deref(), Some("2.1"));
        assert_eq!(store.get("me_1_key_1").as_deref(), Some("off"));
    }

    #[test]
    fn set_notifies_subscribers() {
        let callbacks = Arc::new(CallbackRegistry::new());
        let store = StateStore::new(callbacks.clone());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        callbacks.on_variable_changed(move |c| seen_clone.lock().push(c.clone()));

        store.set("a", "1");
        store.set("a", "1");
        store.set("a", "2");

        let seen = seen.lock();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[1].old.as_deref(), Some("1"));
    }

    #[test]
    fn callback_can_read_store() {
        let callbacks = Arc::new(CallbackRegistry::new());
        let store = Arc::new(StateStore::new(callbacks.clone()));
        let observed = Arc::new(Mutex::new(None));

        let store_clone = store.clone();
        let observed_clone = observed.clone();
        callbacks.on_variable_changed(move |c| {
            *observed_clone.lock() = store_clone.get(&c.key);
        });

        store.set("me_1_program", "7");
        assert_eq!(observed.lock().as_deref(), Some("7"));
    }
}
