// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Caller-facing switcher client.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::{mpsc, watch};

use crate::command::{self, ActionParams, Command};
use crate::config::SwitcherConfig;
use crate::connection::{ConnectionMachine, Driver, Event, Status};
use crate::error::{EncodeError, Error, Result};
use crate::model::Model;
use crate::state::{StateStore, VariableChange};
use crate::subscription::{CallbackRegistry, Subscribable, SubscriptionId};

/// Handle to one switcher connection.
///
/// Creating a `Switcher` spawns a background driver task that owns the
/// connection. Every method returns immediately; results surface later as
/// variable changes and status updates. Dropping the handle shuts the
/// connection down.
///
/// # Examples
///
/// ```no_run
/// use switcher_lib::{ActionParams, Model, Switcher, SwitcherConfig};
///
/// # async fn example() -> switcher_lib::Result<()> {
/// let switcher = Switcher::with_config(SwitcherConfig::new("10.0.0.20", Model::Studio))?;
///
/// switcher.send_action("key_on", &ActionParams::new().with("me", "2").with("key", "1"))?;
///
/// println!("{:?}", switcher.variable("me_2_key_1"));
/// # Ok(())
/// # }
/// ```
pub struct Switcher {
    commands: mpsc::UnboundedSender<Event>,
    store: Arc<StateStore>,
    callbacks: Arc<CallbackRegistry>,
    status: watch::Receiver<Status>,
    model: RwLock<Option<Model>>,
}

impl Switcher {
    /// Creates an unconfigured switcher.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    #[must_use]
    pub fn new() -> Self {
        let callbacks = Arc::new(CallbackRegistry::new());
        let store = Arc::new(StateStore::new(Arc::clone(&callbacks)));
        let (status_tx, status) = watch::channel(Status::default());
        let machine = ConnectionMachine::new(Arc::clone(&store), Arc::clone(&callbacks), status_tx);

        let (commands, commands_rx) = mpsc::unbounded_channel();
        tokio::spawn(Driver::new(machine, commands_rx).run());

        Self {
            commands,
            store,
            callbacks,
            status,
            model: RwLock::new(None),
        }
    }

    /// Creates a switcher and applies a configuration.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChannelClosed`] if the driver is not running.
    pub fn with_config(config: SwitcherConfig) -> Result<Self> {
        let switcher = Self::new();
        switcher.configure(config)?;
        Ok(switcher)
    }

    /// Applies a new configuration.
    ///
    /// Any open transport and pending reconnect are torn down first, the
    /// model's declared variables are reset to their defaults, and a new
    /// connection is started. An invalid host is not an error here: the
    /// status becomes [`Status::BadConfiguration`] instead.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChannelClosed`] if the driver is not running.
    pub fn configure(&self, config: SwitcherConfig) -> Result<()> {
        let model = config.model;
        self.dispatch(Event::Configure(Box::new(config)))?;
        *self.model.write() = Some(model);
        Ok(())
    }

    /// Encodes an action for the configured model and sends it.
    ///
    /// The command is dropped if the connection is not open.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError::NotConfigured`] before the first configuration,
    /// any other [`EncodeError`] if the action cannot be encoded, and
    /// [`Error::ChannelClosed`] if the driver is not running.
    pub fn send_action(&self, action_id: &str, params: &ActionParams) -> Result<()> {
        let model = (*self.model.read()).ok_or(EncodeError::NotConfigured)?;
        let command = command::encode(model, action_id, params)?;
        self.send_command(command)
    }

    /// Sends an already encoded command.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChannelClosed`] if the driver is not running.
    pub fn send_command(&self, command: Command) -> Result<()> {
        self.dispatch(Event::Send(command))
    }

    /// Returns the configured model, if any.
    #[must_use]
    pub fn model(&self) -> Option<Model> {
        *self.model.read()
    }

    /// Returns the current value of a variable.
    #[must_use]
    pub fn variable(&self, key: &str) -> Option<String> {
        self.store.get(key)
    }

    /// Returns a copy of every known variable.
    #[must_use]
    pub fn variables(&self) -> HashMap<String, String> {
        self.store.snapshot()
    }

    /// Returns the current connection status.
    #[must_use]
    pub fn status(&self) -> Status {
        self.status.borrow().clone()
    }

    /// Returns a receiver that observes status changes.
    #[must_use]
    pub fn watch_status(&self) -> watch::Receiver<Status> {
        self.status.clone()
    }

    /// Tears down the connection and stops the driver.
    ///
    /// Later calls fail with [`Error::ChannelClosed`] once the driver has
    /// exited.
    pub fn shutdown(&self) {
        let _ = self.commands.send(Event::Shutdown);
    }

    fn dispatch(&self, event: Event) -> Result<()> {
        self.commands.send(event).map_err(|_| Error::ChannelClosed)
    }
}

impl Default for Switcher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Switcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Switcher")
            .field("model", &*self.model.read())
            .field("status", &*self.status.borrow())
            .field("variables", &self.store.len())
            .finish_non_exhaustive()
    }
}

impl Subscribable for Switcher {
    fn on_variable_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&VariableChange) + Send + Sync + 'static,
    {
        self.callbacks.on_variable_changed(callback)
    }

    fn on_variable<F>(&self, key: impl Into<String>, callback: F) -> SubscriptionId
    where
        F: Fn(&VariableChange) + Send + Sync + 'static,
    {
        self.callbacks.on_variable(key, callback)
    }

    fn on_status_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&Status) + Send + Sync + 'static,
    {
        self.callbacks.on_status_changed(callback)
    }

    fn on_opaque_event<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.callbacks.on_opaque_event(callback)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.callbacks.unsubscribe(id)
    }
}
