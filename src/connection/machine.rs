// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Connection state machine.
//!
//! [`ConnectionMachine`] owns everything that changes over the life of a
//! connection: configuration, endpoint, transport generation and the pending
//! reconnect token. It performs no I/O. Each [`Event`] yields a list of
//! [`Effect`]s that the driver executes.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::command::Command;
use crate::config::SwitcherConfig;
use crate::protocol::transport::TransportEvent;
use crate::protocol::{DecodedItem, Endpoint, decode};
use crate::state::StateStore;
use crate::subscription::CallbackRegistry;

use super::status::{DisconnectReason, Status};

/// Lifecycle state of the connection.
///
/// ```text
/// Idle ──▶ Connecting ──▶ Open ──▶ Disconnected ──▶ ReconnectPending
///             ▲   │                     ▲                  │
///             │   └─────────────────────┘                  │
///             └────────────────────────────────────────────┘
/// ```
///
/// Any state returns to `Idle` on teardown, passing through `Closing` when a
/// transport has to be closed first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// No transport and no pending timer.
    #[default]
    Idle,
    /// A transport is being opened.
    Connecting,
    /// The transport is open.
    Open,
    /// A transport is being torn down.
    Closing,
    /// The transport closed or failed.
    Disconnected,
    /// Waiting for the reconnect timer.
    ReconnectPending,
}

impl ConnectionState {
    /// Returns true if the machine may move from `self` to `next`.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        use ConnectionState::{Closing, Connecting, Disconnected, Idle, Open, ReconnectPending};

        matches!(
            (self, next),
            (Idle | Closing | Disconnected | ReconnectPending, Idle)
                | (Idle | ReconnectPending, Connecting)
                | (Connecting, Open)
                | (Connecting | Open, Disconnected | Closing)
                | (Disconnected, ReconnectPending)
        )
    }

    /// Returns the state name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Connecting => "connecting",
            Self::Open => "open",
            Self::Closing => "closing",
            Self::Disconnected => "disconnected",
            Self::ReconnectPending => "reconnect_pending",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input to the machine.
#[derive(Debug)]
pub(crate) enum Event {
    Configure(Box<SwitcherConfig>),
    Send(Command),
    Shutdown,
    Transport { generation: u64, event: TransportEvent },
    ReconnectDue { token: u64 },
}

/// Work for the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Effect {
    Open {
        generation: u64,
        endpoint: Endpoint,
        connect_timeout: Duration,
    },
    Send { generation: u64, frame: String },
    Close { generation: u64 },
    ScheduleReconnect { token: u64, delay: Duration },
    CancelReconnect,
}

pub(crate) struct ConnectionMachine {
    state: ConnectionState,
    config: Option<SwitcherConfig>,
    endpoint: Option<Endpoint>,
    generation: u64,
    transport_live: bool,
    pending_timer: Option<u64>,
    next_token: u64,
    has_opened: bool,
    stopped: bool,
    store: Arc<StateStore>,
    callbacks: Arc<CallbackRegistry>,
    status: watch::Sender<Status>,
}

impl ConnectionMachine {
    pub(crate) fn new(
        store: Arc<StateStore>,
        callbacks: Arc<CallbackRegistry>,
        status: watch::Sender<Status>,
    ) -> Self {
        Self {
            state: ConnectionState::Idle,
            config: None,
            endpoint: None,
            generation: 0,
            transport_live: false,
            pending_timer: None,
            next_token: 0,
            has_opened: false,
            stopped: false,
            store,
            callbacks,
            status,
        }
    }

    pub(crate) fn state(&self) -> ConnectionState {
        self.state
    }

    pub(crate) fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub(crate) fn handle(&mut self, event: Event) -> Vec<Effect> {
        let mut effects = Vec::new();
        match event {
            Event::Configure(config) => self.configure(*config, &mut effects),
            Event::Send(command) => self.send(command, &mut effects),
            Event::Shutdown => self.shutdown(&mut effects),
            Event::Transport { generation, event } => {
                self.on_transport(generation, event, &mut effects);
            }
            Event::ReconnectDue { token } => self.on_reconnect_due(token, &mut effects),
        }
        effects
    }

    // ========================================================================
    // Caller events
    // ========================================================================

    fn configure(&mut self, config: SwitcherConfig, effects: &mut Vec<Effect>) {
        self.teardown(effects);

        tracing::info!(host = %config.host, model = %config.model, "Applying configuration");
        self.store.initialize(config.model);
        self.has_opened = false;

        match config.endpoint() {
            Ok(endpoint) => {
                self.endpoint = Some(endpoint);
                self.config = Some(config);
                self.connect(effects);
            }
            Err(e) => {
                tracing::warn!(host = %config.host, error = %e, "Rejected configuration");
                self.endpoint = None;
                self.config = Some(config);
                self.set_status(Status::BadConfiguration(e.to_string()));
            }
        }
    }

    fn send(&mut self, command: Command, effects: &mut Vec<Effect>) {
        if self.state == ConnectionState::Open && self.transport_live {
            tracing::debug!(generation = self.generation, command = %command, "Sending command");
            effects.push(Effect::Send {
                generation: self.generation,
                frame: command.into_string(),
            });
        } else {
            tracing::debug!(state = %self.state, command = %command, "Not connected, command dropped");
        }
    }

    fn shutdown(&mut self, effects: &mut Vec<Effect>) {
        self.teardown(effects);
        self.config = None;
        self.endpoint = None;
        self.stopped = true;
        self.set_status(Status::Disconnected(DisconnectReason::Shutdown));
    }

    // ========================================================================
    // Transport and timer events
    // ========================================================================

    fn on_transport(&mut self, generation: u64, event: TransportEvent, effects: &mut Vec<Effect>) {
        if generation != self.generation || !self.transport_live {
            tracing::debug!(
                generation,
                current = self.generation,
                "Discarding event from superseded transport"
            );
            return;
        }

        match event {
            TransportEvent::Opened => self.on_opened(effects),
            TransportEvent::Frame(frame) => self.on_frame(&frame),
            TransportEvent::Closed { code } => {
                tracing::warn!(generation, code, "Connection closed");
                self.on_lost(DisconnectReason::Closed(code), effects);
            }
            TransportEvent::Failed(reason) => {
                tracing::warn!(generation, error = %reason, "Connection failed");
                self.on_lost(DisconnectReason::Error(reason), effects);
            }
        }
    }

    fn on_opened(&mut self, effects: &mut Vec<Effect>) {
        let Some(model) = self.config.as_ref().map(|c| c.model) else {
            return;
        };
        if self.state != ConnectionState::Connecting {
            return;
        }

        self.transition(ConnectionState::Open);
        self.has_opened = true;
        effects.push(Effect::Send {
            generation: self.generation,
            frame: Command::bootstrap(model).into_string(),
        });
        self.set_status(Status::Ok);
    }

    fn on_frame(&mut self, frame: &[u8]) {
        let Some(model) = self.config.as_ref().map(|c| c.model) else {
            return;
        };
        if self.state != ConnectionState::Open {
            return;
        }

        for item in decode(frame, model.info().token_parser) {
            match item {
                DecodedItem::StateUpdate { key, value } => {
                    self.store.set(key, value);
                }
                DecodedItem::OpaqueEvent(raw) => {
                    tracing::debug!(event = %raw, "Opaque event");
                    self.callbacks.dispatch_opaque(&raw);
                }
            }
        }
    }

    fn on_lost(&mut self, reason: DisconnectReason, effects: &mut Vec<Effect>) {
        self.transport_live = false;
        self.transition(ConnectionState::Disconnected);
        self.set_status(Status::Disconnected(reason));
        self.schedule_reconnect(effects);
    }

    fn on_reconnect_due(&mut self, token: u64, effects: &mut Vec<Effect>) {
        if self.pending_timer != Some(token) || self.state != ConnectionState::ReconnectPending {
            tracing::debug!(token, "Ignoring cancelled reconnect timer");
            return;
        }
        self.pending_timer = None;
        self.connect(effects);
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    fn connect(&mut self, effects: &mut Vec<Effect>) {
        let (Some(endpoint), Some(config)) = (self.endpoint.as_ref(), self.config.as_ref()) else {
            return;
        };

        self.generation += 1;
        self.transport_live = true;
        effects.push(Effect::Open {
            generation: self.generation,
            endpoint: endpoint.clone(),
            connect_timeout: config.connect_timeout,
        });
        self.transition(ConnectionState::Connecting);
        self.set_status(Status::Connecting);
    }

    fn schedule_reconnect(&mut self, effects: &mut Vec<Effect>) {
        let Some(config) = self.config.as_ref() else {
            return;
        };

        let delay = config.reconnect.delay_for(self.has_opened);
        let token = self.next_token;
        self.next_token += 1;
        self.pending_timer = Some(token);

        tracing::debug!(token, ?delay, "Reconnect scheduled");
        effects.push(Effect::ScheduleReconnect { token, delay });
        self.transition(ConnectionState::ReconnectPending);
    }

    /// Cancels the pending timer and closes the live transport, ending in `Idle`.
    fn teardown(&mut self, effects: &mut Vec<Effect>) {
        if self.pending_timer.take().is_some() {
            effects.push(Effect::CancelReconnect);
        }
        if self.transport_live {
            self.transition(ConnectionState::Closing);
            effects.push(Effect::Close {
                generation: self.generation,
            });
            self.transport_live = false;
        }
        self.transition(ConnectionState::Idle);
    }

    fn transition(&mut self, next: ConnectionState) {
        if self.state == next {
            return;
        }
        debug_assert!(
            self.state.can_transition_to(next),
            "invalid transition {} -> {next}",
            self.state
        );
        tracing::debug!(from = %self.state, to = %next, "Connection state changed");
        self.state = next;
    }

    fn set_status(&self, status: Status) {
        if *self.status.borrow() == status {
            return;
        }
        tracing::info!(status = %status, "Status changed");
        self.status.send_replace(status.clone());
        self.callbacks.dispatch_status(&status);
    }
}

impl fmt::Debug for ConnectionMachine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionMachine")
            .field("state", &self.state)
            .field("generation", &self.generation)
            .field("transport_live", &self.transport_live)
            .field("pending_timer", &self.pending_timer)
            .field("has_opened", &self.has_opened)
            .finish_non_exhaustive()
    }
}
