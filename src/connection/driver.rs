// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Background task that runs the connection machine.

use tokio::sync::mpsc;

use crate::protocol::transport::TransportHandle;

use super::machine::{ConnectionMachine, Effect, Event};
use super::reconnect::ReconnectTimer;

/// Executes machine effects and feeds transport and timer events back in.
///
/// Caller events arrive on `commands`; when every sender is gone the driver
/// shuts down. Transports and the timer report on `internal`.
pub(crate) struct Driver {
    machine: ConnectionMachine,
    commands: mpsc::UnboundedReceiver<Event>,
    internal_tx: mpsc::UnboundedSender<Event>,
    internal: mpsc::UnboundedReceiver<Event>,
    transport: Option<TransportHandle>,
    timer: Option<ReconnectTimer>,
}

impl Driver {
    pub(crate) fn new(machine: ConnectionMachine, commands: mpsc::UnboundedReceiver<Event>) -> Self {
        let (internal_tx, internal) = mpsc::unbounded_channel();
        Self {
            machine,
            commands,
            internal_tx,
            internal,
            transport: None,
            timer: None,
        }
    }

    pub(crate) async fn run(mut self) {
        tracing::debug!("Connection driver started");

        while !self.machine.is_stopped() {
            let event = tokio::select! {
                command = self.commands.recv() => command.unwrap_or(Event::Shutdown),
                Some(event) = self.internal.recv() => event,
            };

            for effect in self.machine.handle(event) {
                self.apply(effect);
            }
        }

        if let Some(transport) = self.transport.take() {
            transport.close();
        }
        self.timer = None;
        tracing::debug!("Connection driver stopped");
    }

    fn apply(&mut self, effect: Effect) {
        match effect {
            Effect::Open {
                generation,
                endpoint,
                connect_timeout,
            } => {
                if let Some(previous) = self.transport.take() {
                    previous.close();
                }
                self.transport = Some(TransportHandle::spawn(
                    generation,
                    endpoint,
                    connect_timeout,
                    self.internal_tx.clone(),
                ));
            }
            Effect::Send { generation, frame } => match &self.transport {
                Some(transport) if transport.generation() == generation => transport.send(frame),
                _ => tracing::debug!(generation, "No live transport, frame dropped"),
            },
            Effect::Close { generation } => {
                if self
                    .transport
                    .as_ref()
                    .is_some_and(|t| t.generation() == generation)
                    && let Some(transport) = self.transport.take()
                {
                    transport.close();
                }
            }
            Effect::ScheduleReconnect { token, delay } => {
                self.timer = Some(ReconnectTimer::schedule(delay, token, self.internal_tx.clone()));
            }
            Effect::CancelReconnect => {
                if let Some(timer) = self.timer.take() {
                    tracing::debug!(token = timer.token(), "Reconnect cancelled");
                }
            }
        }
    }
}
