// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! WebSocket transport task.
//!
//! Each connect attempt runs in its own task tagged with a generation.
//! Everything the task reports carries that generation so the connection
//! machine can discard events from a transport it has already replaced.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::http::header::ORIGIN;

use crate::connection::Event;
use crate::error::TransportError;
use crate::protocol::Endpoint;

/// Close code reported for a close frame without a status code.
pub(crate) const NO_STATUS_RECEIVED: u16 = 1005;

/// Close code reported when the stream ends without a close frame.
pub(crate) const ABNORMAL_CLOSURE: u16 = 1006;

/// What a transport task reports back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TransportEvent {
    /// The handshake completed.
    Opened,
    /// One inbound message.
    Frame(Vec<u8>),
    /// The socket closed after opening.
    Closed { code: u16 },
    /// The connect attempt failed before the socket opened.
    Failed(String),
}

#[derive(Debug)]
enum Outbound {
    Frame(String),
    Close,
}

/// Owner side of a running transport task.
#[derive(Debug)]
pub(crate) struct TransportHandle {
    generation: u64,
    outbound: mpsc::UnboundedSender<Outbound>,
    task: JoinHandle<()>,
}

impl TransportHandle {
    /// Starts a connect attempt.
    pub(crate) fn spawn(
        generation: u64,
        endpoint: Endpoint,
        connect_timeout: Duration,
        events: mpsc::UnboundedSender<Event>,
    ) -> Self {
        let (outbound, outbound_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run(generation, endpoint, connect_timeout, outbound_rx, events));
        Self {
            generation,
            outbound,
            task,
        }
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    /// Queues a text frame.
    pub(crate) fn send(&self, frame: String) {
        if self.outbound.send(Outbound::Frame(frame)).is_err() {
            tracing::debug!(generation = self.generation, "Transport task already finished, frame dropped");
        }
    }

    /// Asks the task to close the socket. The task exits without reporting.
    pub(crate) fn close(self) {
        if self.outbound.send(Outbound::Close).is_err() {
            self.task.abort();
        }
    }
}

async fn run(
    generation: u64,
    endpoint: Endpoint,
    connect_timeout: Duration,
    mut outbound: mpsc::UnboundedReceiver<Outbound>,
    events: mpsc::UnboundedSender<Event>,
) {
    let report = |event: TransportEvent| {
        let _ = events.send(Event::Transport { generation, event });
    };

    let request = match build_request(&endpoint) {
        Ok(request) => request,
        Err(e) => {
            report(TransportEvent::Failed(e.to_string()));
            return;
        }
    };

    tracing::debug!(generation, url = %endpoint.url(), "Connecting");

    let attempt = tokio::time::timeout(connect_timeout, connect_async(request));
    let stream = tokio::select! {
        result = attempt => match result {
            Ok(Ok((stream, _response))) => stream,
            Ok(Err(e)) => {
                report(TransportEvent::Failed(TransportError::from(e).to_string()));
                return;
            }
            Err(_) => {
                let millis = u64::try_from(connect_timeout.as_millis()).unwrap_or(u64::MAX);
                report(TransportEvent::Failed(TransportError::Timeout(millis).to_string()));
                return;
            }
        },
        // Closed or dropped while connecting: abandon the attempt silently.
        _ = wait_for_close(&mut outbound) => return,
    };

    report(TransportEvent::Opened);
    let (mut write, mut read) = stream.split();

    loop {
        tokio::select! {
            inbound = read.next() => match inbound {
                Some(Ok(Message::Text(text))) => report(TransportEvent::Frame(text.into_bytes())),
                Some(Ok(Message::Binary(data))) => report(TransportEvent::Frame(data)),
                Some(Ok(Message::Close(frame))) => {
                    let code = frame.map_or(NO_STATUS_RECEIVED, |f| u16::from(f.code));
                    tracing::debug!(generation, code, "Server closed the socket");
                    report(TransportEvent::Closed { code });
                    return;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::debug!(generation, error = %e, "Socket error");
                    report(TransportEvent::Closed { code: ABNORMAL_CLOSURE });
                    return;
                }
                None => {
                    report(TransportEvent::Closed { code: ABNORMAL_CLOSURE });
                    return;
                }
            },
            command = outbound.recv() => match command {
                Some(Outbound::Frame(frame)) => {
                    tracing::trace!(generation, frame = %frame, "Sending frame");
                    if let Err(e) = write.send(Message::Text(frame)).await {
                        tracing::debug!(generation, error = %e, "Send failed");
                        report(TransportEvent::Closed { code: ABNORMAL_CLOSURE });
                        return;
                    }
                }
                Some(Outbound::Close) | None => {
                    let _ = write.send(Message::Close(None)).await;
                    let _ = write.close().await;
                    return;
                }
            },
        }
    }
}

/// Resolves once a close is requested, discarding frames queued before open.
async fn wait_for_close(outbound: &mut mpsc::UnboundedReceiver<Outbound>) {
    while let Some(command) = outbound.recv().await {
        if matches!(command, Outbound::Close) {
            return;
        }
    }
}

fn build_request(endpoint: &Endpoint) -> Result<Request, TransportError> {
    let mut request = endpoint.url().as_str().into_client_request()?;
    let origin = HeaderValue::from_str(endpoint.host())
        .map_err(|e| TransportError::InvalidOrigin(e.to_string()))?;
    request.headers_mut().insert(ORIGIN, origin);
    Ok(request)
}
