// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests against a local WebSocket server playing the switcher.

use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use switcher_lib::{
    ActionParams, DisconnectReason, Model, ReconnectPolicy, Status, Subscribable, Switcher,
    SwitcherConfig,
};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::time::{sleep, timeout};
use tokio_tungstenite::accept_hdr_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;

const WAIT: Duration = Duration::from_secs(5);

/// A fake switcher that hands every accepted socket to the test.
struct MockSwitcher {
    port: u16,
    connections: mpsc::UnboundedReceiver<MockConnection>,
}

/// One client connection seen by the fake switcher.
///
/// Dropping it closes the TCP stream without a close frame.
struct MockConnection {
    origin: Option<String>,
    inbound: mpsc::UnboundedReceiver<String>,
    outbound: mpsc::UnboundedSender<Message>,
}

impl MockSwitcher {
    async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let (tx, connections) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                tokio::spawn(serve(stream, tx.clone()));
            }
        });

        Self { port, connections }
    }

    async fn next_connection(&mut self) -> MockConnection {
        timeout(WAIT, self.connections.recv())
            .await
            .expect("no connection")
            .expect("server stopped")
    }
}

impl MockConnection {
    async fn recv(&mut self) -> String {
        timeout(WAIT, self.inbound.recv())
            .await
            .expect("no frame")
            .expect("connection closed")
    }

    async fn closed(&mut self) {
        loop {
            match timeout(WAIT, self.inbound.recv()).await.expect("still open") {
                Some(_) => {}
                None => return,
            }
        }
    }

    fn send_text(&self, text: &str) {
        self.outbound.send(Message::Text(text.to_string())).unwrap();
    }

    fn close_with(&self, code: CloseCode) {
        let frame = CloseFrame {
            code,
            reason: "".into(),
        };
        self.outbound.send(Message::Close(Some(frame))).unwrap();
    }
}

async fn serve(stream: tokio::net::TcpStream, connections: mpsc::UnboundedSender<MockConnection>) {
    let mut origin = None;
    let record_origin = |request: &Request, response: Response| -> Result<Response, ErrorResponse> {
        origin = request
            .headers()
            .get("origin")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        Ok(response)
    };
    let Ok(socket) = accept_hdr_async(stream, record_origin).await else {
        return;
    };

    let (inbound_tx, inbound) = mpsc::unbounded_channel();
    let (outbound, mut outbound_rx) = mpsc::unbounded_channel();
    let _ = connections.send(MockConnection {
        origin,
        inbound,
        outbound,
    });

    let (mut write, mut read) = socket.split();
    loop {
        tokio::select! {
            message = read.next() => match message {
                Some(Ok(Message::Text(text))) => {
                    let _ = inbound_tx.send(text);
                }
                Some(Ok(Message::Close(_)) | Err(_)) | None => return,
                Some(Ok(_)) => {}
            },
            message = outbound_rx.recv() => match message {
                Some(message) => {
                    let closing = matches!(message, Message::Close(_));
                    let _ = write.send(message).await;
                    if closing {
                        return;
                    }
                }
                None => return,
            },
        }
    }
}

fn config(port: u16, model: Model) -> SwitcherConfig {
    SwitcherConfig::new("127.0.0.1", model)
        .with_port(port)
        .with_reconnect(ReconnectPolicy::fixed(Duration::from_millis(100)))
}

async fn wait_until(mut condition: impl FnMut() -> bool) {
    timeout(WAIT, async {
        while !condition() {
            sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("condition not reached");
}

async fn wait_for_status(switcher: &Switcher, expected: Status) {
    let mut status = switcher.watch_status();
    timeout(WAIT, status.wait_for(|s| *s == expected))
        .await
        .expect("status not reached")
        .unwrap();
}

fn record_statuses(switcher: &Switcher) -> Arc<Mutex<Vec<Status>>> {
    let history = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&history);
    switcher.on_status_changed(move |status| sink.lock().push(status.clone()));
    history
}

// ============================================================================
// Connection Setup
// ============================================================================

mod connection_setup {
    use super::*;

    #[tokio::test]
    async fn bootstrap_sent_on_open() {
        let mut server = MockSwitcher::start().await;
        let switcher = Switcher::with_config(config(server.port, Model::Studio)).unwrap();

        let mut connection = server.next_connection().await;
        assert_eq!(connection.recv().await, "get_state");
        wait_for_status(&switcher, Status::Ok).await;
    }

    #[tokio::test]
    async fn origin_header_is_host() {
        let mut server = MockSwitcher::start().await;
        let _switcher = Switcher::with_config(config(server.port, Model::Compact)).unwrap();

        let connection = server.next_connection().await;
        assert_eq!(connection.origin.as_deref(), Some("127.0.0.1"));
    }

    #[tokio::test]
    async fn classic_model_bootstrap() {
        let mut server = MockSwitcher::start().await;
        let _switcher = Switcher::with_config(config(server.port, Model::StudioClassic)).unwrap();

        let mut connection = server.next_connection().await;
        assert_eq!(connection.recv().await, "STATE?");
    }

    #[tokio::test]
    async fn status_sequence_on_connect() {
        let mut server = MockSwitcher::start().await;
        let switcher = Switcher::new();
        let history = record_statuses(&switcher);
        switcher.configure(config(server.port, Model::Studio)).unwrap();

        let mut connection = server.next_connection().await;
        connection.recv().await;
        wait_for_status(&switcher, Status::Ok).await;

        assert_eq!(*history.lock(), vec![Status::Connecting, Status::Ok]);
    }
}

// ============================================================================
// State Mirroring
// ============================================================================

mod state_mirroring {
    use super::*;

    #[tokio::test]
    async fn frame_updates_variables() {
        let mut server = MockSwitcher::start().await;
        let switcher = Switcher::with_config(config(server.port, Model::Studio)).unwrap();

        let opaque = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&opaque);
        switcher.on_opaque_event(move |raw| sink.lock().push(raw.to_string()));

        let mut connection = server.next_connection().await;
        connection.recv().await;
        connection.send_text("me_1_key_1:on, garbage!!!, me_2_key_3:off, me_1_program:4");

        wait_until(|| switcher.variable("me_1_program").as_deref() == Some("4")).await;
        assert_eq!(switcher.variable("me_1_key_1").as_deref(), Some("on"));
        assert_eq!(switcher.variable("me_2_key_3").as_deref(), Some("off"));
        assert_eq!(switcher.variable("garbage!!!"), None);
        assert_eq!(*opaque.lock(), vec!["garbage!!!".to_string()]);
    }

    #[tokio::test]
    async fn declared_variables_seeded_before_first_frame() {
        let mut server = MockSwitcher::start().await;
        let switcher = Switcher::with_config(config(server.port, Model::Studio)).unwrap();

        server.next_connection().await;
        assert_eq!(switcher.variable("me_2_key_4").as_deref(), Some("off"));
        assert_eq!(switcher.variable("me_1_preview").as_deref(), Some("0"));
    }

    #[tokio::test]
    async fn classic_indicator_codes_are_named() {
        let mut server = MockSwitcher::start().await;
        let switcher = Switcher::with_config(config(server.port, Model::StudioClassic)).unwrap();

        let mut connection = server.next_connection().await;
        connection.recv().await;
        connection.send_text("me_2_key_3:2,me_1_key_1:1");

        wait_until(|| switcher.variable("me_1_key_1").as_deref() == Some("on")).await;
        assert_eq!(switcher.variable("me_2_key_3").as_deref(), Some("next"));
    }

    #[tokio::test]
    async fn variable_callbacks_receive_changes() {
        let mut server = MockSwitcher::start().await;
        let switcher = Switcher::new();

        let changes = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&changes);
        switcher.on_variable("me_1_key_2", move |change| {
            sink.lock().push((change.old.clone(), change.new.clone()));
        });
        switcher.configure(config(server.port, Model::Compact)).unwrap();

        let mut connection = server.next_connection().await;
        connection.recv().await;
        connection.send_text("me_1_key_2:on");
        connection.send_text("me_1_key_2:on");
        connection.send_text("me_1_key_2:off");

        wait_until(|| changes.lock().len() == 3).await;
        assert_eq!(
            *changes.lock(),
            vec![
                (None, "off".to_string()),
                (Some("off".to_string()), "on".to_string()),
                (Some("on".to_string()), "off".to_string()),
            ]
        );
    }
}

// ============================================================================
// Commands
// ============================================================================

mod commands {
    use super::*;

    #[tokio::test]
    async fn actions_reach_device() {
        let mut server = MockSwitcher::start().await;
        let switcher = Switcher::with_config(config(server.port, Model::Studio)).unwrap();

        let mut connection = server.next_connection().await;
        connection.recv().await;
        wait_for_status(&switcher, Status::Ok).await;

        switcher
            .send_action("key_toggle", &ActionParams::new().with("me", "2").with("key", "3"))
            .unwrap();
        switcher
            .send_action("program", &ActionParams::new().with("source", "5"))
            .unwrap();

        assert_eq!(connection.recv().await, "me_2_key_3:toggle");
        assert_eq!(connection.recv().await, "me_1_program:5");
    }

    #[tokio::test]
    async fn classic_dialect_reaches_device() {
        let mut server = MockSwitcher::start().await;
        let switcher = Switcher::with_config(config(server.port, Model::StudioClassic)).unwrap();

        let mut connection = server.next_connection().await;
        connection.recv().await;
        wait_for_status(&switcher, Status::Ok).await;

        switcher
            .send_action("key_on", &ActionParams::new().with("me", "2").with("key", "1"))
            .unwrap();
        assert_eq!(connection.recv().await, "KEY 2 1 ON");
    }

    #[tokio::test]
    async fn commands_while_disconnected_are_dropped() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let switcher = Switcher::with_config(config(port, Model::Studio)).unwrap();
        assert!(switcher.send_action("cut", &ActionParams::new()).is_ok());
    }
}

// ============================================================================
// Reconnection
// ============================================================================

mod reconnection {
    use super::*;

    #[tokio::test]
    async fn server_close_reports_code_and_reconnects() {
        let mut server = MockSwitcher::start().await;
        let switcher = Switcher::new();
        let history = record_statuses(&switcher);
        switcher.configure(config(server.port, Model::Studio)).unwrap();

        let mut first = server.next_connection().await;
        first.recv().await;
        wait_for_status(&switcher, Status::Ok).await;
        first.close_with(CloseCode::Normal);

        let mut second = server.next_connection().await;
        assert_eq!(second.recv().await, "get_state");
        wait_for_status(&switcher, Status::Ok).await;

        assert!(history
            .lock()
            .contains(&Status::Disconnected(DisconnectReason::Closed(1000))));
    }

    #[tokio::test]
    async fn dropped_socket_reports_1006() {
        let mut server = MockSwitcher::start().await;
        let switcher = Switcher::new();
        let history = record_statuses(&switcher);
        switcher.configure(config(server.port, Model::Compact)).unwrap();

        let mut first = server.next_connection().await;
        first.recv().await;
        wait_for_status(&switcher, Status::Ok).await;
        drop(first);

        let mut second = server.next_connection().await;
        second.recv().await;

        assert!(history
            .lock()
            .contains(&Status::Disconnected(DisconnectReason::Closed(1006))));
    }

    #[tokio::test]
    async fn reconnect_waits_for_delay() {
        let mut server = MockSwitcher::start().await;
        let policy = ReconnectPolicy::fixed(Duration::from_millis(400));
        let switcher = Switcher::with_config(
            SwitcherConfig::new("127.0.0.1", Model::Studio)
                .with_port(server.port)
                .with_reconnect(policy),
        )
        .unwrap();

        let mut first = server.next_connection().await;
        first.recv().await;
        wait_for_status(&switcher, Status::Ok).await;

        let closed_at = tokio::time::Instant::now();
        first.close_with(CloseCode::Away);
        server.next_connection().await;

        assert!(closed_at.elapsed() >= Duration::from_millis(400));
    }
}

// ============================================================================
// Reconfiguration and Shutdown
// ============================================================================

mod lifecycle {
    use super::*;

    #[tokio::test]
    async fn reconfigure_switches_servers() {
        let mut old_server = MockSwitcher::start().await;
        let mut new_server = MockSwitcher::start().await;
        let switcher = Switcher::with_config(config(old_server.port, Model::Studio)).unwrap();

        let mut old = old_server.next_connection().await;
        old.recv().await;
        wait_for_status(&switcher, Status::Ok).await;
        old.send_text("me_1_program:9");
        wait_until(|| switcher.variable("me_1_program").as_deref() == Some("9")).await;

        switcher
            .configure(config(new_server.port, Model::StudioClassic))
            .unwrap();

        old.closed().await;
        let mut new = new_server.next_connection().await;
        assert_eq!(new.recv().await, "STATE?");
        assert_eq!(switcher.model(), Some(Model::StudioClassic));
        assert_eq!(switcher.variable("me_1_program").as_deref(), Some("0"));

        // The old server never sees a second attempt.
        assert!(
            timeout(Duration::from_millis(300), old_server.connections.recv())
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn invalid_host_never_connects() {
        let switcher = Switcher::with_config(SwitcherConfig::new("not a host", Model::Studio)).unwrap();
        let mut status = switcher.watch_status();

        let status = timeout(WAIT, status.wait_for(Status::is_bad_configuration))
            .await
            .unwrap()
            .unwrap()
            .clone();
        assert!(matches!(status, Status::BadConfiguration(_)));
    }

    #[tokio::test]
    async fn shutdown_closes_socket() {
        let mut server = MockSwitcher::start().await;
        let switcher = Switcher::with_config(config(server.port, Model::Studio)).unwrap();

        let mut connection = server.next_connection().await;
        connection.recv().await;
        switcher.shutdown();

        connection.closed().await;
        wait_for_status(&switcher, Status::Disconnected(DisconnectReason::Shutdown)).await;
    }

    #[tokio::test]
    async fn dropping_switcher_closes_socket() {
        let mut server = MockSwitcher::start().await;
        let switcher = Switcher::with_config(config(server.port, Model::Studio)).unwrap();

        let mut connection = server.next_connection().await;
        connection.recv().await;
        drop(switcher);

        connection.closed().await;
    }
}
