// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Switcher Lib - A Rust library to control video production switchers.
//!
//! This library keeps a WebSocket connection to a switcher, mirrors the
//! device's reported state in a key/value store, and turns control-surface
//! actions into the command strings each model understands.
//!
//! # Supported Features
//!
//! - **Transitions**: Cut, auto and fade-to-black per mix-effect bank
//! - **Keyers**: On/off/toggle for up to four keyers per bank
//! - **Sources**: Program and preview bus selection
//! - **State mirroring**: Key indicators, program and preview per bank
//! - **Reconnection**: Fixed-delay retry after any transport loss
//!
//! # Supported Models
//!
//! - Compact 1 M/E
//! - Studio 2 M/E
//! - Studio Classic 2 M/E (legacy command dialect)
//!
//! # Quick Start
//!
//! ```no_run
//! use switcher_lib::{ActionParams, Model, Status, Switcher, SwitcherConfig};
//! use switcher_lib::subscription::Subscribable;
//!
//! #[tokio::main]
//! async fn main() -> switcher_lib::Result<()> {
//!     let switcher = Switcher::new();
//!
//!     switcher.on_variable_changed(|change| {
//!         println!("{} is now {}", change.key, change.new);
//!     });
//!     switcher.on_status_changed(|status| println!("status: {status}"));
//!
//!     switcher.configure(SwitcherConfig::new("10.0.0.20", Model::Studio))?;
//!
//!     let mut status = switcher.watch_status();
//!     status.wait_for(Status::is_ok).await.ok();
//!
//!     switcher.send_action("cut", &ActionParams::new().with("me", "1"))?;
//!     Ok(())
//! }
//! ```
//!
//! # Connection Lifecycle
//!
//! The connection is owned by a background task. Calls on [`Switcher`]
//! never wait for I/O: commands are queued for the driver, and results
//! arrive later as variable changes and [`Status`] updates. A lost
//! connection is retried on a fixed delay. An invalid host is reported once
//! as [`Status::BadConfiguration`] and is not retried.

mod client;
pub mod command;
pub mod config;
pub mod connection;
pub mod error;
pub mod model;
pub mod protocol;
pub mod state;
pub mod subscription;
pub mod types;

pub use client::Switcher;
pub use command::{Action, ActionParams, Command, encode};
pub use config::SwitcherConfig;
pub use connection::{ConnectionState, DisconnectReason, ReconnectPolicy, Status};
pub use error::{ConfigError, EncodeError, Error, Result, TransportError, ValueError};
pub use model::Model;
pub use state::{StateStore, VariableChange};
pub use subscription::{CallbackRegistry, Subscribable, SubscriptionId};
pub use types::{KeyIndex, KeyState, KeySwitch, MixEffect};
