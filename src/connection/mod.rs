// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Connection management.
//!
//! The connection is driven by a state machine that never performs I/O
//! itself. A background task executes what it asks for: opening and closing
//! transports, sending frames, and arming the reconnect timer.
//!
//! Every transport is tagged with a generation number. Once a transport is
//! replaced, anything it still reports is discarded, so two transports can
//! never both feed the state store. At most one reconnect timer is pending,
//! and any teardown cancels it before a new transport is created.
//!
//! Invalid configurations are terminal: the status becomes
//! [`Status::BadConfiguration`] and nothing is retried until the
//! configuration changes.

mod driver;
mod machine;
mod reconnect;
mod status;

pub(crate) use driver::Driver;
pub(crate) use machine::{ConnectionMachine, Event};
pub use machine::ConnectionState;
pub use reconnect::ReconnectPolicy;
pub use status::{DisconnectReason, Status};
