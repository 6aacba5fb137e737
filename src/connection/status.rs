// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Coarse connection status reported to the caller.

use std::fmt;

/// Connection status as seen by a control surface.
///
/// Informational only; nothing in the library reacts to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// A connect attempt is in flight.
    Connecting,
    /// The transport is open and the bootstrap query has been sent.
    Ok,
    /// No transport is open.
    Disconnected(DisconnectReason),
    /// The configuration cannot produce a valid endpoint. No retry happens
    /// until the configuration changes.
    BadConfiguration(String),
}

impl Status {
    /// Returns true if the transport is open.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }

    /// Returns true for a configuration error.
    #[must_use]
    pub fn is_bad_configuration(&self) -> bool {
        matches!(self, Self::BadConfiguration(_))
    }
}

impl Default for Status {
    fn default() -> Self {
        Self::Disconnected(DisconnectReason::NotConfigured)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connecting => f.write_str("connecting"),
            Self::Ok => f.write_str("ok"),
            Self::Disconnected(reason) => write!(f, "disconnected: {reason}"),
            Self::BadConfiguration(reason) => write!(f, "bad configuration: {reason}"),
        }
    }
}

/// Why the transport is not open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisconnectReason {
    /// Nothing has been configured yet.
    NotConfigured,
    /// The socket closed with a WebSocket close code.
    Closed(u16),
    /// The connect attempt failed.
    Error(String),
    /// The client was shut down.
    Shutdown,
}

impl DisconnectReason {
    /// Returns the close code, if the socket closed with one.
    #[must_use]
    pub fn code(&self) -> Option<u16> {
        match self {
            Self::Closed(code) => Some(*code),
            _ => None,
        }
    }
}

impl fmt::Display for DisconnectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConfigured => f.write_str("not configured"),
            Self::Closed(code) => write!(f, "closed with code {code}"),
            Self::Error(reason) => f.write_str(reason),
            Self::Shutdown => f.write_str("shut down"),
        }
    }
}
