// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the switcher library.
//!
//! Errors are split by where they can occur: configuration, the WebSocket
//! transport, and local action encoding. Transport errors never reach the
//! caller directly; the connection driver turns them into a
//! [`Status`](crate::connection::Status) and retries.

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// A value is outside its allowed domain.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// The configuration is invalid.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Socket-level failure.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// An action could not be turned into a command.
    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),

    /// The connection driver is no longer running.
    #[error("connection driver has shut down")]
    ChannelClosed,
}

/// Errors related to value validation and constraints.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A numeric value is outside the allowed range.
    #[error("value {actual} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Minimum allowed value.
        min: u8,
        /// Maximum allowed value.
        max: u8,
        /// The actual value that was provided.
        actual: u8,
    },

    /// A string does not name a key indicator state.
    #[error("invalid key state: {0}")]
    InvalidKeyState(String),

    /// A string does not name a key switch operation.
    #[error("invalid key switch: {0}")]
    InvalidKeySwitch(String),
}

/// Errors caused by an invalid or missing configuration.
///
/// These are terminal until the configuration changes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// No host was provided.
    #[error("host is empty")]
    EmptyHost,

    /// The host contains characters that cannot form a hostname or IPv4 address.
    #[error("invalid host: {0}")]
    InvalidHost(String),

    /// The endpoint URL did not survive validation.
    #[error("invalid endpoint URL {url}: {reason}")]
    InvalidUrl {
        /// The URL that was built from the configuration.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The model id does not name a supported model.
    #[error("unknown model: {0}")]
    UnknownModel(String),

    /// Configuration text could not be parsed.
    #[error("malformed configuration: {0}")]
    Malformed(String),
}

/// Socket-level errors during connect or while connected.
#[derive(Debug, Error)]
pub enum TransportError {
    /// WebSocket handshake or stream failure.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// The connect attempt did not finish in time.
    #[error("connect timed out after {0} ms")]
    Timeout(u64),

    /// The `origin` header could not be built from the host.
    #[error("invalid origin header: {0}")]
    InvalidOrigin(String),
}

/// Errors raised while encoding an action for a model.
///
/// Encoding failures are local: no command is sent.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// The action id is not known.
    #[error("unknown action: {0}")]
    UnknownAction(String),

    /// The model cannot perform this action.
    #[error("{action} is not supported by {model}")]
    Unsupported {
        /// The action id.
        action: String,
        /// The model label.
        model: String,
    },

    /// A required parameter was not supplied.
    #[error("missing parameter: {0}")]
    MissingParam(&'static str),

    /// A parameter value could not be interpreted.
    #[error("invalid value {value:?} for parameter {name}")]
    InvalidParam {
        /// The parameter name.
        name: &'static str,
        /// The rejected value.
        value: String,
    },

    /// No model is configured yet.
    #[error("no model configured")]
    NotConfigured,
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
