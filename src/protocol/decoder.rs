// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Inbound frame decoding.
//!
//! A frame is a comma-separated list of tokens. Tokens made only of
//! `[A-Za-z0-9_:]` are state tokens and go through the model's token parser;
//! anything else is an opaque event. Decoding never fails: a state token the
//! parser does not understand is dropped.
//!
//! # Examples
//!
//! ```
//! use switcher_lib::model::TokenParser;
//! use switcher_lib::protocol::{DecodedItem, decode};
//!
//! let items = decode(b"me_1_key_1:on, garbage!!!", TokenParser::Plain);
//! assert_eq!(
//!     items,
//!     vec![
//!         DecodedItem::state_update("me_1_key_1", "on"),
//!         DecodedItem::OpaqueEvent("garbage!!!".to_string()),
//!     ]
//! );
//! ```

use std::sync::LazyLock;

use regex::Regex;

use crate::model::TokenParser;
use crate::types::KeyState;

/// Character class every state token must satisfy.
static STATE_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_:]*$").unwrap_or_else(|e| unreachable!("token grammar: {e}"))
});

/// Keyer indicator variable names, as reported by classic firmware.
static KEY_VARIABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^me_[0-9]+_key_[0-9]+$").unwrap_or_else(|e| unreachable!("key grammar: {e}"))
});

/// One decoded piece of a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedItem {
    /// A variable's current value.
    StateUpdate {
        /// Variable name.
        key: String,
        /// Reported value.
        value: String,
    },
    /// A token outside the state grammar, passed on verbatim.
    OpaqueEvent(String),
}

impl DecodedItem {
    /// Creates a state update.
    #[must_use]
    pub fn state_update(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::StateUpdate {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Returns true if a trimmed token satisfies the state grammar.
#[must_use]
pub fn is_state_token(token: &str) -> bool {
    STATE_TOKEN.is_match(token)
}

/// Decodes a frame into items, in the order the tokens appeared.
///
/// Invalid UTF-8 is replaced rather than rejected.
#[must_use]
pub fn decode(frame: &[u8], parser: TokenParser) -> Vec<DecodedItem> {
    let text = String::from_utf8_lossy(frame);
    let mut items = Vec::new();

    for token in text.split(',').map(str::trim) {
        if is_state_token(token) {
            match parse_variable(token, parser) {
                Some((key, value)) => items.push(DecodedItem::StateUpdate { key, value }),
                None => tracing::trace!(token, "Dropped unparseable state token"),
            }
        } else {
            items.push(DecodedItem::OpaqueEvent(token.to_string()));
        }
    }

    items
}

/// Splits a state token into a key and value.
///
/// Returns `None` when either side is empty.
#[must_use]
pub fn parse_variable(token: &str, parser: TokenParser) -> Option<(String, String)> {
    let (key, value) = token.split_once(':')?;
    if key.is_empty() || value.is_empty() {
        return None;
    }

    let value = match parser {
        TokenParser::Plain => value.to_string(),
        TokenParser::IndicatorCodes => indicator_value(key, value),
    };
    Some((key.to_string(), value))
}

/// Maps classic numeric keyer codes onto indicator names.
///
/// Codes outside the known set pass through unchanged.
fn indicator_value(key: &str, value: &str) -> String {
    if KEY_VARIABLE.is_match(key)
        && value.bytes().all(|b| b.is_ascii_digit())
        && let Ok(state) = value.parse::<KeyState>()
    {
        return state.as_str().to_string();
    }
    value.to_string()
}
