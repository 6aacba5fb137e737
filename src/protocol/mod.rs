// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wire protocol: endpoint construction, inbound decoding, and the
//! WebSocket transport.

mod decoder;
mod endpoint;
pub(crate) mod transport;

pub use decoder::{DecodedItem, decode, is_state_token, parse_variable};
pub use endpoint::Endpoint;
