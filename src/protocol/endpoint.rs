// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Validated WebSocket endpoint of a switcher.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use url::{Host, Url};

use crate::error::ConfigError;
use crate::model::Model;

/// Hostname or dotted IPv4 address: labels of `[A-Za-z0-9-]` separated by dots.
static HOST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9]([A-Za-z0-9-]*[A-Za-z0-9])?(\.[A-Za-z0-9]([A-Za-z0-9-]*[A-Za-z0-9])?)*$")
        .unwrap_or_else(|e| unreachable!("host grammar: {e}"))
});

/// Where to reach a switcher.
///
/// An endpoint is immutable; changing any part means building a new one and
/// reconnecting.
///
/// # Examples
///
/// ```
/// use switcher_lib::Model;
/// use switcher_lib::protocol::Endpoint;
///
/// let endpoint = Endpoint::new("10.0.0.20", Model::StudioClassic, None).unwrap();
/// assert_eq!(endpoint.url().as_str(), "ws://10.0.0.20:6800/");
///
/// assert!(Endpoint::new("", Model::Studio, None).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    host: String,
    model: Model,
    port: u16,
    url: Url,
}

impl Endpoint {
    /// Validates a host and model into an endpoint.
    ///
    /// The port comes from the model unless `port` overrides it.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the host is empty or malformed, or the
    /// resulting URL does not carry the expected scheme, host and port.
    pub fn new(host: &str, model: Model, port: Option<u16>) -> Result<Self, ConfigError> {
        let host = host.trim();
        if host.is_empty() {
            return Err(ConfigError::EmptyHost);
        }
        if !HOST.is_match(host) {
            return Err(ConfigError::InvalidHost(host.to_string()));
        }

        let port = port.unwrap_or_else(|| model.default_port());
        let raw = format!("ws://{host}:{port}");
        let url = Url::parse(&raw).map_err(|e| ConfigError::InvalidUrl {
            url: raw.clone(),
            reason: e.to_string(),
        })?;

        let invalid = |reason: &str| ConfigError::InvalidUrl {
            url: raw.clone(),
            reason: reason.to_string(),
        };
        if url.scheme() != "ws" {
            return Err(invalid("scheme is not ws"));
        }
        match url.host() {
            Some(Host::Domain(d)) if d.eq_ignore_ascii_case(host) => {}
            Some(Host::Ipv4(ip)) if ip.to_string() == host => {}
            _ => return Err(invalid("host does not round-trip")),
        }
        // `Url` elides the scheme's default port, so compare with the known default.
        if url.port_or_known_default() != Some(port) {
            return Err(invalid("port does not round-trip"));
        }

        Ok(Self {
            host: host.to_string(),
            model,
            port,
            url,
        })
    }

    /// Returns the host, also sent as the `origin` header.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the model.
    #[must_use]
    pub fn model(&self) -> Model {
        self.model
    }

    /// Returns the port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns the WebSocket URL.
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.url, self.model)
    }
}
