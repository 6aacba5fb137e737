// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! User configuration for a switcher connection.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::connection::ReconnectPolicy;
use crate::error::ConfigError;
use crate::model::Model;
use crate::protocol::Endpoint;

/// Default bound on a single connect attempt.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for a switcher connection.
///
/// Only `host` and `model` are required; everything else has a default.
/// Construction never fails: the host is validated when the configuration
/// is applied, and an invalid one surfaces as a bad-configuration status.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use switcher_lib::{Model, SwitcherConfig};
/// use switcher_lib::connection::ReconnectPolicy;
///
/// let config = SwitcherConfig::new("10.0.0.20", Model::Studio)
///     .with_reconnect(ReconnectPolicy::new().with_delay(Duration::from_secs(2)))
///     .with_connect_timeout(Duration::from_secs(3));
///
/// assert_eq!(config.port(), 9990);
///
/// let config = SwitcherConfig::from_json(r#"{"host": "10.0.0.21", "model": "studio_classic"}"#)
///     .unwrap();
/// assert_eq!(config.port(), 6800);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitcherConfig {
    /// Device hostname or IPv4 address.
    pub host: String,
    /// Device model.
    pub model: Model,
    /// Port override; the model's port is used when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    /// Reconnect timing.
    #[serde(default)]
    pub reconnect: ReconnectPolicy,
    /// Bound on a single connect attempt.
    #[serde(
        default = "default_connect_timeout",
        rename = "connect_timeout_ms",
        with = "duration_ms"
    )]
    pub connect_timeout: Duration,
}

fn default_connect_timeout() -> Duration {
    DEFAULT_CONNECT_TIMEOUT
}

impl SwitcherConfig {
    /// Creates a configuration with default timing.
    #[must_use]
    pub fn new(host: impl Into<String>, model: Model) -> Self {
        Self {
            host: host.into(),
            model,
            port: None,
            reconnect: ReconnectPolicy::default(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    /// Parses a configuration from JSON.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Malformed` if the text is not a valid
    /// configuration object, including an unknown model id.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(text).map_err(|e| ConfigError::Malformed(e.to_string()))
    }

    /// Serializes the configuration to JSON.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Malformed` if serialization fails.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string(self).map_err(|e| ConfigError::Malformed(e.to_string()))
    }

    /// Overrides the model's port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Sets the reconnect policy.
    #[must_use]
    pub fn with_reconnect(mut self, policy: ReconnectPolicy) -> Self {
        self.reconnect = policy;
        self
    }

    /// Sets the connect timeout.
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Returns the port that will be dialled.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port.unwrap_or_else(|| self.model.default_port())
    }

    /// Validates the host and builds the endpoint.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the host or the resulting URL is invalid.
    pub fn endpoint(&self) -> Result<Endpoint, ConfigError> {
        Endpoint::new(&self.host, self.model, self.port)
    }
}

/// Serde adapter storing a `Duration` as whole milliseconds.
pub(crate) mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        let millis = u64::try_from(value.as_millis()).unwrap_or(u64::MAX);
        serializer.serialize_u64(millis)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = SwitcherConfig::new("10.0.0.1", Model::Compact);
        assert_eq!(config.port, None);
        assert_eq!(config.port(), 9990);
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.reconnect, ReconnectPolicy::default());
    }

    #[test]
    fn port_override() {
        let config = SwitcherConfig::new("10.0.0.1", Model::StudioClassic).with_port(7000);
        assert_eq!(config.port(), 7000);
        assert_eq!(config.endpoint().unwrap().port(), 7000);
    }

    #[test]
    fn from_json_minimal() {
        let config = SwitcherConfig::from_json(r#"{"host":"sw.local","model":"compact"}"#).unwrap();
        assert_eq!(config, SwitcherConfig::new("sw.local", Model::Compact));
    }

    #[test]
    fn from_json_full() {
        let config = SwitcherConfig::from_json(
            r#"{
                "host": "sw.local",
                "model": "studio",
                "port": 19990,
                "reconnect": {"delay_ms": 1000, "initial_delay_ms": 2000},
                "connect_timeout_ms": 500
            }"#,
        )
        .unwrap();
        assert_eq!(config.port(), 19990);
        assert_eq!(config.reconnect.delay, Duration::from_secs(1));
        assert_eq!(config.reconnect.initial_delay, Duration::from_secs(2));
        assert_eq!(config.connect_timeout, Duration::from_millis(500));
    }

    #[test]
    fn from_json_unknown_model() {
        let result = SwitcherConfig::from_json(r#"{"host":"sw.local","model":"mega"}"#);
        assert!(matches!(result, Err(ConfigError::Malformed(_))));
    }

    #[test]
    fn json_round_trip_preserves_timing() {
        let config = SwitcherConfig::new("sw.local", Model::Studio)
            .with_connect_timeout(Duration::from_millis(1500));
        let json = config.to_json().unwrap();
        assert!(json.contains("\"connect_timeout_ms\":1500"));
        assert_eq!(SwitcherConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn empty_host_is_accepted_until_applied() {
        let config = SwitcherConfig::new("", Model::Studio);
        assert_eq!(config.endpoint(), Err(ConfigError::EmptyHost));
    }
}
