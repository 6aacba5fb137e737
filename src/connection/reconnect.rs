// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Reconnect timing and the cancellable reconnect timer.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::duration_ms;

use super::machine::Event;

/// Fixed-delay reconnect timing.
///
/// There is no backoff: every retry waits the same delay. Until the current
/// configuration has connected once, the longer `initial_delay` applies.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use switcher_lib::connection::ReconnectPolicy;
///
/// let policy = ReconnectPolicy::default();
/// assert_eq!(policy.delay_for(false), Duration::from_secs(15));
/// assert_eq!(policy.delay_for(true), Duration::from_secs(5));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconnectPolicy {
    /// Delay after losing an established connection.
    #[serde(default = "default_delay", rename = "delay_ms", with = "duration_ms")]
    pub delay: Duration,
    /// Delay while the configuration has never connected.
    #[serde(
        default = "default_initial_delay",
        rename = "initial_delay_ms",
        with = "duration_ms"
    )]
    pub initial_delay: Duration,
}

fn default_delay() -> Duration {
    Duration::from_secs(5)
}

fn default_initial_delay() -> Duration {
    Duration::from_secs(15)
}

impl ReconnectPolicy {
    /// Creates a policy with default delays.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses the same delay whether or not a connection was ever established.
    #[must_use]
    pub fn fixed(delay: Duration) -> Self {
        Self {
            delay,
            initial_delay: delay,
        }
    }

    /// Sets the delay after losing an established connection.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Sets the delay used before the first successful connection.
    #[must_use]
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Returns the delay to wait before the next attempt.
    #[must_use]
    pub fn delay_for(&self, has_connected: bool) -> Duration {
        if has_connected {
            self.delay
        } else {
            self.initial_delay
        }
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            delay: default_delay(),
            initial_delay: default_initial_delay(),
        }
    }
}

/// A pending reconnect.
///
/// Fires `Event::ReconnectDue` after the delay. Dropping the handle cancels
/// the timer.
pub(crate) struct ReconnectTimer {
    token: u64,
    task: JoinHandle<()>,
}

impl ReconnectTimer {
    pub(crate) fn schedule(delay: Duration, token: u64, events: mpsc::UnboundedSender<Event>) -> Self {
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = events.send(Event::ReconnectDue { token });
        });
        Self { token, task }
    }

    pub(crate) fn token(&self) -> u64 {
        self.token
    }
}

impl Drop for ReconnectTimer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl std::fmt::Debug for ReconnectTimer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReconnectTimer")
            .field("token", &self.token)
            .finish_non_exhaustive()
    }
}
