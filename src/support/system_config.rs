//-
// Copyright (c) 2023, Jason Lingle
//
// This file is part of Localstatus.
//
// Localstatus is free software: you can  redistribute it and/or modify it
// under the terms of the GNU General Public License as published by the Free
// Software Foundation, either version 3 of the License, or (at your option)
// any later version.
//
// Localstatus is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or
// FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for
// more details.
//
// You should have received a copy of the GNU General Public License along with
// Localstatus. If not, see <http://www.gnu.org/licenses/>.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::Error;

/// Configuration for a status store.
///
/// This is normally read from a TOML file; every field has a usable default,
/// so an empty file is a valid configuration.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct StatusConfig {
    /// How writes reach the disk.
    #[serde(default)]
    pub persistence: PersistenceConfig,

    /// How transient locking conflicts are handled.
    #[serde(default)]
    pub retry: RetryConfig,
}

impl StatusConfig {
    /// Reads and parses the TOML configuration at `path`.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let text = fs::read_to_string(path)?;
        toml::from_str(&text).map_err(Into::into)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PersistenceStrategy {
    /// Every mutation is committed immediately on its own connection.
    ///
    /// Nothing is lost on a crash, at the cost of one fsync per write.
    WriteThrough,
    /// Mutations accumulate in one transaction on a long-lived connection
    /// until `save()` is called.
    ///
    /// A crash loses everything written since the last `save()`.
    Deferred,
}

impl Default for PersistenceStrategy {
    fn default() -> Self {
        PersistenceStrategy::WriteThrough
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct PersistenceConfig {
    pub strategy: PersistenceStrategy,

    /// How long SQLite itself waits on a lock before reporting `SQLITE_BUSY`,
    /// in milliseconds. Busy reports beyond this are handled by `retry`.
    pub busy_timeout_ms: u64,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            strategy: PersistenceStrategy::default(),
            busy_timeout_ms: 100,
        }
    }
}

impl PersistenceConfig {
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// The maximum number of attempts at a write before giving up with
    /// `Error::Busy`. 0 means to retry forever.
    pub max_attempts: u32,
    /// The delay after the first busy attempt, in milliseconds. Each further
    /// delay doubles, up to `max_backoff_ms`.
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 0,
            initial_backoff_ms: 1,
            max_backoff_ms: 250,
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            initial_backoff: Duration::from_millis(self.initial_backoff_ms),
            max_backoff: Duration::from_millis(
                self.max_backoff_ms.max(self.initial_backoff_ms),
            ),
        }
    }
}

/// The resolved form of `RetryConfig`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl RetryPolicy {
    /// Returns the delay to wait after `attempt` (1-based) failed, or `None`
    /// if no further attempt should be made.
    pub fn backoff(&self, attempt: u32) -> Option<Duration> {
        if 0 != self.max_attempts && attempt >= self.max_attempts {
            return None;
        }

        let shift = attempt.saturating_sub(1).min(31);
        Some(
            self.initial_backoff
                .checked_mul(1u32 << shift)
                .unwrap_or(self.max_backoff)
                .min(self.max_backoff),
        )
    }
}
