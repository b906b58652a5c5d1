//! # Playback Configuration
//!
//! Configuration surface for the playback control core. Values are plain
//! data with serde derives so hosts can load them from whatever settings
//! store they use; `validate()` catches non-sensical combinations early.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Reconnect backoff tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackoffConfig {
    /// Base wait before the second reconnect attempt (the first retry is
    /// always immediate), in milliseconds.
    pub initial_wait_ms: u64,
    /// Cap on any single attempt's wait, in milliseconds.
    pub maximum_wait_ms: u64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial_wait_ms: 500,
            maximum_wait_ms: 30_000,
        }
    }
}

impl BackoffConfig {
    /// Base wait as a [`Duration`].
    pub fn initial_wait(&self) -> Duration {
        Duration::from_millis(self.initial_wait_ms)
    }

    /// Wait cap as a [`Duration`].
    pub fn maximum_wait(&self) -> Duration {
        Duration::from_millis(self.maximum_wait_ms)
    }
}

/// Top-level configuration for a backend controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Reconnect backoff tuning.
    pub backoff: BackoffConfig,
    /// Event bus buffer size per subscriber.
    pub event_buffer_size: usize,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            backoff: BackoffConfig::default(),
            event_buffer_size: 100,
        }
    }
}

impl PlaybackConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] describing the first invalid field found.
    pub fn validate(&self) -> Result<()> {
        if self.backoff.maximum_wait_ms == 0 {
            return Err(Error::Config(
                "backoff.maximum_wait_ms must be greater than zero".to_string(),
            ));
        }
        if self.backoff.initial_wait_ms > self.backoff.maximum_wait_ms {
            return Err(Error::Config(format!(
                "backoff.initial_wait_ms ({}) exceeds backoff.maximum_wait_ms ({})",
                self.backoff.initial_wait_ms, self.backoff.maximum_wait_ms
            )));
        }
        if self.event_buffer_size == 0 {
            return Err(Error::Config(
                "event_buffer_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
