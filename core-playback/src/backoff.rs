//! # Reconnect Backoff
//!
//! Pure calculation of retry wait times for the stall-reconnect loop.
//!
//! The first attempt is always immediate: a momentary stall usually recovers
//! the instant the player is re-kicked. From the second attempt on, waits
//! grow geometrically from the configured base, with up to one second of
//! uniform jitter added so a fleet of clients does not reconnect in
//! lockstep, capped at the configured maximum per attempt. There is no cap
//! on attempt count; the loop owns termination.

use core_runtime::config::BackoffConfig;
use std::time::Duration;

/// Source of the uniform [0, 1) jitter term, injectable for deterministic
/// tests.
type JitterSource = Box<dyn FnMut() -> f64 + Send>;

/// Exponential backoff state for one backend controller.
///
/// Created once per controller; [`next_wait_time`](Self::next_wait_time)
/// advances the attempt count and accumulates total wait,
/// [`reset`](Self::reset) zeroes both on successful recovery.
pub struct ExponentialBackoff {
    attempts: u32,
    total_wait: Duration,
    initial_wait: Duration,
    maximum_wait: Duration,
    jitter: JitterSource,
}

impl ExponentialBackoff {
    /// Create a backoff with the given base and per-attempt cap.
    pub fn new(initial_wait: Duration, maximum_wait: Duration) -> Self {
        Self {
            attempts: 0,
            total_wait: Duration::ZERO,
            initial_wait,
            maximum_wait,
            jitter: Box::new(rand::random::<f64>),
        }
    }

    /// Create a backoff from controller configuration.
    pub fn from_config(config: &BackoffConfig) -> Self {
        Self::new(config.initial_wait(), config.maximum_wait())
    }

    /// Replace the jitter source. Tests inject a deterministic closure here.
    pub fn with_jitter(mut self, jitter: impl FnMut() -> f64 + Send + 'static) -> Self {
        self.jitter = Box::new(jitter);
        self
    }

    /// Number of waits handed out since construction or the last reset.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Sum of all waits handed out since construction or the last reset.
    pub fn total_wait(&self) -> Duration {
        self.total_wait
    }

    /// Compute the wait before the next reconnect attempt.
    ///
    /// Attempt 0 always yields [`Duration::ZERO`]. Attempt n (n >= 1) yields
    /// `min(max(0, initial * 2^(n-1) + jitter), maximum)` where `jitter` is
    /// a fresh uniform draw from [0, 1) seconds.
    pub fn next_wait_time(&mut self) -> Duration {
        let wait = if self.attempts == 0 {
            Duration::ZERO
        } else {
            let exponent = self.attempts.saturating_sub(1).min(63);
            let deterministic = self.initial_wait.as_secs_f64() * 2f64.powi(exponent as i32);
            let jittered = (deterministic + (self.jitter)()).max(0.0);
            Duration::from_secs_f64(jittered).min(self.maximum_wait)
        };

        self.attempts = self.attempts.saturating_add(1);
        self.total_wait += wait;
        wait
    }

    /// Zero the attempt count and accumulated wait after a successful
    /// recovery, so the next stall starts over with an immediate retry.
    pub fn reset(&mut self) {
        self.attempts = 0;
        self.total_wait = Duration::ZERO;
    }
}

impl std::fmt::Debug for ExponentialBackoff {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExponentialBackoff")
            .field("attempts", &self.attempts)
            .field("total_wait", &self.total_wait)
            .field("initial_wait", &self.initial_wait)
            .field("maximum_wait", &self.maximum_wait)
            .finish()
    }
}
