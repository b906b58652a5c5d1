//! Analytics sink bridge trait.
//!
//! The core emits a small set of playback analytics events (play, pause with
//! listened duration, session failures, route changes). Transport is the
//! host's concern; the core only needs a fire-and-forget capture call.

use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// Trait for host analytics pipelines.
///
/// `capture` must not block; implementations should queue and ship events on
/// their own schedule. The provided `play`/`pause` conveniences standardize
/// the event names and property keys the core uses.
pub trait AnalyticsSink: Send + Sync {
    /// Record an event with arbitrary string properties.
    fn capture(&self, event: &str, properties: HashMap<String, String>);

    /// Record a playback start, tagged with the reason it was requested
    /// (user tap, remote command, reconnect, controller switch, ...).
    fn play(&self, reason: &str) {
        let mut properties = HashMap::new();
        properties.insert("play_reason".to_string(), reason.to_string());
        self.capture("playback_started", properties);
    }

    /// Record a playback pause carrying the elapsed listening duration since
    /// the matching play, plus the reason that play was issued for.
    fn pause(&self, listened: Duration, reason: Option<&str>) {
        let mut properties = HashMap::new();
        properties.insert(
            "listened_secs".to_string(),
            listened.as_secs().to_string(),
        );
        if let Some(reason) = reason {
            properties.insert("play_reason".to_string(), reason.to_string());
        }
        self.capture("playback_paused", properties);
    }
}

/// Sink that drops every event. Useful for tests and headless tools.
#[derive(Debug, Clone, Default)]
pub struct NoopAnalytics;

impl AnalyticsSink for NoopAnalytics {
    fn capture(&self, _event: &str, _properties: HashMap<String, String>) {}
}

/// Sink that mirrors events into the `tracing` pipeline at debug level.
/// A reasonable default while a host has no analytics transport wired up.
#[derive(Debug, Clone, Default)]
pub struct TracingAnalytics;

impl AnalyticsSink for TracingAnalytics {
    fn capture(&self, event: &str, properties: HashMap<String, String>) {
        debug!(target: "analytics", event, ?properties, "analytics event");
    }
}
