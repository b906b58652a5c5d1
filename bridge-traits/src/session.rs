//! Audio session bridge trait.
//!
//! An audio session models exclusive ownership of the device audio output:
//! activating it may interrupt other apps, and the OS may interrupt it in
//! turn. Exactly one backend controller holds an active session at a time;
//! the manager enforces this ordering when switching backends.

use thiserror::Error;

/// Errors raised by session activation and deactivation.
#[derive(Error, Debug)]
pub enum SessionError {
    /// The OS refused to activate the session (e.g., another process holds
    /// exclusive output, or the app lacks the required entitlement).
    #[error("Audio session activation failed: {0}")]
    ActivationFailed(String),

    /// Deactivation failed. Usually harmless; logged and ignored by the core.
    #[error("Audio session deactivation failed: {0}")]
    DeactivationFailed(String),
}

/// Kind of audio output port a route terminates in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutePortKind {
    BuiltInSpeaker,
    Headphones,
    Bluetooth,
    AirPlay,
    CarAudio,
    /// Port type not recognized or not yet mapped to a dedicated variant.
    Other(String),
}

/// A single output port in the current audio route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePort {
    /// Kind of port (speaker, headphones, ...).
    pub kind: RoutePortKind,
    /// Human-readable port name as reported by the OS.
    pub name: String,
}

/// The session's current audio route.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AudioRoute {
    /// Output ports the session is currently routed to.
    pub outputs: Vec<RoutePort>,
}

impl AudioRoute {
    /// Returns `true` if any output port is an external device (anything
    /// other than the built-in speaker).
    pub fn has_external_output(&self) -> bool {
        self.outputs
            .iter()
            .any(|port| !matches!(port.kind, RoutePortKind::BuiltInSpeaker))
    }
}

/// Trait for the platform audio session.
///
/// Activation is notionally asynchronous but awaited inline by the core; a
/// failed activation is surfaced through the public `play()` contract and is
/// not retried on a timer.
#[async_trait::async_trait]
pub trait AudioSession: Send + Sync {
    /// Acquire exclusive audio output for this app.
    async fn activate(&self) -> Result<(), SessionError>;

    /// Release the audio output so other apps can resume.
    async fn deactivate(&self) -> Result<(), SessionError>;

    /// The route audio is currently leaving through.
    fn current_route(&self) -> AudioRoute;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_external_output_detection() {
        let builtin = AudioRoute {
            outputs: vec![RoutePort {
                kind: RoutePortKind::BuiltInSpeaker,
                name: "Speaker".to_string(),
            }],
        };
        assert!(!builtin.has_external_output());

        let bluetooth = AudioRoute {
            outputs: vec![RoutePort {
                kind: RoutePortKind::Bluetooth,
                name: "Kitchen Speaker".to_string(),
            }],
        };
        assert!(bluetooth.has_external_output());

        assert!(!AudioRoute::default().has_external_output());
    }
}
