//! # Playback Error Types
//!
//! Error taxonomy for playback control operations. Everything here is
//! absorbed at the backend-controller boundary except session activation,
//! which the public `play()` contract surfaces to callers.

use bridge_traits::session::SessionError;
use thiserror::Error;

/// Errors that can occur during playback control operations.
#[derive(Error, Debug)]
pub enum PlaybackError {
    /// The audio session could not be acquired. Playback simply does not
    /// start until the next `play()` call.
    #[error("Session activation failed: {0}")]
    SessionActivation(#[source] SessionError),

    /// A command to the underlying player failed.
    #[error("Player command failed: {0}")]
    PlayerCommand(String),

    /// The controller backing an operation has already been torn down.
    #[error("Controller no longer available")]
    ControllerGone,

    /// Configuration rejected by validation.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not occur in normal operation).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PlaybackError {
    /// Returns `true` if this error is transient and the operation can be
    /// retried on the next user action.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            PlaybackError::SessionActivation(_) | PlaybackError::PlayerCommand(_)
        )
    }
}

/// Result type for playback control operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;
