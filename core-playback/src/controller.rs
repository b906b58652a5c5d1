//! # Playback Controller Contract
//!
//! The trait every concrete backend controller implements, plus the derived
//! playback state projection and the handler types the manager transfers
//! across backend switches.

use crate::error::Result;
use bridge_traits::player::AudioFrameChunk;
use std::collections::HashMap;
use std::sync::Arc;

/// Derived playback state exposed to UI and widget layers.
///
/// Never independently settable: it is a projection of the underlying
/// player's reported rate/buffering plus the controller's own intent flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    /// No playback session; the audio session has been released.
    Stopped,
    /// The player reports a non-zero rate.
    Playing,
    /// Silent, and the user did not ask for playback (or an interruption
    /// paused it on their behalf).
    Paused,
    /// The user asked for playback and the player is waiting for data, or a
    /// reconnect loop is in flight.
    Buffering,
    /// The last session activation failed; cleared by the next user action.
    Error,
}

/// Callback consuming decoded audio frames for visualization.
pub type AudioBufferHandler = Arc<dyn Fn(AudioFrameChunk) + Send + Sync>;

/// Callback consuming stream metadata key/value pairs.
pub type MetadataHandler = Arc<dyn Fn(HashMap<String, String>) + Send + Sync>;

/// The contract every concrete backend controller implements.
///
/// One backend owns one underlying player, one audio session, and one remote
/// command surface, and runs the interruption/stall/lifecycle state machine
/// over them. All operations are serialized on the controller's internal
/// scheduling context; callers never need external locking.
#[async_trait::async_trait]
pub trait PlaybackController: Send + Sync {
    /// Whether the underlying player currently reports a non-zero rate.
    fn is_playing(&self) -> bool;

    /// Whether the user asked for playback and the player reports a
    /// buffering sub-state. Buffering the user did not ask for is not
    /// "loading".
    fn is_loading(&self) -> bool;

    /// The derived playback state projection.
    fn playback_state(&self) -> PlaybackState;

    /// Start playback.
    ///
    /// Sets the intent flag, activates the audio session, commands the
    /// player to play, and emits a "play" analytics event tagged with
    /// `reason`. Calling while already playing issues no second player
    /// command.
    ///
    /// # Errors
    ///
    /// Fails with [`PlaybackError::SessionActivation`] when the session
    /// cannot be acquired; the controller remains in its prior state.
    ///
    /// [`PlaybackError::SessionActivation`]: crate::error::PlaybackError::SessionActivation
    async fn play(&self, reason: &str) -> Result<()>;

    /// Pause playback. Clears the intent flag and emits a "pause" analytics
    /// event carrying the elapsed listening duration since the matching
    /// play.
    async fn pause(&self);

    /// Dispatch to [`pause`](Self::pause) when playing, otherwise to
    /// [`play`](Self::play) with the given reason.
    async fn toggle(&self, reason: &str) -> Result<()>;

    /// Unconditionally pause the player, clear intent, and deactivate the
    /// audio session immediately (without waiting for backgrounding).
    async fn stop(&self);

    /// Register the audio-buffer handler. Replacing a handler silently
    /// discards the previous one; `None` unregisters.
    fn set_audio_buffer_handler(&self, handler: Option<AudioBufferHandler>);

    /// Register the metadata handler. Replacing a handler silently discards
    /// the previous one; `None` unregisters.
    fn set_metadata_handler(&self, handler: Option<MetadataHandler>);

    /// Lifecycle hook: the app moved to the background. Deactivates the
    /// audio session only when playback is not intended.
    async fn handle_app_did_enter_background(&self);

    /// Lifecycle hook: the app is returning to the foreground. Resumes
    /// playback when intended, otherwise pauses the player to guarantee a
    /// consistent UI state.
    async fn handle_app_will_enter_foreground(&self);
}
