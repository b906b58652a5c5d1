//! Remote command surface bridge trait.
//!
//! OS-provided external playback controls (lock screen, headset buttons,
//! watch complications) arrive through this surface. A backend controller
//! registers a single handler at construction mapping each command onto the
//! same play/pause/toggle/stop operations as in-app controls; replacing the
//! handler silently discards the previous one.

use futures::future::BoxFuture;
use std::sync::Arc;

/// External playback command delivered by the host platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteCommand {
    Play,
    Pause,
    Toggle,
    Stop,
}

impl RemoteCommand {
    /// Stable string tag used in logs and analytics properties.
    pub fn as_str(&self) -> &'static str {
        match self {
            RemoteCommand::Play => "play",
            RemoteCommand::Pause => "pause",
            RemoteCommand::Toggle => "toggle",
            RemoteCommand::Stop => "stop",
        }
    }
}

/// Result a command handler reports back to the host so it can update the
/// system UI (e.g., flip the lock-screen play button only on success).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The command was accepted and acted upon.
    Handled,
    /// The command could not be carried out.
    Failed,
}

/// Async callback invoked for each incoming remote command.
pub type RemoteCommandHandler =
    Arc<dyn Fn(RemoteCommand) -> BoxFuture<'static, CommandOutcome> + Send + Sync>;

/// Trait for the platform remote command center.
///
/// Implementations wire the registered handler to the native command targets
/// (MPRemoteCommandCenter, MediaSession, MPRIS, ...). Registration replaces
/// any previously registered handler.
pub trait RemoteCommandCenter: Send + Sync {
    /// Register the handler invoked for incoming commands.
    fn register_handler(&self, handler: RemoteCommandHandler);

    /// Drop the registered handler. Subsequent commands report
    /// [`CommandOutcome::Failed`] until a new handler is registered.
    fn clear_handler(&self);
}
