//! # Playback Controller Manager
//!
//! Owns the active backend controller and performs hot switching between
//! stream backends while preserving the app-facing handler registrations.
//!
//! Switching is stop-before-construct: the outgoing controller is stopped
//! and dropped (releasing its audio session and remote-command registration)
//! before the replacement is built. Constructing the replacement first would
//! let the old controller's teardown clear the new one's remote handler.

use crate::backend::ControllerDeps;
use crate::backends::{HlsController, IcecastController};
use crate::controller::{AudioBufferHandler, MetadataHandler, PlaybackController, PlaybackState};
use crate::error::{PlaybackError, Result};
use bridge_traits::player::StreamFormat;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// The selectable stream backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerControllerType {
    /// 128 kbps MP3 Icecast mount.
    Icecast128,
    /// Lower-bitrate AAC Icecast mount for constrained connections.
    IcecastMobile,
    /// HLS playlist.
    Hls,
}

impl PlayerControllerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Icecast128 => "icecast_128",
            Self::IcecastMobile => "icecast_mobile",
            Self::Hls => "hls",
        }
    }
}

/// Builds a backend controller for the requested type.
///
/// Injected so hosts can point different backends at different environments
/// and tests can substitute instrumented controllers.
pub type ControllerFactory =
    Box<dyn Fn(PlayerControllerType) -> Box<dyn PlaybackController> + Send + Sync>;

/// Stream URLs for the production backends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamEndpoints {
    pub icecast_128: String,
    pub icecast_mobile: String,
    pub hls: String,
}

/// A [`ControllerFactory`] over the real backend controllers.
///
/// `deps` is called once per constructed controller; each invocation must
/// yield a fresh set of platform capabilities for that controller to own.
pub fn stream_factory(
    endpoints: StreamEndpoints,
    deps: impl Fn() -> ControllerDeps + Send + Sync + 'static,
) -> ControllerFactory {
    Box::new(move |kind| match kind {
        PlayerControllerType::Icecast128 => Box::new(IcecastController::new(
            deps(),
            endpoints.icecast_128.clone(),
            StreamFormat::Mp3,
        )),
        PlayerControllerType::IcecastMobile => Box::new(IcecastController::new(
            deps(),
            endpoints.icecast_mobile.clone(),
            StreamFormat::Aac,
        )),
        PlayerControllerType::Hls => {
            Box::new(HlsController::new(deps(), endpoints.hls.clone()))
        }
    })
}

/// Facade over the active backend controller with hot switching.
///
/// Handler registrations (`audio buffer`, `metadata`) survive backend
/// switches: the manager caches them and re-applies them to each new
/// controller.
pub struct PlaybackControllerManager {
    factory: ControllerFactory,
    active: Option<Box<dyn PlaybackController>>,
    active_kind: PlayerControllerType,
    audio_handler: Option<AudioBufferHandler>,
    metadata_handler: Option<MetadataHandler>,
}

impl PlaybackControllerManager {
    /// Creates a manager with the given backend active.
    pub fn new(factory: ControllerFactory, initial: PlayerControllerType) -> Self {
        let active = factory(initial);
        info!(backend = initial.as_str(), "playback backend selected");
        Self {
            factory,
            active: Some(active),
            active_kind: initial,
            audio_handler: None,
            metadata_handler: None,
        }
    }

    /// The currently active backend type.
    pub fn active_kind(&self) -> PlayerControllerType {
        self.active_kind
    }

    /// Switches to another backend.
    ///
    /// The outgoing controller is stopped and torn down before the new one
    /// is constructed, releasing its audio session and remote registration.
    /// If playback was intended on the old backend, the new one is started
    /// (at the live edge) with reason `"controller_switch"`. Switching to
    /// the already-active backend is a no-op.
    pub async fn switch_to(&mut self, kind: PlayerControllerType) {
        if kind == self.active_kind {
            debug!(backend = kind.as_str(), "backend already active");
            return;
        }

        let resume = self
            .active
            .as_ref()
            .is_some_and(|c| c.is_playing() || c.is_loading());
        if let Some(old) = self.active.take() {
            old.stop().await;
            drop(old);
        }

        let next = (self.factory)(kind);
        next.set_audio_buffer_handler(self.audio_handler.clone());
        next.set_metadata_handler(self.metadata_handler.clone());
        if resume {
            if let Err(e) = next.play("controller_switch").await {
                warn!(error = %e, backend = kind.as_str(), "failed to resume on new backend");
            }
        }
        self.active = Some(next);
        self.active_kind = kind;
        info!(backend = kind.as_str(), resumed = resume, "switched playback backend");
    }

    // ------------------------------------------------------------------
    // Handler registration (cached across switches)
    // ------------------------------------------------------------------

    pub fn set_audio_buffer_handler(&mut self, handler: Option<AudioBufferHandler>) {
        self.audio_handler = handler.clone();
        if let Some(active) = &self.active {
            active.set_audio_buffer_handler(handler);
        }
    }

    pub fn set_metadata_handler(&mut self, handler: Option<MetadataHandler>) {
        self.metadata_handler = handler.clone();
        if let Some(active) = &self.active {
            active.set_metadata_handler(handler);
        }
    }

    // ------------------------------------------------------------------
    // Forwarded controller surface
    // ------------------------------------------------------------------

    pub fn is_playing(&self) -> bool {
        self.active.as_ref().is_some_and(|c| c.is_playing())
    }

    pub fn is_loading(&self) -> bool {
        self.active.as_ref().is_some_and(|c| c.is_loading())
    }

    pub fn playback_state(&self) -> PlaybackState {
        match &self.active {
            Some(active) => active.playback_state(),
            None => PlaybackState::Stopped,
        }
    }

    pub async fn play(&self, reason: &str) -> Result<()> {
        match &self.active {
            Some(active) => active.play(reason).await,
            None => Err(PlaybackError::ControllerGone),
        }
    }

    pub async fn pause(&self) {
        if let Some(active) = &self.active {
            active.pause().await;
        }
    }

    pub async fn toggle(&self, reason: &str) -> Result<()> {
        match &self.active {
            Some(active) => active.toggle(reason).await,
            None => Err(PlaybackError::ControllerGone),
        }
    }

    pub async fn stop(&self) {
        if let Some(active) = &self.active {
            active.stop().await;
        }
    }

    pub async fn handle_app_did_enter_background(&self) {
        if let Some(active) = &self.active {
            active.handle_app_did_enter_background().await;
        }
    }

    pub async fn handle_app_will_enter_foreground(&self) {
        if let Some(active) = &self.active {
            active.handle_app_will_enter_foreground().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn controller_type_round_trips_through_serde() {
        let json = serde_json::to_string(&PlayerControllerType::IcecastMobile).unwrap();
        assert_eq!(json, "\"icecast_mobile\"");
        let back: PlayerControllerType = serde_json::from_str(&json).unwrap();
        assert_eq!(back, PlayerControllerType::IcecastMobile);
    }

    #[test]
    fn controller_type_names_are_stable() {
        assert_eq!(PlayerControllerType::Icecast128.as_str(), "icecast_128");
        assert_eq!(PlayerControllerType::Hls.as_str(), "hls");
    }
}
