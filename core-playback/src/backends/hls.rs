//! HLS backend controller.
//!
//! HLS players track the live edge themselves through playlist reloads, so
//! the source is loaded once and reused across pause/resume cycles. The
//! interruption, stall, and lifecycle policy is otherwise identical to the
//! Icecast backend.

use crate::backend::{ControllerDeps, SourcePolicy, StreamController};
use crate::controller::{AudioBufferHandler, MetadataHandler, PlaybackController, PlaybackState};
use crate::error::Result;
use bridge_traits::player::{StreamFormat, StreamItem};

/// Controller for a live HLS stream.
pub struct HlsController {
    inner: StreamController,
}

impl HlsController {
    /// Creates a controller for the HLS playlist at `url`.
    pub fn new(deps: ControllerDeps, url: impl Into<String>) -> Self {
        let item = StreamItem::new(url, Some(StreamFormat::Hls));
        Self {
            inner: StreamController::new(deps, item, SourcePolicy::ReuseSource),
        }
    }
}

#[async_trait::async_trait]
impl PlaybackController for HlsController {
    fn is_playing(&self) -> bool {
        self.inner.is_playing()
    }

    fn is_loading(&self) -> bool {
        self.inner.is_loading()
    }

    fn playback_state(&self) -> PlaybackState {
        self.inner.playback_state()
    }

    async fn play(&self, reason: &str) -> Result<()> {
        self.inner.play(reason).await
    }

    async fn pause(&self) {
        self.inner.pause().await;
    }

    async fn toggle(&self, reason: &str) -> Result<()> {
        self.inner.toggle(reason).await
    }

    async fn stop(&self) {
        self.inner.stop().await;
    }

    fn set_audio_buffer_handler(&self, handler: Option<AudioBufferHandler>) {
        self.inner.set_audio_buffer_handler(handler);
    }

    fn set_metadata_handler(&self, handler: Option<MetadataHandler>) {
        self.inner.set_metadata_handler(handler);
    }

    async fn handle_app_did_enter_background(&self) {
        self.inner.handle_app_did_enter_background().await;
    }

    async fn handle_app_will_enter_foreground(&self) {
        self.inner.handle_app_will_enter_foreground().await;
    }
}
