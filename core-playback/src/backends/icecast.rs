//! Icecast backend controller.
//!
//! Icecast serves a continuous live stream with no timeline: a player that
//! pauses and later resumes would drain minutes-old buffer instead of
//! rejoining the broadcast. This backend therefore re-issues
//! `replace_source` before every resume so playback always restarts at the
//! live edge.

use crate::backend::{ControllerDeps, SourcePolicy, StreamController};
use crate::controller::{AudioBufferHandler, MetadataHandler, PlaybackController, PlaybackState};
use crate::error::Result;
use bridge_traits::player::{StreamFormat, StreamItem};

/// Controller for a live Icecast stream (MP3 or AAC).
pub struct IcecastController {
    inner: StreamController,
}

impl IcecastController {
    /// Creates a controller for the Icecast mount at `url`.
    ///
    /// `format` is a hint for the player's demuxer; Icecast itself does not
    /// announce the codec ahead of the byte stream.
    pub fn new(deps: ControllerDeps, url: impl Into<String>, format: StreamFormat) -> Self {
        let item = StreamItem::new(url, Some(format));
        Self {
            inner: StreamController::new(deps, item, SourcePolicy::RejoinLiveEdge),
        }
    }
}

#[async_trait::async_trait]
impl PlaybackController for IcecastController {
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
