//! Player bridge trait and supporting stream types.
//!
//! These abstractions let the playback control core drive a real-time media
//! player without knowing anything about decoding or network transport. Host
//! applications provide a concrete implementation backed by their platform
//! player (AVPlayer, ExoPlayer, GStreamer, ...).

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Container/codec hint for a live stream source.
///
/// This enum is intentionally extensible; use [`StreamFormat::Other`] for
/// formats not explicitly listed here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamFormat {
    /// Raw Icecast/Shoutcast MP3 stream.
    Mp3,
    /// Raw AAC stream.
    Aac,
    /// HTTP Live Streaming playlist.
    Hls,
    /// Vendor- or platform-specific stream format.
    Other(String),
}

/// Source descriptor handed to [`StreamPlayer::replace_source`].
///
/// Live streams carry no intrinsic duration or seek surface, so an item is
/// just a URL plus an optional format hint for players that need one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamItem {
    /// Full URL of the live stream endpoint.
    pub url: String,
    /// Optional hint about the stream format.
    pub format_hint: Option<StreamFormat>,
}

impl StreamItem {
    /// Create a new stream item for the given URL.
    pub fn new(url: impl Into<String>, format_hint: Option<StreamFormat>) -> Self {
        Self {
            url: url.into(),
            format_hint,
        }
    }

    /// Returns `true` if the item points at an HLS playlist.
    pub fn is_hls(&self) -> bool {
        matches!(self.format_hint, Some(StreamFormat::Hls))
    }
}

/// Chunk of decoded PCM frames tapped from the playing stream.
///
/// Samples are interleaved f32 values normalized to `[-1.0, 1.0]` (stereo is
/// LRLRLR...). The core forwards these chunks untouched to the registered
/// audio-buffer handler for visualization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioFrameChunk {
    /// Interleaved PCM samples in the range `[-1.0, 1.0]`.
    pub samples: Vec<f32>,
    /// Number of frames represented by `samples` (frame = sample per channel).
    pub frames: usize,
    /// Presentation timestamp for the first frame in this chunk.
    pub timestamp: Duration,
}

impl AudioFrameChunk {
    /// Create a new audio frame chunk.
    pub fn new(samples: Vec<f32>, frames: usize, timestamp: Duration) -> Self {
        Self {
            samples,
            frames,
            timestamp,
        }
    }

    /// Returns `true` if the chunk contains no sample data.
    pub fn is_empty(&self) -> bool {
        self.frames == 0 || self.samples.is_empty()
    }
}

/// Trait for platform media players that render a live stream.
///
/// The core issues commands through this trait and observes the player's
/// self-reported state through [`rate`](StreamPlayer::rate) and
/// [`is_buffering`](StreamPlayer::is_buffering). Rate changes must also be
/// published as `RateChanged` events on the system event bus so the control
/// state machine can fold them back into its public `is_playing` signal.
///
/// ## Design Considerations
///
/// - Command methods should be fast; long-running work belongs inside the
///   platform player, not in the adapter.
/// - `rate()` is the player's *reported* rate, not the last commanded one.
///   A player that was told to play but has not produced audio yet reports 0.
/// - Live streams are never seekable; there is no seek surface here.
#[async_trait::async_trait]
pub trait StreamPlayer: Send + Sync {
    /// Command the player to start (or resume) rendering the current source.
    async fn play(&self) -> Result<()>;

    /// Command the player to stop rendering without releasing the source.
    async fn pause(&self) -> Result<()>;

    /// Swap the player's source item. Used on first play and whenever a
    /// backend wants to rejoin the live edge instead of draining a stale
    /// buffer.
    async fn replace_source(&self, item: StreamItem) -> Result<()>;

    /// The player's currently reported playback rate. `0.0` means silent;
    /// anything greater means audio is being rendered.
    fn rate(&self) -> f32;

    /// Whether the player reports a buffering sub-state (told to play, but
    /// waiting for data).
    fn is_buffering(&self) -> bool;
}
