//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host platform.
//!
//! ## Overview
//!
//! This crate defines the contract between the playback control core and
//! platform-specific implementations. Each trait represents a capability that
//! the core requires but that must be provided differently per platform
//! (desktop, iOS, Android):
//!
//! - [`StreamPlayer`](player::StreamPlayer) - Real-time media player commands
//!   (play, pause, replace source) and rate/buffering observation
//! - [`AudioSession`](session::AudioSession) - Exclusive audio-output session
//!   activation and route inspection
//! - [`RemoteCommandCenter`](remote::RemoteCommandCenter) - External playback
//!   controls (lock screen, headset, hardware buttons)
//! - [`AnalyticsSink`](analytics::AnalyticsSink) - Fire-and-forget analytics
//!   event capture
//!
//! ## Dependency injection
//!
//! The core never reaches for a global singleton. Concrete adapters are
//! constructed at the application composition root and injected into backend
//! controllers as `Arc<dyn Trait>` handles:
//!
//! ```ignore
//! use std::sync::Arc;
//! use bridge_traits::{AudioSession, StreamPlayer};
//!
//! let player: Arc<dyn StreamPlayer> = Arc::new(AvfPlayer::new());
//! let session: Arc<dyn AudioSession> = Arc::new(AvfSession::shared());
//! let controller = IcecastController::new(deps(player, session), STREAM_URL);
//! ```
//!
//! ## Error Handling
//!
//! All bridge traits use the [`BridgeError`](error::BridgeError) type for
//! consistent error handling, except session activation which carries its own
//! [`SessionError`](session::SessionError) because the core's public `play()`
//! contract surfaces it. Platform implementations should convert native
//! errors into these types with actionable messages.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` bounds so adapters can be shared
//! freely across async tasks. Implementations must ensure thread safety.

pub mod analytics;
pub mod error;
pub mod player;
pub mod remote;
pub mod session;

pub use error::BridgeError;

// Re-export commonly used types
pub use analytics::{AnalyticsSink, NoopAnalytics, TracingAnalytics};
pub use player::{AudioFrameChunk, StreamFormat, StreamItem, StreamPlayer};
pub use remote::{CommandOutcome, RemoteCommand, RemoteCommandCenter, RemoteCommandHandler};
pub use session::{AudioRoute, AudioSession, RoutePort, RoutePortKind, SessionError};
