//! # Playback Control Module
//!
//! Keeps a live audio stream playing reliably in the presence of OS audio
//! interruptions, network stalls, app backgrounding, and user-driven backend
//! switching.
//!
//! ## Overview
//!
//! This module provides:
//! - The [`PlaybackController`] contract every concrete backend implements
//! - The shared backend state machine ([`backend::StreamController`]) driving
//!   one player, one audio session, and one remote command surface
//! - Concrete backend controllers ([`backends::IcecastController`],
//!   [`backends::HlsController`]) isolating per-backend quirks
//! - [`PlaybackControllerManager`] for hot-swapping backends at runtime
//!   without losing playback state or registered handlers
//! - [`ExponentialBackoff`] reconnect timing with jitter

pub mod backend;
pub mod backends;
pub mod backoff;
pub mod controller;
pub mod error;
pub mod manager;

pub use backend::ControllerDeps;
pub use backends::{HlsController, IcecastController};
pub use backoff::ExponentialBackoff;
pub use controller::{
    AudioBufferHandler, MetadataHandler, PlaybackController, PlaybackState,
};
pub use error::{PlaybackError, Result};
pub use manager::{
    ControllerFactory, PlaybackControllerManager, PlayerControllerType, StreamEndpoints,
    stream_factory,
};
