//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the playback control core:
//! - Logging and tracing infrastructure
//! - Configuration management
//! - System event bus
//!
//! ## Overview
//!
//! This crate contains the runtime utilities the playback crates depend on.
//! It establishes the logging conventions, configuration surface, and the
//! typed event channel that carries OS/system notifications (rate changes,
//! interruptions, stalls, lifecycle transitions) to backend controllers.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
