//! # Logging & Tracing Infrastructure
//!
//! Configures the `tracing-subscriber` stack for the playback core:
//! - Pretty, JSON, or compact output formats
//! - Module-level filtering via `EnvFilter` syntax
//! - `RUST_LOG` environment override
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
//!
//! let config = LoggingConfig::default()
//!     .with_format(LogFormat::Pretty)
//!     .with_filter("core_playback=debug,info");
//!
//! init_logging(config).expect("Failed to initialize logging");
//!
//! tracing::info!("Playback core started");
//! ```

use crate::error::{Error, Result};
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable pretty format with colors
    Pretty,
    /// Structured JSON format for machine parsing
    Json,
    /// Compact format for production
    Compact,
}

impl Default for LogFormat {
    fn default() -> Self {
        #[cfg(debug_assertions)]
        return Self::Pretty;

        #[cfg(not(debug_assertions))]
        return Self::Json;
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Output format
    pub format: LogFormat,
    /// Filter string in `EnvFilter` syntax (e.g., "core_playback=debug,info").
    /// `RUST_LOG` takes precedence when set.
    pub filter: Option<String>,
    /// Display target module in logs
    pub display_target: bool,
    /// Display thread info
    pub display_thread_info: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            filter: None,
            display_target: true,
            display_thread_info: false,
        }
    }
}

impl LoggingConfig {
    /// Set log format
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the filter string
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }
}

/// Initialize the global tracing subscriber.
///
/// Call exactly once at startup, from the application composition root.
///
/// # Errors
///
/// Returns [`Error::Config`] when the filter string does not parse and
/// [`Error::Internal`] when a global subscriber is already installed.
pub fn init_logging(config: LoggingConfig) -> Result<()> {
    let filter = match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(env) => EnvFilter::try_new(env),
        Err(_) => EnvFilter::try_new(config.filter.as_deref().unwrap_or("info")),
    }
    .map_err(|e| Error::Config(format!("Invalid log filter: {e}")))?;

    let registry = tracing_subscriber::registry().with(filter);

    let init_result = match config.format {
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .pretty()
                    .with_target(config.display_target)
                    .with_thread_names(config.display_thread_info),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(config.display_target)
                    .with_thread_names(config.display_thread_info),
            )
            .try_init(),
        LogFormat::Compact => registry
            .with(
                fmt::layer()
                    .compact()
                    .with_target(config.display_target)
                    .with_thread_names(config.display_thread_info),
            )
            .try_init(),
    };

    init_result.map_err(|e| Error::Internal(format!("Failed to install subscriber: {e}")))
}
