//! # System Event Bus
//!
//! Typed event channel for the playback control core, built on
//! `tokio::sync::broadcast`. This replaces notification-center-style control
//! flow with a single inbound message type carrying a tagged payload, so the
//! backend state machine can be driven by synthetic events in tests exactly
//! as it is driven by real OS notifications in production.
//!
//! ## Overview
//!
//! - **Event Types**: [`SystemEvent`] wraps [`PlayerEvent`] (rate changes,
//!   stalls, interruptions, route changes, stream metadata, tapped audio
//!   buffers) and [`LifecycleEvent`] (background/foreground transitions)
//! - **EventBus**: Central broadcast channel for publishing events
//! - **EventStream**: Wrapper for consuming events with filtering
//!
//! Host platforms observe their native notification sources (AVAudioSession
//! interruptions, UIApplication lifecycle, player KVO, ...) and translate
//! each into exactly one [`SystemEvent`] emitted on the bus. Events are
//! delivered to every subscriber in arrival order.
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{EventBus, SystemEvent, PlayerEvent};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let bus = EventBus::new(100);
//! let mut subscriber = bus.subscribe();
//!
//! bus.emit(SystemEvent::Player(PlayerEvent::RateChanged { rate: 1.0 })).ok();
//!
//! let event = subscriber.recv().await.unwrap();
//! assert!(matches!(event, SystemEvent::Player(PlayerEvent::RateChanged { .. })));
//! # }
//! ```
//!
//! ## Error Handling
//!
//! `tokio::sync::broadcast` can produce two receive errors:
//!
//! - **`RecvError::Lagged(n)`**: the subscriber was too slow and missed `n`
//!   events. Non-fatal; the subscriber keeps receiving new events.
//! - **`RecvError::Closed`**: all senders dropped. Treat as shutdown.

use bridge_traits::player::AudioFrameChunk;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tokio::sync::broadcast;

// Re-export commonly used types
pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
///
/// Playback control traffic is light (a handful of events per user action),
/// but audio-buffer taps can burst; subscribers that fall behind by more
/// than this receive `RecvError::Lagged`.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Core Event Types
// ============================================================================

/// Top-level event enum encompassing all event categories.
///
/// This is the single message type published and received through the bus.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload")]
pub enum SystemEvent {
    /// Events originating from the underlying player or audio session.
    Player(PlayerEvent),
    /// App lifecycle transitions.
    Lifecycle(LifecycleEvent),
}

impl SystemEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            SystemEvent::Player(e) => e.description(),
            SystemEvent::Lifecycle(e) => e.description(),
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            SystemEvent::Player(PlayerEvent::Stalled) => EventSeverity::Warning,
            SystemEvent::Player(PlayerEvent::Interrupted { .. }) => EventSeverity::Info,
            SystemEvent::Lifecycle(_) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    /// Debug-level events (verbose)
    Debug,
    /// Informational events
    Info,
    /// Warning events
    Warning,
    /// Error events
    Error,
}

// ============================================================================
// Player Events
// ============================================================================

/// Phase of an audio session interruption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InterruptionPhase {
    /// Another process took exclusive control of audio output.
    Began,
    /// The interrupting process released audio output.
    Ended,
}

/// Reason attached to an interruption notification, when the OS supplies one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InterruptionReason {
    /// The active output route was disconnected (e.g., headphones unplugged
    /// mid-interruption). Not balanced by an `Ended` notification.
    RouteDisconnected,
    /// Reason reported by the OS but not recognized by the core.
    Unrecognized(String),
}

/// Events originating from the underlying player or audio session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event")]
pub enum PlayerEvent {
    /// The player's reported rate changed.
    RateChanged {
        /// New reported rate; `0.0` means silent.
        rate: f32,
    },
    /// The live media pipeline stopped delivering data unexpectedly.
    Stalled,
    /// An audio session interruption began or ended.
    Interrupted {
        /// Which side of the interruption this notification describes.
        phase: InterruptionPhase,
        /// OS hint that playback should resume when the interruption ends.
        should_resume: bool,
        /// Optional reason supplied by the OS.
        reason: Option<InterruptionReason>,
    },
    /// The audio output route changed (device plugged/unplugged, handoff).
    RouteChanged {
        /// Human-readable description of the change.
        description: String,
    },
    /// New stream metadata arrived (e.g., ICY title updates).
    MetadataReceived {
        /// Metadata key/value pairs.
        fields: HashMap<String, String>,
    },
    /// A chunk of decoded audio frames was tapped for visualization.
    AudioBufferReady {
        /// The tapped frames.
        chunk: AudioFrameChunk,
    },
}

impl PlayerEvent {
    fn description(&self) -> &str {
        match self {
            PlayerEvent::RateChanged { .. } => "Player rate changed",
            PlayerEvent::Stalled => "Playback stalled",
            PlayerEvent::Interrupted { .. } => "Audio session interruption",
            PlayerEvent::RouteChanged { .. } => "Audio route changed",
            PlayerEvent::MetadataReceived { .. } => "Stream metadata received",
            PlayerEvent::AudioBufferReady { .. } => "Audio buffer tapped",
        }
    }
}

// ============================================================================
// Lifecycle Events
// ============================================================================

/// App lifecycle transitions relevant to session management.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum LifecycleEvent {
    /// The app moved to the background.
    EnteredBackground,
    /// The app is about to return to the foreground.
    WillEnterForeground,
}

impl LifecycleEvent {
    fn description(&self) -> &str {
        match self {
            LifecycleEvent::EnteredBackground => "App entered background",
            LifecycleEvent::WillEnterForeground => "App will enter foreground",
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central event bus for publishing and subscribing to system events.
///
/// Uses `tokio::sync::broadcast` internally, which provides:
/// - Multiple producers (clone the `EventBus`)
/// - Multiple consumers (each `subscribe()` creates a new receiver)
/// - Non-blocking sends (events are cloned for each subscriber)
/// - Lagging detection (slow subscribers get `RecvError::Lagged`)
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<SystemEvent>,
}

impl EventBus {
    /// Creates a new event bus with the specified buffer size.
    ///
    /// When a subscriber falls behind by more than `capacity` events it will
    /// receive a `RecvError::Lagged` error on its next receive.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an
    /// error if there are no active subscribers.
    pub fn emit(&self, event: SystemEvent) -> Result<usize, SendError<SystemEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscriber to receive events.
    ///
    /// Each call creates an independent receiver that will receive all
    /// future events. Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<SystemEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

/// Type alias for event filter functions.
type EventFilter = Box<dyn Fn(&SystemEvent) -> bool + Send + Sync>;

/// A wrapper around `broadcast::Receiver` with additional filtering.
///
/// Provides a more ergonomic API for consuming a subset of the bus traffic,
/// e.g. only lifecycle events.
pub struct EventStream {
    receiver: Receiver<SystemEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    /// Creates a new event stream from a receiver.
    pub fn new(receiver: Receiver<SystemEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Adds a filter function to this stream. Only events that match the
    /// filter will be returned by `recv()`.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&SystemEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    /// Receives the next event that passes the filter (if any).
    ///
    /// # Errors
    ///
    /// Returns `RecvError::Lagged(n)` if the subscriber fell behind by `n`
    /// events, `RecvError::Closed` if all senders have been dropped.
    pub async fn recv(&mut self) -> Result<SystemEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;

            let Some(filter) = &self.filter else {
                return Ok(event);
            };

            if filter(&event) {
                return Ok(event);
            }
        }
    }

    /// Attempts to receive an event without blocking.
    ///
    /// Returns `None` if no matching events are currently available.
    pub fn try_recv(&mut self) -> Option<Result<SystemEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    let Some(filter) = &self.filter else {
                        return Some(Ok(event));
                    };

                    if filter(&event) {
                        return Some(Ok(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
