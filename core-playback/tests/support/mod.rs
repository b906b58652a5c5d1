//! Hand-rolled fakes for the bridge capabilities, shared by the integration
//! tests. Each fake records the calls it receives so tests can assert on
//! ordering as well as counts.

#![allow(dead_code)]

use bridge_traits::analytics::AnalyticsSink;
use bridge_traits::error::BridgeError;
use bridge_traits::player::{StreamItem, StreamPlayer};
use bridge_traits::remote::{CommandOutcome, RemoteCommand, RemoteCommandCenter, RemoteCommandHandler};
use bridge_traits::session::{AudioRoute, AudioSession, SessionError};
use core_playback::ControllerDeps;
use core_runtime::config::PlaybackConfig;
use core_runtime::events::EventBus;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Player fake exposing its reported rate and buffering flag as test knobs.
///
/// With `auto_start` set (the default), a `play` command immediately raises
/// the rate to 1.0, modelling a healthy stream. Tests simulating a dead
/// stream clear it so play commands leave the player silent.
#[derive(Default)]
pub struct FakePlayer {
    rate: Mutex<f32>,
    buffering: AtomicBool,
    auto_start: AtomicBool,
    fail_commands: AtomicBool,
    commands: Mutex<Vec<String>>,
}

impl FakePlayer {
    pub fn new() -> Arc<Self> {
        let player = Self::default();
        player.auto_start.store(true, Ordering::SeqCst);
        Arc::new(player)
    }

    pub fn set_rate(&self, rate: f32) {
        *self.rate.lock() = rate;
    }

    pub fn set_buffering(&self, buffering: bool) {
        self.buffering.store(buffering, Ordering::SeqCst);
    }

    pub fn set_auto_start(&self, auto_start: bool) {
        self.auto_start.store(auto_start, Ordering::SeqCst);
    }

    pub fn set_fail_commands(&self, fail: bool) {
        self.fail_commands.store(fail, Ordering::SeqCst);
    }

    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().clone()
    }

    pub fn command_count(&self, command: &str) -> usize {
        self.commands
            .lock()
            .iter()
            .filter(|c| c.as_str() == command || c.starts_with(&format!("{command}:")))
            .count()
    }
}

#[async_trait::async_trait]
impl StreamPlayer for FakePlayer {
    async fn play(&self) -> Result<(), BridgeError> {
        self.commands.lock().push("play".to_string());
        if self.fail_commands.load(Ordering::SeqCst) {
            return Err(BridgeError::OperationFailed("play refused".to_string()));
        }
        if self.auto_start.load(Ordering::SeqCst) {
            *self.rate.lock() = 1.0;
        }
        Ok(())
    }

    async fn pause(&self) -> Result<(), BridgeError> {
        self.commands.lock().push("pause".to_string());
        *self.rate.lock() = 0.0;
        Ok(())
    }

    async fn replace_source(&self, item: StreamItem) -> Result<(), BridgeError> {
        self.commands.lock().push(format!("source:{}", item.url));
        Ok(())
    }

    fn rate(&self) -> f32 {
        *self.rate.lock()
    }

    fn is_buffering(&self) -> bool {
        self.buffering.load(Ordering::SeqCst)
    }
}

/// Session fake counting activations/deactivations, with a failure knob.
#[derive(Default)]
pub struct FakeSession {
    fail_activate: AtomicBool,
    activations: AtomicUsize,
    deactivations: AtomicUsize,
}

impl FakeSession {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_fail_activate(&self, fail: bool) {
        self.fail_activate.store(fail, Ordering::SeqCst);
    }

    pub fn activations(&self) -> usize {
        self.activations.load(Ordering::SeqCst)
    }

    pub fn deactivations(&self) -> usize {
        self.deactivations.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl AudioSession for FakeSession {
    async fn activate(&self) -> Result<(), SessionError> {
        if self.fail_activate.load(Ordering::SeqCst) {
            return Err(SessionError::ActivationFailed("output busy".to_string()));
        }
        self.activations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn deactivate(&self) -> Result<(), SessionError> {
        self.deactivations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn current_route(&self) -> AudioRoute {
        AudioRoute { outputs: vec![] }
    }
}

/// Remote command fake that stores the registered handler and lets tests
/// drive commands through it like the OS would.
#[derive(Default)]
pub struct FakeRemote {
    handler: Mutex<Option<RemoteCommandHandler>>,
}

impl FakeRemote {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn has_handler(&self) -> bool {
        self.handler.lock().is_some()
    }

    pub async fn send(&self, command: RemoteCommand) -> CommandOutcome {
        let handler = self.handler.lock().clone();
        match handler {
            Some(handler) => handler(command).await,
            None => CommandOutcome::Failed,
        }
    }
}

impl RemoteCommandCenter for FakeRemote {
    fn register_handler(&self, handler: RemoteCommandHandler) {
        *self.handler.lock() = Some(handler);
    }

    fn clear_handler(&self) {
        *self.handler.lock() = None;
    }
}

/// Analytics sink recording every captured event with its properties.
#[derive(Default)]
pub struct RecordingAnalytics {
    events: Mutex<Vec<(String, HashMap<String, String>)>>,
}

impl RecordingAnalytics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<(String, HashMap<String, String>)> {
        self.events.lock().clone()
    }

    pub fn names(&self) -> Vec<String> {
        self.events.lock().iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn property_of(&self, event: &str, key: &str) -> Option<String> {
        self.events
            .lock()
            .iter()
            .rev()
            .find(|(name, _)| name == event)
            .and_then(|(_, props)| props.get(key).cloned())
    }
}

impl AnalyticsSink for RecordingAnalytics {
    fn capture(&self, event: &str, properties: HashMap<String, String>) {
        self.events.lock().push((event.to_string(), properties));
    }
}

/// One controller's worth of fakes plus the deps bundle built over them.
pub struct TestRig {
    pub deps: ControllerDeps,
    pub player: Arc<FakePlayer>,
    pub session: Arc<FakeSession>,
    pub remote: Arc<FakeRemote>,
    pub analytics: Arc<RecordingAnalytics>,
    pub events: EventBus,
}

impl TestRig {
    pub fn new() -> Self {
        let player = FakePlayer::new();
        let session = FakeSession::new();
        let remote = FakeRemote::new();
        let analytics = RecordingAnalytics::new();
        let events = EventBus::default();
        let deps = ControllerDeps {
            player: player.clone(),
            session: session.clone(),
            remote: remote.clone(),
            analytics: analytics.clone(),
            events: events.clone(),
            config: PlaybackConfig::default(),
        };
        Self {
            deps,
            player,
            session,
            remote,
            analytics,
            events,
        }
    }
}

/// Lets the controller's event task and any in-flight reconnect attempts run.
///
/// All tests run under a paused tokio clock, so the sleep both yields to
/// other tasks and auto-advances virtual time.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(5)).await;
}

/// Advances the paused clock far enough for a reconnect backoff wait.
pub async fn advance(duration: Duration) {
    tokio::time::sleep(duration).await;
}
